use clap::Parser;
use postmark_client::config::cli::{BounceAction, Command, SendArgs};
use postmark_client::utils::error::ErrorSeverity;
use postmark_client::utils::logger::{self, LogFormat};
use postmark_client::utils::validation::Validate;
use postmark_client::{
    AttachmentSource, BounceManager, BounceQuery, CliConfig, Mail, PostmarkError,
    PostmarkSettings,
};
use serde::Serialize;

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    let log_format = if config.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(log_format, config.verbose);

    tracing::debug!("CLI config: {:?}", config.command);

    let settings = match config.load_settings().and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => settings,
        Err(e) => exit_with(e),
    };

    let outcome = match &config.command {
        Command::Send(args) => run_send(args, &settings),
        Command::Bounces { action } => run_bounces(action, &settings),
    };

    if let Err(e) = outcome {
        exit_with(e);
    }

    Ok(())
}

fn exit_with(e: PostmarkError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 4,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn print_json<T: Serialize>(value: &T) -> postmark_client::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_send(args: &SendArgs, settings: &PostmarkSettings) -> postmark_client::Result<()> {
    let mut mail = Mail::from_settings(settings);

    if let Some(from) = &args.from {
        mail.sender = Some(from.clone());
    }
    mail.to = args.to.clone();
    mail.cc = args.cc.clone();
    mail.bcc = args.bcc.clone();
    mail.reply_to = args.reply_to.clone();
    mail.subject = args.subject.clone();
    mail.text_body = args.text.clone();
    mail.html_body = args.html.clone();
    mail.tag = args.tag.clone();
    mail.track_opens = mail.track_opens || args.track_opens;
    mail.track_links = args.track_links;
    if args.message_stream.is_some() {
        mail.message_stream = args.message_stream.clone();
    }

    for header in &args.headers {
        let (name, value) =
            header
                .split_once(':')
                .ok_or_else(|| PostmarkError::ValidationError {
                    message: format!("Header '{}' must look like NAME:VALUE", header),
                })?;
        mail.add_header(name.trim(), value.trim());
    }

    mail.attachments = args
        .attachments
        .iter()
        .map(|path| AttachmentSource::File(path.clone()))
        .collect();
    for path in &args.mime_parts {
        mail.attachments
            .push(AttachmentSource::Mime(std::fs::read(path)?));
    }

    mail.template_id = args.template_id;
    mail.template_alias = args.template_alias.clone();
    if let Some(model) = &args.template_model {
        mail.template_model = Some(serde_json::from_str(model)?);
    }

    let response = if mail.template_id.is_some() || mail.template_alias.is_some() {
        mail.send_with_template()?
    } else {
        mail.send()?
    };

    tracing::info!("✅ Message accepted: {}", response.message);
    print_json(&response)
}

fn run_bounces(action: &BounceAction, settings: &PostmarkSettings) -> postmark_client::Result<()> {
    let manager = BounceManager::from_settings(settings);

    match action {
        BounceAction::List {
            count,
            offset,
            bounce_type,
            inactive,
            email_filter,
            tag,
        } => {
            let query = BounceQuery {
                count: *count,
                offset: *offset,
                bounce_type: bounce_type.clone(),
                inactive: *inactive,
                email_filter: email_filter.clone(),
                tag: tag.clone(),
                message_id: None,
            };
            print_json(&manager.get_all(&query)?)
        }
        BounceAction::Get { id } => print_json(&manager.get(*id)?),
        BounceAction::Dump { id } => {
            println!("{}", manager.get_dump(*id)?.body);
            Ok(())
        }
        BounceAction::Activate { id } => print_json(&manager.activate(*id)?),
        BounceAction::Tags => print_json(&manager.get_tags()?),
        BounceAction::Stats => print_json(&manager.get_delivery_stats()?),
    }
}
