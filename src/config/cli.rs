use crate::config::settings::PostmarkSettings;
use crate::domain::model::TrackLinks;
use crate::utils::error::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "postmark")]
#[command(about = "Send e-mail and manage bounces through the Postmark API")]
pub struct CliConfig {
    #[arg(long, global = true, help = "TOML file with a [postmark] table")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Server API token (overrides POSTMARK_API_KEY)")]
    pub api_key: Option<String>,

    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[arg(long, global = true, help = "Log the JSON payload instead of sending")]
    pub test_mode: bool,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// 寄出一封郵件
    Send(SendArgs),
    /// 查詢與管理退信
    Bounces {
        #[command(subcommand)]
        action: BounceAction,
    },
}

#[derive(Debug, Clone, Args)]
pub struct SendArgs {
    #[arg(long)]
    pub from: Option<String>,

    #[arg(long, value_delimiter = ',', required = true)]
    pub to: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    pub cc: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    pub bcc: Vec<String>,

    #[arg(long)]
    pub reply_to: Option<String>,

    #[arg(long)]
    pub subject: Option<String>,

    #[arg(long)]
    pub text: Option<String>,

    #[arg(long)]
    pub html: Option<String>,

    #[arg(long)]
    pub tag: Option<String>,

    #[arg(long = "header", value_name = "NAME:VALUE")]
    pub headers: Vec<String>,

    #[arg(long = "attach", value_name = "PATH")]
    pub attachments: Vec<PathBuf>,

    #[arg(long = "mime-part", value_name = "PATH", help = "Attach a raw MIME part, e.g. an inline image")]
    pub mime_parts: Vec<PathBuf>,

    #[arg(long)]
    pub track_opens: bool,

    #[arg(long)]
    pub track_links: Option<TrackLinks>,

    #[arg(long)]
    pub message_stream: Option<String>,

    #[arg(long)]
    pub template_id: Option<u64>,

    #[arg(long)]
    pub template_alias: Option<String>,

    #[arg(long, help = "Template model as a JSON object")]
    pub template_model: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum BounceAction {
    List {
        #[arg(long, default_value = "25")]
        count: u32,
        #[arg(long, default_value = "0")]
        offset: u32,
        #[arg(long = "type")]
        bounce_type: Option<String>,
        #[arg(long)]
        inactive: Option<bool>,
        #[arg(long)]
        email_filter: Option<String>,
        #[arg(long)]
        tag: Option<String>,
    },
    Get {
        id: i64,
    },
    Dump {
        id: i64,
    },
    Activate {
        id: i64,
    },
    Tags,
    Stats,
}

impl CliConfig {
    /// 設定檔（若有）→ 環境變數 → 命令列參數，後者覆蓋前者
    pub fn load_settings(&self) -> Result<PostmarkSettings> {
        let base = match &self.config {
            Some(path) => {
                tracing::debug!("Loading settings from {}", path.display());
                PostmarkSettings::from_file(path)?
            }
            None => PostmarkSettings::default(),
        };

        let mut settings = base.merge_env()?;

        if let Some(api_key) = &self.api_key {
            settings.api_key = Some(api_key.clone());
        }
        if let Some(api_url) = &self.api_url {
            settings.api_url = api_url.clone();
        }
        if self.test_mode {
            settings.test_mode = true;
        }

        Ok(settings)
    }
}
