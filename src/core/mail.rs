use crate::adapters::http::PostmarkClient;
use crate::core::attachment::normalize_attachments;
use crate::domain::model::{
    AttachmentSource, Header, MessagePayload, SendResponse, TrackLinks,
};
use crate::domain::ports::{ConfigProvider, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECONDS};
use crate::utils::error::{PostmarkError, Result};
use crate::utils::validation::is_blank;
use std::collections::HashMap;
use std::time::Duration;

/// Postmark 單次請求允許的收件者上限（To、Cc、Bcc 合計）
pub const MAX_RECIPIENTS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendMode {
    Plain,
    Template,
}

impl SendMode {
    pub fn endpoint(&self) -> &'static str {
        match self {
            SendMode::Plain => "/email",
            SendMode::Template => "/email/withTemplate",
        }
    }
}

/// 單封郵件
///
/// 欄位直接對應 Postmark 的訊息格式；收件者清單在送出時以逗號串接。
#[derive(Debug, Clone)]
pub struct Mail {
    pub api_key: Option<String>,
    pub sender: Option<String>,
    pub reply_to: Option<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: Option<String>,
    pub tag: Option<String>,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
    pub custom_headers: Vec<Header>,
    pub attachments: Vec<AttachmentSource>,
    pub metadata: HashMap<String, String>,
    pub track_opens: bool,
    pub track_links: Option<TrackLinks>,
    pub message_stream: Option<String>,
    pub template_id: Option<u64>,
    pub template_alias: Option<String>,
    pub template_model: Option<serde_json::Value>,
    pub inline_css: Option<bool>,
    pub test_mode: bool,
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for Mail {
    fn default() -> Self {
        Self {
            api_key: None,
            sender: None,
            reply_to: None,
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: None,
            tag: None,
            html_body: None,
            text_body: None,
            custom_headers: Vec::new(),
            attachments: Vec::new(),
            metadata: HashMap::new(),
            track_opens: false,
            track_links: None,
            message_stream: None,
            template_id: None,
            template_alias: None,
            template_model: None,
            inline_css: None,
            test_mode: false,
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

impl Mail {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以設定值預先填入 API key、寄件者與其他預設值
    pub fn from_settings<C: ConfigProvider + ?Sized>(settings: &C) -> Self {
        Self {
            api_key: settings.api_key().map(str::to_string),
            sender: settings.sender().map(str::to_string),
            track_opens: settings.track_opens(),
            message_stream: settings.message_stream().map(str::to_string),
            test_mode: settings.test_mode(),
            api_url: settings.api_url().to_string(),
            timeout: settings.timeout(),
            ..Self::default()
        }
    }

    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.custom_headers.push(Header::new(name, value));
    }

    fn uses_template(&self) -> bool {
        self.template_id.is_some() || !is_blank(&self.template_alias)
    }

    /// 實際會送出的收件地址數（逗號拆開、略過空白）
    fn recipient_count(&self) -> usize {
        [&self.to, &self.cc, &self.bcc]
            .into_iter()
            .map(|list| recipient_addresses(list).count())
            .sum()
    }

    /// 送出前的欄位檢查，依序回報第一個缺少的值
    pub fn check_values(&self, mode: SendMode) -> Result<()> {
        if is_blank(&self.api_key) {
            return Err(PostmarkError::missing_value(
                "Cannot send an e-mail without a Postmark API Key",
            ));
        }
        if is_blank(&self.sender) {
            return Err(PostmarkError::missing_value(
                "Cannot send an e-mail without a sender (.sender field)",
            ));
        }
        if recipient_addresses(&self.to).next().is_none() {
            return Err(PostmarkError::missing_value(
                "Cannot send an e-mail without at least one recipient (.to field)",
            ));
        }
        if self.recipient_count() > MAX_RECIPIENTS {
            return Err(PostmarkError::missing_value(format!(
                "Cannot send an e-mail to more than {} recipients",
                MAX_RECIPIENTS
            )));
        }

        let has_template = self.uses_template();
        let has_model = self.template_model.is_some();
        if has_template != has_model || (mode == SendMode::Template && !has_template) {
            return Err(PostmarkError::missing_value(
                "Cannot send a template e-mail without a both template_id and template_model set",
            ));
        }

        match mode {
            SendMode::Template => {
                if !is_blank(&self.subject) {
                    return Err(PostmarkError::missing_value(
                        "If using Postmark templates, do not set the subject value",
                    ));
                }
            }
            SendMode::Plain => {
                if is_blank(&self.subject) {
                    return Err(PostmarkError::missing_value(
                        "Cannot send an e-mail without a subject",
                    ));
                }
                if is_blank(&self.html_body) && is_blank(&self.text_body) {
                    return Err(PostmarkError::missing_value(
                        "Provide either email TextBody or HtmlBody or both",
                    ));
                }
            }
        }

        if self.track_opens && is_blank(&self.html_body) && mode == SendMode::Plain {
            tracing::warn!(
                "track_opens is set with no html_body; opens will not be tracked but the message will still send"
            );
        }

        Ok(())
    }

    /// 組出 Postmark 的 JSON 訊息內容
    pub fn to_json_message(&self, mode: SendMode) -> Result<MessagePayload> {
        let attachments = normalize_attachments(&self.attachments)?;

        let mut payload = MessagePayload {
            from: self.sender.clone().unwrap_or_default(),
            to: join_recipients(&self.to).unwrap_or_default(),
            cc: join_recipients(&self.cc),
            bcc: join_recipients(&self.bcc),
            reply_to: self.reply_to.clone().filter(|r| !r.trim().is_empty()),
            tag: self.tag.clone(),
            headers: self.custom_headers.clone(),
            attachments,
            metadata: self.metadata.clone(),
            track_opens: self.track_opens.then_some(true),
            track_links: self.track_links,
            message_stream: self.message_stream.clone(),
            ..Default::default()
        };

        match mode {
            SendMode::Plain => {
                payload.subject = self.subject.clone();
                payload.html_body = self.html_body.clone();
                payload.text_body = self.text_body.clone();
            }
            SendMode::Template => {
                payload.template_id = self.template_id;
                payload.template_alias = self.template_alias.clone();
                payload.template_model = self.template_model.clone();
                payload.inline_css = self.inline_css;
            }
        }

        Ok(payload)
    }

    pub fn send(&self) -> Result<SendResponse> {
        self.deliver(SendMode::Plain)
    }

    pub fn send_with_template(&self) -> Result<SendResponse> {
        self.deliver(SendMode::Template)
    }

    fn deliver(&self, mode: SendMode) -> Result<SendResponse> {
        self.check_values(mode)?;
        let payload = self.to_json_message(mode)?;

        if self.test_mode {
            tracing::info!(
                "Test mode enabled, not sending. JSON message is:\n{}",
                serde_json::to_string_pretty(&payload)?
            );
            return Ok(SendResponse::test_mode(&payload.to));
        }

        let client = PostmarkClient::with_options(
            self.api_key.as_deref().unwrap_or_default(),
            &self.api_url,
            self.timeout,
        )?;

        tracing::info!("Sending e-mail to {} via {}", payload.to, mode.endpoint());
        let response: SendResponse = client.post_json(mode.endpoint(), &payload)?;
        tracing::debug!(
            "Postmark accepted message {:?}: {}",
            response.message_id,
            response.message
        );

        Ok(response)
    }
}

fn recipient_addresses(recipients: &[String]) -> impl Iterator<Item = &str> {
    recipients
        .iter()
        .flat_map(|entry| entry.split(','))
        .map(str::trim)
        .filter(|address| !address.is_empty())
}

pub(crate) fn join_recipients(recipients: &[String]) -> Option<String> {
    let joined = recipient_addresses(recipients)
        .collect::<Vec<_>>()
        .join(",");

    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_mail() -> Mail {
        Mail {
            api_key: Some("test".to_string()),
            sender: Some("from@example.com".to_string()),
            to: vec!["to@example.com".to_string()],
            subject: Some("Subject".to_string()),
            text_body: Some("Body".to_string()),
            ..Mail::default()
        }
    }

    fn template_mail() -> Mail {
        Mail {
            api_key: Some("test".to_string()),
            sender: Some("from@example.com".to_string()),
            to: vec!["to@example.com".to_string()],
            template_id: Some(1),
            template_model: Some(serde_json::json!({"junk": "more junk"})),
            ..Mail::default()
        }
    }

    fn missing_value(result: Result<()>) -> String {
        match result {
            Err(PostmarkError::MissingValue { parameter }) => parameter,
            other => panic!("expected a missing value error, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_mail_passes_validation() {
        assert!(plain_mail().check_values(SendMode::Plain).is_ok());
    }

    #[test]
    fn test_required_field_order() {
        let mail = Mail::default();
        assert_eq!(
            missing_value(mail.check_values(SendMode::Plain)),
            "Cannot send an e-mail without a Postmark API Key"
        );

        let mail = Mail {
            sender: None,
            ..plain_mail()
        };
        assert_eq!(
            missing_value(mail.check_values(SendMode::Plain)),
            "Cannot send an e-mail without a sender (.sender field)"
        );

        let mail = Mail {
            to: vec![],
            ..plain_mail()
        };
        assert_eq!(
            missing_value(mail.check_values(SendMode::Plain)),
            "Cannot send an e-mail without at least one recipient (.to field)"
        );

        let mail = Mail {
            text_body: None,
            ..plain_mail()
        };
        assert_eq!(
            missing_value(mail.check_values(SendMode::Plain)),
            "Provide either email TextBody or HtmlBody or both"
        );
    }

    #[test]
    fn test_plain_send_requires_subject() {
        let mail = Mail {
            subject: None,
            ..plain_mail()
        };
        assert_eq!(
            missing_value(mail.check_values(SendMode::Plain)),
            "Cannot send an e-mail without a subject"
        );
    }

    #[test]
    fn test_template_send_requires_id_and_model() {
        let template_error =
            "Cannot send a template e-mail without a both template_id and template_model set";

        let only_plain_fields = plain_mail();
        let only_id = Mail {
            template_model: None,
            ..template_mail()
        };
        let only_model = Mail {
            template_id: None,
            ..template_mail()
        };

        for mail in [only_plain_fields, only_id, only_model] {
            assert_eq!(
                missing_value(mail.check_values(SendMode::Template)),
                template_error
            );
        }

        assert!(template_mail().check_values(SendMode::Template).is_ok());
    }

    #[test]
    fn test_template_alias_counts_as_template() {
        let mail = Mail {
            template_id: None,
            template_alias: Some("welcome".to_string()),
            ..template_mail()
        };
        assert!(mail.check_values(SendMode::Template).is_ok());
    }

    #[test]
    fn test_template_send_rejects_subject() {
        let mail = Mail {
            subject: Some("Subject".to_string()),
            ..template_mail()
        };
        assert_eq!(
            missing_value(mail.check_values(SendMode::Template)),
            "If using Postmark templates, do not set the subject value"
        );
    }

    #[test]
    fn test_too_many_recipients() {
        let mail = Mail {
            to: (0..30).map(|i| format!("to{}@example.com", i)).collect(),
            cc: (0..21).map(|i| format!("cc{}@example.com", i)).collect(),
            ..plain_mail()
        };
        assert_eq!(
            missing_value(mail.check_values(SendMode::Plain)),
            "Cannot send an e-mail to more than 50 recipients"
        );
    }

    #[test]
    fn test_comma_joined_entry_counts_each_address() {
        let joined = (0..60)
            .map(|i| format!("to{}@example.com", i))
            .collect::<Vec<_>>()
            .join(",");
        let mail = Mail {
            to: vec![joined],
            ..plain_mail()
        };
        assert_eq!(
            missing_value(mail.check_values(SendMode::Plain)),
            "Cannot send an e-mail to more than 50 recipients"
        );
    }

    #[test]
    fn test_blank_recipients_do_not_count() {
        let mut cc = vec![String::new(); 50];
        cc.push(" ".to_string());
        let mail = Mail { cc, ..plain_mail() };

        assert!(mail.check_values(SendMode::Plain).is_ok());
        let payload = mail.to_json_message(SendMode::Plain).unwrap();
        assert_eq!(payload.cc, None);
    }

    #[test]
    fn test_recipient_entries_are_split_and_trimmed() {
        let mail = Mail {
            to: vec!["a@example.com, b@example.com".to_string(), " ,".to_string()],
            ..plain_mail()
        };
        let payload = mail.to_json_message(SendMode::Plain).unwrap();
        assert_eq!(payload.to, "a@example.com,b@example.com");

        let blank_to = Mail {
            to: vec![" , ".to_string()],
            ..plain_mail()
        };
        assert_eq!(
            missing_value(blank_to.check_values(SendMode::Plain)),
            "Cannot send an e-mail without at least one recipient (.to field)"
        );
    }

    #[test]
    fn test_track_opens_without_html_still_sends() {
        let mail = Mail {
            track_opens: true,
            ..plain_mail()
        };
        assert!(mail.check_values(SendMode::Plain).is_ok());

        let payload = mail.to_json_message(SendMode::Plain).unwrap();
        assert_eq!(payload.track_opens, Some(true));
        assert_eq!(payload.html_body, None);
    }

    #[test]
    fn test_plain_payload_excludes_template_fields() {
        let mut mail = plain_mail();
        mail.cc = vec!["cc1@example.com".to_string(), "cc2@example.com".to_string()];
        mail.add_header("X-Campaign", "spring");
        mail.track_opens = true;
        mail.template_id = Some(7);

        let payload = serde_json::to_value(mail.to_json_message(SendMode::Plain).unwrap()).unwrap();

        assert_eq!(payload["From"], "from@example.com");
        assert_eq!(payload["To"], "to@example.com");
        assert_eq!(payload["Cc"], "cc1@example.com,cc2@example.com");
        assert_eq!(payload["Subject"], "Subject");
        assert_eq!(payload["TextBody"], "Body");
        assert_eq!(payload["TrackOpens"], true);
        assert_eq!(
            payload["Headers"],
            serde_json::json!([{"Name": "X-Campaign", "Value": "spring"}])
        );
        assert!(payload.get("TemplateId").is_none());
        assert!(payload.get("Bcc").is_none());
    }

    #[test]
    fn test_template_payload_excludes_subject_and_bodies() {
        let mut mail = template_mail();
        mail.text_body = Some("ignored".to_string());

        let payload =
            serde_json::to_value(mail.to_json_message(SendMode::Template).unwrap()).unwrap();

        assert_eq!(payload["TemplateId"], 1);
        assert_eq!(payload["TemplateModel"]["junk"], "more junk");
        assert!(payload.get("Subject").is_none());
        assert!(payload.get("TextBody").is_none());
    }

    #[test]
    fn test_test_mode_skips_network() {
        let mail = Mail {
            test_mode: true,
            api_url: "http://127.0.0.1:1".to_string(),
            ..plain_mail()
        };

        let response = mail.send().unwrap();
        assert!(response.is_success());
        assert_eq!(response.to.as_deref(), Some("to@example.com"));
        assert!(response.message_id.is_none());
    }

    #[test]
    fn test_validation_happens_before_network() {
        let mail = Mail {
            subject: None,
            api_url: "http://127.0.0.1:1".to_string(),
            ..plain_mail()
        };
        assert!(matches!(
            mail.send(),
            Err(PostmarkError::MissingValue { .. })
        ));
    }
}
