use crate::adapters::http::PostmarkClient;
use crate::core::mail::{Mail, SendMode};
use crate::domain::model::{MessagePayload, SendResponse};
use crate::domain::ports::{ConfigProvider, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECONDS};
use crate::utils::error::{PostmarkError, Result};
use crate::utils::validation::is_blank;
use std::time::Duration;

/// `/email/batch` 單次請求的訊息上限
pub const MAX_BATCH_MESSAGES: usize = 500;

const BATCH_ENDPOINT: &str = "/email/batch";

#[derive(Debug, Clone)]
pub struct BatchMail {
    pub messages: Vec<Mail>,
    pub api_key: Option<String>,
    pub test_mode: bool,
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for BatchMail {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            api_key: None,
            test_mode: false,
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

impl BatchMail {
    pub fn new(messages: Vec<Mail>, api_key: impl Into<String>) -> Self {
        Self {
            messages,
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    pub fn from_settings<C: ConfigProvider + ?Sized>(messages: Vec<Mail>, settings: &C) -> Self {
        Self {
            messages,
            api_key: settings.api_key().map(str::to_string),
            test_mode: settings.test_mode(),
            api_url: settings.api_url().to_string(),
            timeout: settings.timeout(),
        }
    }

    /// 訊息未設定 API key 時沿用批次的 key
    fn resolved_messages(&self) -> Vec<Mail> {
        self.messages
            .iter()
            .map(|message| {
                let mut message = message.clone();
                if is_blank(&message.api_key) {
                    message.api_key = self.api_key.clone();
                }
                message
            })
            .collect()
    }

    pub fn check_values(&self) -> Result<()> {
        if is_blank(&self.api_key) {
            return Err(PostmarkError::missing_value(
                "Cannot send a batch of e-mails without a Postmark API Key",
            ));
        }
        if self.messages.is_empty() {
            return Err(PostmarkError::missing_value(
                "Cannot send a batch of e-mails with no e-mails",
            ));
        }
        if self.messages.len() > MAX_BATCH_MESSAGES {
            return Err(PostmarkError::ValidationError {
                message: format!(
                    "Cannot send more than {} e-mails in one batch (got {})",
                    MAX_BATCH_MESSAGES,
                    self.messages.len()
                ),
            });
        }

        for message in self.resolved_messages() {
            message.check_values(SendMode::Plain)?;
        }

        Ok(())
    }

    pub fn to_json_message(&self) -> Result<Vec<MessagePayload>> {
        self.resolved_messages()
            .iter()
            .map(|message| message.to_json_message(SendMode::Plain))
            .collect()
    }

    pub fn send(&self) -> Result<Vec<SendResponse>> {
        self.check_values()?;
        let payload = self.to_json_message()?;

        if self.test_mode {
            tracing::info!(
                "Test mode enabled, not sending batch. JSON message is:\n{}",
                serde_json::to_string_pretty(&payload)?
            );
            return Ok(payload
                .iter()
                .map(|message| SendResponse::test_mode(&message.to))
                .collect());
        }

        let client = PostmarkClient::with_options(
            self.api_key.as_deref().unwrap_or_default(),
            &self.api_url,
            self.timeout,
        )?;

        tracing::info!("Sending batch of {} e-mails", payload.len());
        let responses: Vec<SendResponse> = client.post_json(BATCH_ENDPOINT, &payload)?;

        for response in responses.iter().filter(|r| !r.is_success()) {
            tracing::warn!(
                "Postmark rejected batch message to {}: {} (ErrorCode {})",
                response.to.as_deref().unwrap_or("<unknown>"),
                response.message,
                response.error_code
            );
        }

        Ok(responses)
    }
}
