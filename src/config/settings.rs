use crate::domain::ports::{ConfigProvider, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECONDS};
use crate::utils::error::{PostmarkError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

pub const ENV_API_KEY: &str = "POSTMARK_API_KEY";
pub const ENV_SENDER: &str = "POSTMARK_SENDER";
pub const ENV_API_URL: &str = "POSTMARK_API_URL";
pub const ENV_TEST_MODE: &str = "POSTMARK_TEST_MODE";
pub const ENV_TRACK_OPENS: &str = "POSTMARK_TRACK_OPENS";
pub const ENV_MESSAGE_STREAM: &str = "POSTMARK_MESSAGE_STREAM";
pub const ENV_TIMEOUT: &str = "POSTMARK_TIMEOUT_SECONDS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostmarkSettings {
    pub api_key: Option<String>,
    pub sender: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub test_mode: bool,
    #[serde(default)]
    pub track_opens: bool,
    pub message_stream: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// 設定檔的最外層，所有設定放在 `[postmark]` 表格下
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SettingsFile {
    postmark: PostmarkSettings,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

impl Default for PostmarkSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            sender: None,
            api_url: default_api_url(),
            test_mode: false,
            track_opens: false,
            message_stream: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl PostmarkSettings {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let file: SettingsFile =
            toml::from_str(&processed_content).map_err(|e| PostmarkError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            })?;
        Ok(file.postmark)
    }

    /// 替換環境變數 (例如 ${POSTMARK_API_KEY})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static ENV_PATTERN: OnceLock<Regex> = OnceLock::new();
        let re = ENV_PATTERN.get_or_init(|| {
            Regex::new(r"\$\{([^}]+)\}").expect("environment variable pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    /// 從 POSTMARK_* 環境變數讀取配置
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env()
    }

    /// 以環境變數覆蓋目前的值
    pub fn merge_env(self) -> Result<Self> {
        self.merge_vars(|name| std::env::var(name).ok())
    }

    /// 依 `lookup` 取得 POSTMARK_* 的值並覆蓋，方便以固定的值測試
    fn merge_vars<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = lookup(ENV_API_KEY) {
            self.api_key = Some(api_key);
        }
        if let Some(sender) = lookup(ENV_SENDER) {
            self.sender = Some(sender);
        }
        if let Some(api_url) = lookup(ENV_API_URL) {
            self.api_url = api_url;
        }
        if let Some(value) = lookup(ENV_TEST_MODE) {
            self.test_mode = parse_bool(ENV_TEST_MODE, &value)?;
        }
        if let Some(value) = lookup(ENV_TRACK_OPENS) {
            self.track_opens = parse_bool(ENV_TRACK_OPENS, &value)?;
        }
        if let Some(stream) = lookup(ENV_MESSAGE_STREAM) {
            self.message_stream = Some(stream);
        }
        if let Some(value) = lookup(ENV_TIMEOUT) {
            self.timeout_seconds =
                value
                    .trim()
                    .parse()
                    .map_err(|_| PostmarkError::InvalidConfigValueError {
                        field: ENV_TIMEOUT.to_string(),
                        value: value.clone(),
                        reason: "Expected a whole number of seconds".to_string(),
                    })?;
        }
        Ok(self)
    }
}

fn parse_bool(field: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(PostmarkError::InvalidConfigValueError {
            field: field.to_string(),
            value: value.to_string(),
            reason: "Expected a boolean (true/false)".to_string(),
        }),
    }
}

impl ConfigProvider for PostmarkSettings {
    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    fn api_url(&self) -> &str {
        &self.api_url
    }

    fn test_mode(&self) -> bool {
        self.test_mode
    }

    fn track_opens(&self) -> bool {
        self.track_opens
    }

    fn message_stream(&self) -> Option<&str> {
        self.message_stream.as_deref()
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Validate for PostmarkSettings {
    fn validate(&self) -> Result<()> {
        validate_url("api_url", &self.api_url)?;
        validate_range("timeout_seconds", self.timeout_seconds, 1, 300)?;

        if let Some(api_key) = &self.api_key {
            validate_non_empty_string("api_key", api_key)?;
        }
        if let Some(sender) = &self.sender {
            validate_non_empty_string("sender", sender)?;
        }

        tracing::debug!("Postmark configuration validation passed");
        Ok(())
    }
}
