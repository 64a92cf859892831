use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Postmark 附件格式，`content` 為 base64 編碼內容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Attachment {
    pub name: String,
    pub content: String,
    pub content_type: String,
    #[serde(rename = "ContentID", skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TrackLinks {
    #[default]
    None,
    HtmlAndText,
    HtmlOnly,
    TextOnly,
}

impl std::str::FromStr for TrackLinks {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(TrackLinks::None),
            "htmlandtext" | "html-and-text" => Ok(TrackLinks::HtmlAndText),
            "htmlonly" | "html-only" => Ok(TrackLinks::HtmlOnly),
            "textonly" | "text-only" => Ok(TrackLinks::TextOnly),
            other => Err(format!("Unknown link tracking mode: {}", other)),
        }
    }
}

/// 尚未轉換為 Postmark 格式的附件來源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentSource {
    /// 名稱與原始內容，`content_type` 未指定時依檔名推斷
    Data {
        name: String,
        content: Vec<u8>,
        content_type: Option<String>,
        content_id: Option<String>,
    },
    /// 已是 Postmark 格式，原樣送出
    Encoded(Attachment),
    File(std::path::PathBuf),
    /// 完整的 MIME part（標頭加內容），例如內嵌圖片
    Mime(Vec<u8>),
}

impl AttachmentSource {
    pub fn data(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        AttachmentSource::Data {
            name: name.into(),
            content: content.into(),
            content_type: None,
            content_id: None,
        }
    }
}

/// `/email`、`/email/withTemplate` 與 `/email/batch` 每個元素的 JSON 內容
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessagePayload {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_body: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub headers: Vec<Header>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub metadata: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_opens: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_links: Option<TrackLinks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_stream: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_model: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_css: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SendResponse {
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<FixedOffset>>,
    #[serde(rename = "MessageID", default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub message: String,
}

impl SendResponse {
    /// 測試模式下不發送請求時回傳的結果
    pub fn test_mode(to: &str) -> Self {
        Self {
            to: Some(to.to_string()),
            submitted_at: None,
            message_id: None,
            error_code: 0,
            message: "Test mode: message was not sent".to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error_code == 0
    }
}

/// API 失敗時的回應內容
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiErrorBody {
    pub error_code: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Bounce {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Type")]
    pub bounce_type: String,
    #[serde(default)]
    pub type_code: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(rename = "MessageID", default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub server_id: Option<i64>,
    #[serde(default)]
    pub message_stream: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub details: String,
    pub email: String,
    #[serde(default)]
    pub from: Option<String>,
    pub bounced_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub dump_available: bool,
    #[serde(default)]
    pub inactive: bool,
    #[serde(default)]
    pub can_activate: bool,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BounceList {
    pub total_count: i64,
    pub bounces: Vec<Bounce>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BounceDump {
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BounceActivation {
    pub message: String,
    pub bounce: Bounce,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BounceTypeCount {
    #[serde(rename = "Type", default)]
    pub bounce_type: Option<String>,
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeliveryStats {
    pub inactive_mails: i64,
    pub bounces: Vec<BounceTypeCount>,
}

/// `/bounces` 的查詢參數
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BounceQuery {
    pub count: u32,
    pub offset: u32,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub bounce_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive: Option<bool>,
    #[serde(rename = "emailFilter", skip_serializing_if = "Option::is_none")]
    pub email_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(rename = "messageID", skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl Default for BounceQuery {
    fn default() -> Self {
        Self {
            count: 25,
            offset: 0,
            bounce_type: None,
            inactive: None,
            email_filter: None,
            tag: None,
            message_id: None,
        }
    }
}

/// 宿主應用程式交給 email backend 的訊息
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
    pub from_email: Option<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub reply_to: Vec<String>,
    pub extra_headers: Vec<Header>,
    /// (內容, MIME 類型)
    pub alternatives: Vec<(String, String)>,
    pub attachments: Vec<AttachmentSource>,
    /// "plain" 或 "html"
    pub content_subtype: String,
    pub tag: Option<String>,
    pub track_opens: bool,
}

impl Default for EmailMessage {
    fn default() -> Self {
        Self {
            subject: String::new(),
            body: String::new(),
            from_email: None,
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            reply_to: Vec::new(),
            extra_headers: Vec::new(),
            alternatives: Vec::new(),
            attachments: Vec::new(),
            content_subtype: "plain".to_string(),
            tag: None,
            track_opens: false,
        }
    }
}

impl EmailMessage {
    pub fn recipients(&self) -> impl Iterator<Item = &String> {
        self.to.iter().chain(self.cc.iter()).chain(self.bcc.iter())
    }
}
