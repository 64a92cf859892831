use crate::domain::model::EmailMessage;
use crate::utils::error::Result;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.postmarkapp.com";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

pub trait ConfigProvider {
    fn api_key(&self) -> Option<&str>;
    fn sender(&self) -> Option<&str>;
    fn api_url(&self) -> &str;
    fn test_mode(&self) -> bool;
    fn track_opens(&self) -> bool;
    fn message_stream(&self) -> Option<&str>;
    fn timeout(&self) -> Duration;
}

/// 宿主應用程式的郵件發送介面，回傳成功送出的訊息數
pub trait EmailBackend {
    fn send_messages(&self, messages: &[EmailMessage]) -> Result<usize>;
}
