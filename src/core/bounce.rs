use crate::adapters::http::PostmarkClient;
use crate::domain::model::{
    Bounce, BounceActivation, BounceDump, BounceList, BounceQuery, DeliveryStats,
};
use crate::domain::ports::{ConfigProvider, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECONDS};
use crate::utils::error::{PostmarkError, Result};
use crate::utils::validation::{is_blank, validate_range};
use std::time::Duration;

/// Bounce API 客戶端
#[derive(Debug, Clone)]
pub struct BounceManager {
    pub api_key: Option<String>,
    pub api_url: String,
    pub timeout: Duration,
}

impl BounceManager {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }

    pub fn from_settings<C: ConfigProvider + ?Sized>(settings: &C) -> Self {
        Self {
            api_key: settings.api_key().map(str::to_string),
            api_url: settings.api_url().to_string(),
            timeout: settings.timeout(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    fn client(&self) -> Result<PostmarkClient> {
        if is_blank(&self.api_key) {
            return Err(PostmarkError::missing_value(
                "Cannot use the bounce API without a Postmark API Key",
            ));
        }
        PostmarkClient::with_options(
            self.api_key.as_deref().unwrap_or_default(),
            &self.api_url,
            self.timeout,
        )
    }

    pub fn get_all(&self, query: &BounceQuery) -> Result<BounceList> {
        validate_range("count", query.count, 1, 500).map_err(|e| {
            PostmarkError::ValidationError {
                message: e.to_string(),
            }
        })?;
        let client = self.client()?;
        let list: BounceList = client.get_json_with_query("/bounces", query)?;
        tracing::debug!(
            "Fetched {} of {} bounces",
            list.bounces.len(),
            list.total_count
        );
        Ok(list)
    }

    pub fn get(&self, bounce_id: i64) -> Result<Bounce> {
        self.client()?.get_json(&format!("/bounces/{}", bounce_id))
    }

    /// 取得退信的原始 SMTP 內容
    pub fn get_dump(&self, bounce_id: i64) -> Result<BounceDump> {
        self.client()?
            .get_json(&format!("/bounces/{}/dump", bounce_id))
    }

    /// 重新啟用因退信而被停用的收件者
    pub fn activate(&self, bounce_id: i64) -> Result<BounceActivation> {
        let activation: BounceActivation = self
            .client()?
            .put_json(&format!("/bounces/{}/activate", bounce_id))?;
        tracing::info!(
            "Activated bounce {} for {}: {}",
            bounce_id,
            activation.bounce.email,
            activation.message
        );
        Ok(activation)
    }

    pub fn get_tags(&self) -> Result<Vec<String>> {
        self.client()?.get_json("/bounces/tags")
    }

    pub fn get_delivery_stats(&self) -> Result<DeliveryStats> {
        self.client()?.get_json("/deliverystats")
    }
}
