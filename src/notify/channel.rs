use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("credential verification failed")]
    Unauthorized,
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("feed rejected request: {0}")]
    Status(StatusCode),
}

/// Rate-limited external short-message posting service.
#[async_trait]
pub trait NotificationChannel: Send {
    async fn post(&mut self, message: &str) -> Result<(), NotifyError>;
}

/// Hands out a channel after verifying account credentials. Verification
/// happens once per connect; a lost channel is reconnected through here.
#[async_trait]
pub trait ChannelConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn NotificationChannel>, NotifyError>;
}

/// Microblog feed client. Credentials are an opaque access token passed
/// through as a bearer header.
pub struct FeedConnector {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl FeedConnector {
    pub fn new(client: reqwest::Client, base_url: String, access_token: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
        }
    }
}

#[async_trait]
impl ChannelConnector for FeedConnector {
    async fn connect(&self) -> Result<Box<dyn NotificationChannel>, NotifyError> {
        let url = format!("{}/api/v1/accounts/verify_credentials", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        Ok(Box::new(FeedChannel {
            client: self.client.clone(),
            status_url: format!("{}/api/v1/statuses", self.base_url),
            access_token: self.access_token.clone(),
        }))
    }
}

struct FeedChannel {
    client: reqwest::Client,
    status_url: String,
    access_token: String,
}

#[async_trait]
impl NotificationChannel for FeedChannel {
    async fn post(&mut self, message: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.status_url)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({ "status": message }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }
        Ok(())
    }
}

fn status_error(status: StatusCode) -> NotifyError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => NotifyError::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => NotifyError::RateLimited,
        other => NotifyError::Status(other),
    }
}
