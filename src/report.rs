use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("collector rejected request: {0}")]
    Status(reqwest::StatusCode),
}

/// Remote collector endpoint accepting serialized samples.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn send(&self, record: &BTreeMap<String, String>) -> Result<(), DeliveryError>;
}

/// POSTs records as flat JSON objects. Timeouts are enforced by the shared
/// `reqwest::Client` the sink is built with.
pub struct HttpSink {
    client: reqwest::Client,
    url: String,
}

impl HttpSink {
    pub fn new(client: reqwest::Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl ReportSink for HttpSink {
    async fn send(&self, record: &BTreeMap<String, String>) -> Result<(), DeliveryError> {
        let response = self.client.post(&self.url).json(record).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn location_record() -> BTreeMap<String, String> {
        let mut record = BTreeMap::new();
        record.insert("type".to_string(), "location".to_string());
        record.insert("lat".to_string(), "51.477".to_string());
        record
    }

    #[tokio::test]
    async fn posts_record_as_json() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/report")
                    .json_body_partial(r#"{"type":"location","lat":"51.477"}"#);
                then.status(200);
            })
            .await;

        let sink = HttpSink::new(reqwest::Client::new(), server.url("/report"));
        sink.send(&location_record()).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_is_a_delivery_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/report");
                then.status(503);
            })
            .await;

        let sink = HttpSink::new(reqwest::Client::new(), server.url("/report"));
        let result = sink.send(&location_record()).await;

        assert!(matches!(result, Err(DeliveryError::Status(status)) if status.as_u16() == 503));
    }

    #[tokio::test]
    async fn unreachable_collector_is_a_delivery_failure() {
        let sink = HttpSink::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/report".to_string(),
        );
        let result = sink.send(&location_record()).await;

        assert!(matches!(result, Err(DeliveryError::Http(_))));
    }
}
