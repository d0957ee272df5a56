use crate::api::Notifier;
use crate::error::MonitorError;
use crate::models::NotificationMessage;
use std::time::Duration;
use tracing::info;

/// Publishes messages to an ntfy topic
pub struct NtfyClient {
    client: reqwest::Client,
    server: String,
    topic: String,
}

impl NtfyClient {
    pub fn new(server: &str, topic: &str, timeout: Duration) -> Result<Self, MonitorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(MonitorError::Client)?;

        Ok(Self {
            client,
            server: server.trim_end_matches('/').to_string(),
            topic: topic.to_string(),
        })
    }

    pub fn topic_url(&self) -> String {
        format!("{}/{}", self.server, self.topic)
    }

    /// ntfy headers must be plain ASCII, so the (emoji) title travels in the body
    pub fn request_body(message: &NotificationMessage) -> String {
        format!("{}\n\n{}", message.title, message.body)
    }

    pub async fn publish(&self, message: &NotificationMessage) -> Result<(), MonitorError> {
        let failed = |reason: String| MonitorError::Notification {
            topic: self.topic.clone(),
            reason,
        };

        let mut request = self
            .client
            .post(self.topic_url())
            .header("Priority", message.priority.as_str())
            .body(Self::request_body(message));

        if !message.tags.is_empty() {
            request = request.header("Tags", message.tags.join(","));
        }
        if let Some(click) = &message.click {
            request = request.header("Click", click.as_str());
        }

        let response = request.send().await.map_err(|e| failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failed(format!("ntfy returned HTTP {}", response.status())));
        }

        info!(topic = %self.topic, title = %message.title, "notification sent");
        Ok(())
    }
}

impl Notifier for NtfyClient {
    async fn send(&self, message: &NotificationMessage) -> Result<(), MonitorError> {
        self.publish(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    fn message() -> NotificationMessage {
        NotificationMessage {
            title: "⚽ Ambassadors FC Schedule Updated!".to_string(),
            body: "Added matches: 1".to_string(),
            priority: Priority::High,
            tags: vec!["soccer".to_string(), "warning".to_string()],
            click: None,
        }
    }

    #[test]
    fn test_topic_url_strips_trailing_slash() {
        let client = NtfyClient::new("https://ntfy.sh/", "afc-test", Duration::from_secs(5)).unwrap();
        assert_eq!(client.topic_url(), "https://ntfy.sh/afc-test");
    }

    #[test]
    fn test_request_body_carries_title() {
        assert_eq!(
            NtfyClient::request_body(&message()),
            "⚽ Ambassadors FC Schedule Updated!\n\nAdded matches: 1"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_notification_error() {
        let client =
            NtfyClient::new("http://127.0.0.1:9", "afc-test", Duration::from_secs(2)).unwrap();
        let err = client.send(&message()).await.unwrap_err();
        assert!(matches!(err, MonitorError::Notification { ref topic, .. } if topic == "afc-test"));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_publish_live() {
        dotenv::dotenv().ok();
        let topic = std::env::var("NTFY_TOPIC").expect("NTFY_TOPIC not set");
        let client = NtfyClient::new("https://ntfy.sh", &topic, Duration::from_secs(10)).unwrap();
        client.publish(&message()).await.unwrap();
    }
}
