use async_trait::async_trait;
use log::{error, info};

use super::{Delivery, Notifier};
use crate::config::WebhookConfig;
use crate::error::NotifyError;

/// Posts `msg=<text>` as a form to a fixed endpoint (the WeChat relay).
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// `None` when the webhook is disabled by an empty URL.
    pub fn from_config(client: reqwest::Client, config: &WebhookConfig) -> Option<Self> {
        if config.url.trim().is_empty() {
            return None;
        }
        Some(Self::new(client, config.url.trim()))
    }

    async fn post(&self, message: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .form(&[("msg", message)]) // relay only reads `msg`
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(NotifyError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "wechat"
    }

    async fn notify(&self, message: &str) -> Vec<Delivery> {
        let result = self.post(message).await;
        match &result {
            Ok(()) => info!("wechat: delivered"),
            Err(e) => error!("wechat: delivery failed: {}", e),
        }
        vec![Delivery {
            channel: self.name().to_string(),
            target: self.url.clone(),
            result,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::CannedServer;

    #[tokio::test]
    async fn posts_message_as_form_field() {
        let server = CannedServer::start(200, "ok").await;
        let notifier = WebhookNotifier::new(reqwest::Client::new(), format!("{}/weixin", server.url));

        let deliveries = notifier.notify("gold up").await;

        assert_eq!(deliveries.len(), 1);
        assert!(deliveries[0].result.is_ok());
        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/weixin");
        assert_eq!(requests[0].body, "msg=gold+up");
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = CannedServer::start(500, "boom").await;
        let notifier = WebhookNotifier::new(reqwest::Client::new(), server.url.clone());

        let deliveries = notifier.notify("gold down").await;

        assert!(matches!(
            deliveries[0].result,
            Err(NotifyError::HttpStatus(500))
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_request_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let notifier = WebhookNotifier::new(reqwest::Client::new(), format!("http://{}/weixin", addr));

        let deliveries = notifier.notify("gold down").await;

        assert!(matches!(deliveries[0].result, Err(NotifyError::Request(_))));
    }

    #[test]
    fn empty_url_disables_webhook() {
        let config = WebhookConfig {
            url: "  ".to_string(),
        };
        assert!(WebhookNotifier::from_config(reqwest::Client::new(), &config).is_none());
        assert!(WebhookNotifier::from_config(reqwest::Client::new(), &WebhookConfig::default())
            .is_some());
    }
}
