use async_trait::async_trait;
use futures::future::join_all;
use log::{error, info};
use reqwest::Url;

use super::{Delivery, Notifier};
use crate::config::BarkConfig;
use crate::error::NotifyError;

/// Bark push notifications, one GET per device token:
/// `{base}/{token}/{title}/{message}`.
pub struct BarkNotifier {
    client: reqwest::Client,
    base_url: String,
    title: String,
    tokens: Vec<String>,
}

impl BarkNotifier {
    pub fn new(client: reqwest::Client, config: &BarkConfig) -> Self {
        Self {
            client,
            base_url: config.url.clone(),
            title: config.title.clone(),
            tokens: config.token.clone(),
        }
    }

    fn push_url(&self, token: &str, message: &str) -> Result<Url, NotifyError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| NotifyError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| NotifyError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty() // drop the trailing slash of the base
            .extend([token, self.title.as_str(), message]);
        Ok(url)
    }

    async fn push(&self, token: &str, message: &str) -> Result<(), NotifyError> {
        let url = self.push_url(token, message)?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(NotifyError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }

    async fn deliver(&self, token: &str, message: &str) -> Delivery {
        let result = self.push(token, message).await;
        match &result {
            Ok(()) => info!("token:{}, delivered", mask_token(token)),
            Err(e) => error!("token:{}, delivery failed: {}", mask_token(token), e),
        }
        Delivery {
            channel: self.name().to_string(),
            target: mask_token(token),
            result,
        }
    }
}

#[async_trait]
impl Notifier for BarkNotifier {
    fn name(&self) -> &str {
        "bark"
    }

    async fn notify(&self, message: &str) -> Vec<Delivery> {
        join_all(self.tokens.iter().map(|token| self.deliver(token, message))).await
    }
}

/// Keeps the first four characters of a device token for log lines.
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    if visible.len() == token.len() {
        return visible;
    }
    format!("{}***", visible)
}
