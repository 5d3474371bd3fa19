use async_trait::async_trait;
use log::debug;
use scraper::{Html, Selector};

use crate::api::PriceSource;
use crate::config::SourceConfig;
use crate::error::PriceError;

/// Scrapes the gold price from ICBC's gold tendency page.
pub struct IcbcGoldSource {
    client: reqwest::Client,
    url: String,
    selector: Selector,
}

impl IcbcGoldSource {
    pub fn new(client: reqwest::Client, config: &SourceConfig) -> Result<Self, PriceError> {
        Ok(Self {
            client,
            url: config.url.clone(),
            selector: parse_selector(&config.selector)?,
        })
    }
}

#[async_trait]
impl PriceSource for IcbcGoldSource {
    fn name(&self) -> &str {
        "icbc"
    }

    async fn fetch_price(&self) -> Result<f64, PriceError> {
        debug!("Fetching gold price from {}", self.url);
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()? // maintenance pages come back as 5xx
            .text()
            .await?;
        extract_price(&body, &self.selector)
    }
}

pub fn parse_selector(selector: &str) -> Result<Selector, PriceError> {
    Selector::parse(selector).map_err(|e| PriceError::Selector(format!("{}: {:?}", selector, e)))
}

/// Reads the first element matching `selector` as a price.
pub fn extract_price(html: &str, selector: &Selector) -> Result<f64, PriceError> {
    let document = Html::parse_document(html);
    let cell = document.select(selector).next().ok_or(PriceError::NotFound)?;

    let text = cell.text().collect::<String>(); // cell may span several text nodes
    let text = text.trim();
    let price = text.parse::<f64>().map_err(|source| PriceError::Parse {
        text: text.to_string(),
        source,
    })?;

    if !price.is_finite() {
        return Err(PriceError::NotFinite(price));
    }
    Ok(price)
}
