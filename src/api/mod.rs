pub mod icbc;

use crate::error::PriceError;
use async_trait::async_trait;

/// Anything that can report the current gold price.
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_price(&self) -> Result<f64, PriceError>;
}
