use crate::config::HttpConfig;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Shared client for the price source and all notifiers.
pub fn build_client(config: &HttpConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(config.timeout())
        .user_agent(USER_AGENT)
        .build()
}
