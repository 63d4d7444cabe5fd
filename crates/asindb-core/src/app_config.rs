use std::net::SocketAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Marketplace region, selecting which amazon domain upstream requests target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marketplace {
    Us,
    Uk,
}

impl Marketplace {
    /// The `amazon_domain` request parameter value for this region.
    #[must_use]
    pub fn amazon_domain(self) -> &'static str {
        match self {
            Marketplace::Us => "amazon.com",
            Marketplace::Uk => "amazon.co.uk",
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// `None` when unset or set to a placeholder; the marketplace client
    /// degrades to empty results without it.
    pub rainforest_api_key: Option<String>,
    pub marketplace: Marketplace,
    pub marketplace_timeout_secs: u64,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "rainforest_api_key",
                &self.rainforest_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("marketplace", &self.marketplace)
            .field("marketplace_timeout_secs", &self.marketplace_timeout_secs)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "anthropic_api_key",
                &self.anthropic_api_key.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
