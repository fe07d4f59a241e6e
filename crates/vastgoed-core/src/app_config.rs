use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
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

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub altum_api_key: String,
    pub altum_sandbox_api_key: Option<String>,
    pub use_sandbox: bool,
    pub altum_base_url: String,
    pub ep_online_api_key: String,
    pub ep_online_base_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub user_agent: String,
    pub provider_timeout_secs: u64,
    pub summarizer_timeout_secs: u64,
    pub energy_label_batch_size: usize,
    pub energy_label_batch_delay_ms: u64,
    pub area_result_limit: u32,
    pub area_sort: String,
}

impl AppConfig {
    /// The Altum key to send, honouring the sandbox switch.
    #[must_use]
    pub fn effective_altum_api_key(&self) -> &str {
        if self.use_sandbox {
            self.altum_sandbox_api_key
                .as_deref()
                .unwrap_or(&self.altum_api_key)
        } else {
            &self.altum_api_key
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("altum_api_key", &"[redacted]")
            .field(
                "altum_sandbox_api_key",
                &self.altum_sandbox_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("use_sandbox", &self.use_sandbox)
            .field("altum_base_url", &self.altum_base_url)
            .field("ep_online_api_key", &"[redacted]")
            .field("ep_online_base_url", &self.ep_online_base_url)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("gemini_base_url", &self.gemini_base_url)
            .field("gemini_model", &self.gemini_model)
            .field("user_agent", &self.user_agent)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("summarizer_timeout_secs", &self.summarizer_timeout_secs)
            .field("energy_label_batch_size", &self.energy_label_batch_size)
            .field(
                "energy_label_batch_delay_ms",
                &self.energy_label_batch_delay_ms,
            )
            .field("area_result_limit", &self.area_result_limit)
            .field("area_sort", &self.area_sort)
            .finish()
    }
}
