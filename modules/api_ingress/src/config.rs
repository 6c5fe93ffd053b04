use serde::{Deserialize, Serialize};

/// `modules.api_ingress` configuration section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ApiIngressConfig {
    pub bind_addr: String,
    pub cors_enabled: bool,
    /// Time allowed until response headers are produced; 0 disables the timeout.
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8087".to_string(),
            cors_enabled: false,
            request_timeout_secs: 30,
            body_limit_bytes: 1024 * 1024,
        }
    }
}
