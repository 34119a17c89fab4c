use serde::{Deserialize, Serialize};

/// `modules.api_ingress` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiIngressConfig {
    /// `host:port`; empty means `server.host:server.port`.
    #[serde(default)]
    pub bind_addr: String,
    #[serde(default)]
    pub cors_enabled: bool,
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

fn default_body_limit_bytes() -> usize {
    16 * 1024 * 1024
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: String::new(),
            cors_enabled: false,
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

impl ApiIngressConfig {
    /// Resolve the listen address, falling back to the server section.
    pub fn bind_addr_or(&self, host: &str, port: u16) -> String {
        if self.bind_addr.trim().is_empty() {
            format!("{host}:{port}")
        } else {
            self.bind_addr.trim().to_string()
        }
    }
}
