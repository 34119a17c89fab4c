use serde::{Deserialize, Serialize};

/// `modules.rentals` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RentalsConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    /// HS256 signing key for bearer tokens.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    #[serde(default = "default_reset_token_ttl_minutes")]
    pub reset_token_ttl_minutes: i64,
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
}

impl Default for RentalsConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            jwt_secret: default_jwt_secret(),
            token_ttl_hours: default_token_ttl_hours(),
            reset_token_ttl_minutes: default_reset_token_ttl_minutes(),
            min_password_len: default_min_password_len(),
        }
    }
}

fn default_page_size() -> u64 {
    10_000
}

fn default_max_page_size() -> u64 {
    10_000
}

fn default_jwt_secret() -> String {
    "change-me-in-production".to_string()
}

fn default_token_ttl_hours() -> i64 {
    24 * 90
}

fn default_reset_token_ttl_minutes() -> i64 {
    10
}

fn default_min_password_len() -> usize {
    8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_section_keeps_defaults() {
        let cfg: RentalsConfig =
            serde_json::from_value(serde_json::json!({ "jwt_secret": "k" })).unwrap();
        assert_eq!(cfg.jwt_secret, "k");
        assert_eq!(cfg.default_page_size, 10_000);
        assert_eq!(cfg.reset_token_ttl_minutes, 10);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let res: Result<RentalsConfig, _> =
            serde_json::from_value(serde_json::json!({ "page_size": 5 }));
        assert!(res.is_err());
    }
}
