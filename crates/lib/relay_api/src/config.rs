//! API server configuration.

use url::Url;

use relay_core::relay::RelaySettings;

/// Configuration for the API server, resolved once at startup.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3100").
    pub bind_addr: String,
    /// OpenAI API key. Not validated here; the upstream rejects a bad key.
    pub openai_api_key: Option<String>,
    /// Assistant every run is created against.
    pub assistant_id: Option<String>,
    /// Assistants API root.
    pub openai_base_url: Url,
    /// Language tag used when a request carries none.
    pub default_language: String,
    /// Attach a permissive CORS layer (any origin, method, header).
    pub permissive_cors: bool,
}

impl ApiConfig {
    /// Relay settings derived from this configuration.
    pub fn relay_settings(&self) -> RelaySettings {
        RelaySettings {
            assistant_id: self.assistant_id.clone().unwrap_or_default(),
            default_language: self.default_language.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ApiConfig {
        ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            openai_api_key: None,
            assistant_id: Some("asst_abc".into()),
            openai_base_url: Url::parse("https://api.openai.com/v1").unwrap(),
            default_language: "en".into(),
            permissive_cors: false,
        }
    }

    #[test]
    fn relay_settings_carry_assistant_and_language() {
        let settings = config().relay_settings();
        assert_eq!(settings.assistant_id, "asst_abc");
        assert_eq!(settings.default_language, "en");
    }

    #[test]
    fn missing_assistant_id_is_left_empty() {
        let settings = ApiConfig {
            assistant_id: None,
            ..config()
        }
        .relay_settings();
        assert_eq!(settings.assistant_id, "");
    }
}
