//! Runtime configuration from environment variables

use crate::auth::Credentials;
use crate::reply::{FailurePolicy, WebhookConfig};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_WEBHOOK_URL: &str =
    "https://elvis04.app.n8n.cloud/webhook/09564c37-d5b4-4a9d-9503-6bbaa700b312/chat";

// Literal pair the client has always shipped with. Override both in any
// real deployment.
const DEFAULT_USERNAME: &str = "Elvis";
const DEFAULT_PASSWORD: &str = "SoyUnTanque";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub port: u16,
    /// Pair accepted by the login gate
    pub login: Credentials,
    pub webhook: WebhookConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup("CYBERSEC_DB_PATH").map_or_else(
            || {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(format!("{home}/.cybersec-chat/chat.db"))
            },
            PathBuf::from,
        );

        let port = lookup("CYBERSEC_PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let login = Credentials::new(
            lookup("CYBERSEC_LOGIN_USER").unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            lookup("CYBERSEC_LOGIN_PASSWORD").unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
        );

        let failure_policy = match lookup("CYBERSEC_WEBHOOK_FAILURES") {
            Some(value) => FailurePolicy::parse(&value).unwrap_or_else(|| {
                tracing::warn!(value = %value, "Unknown webhook failure policy, using default");
                FailurePolicy::default()
            }),
            None => FailurePolicy::default(),
        };

        let webhook = WebhookConfig {
            url: lookup("CYBERSEC_WEBHOOK_URL").unwrap_or_else(|| DEFAULT_WEBHOOK_URL.to_string()),
            username: lookup("CYBERSEC_WEBHOOK_USER")
                .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            password: lookup("CYBERSEC_WEBHOOK_PASSWORD")
                .unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
            failure_policy,
            timeout: lookup("CYBERSEC_WEBHOOK_TIMEOUT_SECS")
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        };

        Self {
            db_path,
            port,
            login,
            webhook,
        }
    }
}
