use std::str::FromStr;

pub struct Config {
    pub port: u16,
    /// Outbound webhook for customer and company notifications; unset means log only
    pub notify_webhook_url: Option<String>,
    pub notify_max_attempts: u32,
    /// Inbox that hears about new and completed orders
    pub company_email: String,
    pub service_details_min_chars: usize,
    pub service_details_max_chars: usize,
    pub max_attachment_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            notify_webhook_url: None,
            notify_max_attempts: 3,
            company_email: "orders@localhost".to_string(),
            service_details_min_chars: 100,
            service_details_max_chars: 500,
            max_attachment_bytes: 100 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; missing or unparseable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            port: parse_or(&lookup, "PORT", defaults.port),
            notify_webhook_url: lookup("NOTIFY_WEBHOOK_URL").filter(|url| !url.trim().is_empty()),
            notify_max_attempts: parse_or(&lookup, "NOTIFY_MAX_ATTEMPTS", defaults.notify_max_attempts),
            company_email: lookup("COMPANY_EMAIL")
                .filter(|email| !email.trim().is_empty())
                .unwrap_or(defaults.company_email),
            service_details_min_chars: parse_or(
                &lookup,
                "SERVICE_DETAILS_MIN_CHARS",
                defaults.service_details_min_chars,
            ),
            service_details_max_chars: parse_or(
                &lookup,
                "SERVICE_DETAILS_MAX_CHARS",
                defaults.service_details_max_chars,
            ),
            max_attachment_bytes: parse_or(&lookup, "MAX_ATTACHMENT_BYTES", defaults.max_attachment_bytes),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
