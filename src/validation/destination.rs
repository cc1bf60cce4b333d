use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use url::{Host, Url};

/// Every Discord webhook URL must begin with this.
pub const DISCORD_WEBHOOK_PREFIX: &str = "https://discord.com/api/webhooks/";

const MAX_URL_LENGTH: usize = 2083;

/// Where an endpoint's alerts are delivered. Tagged by `dest`, with the
/// kind-specific fields under `destDetails`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dest", content = "destDetails")]
pub enum Destination {
    #[serde(rename = "discord-webhook")]
    DiscordWebhook { url: String },
    #[serde(rename = "json")]
    Json { method: JsonMethod, url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum JsonMethod {
    #[serde(rename = "POST")]
    Post,
    #[serde(rename = "GET")]
    Get,
}

impl Destination {
    /// Decode `dest` + `destDetails` into a destination and check it.
    /// Returns `None` for an unknown kind, a malformed shape, or a URL that
    /// fails the kind's rules.
    pub fn parse(dest: &str, details: &Value) -> Option<Self> {
        if !details.is_object() {
            return None;
        }
        let destination: Destination =
            serde_json::from_value(json!({ "dest": dest, "destDetails": details })).ok()?;
        destination.is_valid().then_some(destination)
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Destination::DiscordWebhook { url } => {
                is_http_url(url) && url.starts_with(DISCORD_WEBHOOK_PREFIX)
            }
            Destination::Json { url, .. } => is_http_url(url),
        }
    }

    /// The `dest` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Destination::DiscordWebhook { .. } => "discord-webhook",
            Destination::Json { .. } => "json",
        }
    }

    /// The `destDetails` object as stored.
    pub fn details(&self) -> Value {
        match self {
            Destination::DiscordWebhook { url } => json!({ "url": url }),
            Destination::Json { method, url } => json!({ "method": method, "url": url }),
        }
    }
}

/// Absolute http(s) URL with a real host. Port, query and fragment are
/// optional; protocol-relative URLs are rejected.
pub fn is_http_url(raw: &str) -> bool {
    if raw.is_empty() || raw.len() > MAX_URL_LENGTH {
        return false;
    }
    if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }

    let Ok(url) = Url::parse(raw) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    if !raw
        .get(..url.scheme().len() + 3)
        .is_some_and(|head| head.eq_ignore_ascii_case(&format!("{}://", url.scheme())))
    {
        return false;
    }

    match url.host() {
        Some(Host::Domain(domain)) => is_fully_qualified(domain),
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
        None => false,
    }
}

fn is_fully_qualified(domain: &str) -> bool {
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty() || l.len() > 63) {
        return false;
    }
    // Letters, digits and hyphens only; no underscores
    if labels.iter().any(|l| {
        l.starts_with('-')
            || l.ends_with('-')
            || !l.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    }) {
        return false;
    }

    // Alphabetic top-level domain, or a punycode one
    let Some(tld) = labels.last() else {
        return false;
    };
    tld.len() >= 2 && (tld.chars().all(|c| c.is_ascii_alphabetic()) || tld.starts_with("xn--"))
}
