/// Origins accepted when `ALLOWED_ORIGINS` is not set.
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5000,https://sub.yourdomain.com";

/// Relay API configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Exact `Origin` header values allowed to open a WebSocket.
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable is optional; unset or unparsable values fall back to
    /// the defaults.
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            allowed_origins: parse_origins(
                &std::env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string()),
            ),
        }
    }
}

/// Split a comma separated origin list, trimming whitespace and dropping
/// empty items.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
