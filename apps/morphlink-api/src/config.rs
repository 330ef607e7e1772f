use crate::gateway::dispatcher::SenderPolicy;

/// Default outbound queue depth per connection, in frames.
pub const DEFAULT_SEND_QUEUE_CAPACITY: usize = 64;

/// Relay configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP/WebSocket server binds to.
    pub port: u16,
    /// Whether `face_data` is echoed back to the connection that sent it.
    pub sender_policy: SenderPolicy,
    /// Frames buffered per connection before further sends to it are dropped.
    pub send_queue_capacity: usize,
    /// Serve the OpenAPI document and Swagger UI.
    pub api_docs_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            sender_policy: SenderPolicy::Include,
            send_queue_capacity: DEFAULT_SEND_QUEUE_CAPACITY,
            api_docs_enabled: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable is optional; unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            sender_policy: match bool_var("ECHO_TO_SENDER") {
                Some(false) => SenderPolicy::Exclude,
                Some(true) => SenderPolicy::Include,
                None => defaults.sender_policy,
            },
            send_queue_capacity: std::env::var("SEND_QUEUE_CAPACITY")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .map(|v| v.max(1))
                .unwrap_or(defaults.send_queue_capacity),
            api_docs_enabled: bool_var("API_DOCS_ENABLED").unwrap_or(defaults.api_docs_enabled),
        }
    }
}

fn bool_var(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    parse_bool(&value)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
