use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Upstream HTTP internals are noisy at info
const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn";

/// Output format for the tracker's logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, for log shippers
    Json,
    /// Human readable, for local runs
    Pretty,
}

impl LogFormat {
    /// `LOG_FORMAT=json` selects JSON; anything else is pretty.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Reload cycles and proxy calls are logged
/// from a handful of tasks, so thread ids are left out in both formats.
pub fn init(format: LogFormat) {
    let registry = tracing_subscriber::registry().with(env_filter());

    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_target(true),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init(),
    }

    tracing::info!("Logging initialized ({:?})", format);
}

pub fn init_from_env() {
    let value = std::env::var("LOG_FORMAT").ok();
    init(LogFormat::from_env_value(value.as_deref()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_env_value() {
        assert_eq!(LogFormat::from_env_value(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::from_env_value(Some(" JSON ")), LogFormat::Json);
        assert_eq!(LogFormat::from_env_value(Some("pretty")), LogFormat::Pretty);
        assert_eq!(LogFormat::from_env_value(None), LogFormat::Pretty);
    }

    #[test]
    fn test_logging_init() {
        // Only checks that initialization doesn't panic
        init(LogFormat::Pretty);
    }
}
