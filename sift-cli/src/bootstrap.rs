use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Map a configured level name to an `EnvFilter` directive. Accepts the
/// usual aliases (`WARNING`, `CRITICAL`) in any case.
pub fn filter_directive(log_level: &str) -> String {
    match log_level.trim().to_lowercase().as_str() {
        "warning" => "warn".to_string(),
        "critical" | "fatal" => "error".to_string(),
        other => other.to_string(),
    }
}

/// Initialise the global `tracing` subscriber on stderr.
///
/// `RUST_LOG` takes precedence over `log_level`. Unrecognised levels fall
/// back to `info`.
pub fn setup_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directive(log_level)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_aliases() {
        assert_eq!(filter_directive("WARNING"), "warn");
        assert_eq!(filter_directive("Critical"), "error");
        assert_eq!(filter_directive(" debug "), "debug");
        assert_eq!(filter_directive("sift_ingest=trace"), "sift_ingest=trace");
    }
}
