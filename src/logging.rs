use std::str::FromStr;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter directives for `log_level`. A bare level also quiets the HTTP stack;
/// anything containing `,` or `=` is taken as a full directive string.
pub fn filter_directives(log_level: &str) -> String {
    let level = log_level.trim();
    if level.contains(',') || level.contains('=') {
        level.to_string()
    } else {
        format!("{},h2=info,hyper=info,hyper_util=info,reqwest=info", level)
    }
}

/// Install the global subscriber. Call once, from the binary.
pub fn setup_logging(log_level: &str, json_format: bool) {
    let directives = filter_directives(log_level);
    let filter = EnvFilter::from_str(&directives).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter);

    if json_format {
        let json_layer = fmt::layer()
            .json()
            .with_target(false)
            .with_current_span(false)
            .with_writer(std::io::stderr);
        subscriber.with(json_layer).init();
    } else {
        let fmt_layer = fmt::layer()
            .with_target(true)
            .compact()
            .with_writer(std::io::stderr);
        subscriber.with(fmt_layer).init();
    }

    tracing::debug!(
        filter = %directives,
        format = if json_format { "json" } else { "compact" },
        "logging initialized"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level_gets_quiet_http_stack() {
        let d = filter_directives(" debug ");
        assert!(d.starts_with("debug,"));
        assert!(d.contains("reqwest=info"));
        assert!(EnvFilter::from_str(&d).is_ok());
    }

    #[test]
    fn test_custom_directives_kept() {
        assert_eq!(
            filter_directives("info,dfusion_orderbook::capping=trace"),
            "info,dfusion_orderbook::capping=trace"
        );
    }
}
