use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Picks the app log level: debug when verbose, info while serving, and
/// silent otherwise so CLI output stays clean.
pub fn level_for(verbose: bool, serving: bool) -> LevelFilter {
    match (verbose, serving) {
        (true, _) => LevelFilter::DEBUG,
        (false, true) => LevelFilter::INFO,
        (false, false) => LevelFilter::OFF,
    }
}

pub fn init_logging(level_filter: LevelFilter) {
    let app_filter = Targets::new()
        .with_target("kira", level_filter)
        .with_target("tower_http", level_filter);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_filter.to_string()));

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time())
        .with(app_filter)
        .with(env_filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(true, false), LevelFilter::DEBUG);
        assert_eq!(level_for(true, true), LevelFilter::DEBUG);
        assert_eq!(level_for(false, true), LevelFilter::INFO);
        assert_eq!(level_for(false, false), LevelFilter::OFF);
    }
}
