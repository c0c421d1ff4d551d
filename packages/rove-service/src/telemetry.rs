use tracing_subscriber::EnvFilter;

use rove_config::Config;

/// Installs the global tracing subscriber from the configured log level. An
/// unparsable filter falls back to "info" rather than failing startup.
pub fn init(cfg: &Config) {
	let filter =
		EnvFilter::try_new(&cfg.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}
