//! Logging setup for applications embedding the SDK.
//!
//! The SDK itself only emits `tracing` events (and `log` records from error
//! constructors, which `tracing-subscriber` bridges). Applications that do not
//! install their own subscriber can call one of the helpers below.
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Default filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "info";

/// Filter used when the SDK's `debug` option is enabled
const DEBUG_FILTER: &str = "info,selendra_sdk=debug";

/// Installs a global subscriber writing to stdout
pub fn setup_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
	setup_logging_with_writer(std::io::stdout, false)
}

/// Installs a global subscriber, raising the SDK's own level to `debug` when
/// `debug` is set and `RUST_LOG` is not
pub fn setup_logging_for(debug: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
	setup_logging_with_writer(std::io::stdout, debug)
}

/// Installs a global subscriber with a custom writer
pub fn setup_logging_with_writer<W>(
	writer: W,
	debug: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>
where
	W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

	tracing_subscriber::registry()
		.with(filter)
		.with(
			fmt::layer()
				.with_writer(writer)
				.event_format(
					fmt::format()
						.with_level(true)
						.with_target(true)
						.with_thread_ids(false)
						.with_thread_names(false)
						.with_ansi(true)
						.compact(),
				)
				.fmt_fields(fmt::format::PrettyFields::new()),
		)
		.try_init()?;
	Ok(())
}

fn default_filter(debug: bool) -> &'static str {
	if debug {
		DEBUG_FILTER
	} else {
		DEFAULT_FILTER
	}
}
