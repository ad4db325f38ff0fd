//! Tracing initialization for the `fraud-infer` binary.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the log filter, e.g. `FRAUD_INFER_LOG=fraud_infer::inference=debug`
pub const LOG_ENV: &str = "FRAUD_INFER_LOG";

/// Install a stderr `fmt` subscriber.
///
/// The filter is read from `FRAUD_INFER_LOG`. If it is unset or invalid, the fallback is
/// `fraud_infer=warn`, or `fraud_infer=debug` when `verbose` is set.
///
/// Calling this more than once is harmless; only the first call has an effect.
pub fn init_tracing(verbose: bool) {
    INIT.call_once(|| {
        let fallback = if verbose { "fraud_infer=debug" } else { "fraud_infer=warn" };
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .with(filter)
            .init();
    });
}
