//! Tracing setup shared by the CLI and embedding frontends.

use once_cell::sync::OnceCell;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INSTALLED: OnceCell<()> = OnceCell::new();

const DEFAULT_FILTER: &str = "searchlauncher=info";

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init() {
    INSTALLED.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        // Another subscriber may already be set by an embedding host.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init();
    });
}
