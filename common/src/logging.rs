//! Logging setup shared by the CLI binary and integration tests.
//!

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_tree::HierarchicalLayer;

/// Initialise a process-wide `tracing` subscriber.
///
/// Log level filtering is driven by `RUST_LOG`, falling back to `info` for
/// this crate family. When `use_tree` is set, spans are rendered as an
/// indented hierarchy, otherwise a flat formatter is used; this mirrors the
/// two output modes a human operator wants on a terminal versus in a
/// redirected log file.
pub fn init_logging(use_tree: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if use_tree {
        let tree = HierarchicalLayer::new(2)
            .with_ansi(true)
            .with_span_retrace(true)
            .with_span_modes(true)
            .with_targets(true)
            .with_bracketed_fields(true);
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tree)
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init();
    }
}
