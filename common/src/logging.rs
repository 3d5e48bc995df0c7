//! Common logging initializer
//!

use eyre::Result;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_tree::HierarchicalLayer;

/// Setup the global subscriber.
///
/// - filters always come from `RUST_LOG`
/// - `use_tree` replaces the compact output with a hierarchical one
/// - `use_file` adds an hourly rolling log in that directory
///
pub fn init_logging(name: &'static str, use_tree: bool, use_file: Option<String>) -> Result<()> {
    // Load filters from environment
    //
    let filter = EnvFilter::from_default_env();

    // Do we want hierarchical output?
    //
    let (tree, compact) = if use_tree {
        (
            Some(
                HierarchicalLayer::new(2)
                    .with_ansi(true)
                    .with_span_retrace(true)
                    .with_span_modes(true)
                    .with_targets(true)
                    .with_verbose_entry(true)
                    .with_verbose_exit(true)
                    .with_bracketed_fields(true),
            ),
            None,
        )
    } else {
        (
            None,
            Some(
                fmt::layer()
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .compact(),
            ),
        )
    };

    // Log to file?
    //
    let file = use_file.map(|dir| {
        // Basic append-only rolling file for all traces.
        //
        let file_appender = tracing_appender::rolling::hourly(dir, name);
        fmt::layer().with_ansi(false).with_writer(file_appender)
    });

    // Combine filters & exporters
    //
    tracing_subscriber::registry()
        .with(filter)
        .with(tree)
        .with(compact)
        .with(file)
        .try_init()?;

    Ok(())
}
