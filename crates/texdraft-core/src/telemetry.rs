//! Logging for the `texdraft` binary.
//!
//! Log lines go to stderr; stdout carries outlines, labels and file lists
//! that callers pipe elsewhere. Without `RUST_LOG`, only the texdraft crates
//! log at the requested level and everything else is held to `warn`.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const CRATES: [&str; 3] = ["texdraft_core", "texdraft_build", "texdraft_cli"];

/// Default filter directives for `level`, e.g.
/// `warn,texdraft_core=debug,texdraft_build=debug,texdraft_cli=debug`.
pub fn default_directives(level: Level) -> String {
    let mut directives = String::from("warn");
    for krate in CRATES {
        directives.push_str(&format!(",{krate}={}", level.as_str().to_lowercase()));
    }
    directives
}

/// Install the global subscriber. Later calls leave the first one in place.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if json {
        registry.with(layer.json()).try_init()
    } else {
        registry.with(layer).try_init()
    };
    if installed.is_ok() {
        tracing::debug!(json, %level, "Tracing initialised");
    }
}
