//! Tracing setup for embedding applications
//!
//! The engine only emits `tracing` events; installing a subscriber is up to
//! the caller. These helpers cover the common cases and honour `RUST_LOG`.

use tracing_subscriber::EnvFilter;

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install a human-readable fmt subscriber
///
/// `default_filter` applies when `RUST_LOG` is unset or invalid, e.g.
/// `"roomtag_core=info"`. Returns `false` if a global subscriber was already
/// installed, in which case nothing changes.
pub fn init_tracing(default_filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_target(false)
        .try_init()
        .is_ok()
}

/// Install a JSON fmt subscriber, one object per event
///
/// Same filter and idempotence rules as [`init_tracing`].
pub fn init_json_tracing(default_filter: &str) -> bool {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter(default_filter))
        .with_current_span(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_a_no_op() {
        let _ = init_tracing("roomtag_core=debug");
        assert!(!init_tracing("roomtag_core=debug"));
        assert!(!init_json_tracing("info"));
    }
}
