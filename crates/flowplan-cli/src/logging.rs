//! Stderr logging for the `flowplan` binary.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `-v` selects `debug` and `-vv`
/// selects `trace` for the flowplan crates; the default is `warn`.
pub fn init(verbose: u8) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "warn,flowplan_core=debug,flowplan_planner=debug",
        _ => "warn,flowplan_core=trace,flowplan_planner=trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level(0), "warn");
        assert!(level(1).contains("flowplan_planner=debug"));
        assert!(level(2).contains("flowplan_planner=trace"));
        assert_eq!(level(5), level(2));
    }
}
