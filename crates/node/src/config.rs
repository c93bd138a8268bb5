//! Runtime knobs of a node actor.
use std::time::Duration;

use chordal_core::consts::DEFAULT_STABILIZE_INTERVAL_MS;
use chordal_core::consts::DEFAULT_SUCC_LIST_LEN;

/// Per-node runtime configuration.
#[derive(Clone, Debug)]
pub struct NodeConfig {
    /// Capacity of the successor list.
    pub succ_list_len: usize,
    /// Period of the self-addressed stabilization tick. `None` disables
    /// the ticker; tests drive rounds by hand instead.
    pub stabilize_interval: Option<Duration>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            succ_list_len: DEFAULT_SUCC_LIST_LEN,
            stabilize_interval: Some(Duration::from_millis(DEFAULT_STABILIZE_INTERVAL_MS)),
        }
    }
}

impl NodeConfig {
    /// A config without the periodic ticker, for manually paced tests.
    pub fn manual() -> Self {
        Self {
            stabilize_interval: None,
            ..Self::default()
        }
    }

    /// Override the stabilization period.
    pub fn with_interval(mut self, period: Duration) -> Self {
        self.stabilize_interval = Some(period);
        self
    }
}
