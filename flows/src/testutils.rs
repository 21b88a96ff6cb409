use tracing_subscriber::EnvFilter;

use crate::bootstrap::SandboxNetwork;

/// A fresh sandbox, with test logging switched on.
pub fn sandbox() -> SandboxNetwork {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init()
        .ok();
    SandboxNetwork::new()
}
