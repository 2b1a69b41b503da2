pub mod metrics;
pub mod tracer;

use clap::Args;
use std::net::SocketAddr;
use tracing::level_filters::LevelFilter;

/// Command line options shared by every component of the workspace.
#[derive(Clone, Debug, Args)]
pub struct CommonOpts {
    /// Level used when `RUST_LOG` is not set
    #[clap(long, env, default_value = "info")]
    pub log_level: LevelFilter,

    /// If set, a Prometheus endpoint serving the component's metrics is opened on this address
    #[clap(long, env)]
    pub observability_address: Option<SocketAddr>,
}
