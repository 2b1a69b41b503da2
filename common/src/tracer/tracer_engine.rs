use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::TryInitError};

#[derive(Debug, Error)]
pub enum TracerError {
    #[error("Tracing subscriber already initialised: {0}")]
    AlreadyInit(#[from] TryInitError),
}

pub struct TracerOptions {
    /// Applied when `RUST_LOG` is absent from the environment.
    pub default_level: LevelFilter,
    /// Write log lines to stderr instead of stdout, leaving stdout free for reports.
    pub use_stderr: bool,
}

impl Default for TracerOptions {
    fn default() -> Self {
        Self {
            default_level: LevelFilter::INFO,
            use_stderr: false,
        }
    }
}

/// This object initialises the global tracing subscriber, given a TracerOptions struct.
pub struct TracerEngine;

impl TracerEngine {
    /// Initialises the fmt tracer for the component
    /// #Arguments
    /// * `options` - The caller-specified instance of TracerOptions.
    /// #Returns
    /// An instance of TracerEngine, or an error if a global subscriber already exists.
    pub fn new(options: TracerOptions) -> Result<Self, TracerError> {
        // This filter is applied to the fmt tracer
        let log_filter = EnvFilter::builder()
            .with_default_directive(options.default_level.into())
            .from_env_lossy();

        let fmt_tracer = if options.use_stderr {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(log_filter)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(log_filter)
                .boxed()
        };

        let subscriber = tracing_subscriber::Registry::default().with(fmt_tracer);
        tracing_subscriber::util::SubscriberInitExt::try_init(subscriber)?;

        Ok(Self)
    }
}
