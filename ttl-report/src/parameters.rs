use clap::{Args, ValueEnum};
use std::path::PathBuf;
use ttl_timing::{Edge, LevelSettings, Real};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Polarity {
    Rising,
    Falling,
    Both,
}

impl Polarity {
    pub(crate) fn edges(self) -> &'static [Edge] {
        match self {
            Polarity::Rising => &[Edge::Rising],
            Polarity::Falling => &[Edge::Falling],
            Polarity::Both => &[Edge::Rising, Edge::Falling],
        }
    }
}

#[derive(Clone, Debug, Args)]
pub(crate) struct InputParameters {
    /// A trace file, or a directory containing trace files.
    #[clap(env = "TTL_INPUT")]
    pub(crate) input: PathBuf,

    /// Glob pattern selecting trace files when the input is a directory.
    #[clap(long, env, default_value = "*.csv")]
    pub(crate) pattern: String,

    /// Search subdirectories of the input directory as well.
    #[clap(long, env)]
    pub(crate) recurse: bool,

    /// Columns of the trace file holding voltages, each processed as an independent trace.
    #[clap(long, env, value_delimiter = ',', default_value = "1")]
    pub(crate) channels: Vec<usize>,

    /// Column of the trace file holding sample times, in seconds.
    #[clap(long, env, default_value = "0")]
    pub(crate) time_column: usize,

    /// Separator between the columns of the trace file.
    #[clap(long, env, default_value = ",")]
    pub(crate) delimiter: char,
}

#[derive(Clone, Debug, Args)]
pub(crate) struct DetectionParameters {
    /// Minimum height in volts above the low level for a sample to count towards the high level.
    #[clap(long, env, default_value = "1.0")]
    pub(crate) separation: Real,

    /// Position of the threshold between the low (0) and high (1) levels.
    #[clap(long, env, default_value_t = 2.0 / 3.0)]
    pub(crate) threshold_fraction: Real,

    /// Which edges of each trace to characterise.
    #[clap(long, env, value_enum, default_value = "rising")]
    pub(crate) polarity: Polarity,
}

impl DetectionParameters {
    pub(crate) fn level_settings(&self) -> LevelSettings {
        LevelSettings {
            separation: self.separation,
            threshold_fraction: self.threshold_fraction,
        }
    }
}

#[derive(Clone, Debug, Args)]
pub(crate) struct RegularizationParameters {
    /// Nominal period in seconds of the pulse train. If set, every signal is also regularized.
    #[clap(long, env)]
    pub(crate) target_period: Option<Real>,

    /// Fractional tolerance on the target period.
    #[clap(long, env, default_value = "0.1")]
    pub(crate) tolerance: Real,
}

#[derive(Clone, Debug, Args)]
pub(crate) struct OutputParameters {
    /// If set, onset sequences are written to files in this directory.
    #[clap(long, env)]
    pub(crate) save_dir: Option<PathBuf>,

    /// Path of the summary report, written to stdout if not set.
    #[clap(long, env)]
    pub(crate) output: Option<PathBuf>,
}
