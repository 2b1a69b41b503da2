//! Timing reconstruction for periodic digital pulse trains.
//!
//! A raw trace of (time, voltage) samples is converted into rising and
//! falling edge onsets by [`EdgeDetector`]. An onset sequence is wrapped in a
//! [`PeriodicSignal`] which characterises how regular it is, and which can be
//! regularized against a known period. Typical usage may look like:
//! ```rust
//! use ttl_timing::{EdgeDetector, PeriodicSignal, Sample};
//!
//! let samples: Vec<Sample> = (0..200)
//!     .map(|i| Sample::new(i as f64 * 1e-3, if (i / 10) % 2 == 0 { 0.0 } else { 5.0 }))
//!     .collect();
//! let edges = EdgeDetector::default().detect(&samples)?;
//! let signal = PeriodicSignal::new(edges.rising)?;
//! let regularized = signal.regularize(0.02, 0.1)?;
//! assert!(regularized.added_times().is_empty());
//! # Ok::<(), ttl_timing::TimingError>(())
//! ```

pub(crate) mod datatype;
pub(crate) mod detectors;
pub mod edges;
pub mod error;
pub(crate) mod iterators;
pub mod mode;
pub mod onsets;
pub mod periodic;

pub use datatype::{Edge, Sample};
pub use edges::{EdgeDetector, Edges, LevelSettings, Levels};
pub use error::{TimingError, TimingResult};
pub use onsets::OnsetSequence;
pub use periodic::{Characteristics, ConditionedTimeline, GapFill, PeriodicSignal, Provenance};

pub type Real = f64;
