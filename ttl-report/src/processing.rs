use crate::{
    loader::{LoaderError, TraceTable, load_trace_file},
    parameters::Polarity,
    report::{RegularizationSummary, ReportRow},
    save_to_file::{SavablePoint, SaveToFileFilter, get_save_file_name, relative_trace_path},
};
use metrics::counter;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{Span, instrument, warn};
use ttl_common::metrics::{
    failures::{self, FailureKind},
    names::{EVENTS_ADDED, EVENTS_REMOVED, FAILURES, TRACES_PROCESSED},
};
use ttl_timing::{Edge, EdgeDetector, OnsetSequence, PeriodicSignal, Real, TimingError};

#[derive(Debug, Error)]
pub(crate) enum ProcessingError {
    #[error("{0}")]
    Loader(#[from] LoaderError),
    #[error("{0}")]
    Timing(#[from] TimingError),
    #[error("Cannot write {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ProcessingError {
    fn failure_kind(&self) -> FailureKind {
        match self {
            ProcessingError::Loader(e) if e.is_io_error() => FailureKind::FileReadFailed,
            ProcessingError::Loader(_) => FailureKind::InvalidSample,
            ProcessingError::Timing(TimingError::InvalidSample { .. }) => {
                FailureKind::InvalidSample
            }
            ProcessingError::Timing(TimingError::InsufficientData { .. }) => {
                FailureKind::InsufficientData
            }
            ProcessingError::Timing(TimingError::InsufficientSeparation { .. }) => {
                FailureKind::InsufficientSeparation
            }
            ProcessingError::Timing(TimingError::InvalidParameter { .. }) => {
                FailureKind::InvalidParameter
            }
            ProcessingError::Save { .. } => FailureKind::FileWriteFailed,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Regularization {
    pub(crate) target_period: Real,
    pub(crate) tolerance: Real,
}

#[derive(Clone, Debug)]
pub(crate) struct ProcessingSettings {
    pub(crate) detector: EdgeDetector,
    pub(crate) polarity: Polarity,
    pub(crate) channels: Vec<usize>,
    pub(crate) time_column: usize,
    pub(crate) delimiter: char,
    pub(crate) regularization: Option<Regularization>,
    pub(crate) save_dir: Option<PathBuf>,
    /// Saved outputs mirror the layout of the traces below this directory.
    pub(crate) input_root: PathBuf,
}

fn record_failure(error: &ProcessingError) {
    counter!(FAILURES, &[failures::get_label(error.failure_kind())]).increment(1);
}

fn save<I>(points: I, path: PathBuf) -> Result<(), ProcessingError>
where
    I: Iterator,
    I::Item: SavablePoint,
{
    let written = match path.parent() {
        Some(dir) => fs::create_dir_all(dir),
        None => Ok(()),
    }
    .and_then(|()| points.save_to_file(&path));
    written.map_err(|source| ProcessingError::Save { path, source })
}

/// Produces the report rows of one trace file. A file which cannot be read
/// yields an error row for each requested channel.
#[instrument(skip_all, fields(path = %path.display(), num_samples))]
pub(crate) fn process_file(path: &Path, settings: &ProcessingSettings) -> Vec<ReportRow> {
    let file = path.display().to_string();
    match load_trace_file(path, settings.delimiter) {
        Ok(table) => {
            Span::current().record("num_samples", table.len());
            let save_path = relative_trace_path(&settings.input_root, path);
            process_table(&file, save_path, &table, settings)
        }
        Err(e) => {
            let e = ProcessingError::from(e);
            warn!("{e}");
            settings
                .channels
                .iter()
                .map(|&channel| {
                    record_failure(&e);
                    ReportRow::failed(&file, channel, &e)
                })
                .collect()
        }
    }
}

/// `save_path` is the trace's path relative to the input root, and names
/// any saved outputs.
pub(crate) fn process_table(
    file: &str,
    save_path: &Path,
    table: &TraceTable,
    settings: &ProcessingSettings,
) -> Vec<ReportRow> {
    settings
        .channels
        .iter()
        .flat_map(|&channel| process_channel(file, save_path, table, channel, settings))
        .collect()
}

#[instrument(skip_all, fields(channel = channel, threshold))]
fn process_channel(
    file: &str,
    save_path: &Path,
    table: &TraceTable,
    channel: usize,
    settings: &ProcessingSettings,
) -> Vec<ReportRow> {
    let edges = table
        .samples(settings.time_column, channel)
        .map_err(ProcessingError::from)
        .and_then(|samples| Ok(settings.detector.detect(&samples)?));
    let edges = match edges {
        Ok(edges) => edges,
        Err(e) => {
            warn!("Channel {channel}: {e}");
            record_failure(&e);
            return vec![ReportRow::failed(file, channel, &e)];
        }
    };
    Span::current().record("threshold", edges.threshold());
    counter!(TRACES_PROCESSED).increment(1);

    settings
        .polarity
        .edges()
        .iter()
        .map(|&edge| {
            let onsets = edges.onsets(edge);
            let mut row = ReportRow {
                polarity: Some(edge),
                threshold: Some(edges.threshold()),
                onsets: Some(onsets.len()),
                ..ReportRow::new(file, channel)
            };
            if let Err(e) = characterise(&mut row, save_path, channel, edge, onsets, settings) {
                warn!("Channel {channel}, {edge} edges: {e}");
                record_failure(&e);
                row.error = Some(e.to_string());
            }
            row
        })
        .collect()
}

/// Fills in the statistics of `row`, leaving whatever was measured before
/// a failure in place.
fn characterise(
    row: &mut ReportRow,
    save_path: &Path,
    channel: usize,
    edge: Edge,
    onsets: &OnsetSequence,
    settings: &ProcessingSettings,
) -> Result<(), ProcessingError> {
    let save_name = |kind| {
        settings
            .save_dir
            .as_deref()
            .map(|dir| get_save_file_name(dir, save_path, channel, edge, kind))
    };

    if let Some(name) = save_name("onsets") {
        save(onsets.iter().copied(), name)?;
    }

    let signal = PeriodicSignal::new(onsets.as_slice())?;
    row.characteristics = Some(*signal.characteristics());

    let Some(Regularization {
        target_period,
        tolerance,
    }) = settings.regularization
    else {
        return Ok(());
    };

    let timeline = signal.condition_timeline(target_period, tolerance)?;
    counter!(EVENTS_ADDED).increment(timeline.added.len() as u64);
    counter!(EVENTS_REMOVED).increment(timeline.removed.len() as u64);

    if let Some(name) = save_name("added") {
        save(timeline.added.iter().copied(), name)?;
    }
    if let Some(name) = save_name("removed") {
        save(timeline.removed.iter().copied(), name)?;
    }
    if let Some(name) = save_name("gaps") {
        save(timeline.gap_fills.iter().copied(), name)?;
    }

    let added = timeline.added.len();
    let removed = timeline.removed.len();
    let regularized = timeline.into_signal()?;
    row.regularization = Some(RegularizationSummary {
        added,
        removed,
        regularized: regularized.onset_times().len(),
    });

    if let Some(name) = save_name("regularized") {
        save(regularized.onset_times().iter().copied(), name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_trace;
    use assert_approx_eq::assert_approx_eq;
    use metrics::{
        Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
    };
    use std::{
        fmt::Write,
        fs,
        io::Cursor,
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        },
    };

    /// Columns: time, a square wave of period 20 starting low, a flat line.
    fn square_table(num_samples: usize) -> TraceTable {
        let mut text = String::from("time,square,flat\n");
        for i in 0..num_samples {
            let square = if (i / 10) % 2 == 1 { 5.0 } else { 0.0 };
            writeln!(text, "{i},{square},0.0").unwrap();
        }
        parse_trace(Cursor::new(text), ',').unwrap()
    }

    fn test_table() -> TraceTable {
        square_table(100)
    }

    fn settings(polarity: Polarity, channels: Vec<usize>) -> ProcessingSettings {
        ProcessingSettings {
            detector: EdgeDetector::default(),
            polarity,
            channels,
            time_column: 0,
            delimiter: ',',
            regularization: None,
            save_dir: None,
            input_root: PathBuf::new(),
        }
    }

    #[test]
    fn rising_edges() {
        let rows = process_table(
            "trace.csv",
            Path::new("trace.csv"),
            &test_table(),
            &settings(Polarity::Rising, vec![1]),
        );
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.polarity, Some(Edge::Rising));
        assert_approx_eq!(row.threshold.unwrap(), 10.0 / 3.0);
        assert_eq!(row.onsets, Some(5));
        assert!(row.error.is_none());

        let c = row.characteristics.unwrap();
        assert_approx_eq!(c.start_time, 9.5);
        assert_approx_eq!(c.end_time, 89.5);
        assert_approx_eq!(c.estimated_period, 20.0);
        assert_eq!(c.target_count, Some(5));
        assert_eq!(c.hit_count, 5);
        assert_eq!(c.miss_count, Some(0));
        assert_eq!(c.false_count, 0);
        assert!(row.regularization.is_none());
    }

    #[test]
    fn both_edges_with_regularization() {
        let mut settings = settings(Polarity::Both, vec![1]);
        settings.regularization = Some(Regularization {
            target_period: 20.0,
            tolerance: 0.1,
        });
        let rows = process_table("trace.csv", Path::new("trace.csv"), &test_table(), &settings);
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].polarity, Some(Edge::Rising));
        assert_eq!(
            rows[0].regularization,
            Some(RegularizationSummary {
                added: 0,
                removed: 0,
                regularized: 5
            })
        );

        assert_eq!(rows[1].polarity, Some(Edge::Falling));
        assert_eq!(rows[1].onsets, Some(4));
        let c = rows[1].characteristics.unwrap();
        assert_approx_eq!(c.start_time, 19.5);
        assert_eq!(c.target_count, Some(4));
        assert_eq!(rows[1].regularization.unwrap().regularized, 4);
    }

    #[test]
    fn failures_are_isolated_per_channel() {
        let rows = process_table(
            "trace.csv",
            Path::new("trace.csv"),
            &test_table(),
            &settings(Polarity::Both, vec![2, 1, 3]),
        );
        assert_eq!(rows.len(), 4);

        assert_eq!(rows[0].channel, 2);
        assert!(rows[0].polarity.is_none());
        assert!(rows[0].error.as_ref().unwrap().contains("not a two-level signal"));

        assert_eq!(rows[1].channel, 1);
        assert!(rows[1].error.is_none());
        assert_eq!(rows[2].channel, 1);
        assert!(rows[2].error.is_none());

        assert_eq!(rows[3].channel, 3);
        assert!(rows[3].error.as_ref().unwrap().contains("Column 3"));
    }

    #[test]
    fn too_few_onsets_keeps_detection_results() {
        let table = parse_trace(Cursor::new("0,0\n1,5\n2,5\n3,0\n"), ',').unwrap();
        let rows = process_table(
            "short.csv",
            Path::new("short.csv"),
            &table,
            &settings(Polarity::Rising, vec![1]),
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].onsets, Some(1));
        assert!(rows[0].threshold.is_some());
        assert!(rows[0].characteristics.is_none());
        assert!(rows[0].error.as_ref().unwrap().starts_with("Insufficient data"));
    }

    #[test]
    fn unreadable_file() {
        let rows = process_file(
            Path::new("/this/path/does/not/exist.csv"),
            &settings(Polarity::Rising, vec![1, 2]),
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].channel, 1);
        assert_eq!(rows[1].channel, 2);
        assert!(rows.iter().all(|row| row.error.is_some() && row.onsets.is_none()));
    }

    #[test]
    fn saved_files() {
        let dir =
            std::env::temp_dir().join(format!("ttl-report-{}-saved_files", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();

        let mut settings = settings(Polarity::Rising, vec![1]);
        settings.save_dir = Some(dir.clone());
        settings.regularization = Some(Regularization {
            target_period: 20.0,
            tolerance: 0.1,
        });
        let rows = process_table(
            "trace.csv",
            Path::new("data/trace.csv"),
            &test_table(),
            &settings,
        );
        assert!(rows[0].error.is_none());

        let saved = dir.join("data");
        let onsets = fs::read_to_string(saved.join("trace_ch1_rising_onsets.csv")).unwrap();
        assert_eq!(onsets, "9.5\n29.5\n49.5\n69.5\n89.5\n");
        let regularized =
            fs::read_to_string(saved.join("trace_ch1_rising_regularized.csv")).unwrap();
        assert_eq!(regularized, onsets);
        for kind in ["added", "removed", "gaps"] {
            let name = saved.join(format!("trace_ch1_rising_{kind}.csv"));
            assert!(fs::read_to_string(name).unwrap().is_empty());
        }

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn same_file_name_in_different_directories() {
        let dir = std::env::temp_dir().join(format!(
            "ttl-report-{}-same_file_name",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);

        let mut settings = settings(Polarity::Rising, vec![1]);
        settings.save_dir = Some(dir.clone());
        for (name, num_samples) in [("a/trace.csv", 100), ("b/trace.csv", 200)] {
            let rows = process_table(name, Path::new(name), &square_table(num_samples), &settings);
            assert!(rows[0].error.is_none());
        }

        let count_lines = |path: PathBuf| fs::read_to_string(path).unwrap().lines().count();
        assert_eq!(count_lines(dir.join("a/trace_ch1_rising_onsets.csv")), 5);
        assert_eq!(count_lines(dir.join("b/trace_ch1_rising_onsets.csv")), 10);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[derive(Default)]
    struct TraceCountRecorder {
        traces_processed: Arc<AtomicU64>,
    }

    impl Recorder for TraceCountRecorder {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
            if key.name() == TRACES_PROCESSED {
                Counter::from_arc(self.traces_processed.clone())
            } else {
                Counter::noop()
            }
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    #[test]
    fn traces_are_counted_once_for_both_edges() {
        let recorder = TraceCountRecorder::default();
        let rows = metrics::with_local_recorder(&recorder, || {
            process_table(
                "trace.csv",
                Path::new("trace.csv"),
                &test_table(),
                &settings(Polarity::Both, vec![1, 2]),
            )
        });
        assert_eq!(rows.len(), 3);
        assert_eq!(recorder.traces_processed.load(Ordering::Relaxed), 1);
    }
}
