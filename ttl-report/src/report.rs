//! The summary table written at the end of a batch, one row per signal.
use std::{fmt::Display, io::Write};
use ttl_timing::{Characteristics, Edge, Real};

const NUM_COLUMNS: usize = 17;

const HEADER: [&str; NUM_COLUMNS] = [
    "file",
    "channel",
    "polarity",
    "threshold",
    "onsets",
    "start",
    "end",
    "estimated_period",
    "mean_period",
    "target",
    "hits",
    "skips",
    "extra",
    "added",
    "removed",
    "regularized",
    "error",
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RegularizationSummary {
    pub(crate) added: usize,
    pub(crate) removed: usize,
    pub(crate) regularized: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ReportRow {
    pub(crate) file: String,
    pub(crate) channel: usize,
    pub(crate) polarity: Option<Edge>,
    pub(crate) threshold: Option<Real>,
    pub(crate) onsets: Option<usize>,
    pub(crate) characteristics: Option<Characteristics>,
    pub(crate) regularization: Option<RegularizationSummary>,
    pub(crate) error: Option<String>,
}

impl ReportRow {
    pub(crate) fn new(file: &str, channel: usize) -> Self {
        Self {
            file: file.to_owned(),
            channel,
            polarity: None,
            threshold: None,
            onsets: None,
            characteristics: None,
            regularization: None,
            error: None,
        }
    }

    pub(crate) fn failed<E: Display>(file: &str, channel: usize, error: &E) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(file, channel)
        }
    }

    fn cells(&self) -> [String; NUM_COLUMNS] {
        let c = self.characteristics.as_ref();
        let r = self.regularization.as_ref();
        [
            self.file.clone(),
            self.channel.to_string(),
            cell(self.polarity),
            cell(self.threshold),
            cell(self.onsets),
            cell(c.map(|c| c.start_time)),
            cell(c.map(|c| c.end_time)),
            cell(c.map(|c| c.estimated_period)),
            cell(c.and_then(|c| c.mean_period)),
            cell(c.and_then(|c| c.target_count)),
            cell(c.map(|c| c.hit_count)),
            cell(c.and_then(|c| c.miss_count)),
            cell(c.map(|c| c.false_count)),
            cell(r.map(|r| r.added)),
            cell(r.map(|r| r.removed)),
            cell(r.map(|r| r.regularized)),
            self.error.clone().unwrap_or_default(),
        ]
    }
}

fn cell<T: Display>(value: Option<T>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

pub(crate) fn write_report<W: Write>(writer: W, rows: &[ReportRow]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(HEADER)?;
    for row in rows {
        writer.write_record(row.cells())?;
    }
    writer.flush()?;
    Ok(())
}
