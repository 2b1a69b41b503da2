use csv::{ReaderBuilder, StringRecord, Trim};
use std::{fs::File, io::Read, num::ParseFloatError, path::Path};
use thiserror::Error;
use ttl_timing::{Real, Sample};

#[derive(Debug, Error)]
pub(crate) enum LoaderError {
    #[error("IO Error: {0}")]
    IO(#[from] std::io::Error),
    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Delimiter {0:?} is not an ASCII character")]
    Delimiter(char),
    #[error("Line {line}: cannot parse \"{field}\" as a number: {source}")]
    Parse {
        line: usize,
        field: String,
        source: ParseFloatError,
    },
    #[error("Line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Column {column} requested, but the trace has {available} columns")]
    MissingColumn { column: usize, available: usize },
}

impl LoaderError {
    pub(crate) fn is_io_error(&self) -> bool {
        match self {
            LoaderError::IO(_) => true,
            LoaderError::Csv(e) => e.is_io_error(),
            _ => false,
        }
    }
}

/// The numeric content of a delimited trace file, one row per sample.
#[derive(Default, Debug)]
pub(crate) struct TraceTable {
    width: usize,
    rows: Vec<Vec<Real>>,
}

impl TraceTable {
    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn samples(
        &self,
        time_column: usize,
        voltage_column: usize,
    ) -> Result<Vec<Sample>, LoaderError> {
        self.rows
            .iter()
            .map(|row| {
                let time = row.get(time_column).ok_or(LoaderError::MissingColumn {
                    column: time_column,
                    available: self.width,
                })?;
                let voltage = row.get(voltage_column).ok_or(LoaderError::MissingColumn {
                    column: voltage_column,
                    available: self.width,
                })?;
                Ok(Sample::new(*time, *voltage))
            })
            .collect()
    }
}

pub(crate) fn load_trace_file(path: &Path, delimiter: char) -> Result<TraceTable, LoaderError> {
    let file = File::open(path)?;
    parse_trace(file, delimiter)
}

fn parse_record(record: &StringRecord, line: usize) -> Result<Vec<Real>, LoaderError> {
    record
        .iter()
        .map(|field| {
            field.parse::<Real>().map_err(|source| LoaderError::Parse {
                line,
                field: field.to_owned(),
                source,
            })
        })
        .collect()
}

/// Blank records are skipped, and a first record which is not numeric is
/// taken as a header.
pub(crate) fn parse_trace<R: Read>(reader: R, delimiter: char) -> Result<TraceTable, LoaderError> {
    if !delimiter.is_ascii() {
        return Err(LoaderError::Delimiter(delimiter));
    }
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut table = TraceTable::default();
    let mut first_record = true;

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line = record
            .position()
            .map_or(index + 1, |position| position.line() as usize);

        let row = match parse_record(&record, line) {
            Ok(row) => row,
            Err(LoaderError::Parse { .. }) if first_record => {
                first_record = false;
                continue;
            }
            Err(e) => return Err(e),
        };
        first_record = false;

        if table.rows.is_empty() {
            table.width = row.len();
        } else if row.len() != table.width {
            return Err(LoaderError::ColumnCount {
                line,
                expected: table.width,
                found: row.len(),
            });
        }
        table.rows.push(row);
    }
    Ok(table)
}
