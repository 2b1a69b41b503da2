use std::{
    fs::File,
    io::{BufWriter, Error, Write},
    path::{Path, PathBuf},
};
use ttl_timing::{Edge, GapFill, Real};

pub(crate) trait SavablePoint {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), Error>;
}

impl SavablePoint for Real {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        writeln!(writer, "{self}")
    }
}

impl SavablePoint for GapFill {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        writeln!(
            writer,
            "{0},{1},{2},{3},{4},{5}",
            self.anchor,
            self.onset,
            self.gap,
            self.estimated_count,
            self.sub_period,
            self.synthesized
        )
    }
}

pub(crate) trait SaveToFileFilter<I>
where
    I: Iterator,
    I::Item: SavablePoint,
{
    fn save_to_file(self, path: &Path) -> Result<(), Error>;
}

impl<I> SaveToFileFilter<I> for I
where
    I: Iterator,
    I::Item: SavablePoint,
{
    fn save_to_file(self, path: &Path) -> Result<(), Error> {
        let mut writer = BufWriter::new(File::create(path)?);
        for item in self {
            item.write_to(&mut writer)?;
        }
        writer.flush()
    }
}

/// The path of a trace below the input root, or its bare file name if it
/// does not lie below it.
pub(crate) fn relative_trace_path<'a>(input_root: &Path, trace_path: &'a Path) -> &'a Path {
    match trace_path.strip_prefix(input_root) {
        Ok(relative) if relative.is_relative() => relative,
        _ => trace_path.file_name().map_or(Path::new(""), Path::new),
    }
}

/// `<dir>/<trace parent>/<stem>_ch<channel>_<edge>_<kind>.csv`, where
/// `trace_path` is relative to the input root.
pub(crate) fn get_save_file_name(
    save_dir: &Path,
    trace_path: &Path,
    channel: usize,
    edge: Edge,
    kind: &str,
) -> PathBuf {
    let stem = trace_path
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    save_dir
        .join(trace_path.parent().unwrap_or(Path::new("")))
        .join(format!("{stem}_ch{channel}_{edge}_{kind}.csv"))
}
