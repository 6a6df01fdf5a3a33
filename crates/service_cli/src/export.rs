//! Plain-text sample dumps.
//!
//! Each dump is written through a `BufWriter` owned by [`export_to_file`],
//! so the file is flushed and closed on every path out of the writer.

use mc_engine::kernels::SamplePoint;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Scale of the pixel grid used by π dumps.
pub const PI_PIXEL_SCALE: f64 = 500.0;

/// Writes π samples as integer pixel coordinates, `"<x·500> <y·500>"` per line.
pub fn write_pi_samples<W: Write>(mut out: W, samples: &[SamplePoint]) -> io::Result<()> {
    for point in samples {
        writeln!(
            out,
            "{} {}",
            (point.x * PI_PIXEL_SCALE) as i64,
            (point.y * PI_PIXEL_SCALE) as i64
        )?;
    }
    Ok(())
}

/// Writes integral samples with two decimals, `"<x> <y>"` per line.
pub fn write_integral_samples<W: Write>(mut out: W, samples: &[SamplePoint]) -> io::Result<()> {
    for point in samples {
        writeln!(out, "{:.2} {:.2}", point.x, point.y)?;
    }
    Ok(())
}

/// Writes one line per price path: its 1-based number, then every price
/// with seven decimals, separated by `", "`.
pub fn write_price_paths<W: Write>(mut out: W, paths: &[Vec<f64>]) -> io::Result<()> {
    for (index, path) in paths.iter().enumerate() {
        write!(out, "{}", index + 1)?;
        for price in path {
            write!(out, ", {:.7}", price)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Creates `dir` if needed and writes `name` inside it with `write`.
///
/// Returns the path of the written file.
pub fn export_to_file<F>(dir: &Path, name: &str, write: F) -> io::Result<PathBuf>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    let mut out = BufWriter::new(File::create(&path)?);
    write(&mut out)?;
    out.flush()?;
    tracing::info!(path = %path.display(), "export written");
    Ok(path)
}
