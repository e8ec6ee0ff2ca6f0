mod plot;

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{DriftError, Result};
use crate::frame::ShiftVector;

pub use plot::{plot_shifts, render_shift_plot};

/// File names written by [`ShiftTableReporter`].
pub const SHIFTS_TABLE: &str = "shifts.txt";
pub const CUMULATIVE_TABLE: &str = "shifts_cumul.txt";
pub const SHIFTS_PLOT: &str = "shifts.png";
pub const CUMULATIVE_PLOT: &str = "shifts_cumul.png";

/// Consumer of the drift history produced by an alignment run.
pub trait Reporter {
    fn report(&mut self, shifts: &[ShiftVector], cumulative: &[ShiftVector]) -> Result<()>;
}

/// Writes the per-frame and cumulative shifts as text tables into a
/// directory, optionally with a trajectory plot of each.
///
/// Each table row is `dx dy` in scientific notation, one row per frame.
#[derive(Clone, Debug)]
pub struct ShiftTableReporter {
    dir: PathBuf,
    plot: bool,
}

impl ShiftTableReporter {
    pub fn new(dir: &Path, plot: bool) -> Self {
        Self {
            dir: dir.to_path_buf(),
            plot,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Reporter for ShiftTableReporter {
    fn report(&mut self, shifts: &[ShiftVector], cumulative: &[ShiftVector]) -> Result<()> {
        if shifts.len() != cumulative.len() {
            return Err(DriftError::Report(format!(
                "{} shifts but {} cumulative shifts",
                shifts.len(),
                cumulative.len()
            )));
        }
        fs::create_dir_all(&self.dir)?;

        write_shift_table(shifts, &self.dir.join(SHIFTS_TABLE))?;
        write_shift_table(cumulative, &self.dir.join(CUMULATIVE_TABLE))?;
        if self.plot {
            plot_shifts(shifts, &self.dir.join(SHIFTS_PLOT))?;
            plot_shifts(cumulative, &self.dir.join(CUMULATIVE_PLOT))?;
        }

        info!(
            dir = %self.dir.display(),
            frames = shifts.len(),
            plot = self.plot,
            "Shift report written"
        );
        Ok(())
    }
}

/// Write one `dx dy` row per shift.
pub fn write_shift_table(shifts: &[ShiftVector], path: &Path) -> Result<()> {
    let mut out = BufWriter::new(fs::File::create(path)?);
    for shift in shifts {
        writeln!(out, "{} {}", format_sci(shift.dx), format_sci(shift.dy))?;
    }
    out.flush()?;
    Ok(())
}

/// `1.5` -> `1.500000000000000000e+00`
fn format_sci(value: f64) -> String {
    let raw = format!("{value:.18e}");
    match raw.split_once('e') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.abs())
            }
            Err(_) => raw,
        },
        // NaN and infinities
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sci() {
        assert_eq!(format_sci(0.0), "0.000000000000000000e+00");
        assert_eq!(format_sci(1.5), "1.500000000000000000e+00");
        assert_eq!(format_sci(-250.0), "-2.500000000000000000e+02");
        assert_eq!(format_sci(0.03125), "3.125000000000000000e-02");
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut reporter = ShiftTableReporter::new(dir.path(), false);
        let result = reporter.report(&[ShiftVector::ZERO], &[]);
        assert!(matches!(result, Err(DriftError::Report(_))));
    }
}
