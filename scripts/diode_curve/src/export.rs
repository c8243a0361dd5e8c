//! CSV export of the simulated sweeps.

use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;
use subcurve::error::{with_err_context, ErrorContext, ErrorSource, Result};
use subcurve::io::create_dir_all;

use crate::curve::scale_currents;
use crate::sweep::{temperature_dir, TemperatureSweep};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct Row {
    sweep: f64,
    voltage: f64,
    current: f64,
    scaled_current: f64,
}

/// The CSV file written for the sweep at `temperature`.
pub fn csv_path(dir: impl AsRef<Path>, temperature: f64) -> PathBuf {
    dir.as_ref()
        .join(format!("diode_curve_{}.csv", temperature_dir(temperature)))
}

/// Writes one sweep as CSV, with a header row.
pub fn write_sweep<W: std::io::Write>(out: W, sweep: &TemperatureSweep) -> Result<()> {
    let curve = &sweep.curve;
    let scaled = scale_currents(&curve.voltage, &curve.current)?;

    let mut writer = csv::Writer::from_writer(out);
    for (i, scaled_current) in scaled.into_iter().enumerate() {
        writer
            .serialize(Row {
                sweep: curve.sweep[i],
                voltage: curve.voltage[i],
                current: curve.current[i],
                scaled_current,
            })
            .map_err(|e| ErrorSource::Other(Box::new(e)))?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes every sweep to its own file in `dir` and returns the paths written.
pub fn write_csv(dir: impl AsRef<Path>, sweeps: &[TemperatureSweep]) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    create_dir_all(dir)?;

    let mut paths = Vec::with_capacity(sweeps.len());
    for sweep in sweeps {
        let path = csv_path(dir, sweep.temperature);
        let file = subcurve::io::create_file(&path)?;
        with_err_context(write_sweep(file, sweep), || {
            ErrorContext::CreateFile(path.clone())
        })?;
        info!("wrote {path:?}");
        paths.push(path);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;

    use super::*;
    use crate::sweep::DiodeCurve;

    fn sweep() -> TemperatureSweep {
        TemperatureSweep {
            temperature: 25.0,
            curve: DiodeCurve {
                sweep: vec![-1.0, 1.0],
                voltage: vec![-1.0, 0.5],
                current: vec![-2e-9, 0.5],
            },
        }
    }

    #[test]
    fn test_write_sweep() {
        let mut out = Vec::new();
        write_sweep(&mut out, &sweep()).unwrap();
        let csv = String::from_utf8(out).unwrap();
        let lines = csv.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "sweep,voltage,current,scaled_current");
        assert_eq!(lines[2], "1.0,0.5,0.5,500.0");

        let row = lines[1]
            .split(',')
            .map(|f| f.parse::<f64>().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(row[..3], [-1.0, -1.0, -2e-9]);
        assert_float_eq!(row[3], -200.0, r2nd <= 1e-12);
    }

    #[test]
    fn test_write_csv() {
        let dir = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/build/test_write_csv"));
        let paths = write_csv(&dir, &[sweep()]).unwrap();
        assert_eq!(paths, vec![dir.join("diode_curve_t25.csv")]);

        let data = std::fs::read_to_string(&paths[0]).unwrap();
        assert!(data.starts_with("sweep,voltage,current,scaled_current\n"));
        assert_eq!(data.lines().count(), 3);
    }
}
