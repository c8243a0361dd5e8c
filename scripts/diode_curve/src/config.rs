//! Run configuration, read from TOML and overridden from the command line.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use subcurve::error::{with_err_context, ErrorContext, ErrorSource, Result};
use subcurve::io::read_to_string;
use subcurve::verification::simulation::{DcAnalysis, SimulatorOpts};

use crate::plot::PlotOptions;
use crate::sweep::{SweepSettings, SOURCE_NAME};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory scanned for SPICE models and subcircuits.
    pub library: PathBuf,
    /// The two-port subcircuit simulated as the diode.
    pub model: String,
    /// Simulation temperatures, in degrees Celsius.
    pub temperatures: Vec<f64>,
    pub sweep: SweepConfig,
    /// The SVG file the charts are written to.
    pub output: PathBuf,
    /// Directory holding the generated netlists and simulator output.
    pub work_dir: PathBuf,
    /// If set, the sweeps are also exported as CSV files into this directory.
    pub csv: Option<PathBuf>,
    /// Overrides the ngspice executable.
    pub ngspice: Option<PathBuf>,
    pub plot: PlotConfig,
}

/// The range of the input voltage sweep, in volts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
}

/// Values given on the command line. `None` keeps the configured value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub library: Option<PathBuf>,
    pub model: Option<String>,
    pub output: Option<PathBuf>,
    pub work_dir: Option<PathBuf>,
    pub csv: Option<PathBuf>,
    pub ngspice: Option<PathBuf>,
    /// Replaces the configured temperatures when non-empty.
    pub temperatures: Vec<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library: PathBuf::from("libraries"),
            model: "1N4148".to_string(),
            temperatures: vec![0.0, 25.0, 100.0],
            sweep: SweepConfig::default(),
            output: PathBuf::from("diode_curve.svg"),
            work_dir: PathBuf::from("build/diode_curve"),
            csv: None,
            ngspice: None,
            plot: PlotConfig::default(),
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            start: -2.0,
            stop: 5.0,
            step: 0.01,
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 2000,
            height: 1000,
        }
    }
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config = toml::from_str(input)?;
        Ok(config)
    }

    /// Reads a TOML configuration file. Missing keys take their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let input = read_to_string(path)?;
        with_err_context(Self::from_toml_str(&input), || {
            ErrorContext::ReadFile(path.to_path_buf())
        })
    }

    pub fn apply(&mut self, overrides: ConfigOverrides) -> &mut Self {
        let ConfigOverrides {
            library,
            model,
            output,
            work_dir,
            csv,
            ngspice,
            temperatures,
        } = overrides;

        if let Some(library) = library {
            self.library = library;
        }
        if let Some(model) = model {
            self.model = model;
        }
        if let Some(output) = output {
            self.output = output;
        }
        if let Some(work_dir) = work_dir {
            self.work_dir = work_dir;
        }
        if csv.is_some() {
            self.csv = csv;
        }
        if ngspice.is_some() {
            self.ngspice = ngspice;
        }
        if !temperatures.is_empty() {
            self.temperatures = temperatures;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ErrorSource::InvalidArgs("model name must not be empty".into()).into());
        }
        if self.temperatures.is_empty() {
            return Err(ErrorSource::InvalidArgs("no temperatures to simulate".into()).into());
        }
        if let Some(t) = self.temperatures.iter().find(|t| !t.is_finite()) {
            return Err(ErrorSource::InvalidArgs(format!("invalid temperature {t}")).into());
        }
        if self.plot.width == 0 || self.plot.height == 0 {
            return Err(ErrorSource::InvalidArgs("plot size must be non-zero".into()).into());
        }
        self.dc_analysis().validate()
    }

    /// The DC sweep of the input source described by this configuration.
    pub fn dc_analysis(&self) -> DcAnalysis {
        DcAnalysis {
            sweep: format!("V{SOURCE_NAME}"),
            start: self.sweep.start,
            stop: self.sweep.stop,
            step: self.sweep.step,
        }
    }

    pub fn sweep_settings(&self) -> SweepSettings {
        SweepSettings {
            temperatures: self.temperatures.clone(),
            analysis: self.dc_analysis(),
            work_dir: self.work_dir.clone(),
        }
    }

    pub fn simulator_opts(&self) -> SimulatorOpts {
        let mut opts = SimulatorOpts::default();
        if let Some(exe) = &self.ngspice {
            opts.opts.insert(
                ngspice::EXECUTABLE_OPT.to_string(),
                exe.to_string_lossy().into_owned(),
            );
        }
        opts
    }

    pub fn plot_options(&self) -> PlotOptions {
        PlotOptions {
            width: self.plot.width,
            height: self.plot.height,
            model: self.model.clone(),
            ..Default::default()
        }
    }
}
