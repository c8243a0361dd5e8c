use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use diode_curve::config::{Config, ConfigOverrides};
use diode_curve::run;

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Simulate the DC characteristic curve of a diode and chart it as SVG"
)]
pub struct Args {
    /// A TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Directory scanned for SPICE models.
    #[arg(long)]
    library: Option<PathBuf>,
    /// The diode subcircuit to simulate.
    #[arg(short, long)]
    model: Option<String>,
    /// The output SVG file.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Directory for netlists and simulator output.
    #[arg(long)]
    work_dir: Option<PathBuf>,
    /// Also export each sweep as CSV into this directory.
    #[arg(long)]
    csv: Option<PathBuf>,
    /// A simulation temperature in °C. May be repeated.
    #[arg(short, long = "temperature", allow_negative_numbers = true)]
    temperatures: Vec<f64>,
    /// The ngspice executable.
    #[arg(long)]
    ngspice: Option<PathBuf>,
    /// Increase log verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            library: self.library.clone(),
            model: self.model.clone(),
            output: self.output.clone(),
            work_dir: self.work_dir.clone(),
            csv: self.csv.clone(),
            ngspice: self.ngspice.clone(),
            temperatures: self.temperatures.clone(),
        }
    }
}

fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply(args.overrides());

    run(&config).context("failed to chart the diode characteristic curve")?;
    Ok(())
}
