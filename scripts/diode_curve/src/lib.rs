//! Simulates the DC characteristic curve of a diode with ngspice and
//! charts its current and resistance.

use log::{debug, info};
use ngspice::Ngspice;
use subcurve::error::Result;
use subcurve::io::canonicalize;
use subcurve::library::SpiceLibrary;
use subcurve::verification::simulation::Simulator;

pub mod config;
pub mod curve;
pub mod export;
pub mod plot;
pub mod shockley;
pub mod sweep;

use config::Config;
use sweep::{diode_circuit, run_sweeps, TemperatureSweep};

/// Runs the sweeps with the given simulator and writes the configured outputs.
pub fn run_with(simulator: &dyn Simulator, config: &Config) -> Result<Vec<TemperatureSweep>> {
    config.validate()?;
    debug!("configuration: {config:?}");

    // Included files must resolve from the simulator's work directory.
    let library = SpiceLibrary::new(canonicalize(&config.library)?)?;
    let circuit = diode_circuit(&library, &config.model)?;
    let sweeps = run_sweeps(simulator, &circuit, &config.sweep_settings())?;

    if let Some(dir) = &config.csv {
        export::write_csv(dir, &sweeps)?;
    }
    plot::render_svg_file(&config.output, &sweeps, &config.plot_options())?;
    info!("done: {} sweeps charted in {:?}", sweeps.len(), config.output);

    Ok(sweeps)
}

/// Runs the sweeps with ngspice.
pub fn run(config: &Config) -> Result<Vec<TemperatureSweep>> {
    let simulator = Ngspice::new(config.simulator_opts())?;
    run_with(&simulator, config)
}
