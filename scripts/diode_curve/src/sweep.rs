//! Netlist assembly and the per-temperature DC sweeps.

use std::path::PathBuf;

use log::{debug, info};
use subcurve::deps::arcstr::ArcStr;
use subcurve::error::{with_err_context, ErrorContext, ErrorSource, Result};
use subcurve::io::{canonicalize, create_dir_all};
use subcurve::library::SpiceLibrary;
use subcurve::schematic::circuit::Circuit;
use subcurve::schematic::elements::SchematicElement;
use subcurve::schematic::netlist::impls::spice::SpiceNetlister;
use subcurve::units::{SiPrefix, SiValue};
use subcurve::verification::simulation::context::PreSimCtx;
use subcurve::verification::simulation::{DcAnalysis, DcData, Simulator};

pub const TITLE: &str = "Diode Characteristic Curve";

/// The swept source, netlisted as `Vinput`.
pub const SOURCE_NAME: &str = "input";
pub const INPUT_NODE: &str = "in";
pub const OUTPUT_NODE: &str = "out";
pub const CIRCUIT_FILE: &str = "circuit.spice";

/// Builds the test circuit: a 10 V source driving `model` through a 1 Ω resistor.
///
/// `model` must name a two-port subcircuit in `library`.
pub fn diode_circuit(library: &SpiceLibrary, model: &str) -> Result<Circuit> {
    let mut circuit = Circuit::new(TITLE);
    let entry = circuit.include_model(library, model)?;
    match entry.ports() {
        Some(ports) if ports.len() == 2 => {}
        Some(ports) => {
            return Err(ErrorSource::InvalidArgs(format!(
                "subcircuit {} has {} ports, expected 2",
                entry.name,
                ports.len()
            ))
            .into())
        }
        None => {
            return Err(ErrorSource::InvalidArgs(format!(
                "{} is a .model card, expected a two-port subcircuit",
                entry.name
            ))
            .into())
        }
    }
    let name = entry.name.clone();

    circuit
        .vdc(
            SOURCE_NAME,
            INPUT_NODE,
            Circuit::GROUND,
            SiValue::new(10, SiPrefix::None),
        )?
        .resistor("1", INPUT_NODE, OUTPUT_NODE, SiValue::new(1, SiPrefix::None))?
        .instance("D1", name, [OUTPUT_NODE, Circuit::GROUND])?;
    Ok(circuit)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepSettings {
    /// Simulation temperatures, in degrees Celsius.
    pub temperatures: Vec<f64>,
    /// The DC sweep run at every temperature.
    pub analysis: DcAnalysis,
    /// Each temperature runs in its own subdirectory of this directory.
    pub work_dir: PathBuf,
}

/// The arrays of one sweep used downstream, indexed by sweep point.
#[derive(Debug, Clone, PartialEq)]
pub struct DiodeCurve {
    /// Input source voltage.
    pub sweep: Vec<f64>,
    /// Voltage across the diode.
    pub voltage: Vec<f64>,
    /// Current through the diode.
    pub current: Vec<f64>,
}

impl DiodeCurve {
    /// Extracts the diode voltage and current from a DC sweep.
    ///
    /// The current is the negated branch current of the source, since SPICE
    /// reports source currents flowing into the positive terminal.
    pub fn from_dc(data: &DcData, voltage: &str, source_current: &str) -> Result<Self> {
        let sweep = data.sweep.values.clone();
        let voltage = data.try_signal(voltage)?.values.clone();
        let current = data
            .try_signal(source_current)?
            .values
            .iter()
            .map(|i| -i)
            .collect::<Vec<_>>();

        if voltage.len() != sweep.len() || current.len() != sweep.len() {
            return Err(ErrorSource::SimOutputParsing(format!(
                "signal lengths differ: sweep {}, voltage {}, current {}",
                sweep.len(),
                voltage.len(),
                current.len()
            ))
            .into());
        }
        if sweep.is_empty() {
            return Err(ErrorSource::SimOutputParsing("empty DC sweep".into()).into());
        }

        Ok(Self {
            sweep,
            voltage,
            current,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sweep.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sweep.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureSweep {
    pub temperature: f64,
    pub curve: DiodeCurve,
}

/// The subdirectory used for the sweep at `temperature`.
pub fn temperature_dir(temperature: f64) -> String {
    format!("t{temperature}")
}

/// Runs one DC sweep per temperature, in order.
///
/// Both the simulation and the nominal temperature are set to the sweep
/// temperature.
pub fn run_sweeps(
    simulator: &dyn Simulator,
    circuit: &Circuit,
    settings: &SweepSettings,
) -> Result<Vec<TemperatureSweep>> {
    let analysis = &settings.analysis;
    analysis.validate()?;
    if circuit.element(&analysis.sweep).is_none() {
        return Err(ErrorSource::InvalidArgs(format!(
            "circuit has no source {}",
            analysis.sweep
        ))
        .into());
    }

    let mut sweeps = Vec::with_capacity(settings.temperatures.len());
    for &temperature in settings.temperatures.iter() {
        let task = ArcStr::from(format!("simulating at {temperature} °C"));
        let curve = with_err_context(
            run_sweep(simulator, circuit, settings, temperature),
            || ErrorContext::Task(task.clone()),
        )?;
        info!(
            "simulated {} points at {temperature} °C",
            curve.len()
        );
        sweeps.push(TemperatureSweep { temperature, curve });
    }
    Ok(sweeps)
}

fn run_sweep(
    simulator: &dyn Simulator,
    circuit: &Circuit,
    settings: &SweepSettings,
    temperature: f64,
) -> Result<DiodeCurve> {
    let analysis = &settings.analysis;
    let work_dir = settings.work_dir.join(temperature_dir(temperature));
    create_dir_all(&work_dir)?;

    let circuit_path = work_dir.join(CIRCUIT_FILE);
    circuit.write_netlist_to_file(&SpiceNetlister::new(), &circuit_path)?;
    // The simulator runs inside the work directory.
    let circuit_path = canonicalize(&circuit_path)?;
    debug!("wrote {circuit_path:?}");

    let mut ctx = PreSimCtx::new(work_dir);
    ctx.set_title(circuit.title().as_str())
        .include(circuit_path)
        .set_temp(temperature)
        .set_tnom(temperature)
        .add_analysis(analysis.clone());

    let output = simulator.simulate(ctx.into_inner())?;
    let data = output
        .data
        .into_iter()
        .next()
        .ok_or_else(|| ErrorSource::SimOutputParsing("simulator returned no analyses".into()))?
        .into_dc()?;

    DiodeCurve::from_dc(
        &data,
        &simulator.node_voltage_string(OUTPUT_NODE),
        &simulator.branch_current_string(&analysis.sweep),
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use subcurve::verification::simulation::{Quantity, RealSignal};

    use super::*;

    const LIBRARIES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../libraries");

    fn signal(values: &[f64]) -> RealSignal {
        RealSignal {
            values: values.to_vec(),
            quantity: Quantity::Unknown,
        }
    }

    #[test]
    fn test_diode_circuit() {
        let library = SpiceLibrary::new(LIBRARIES_PATH).unwrap();
        let circuit = diode_circuit(&library, "1n4148").unwrap();

        assert_eq!(circuit.title().as_str(), TITLE);
        assert_eq!(circuit.includes().len(), 1);
        assert!(circuit.includes()[0].ends_with("1N4148.lib"));

        let names = circuit
            .elements()
            .iter()
            .map(|e| e.name().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, ["Vinput", "R1", "XD1"]);
        let diode = circuit.element("XD1").unwrap();
        assert_eq!(
            diode.nodes().iter().map(|n| n.as_str()).collect::<Vec<_>>(),
            [OUTPUT_NODE, Circuit::GROUND]
        );
    }

    #[test]
    fn test_model_card_is_rejected() {
        let library = SpiceLibrary::new(LIBRARIES_PATH).unwrap();
        let err = diode_circuit(&library, "1N4001").unwrap_err();
        assert!(matches!(err.source(), ErrorSource::InvalidArgs(_)));

        let err = diode_circuit(&library, "1N0000").unwrap_err();
        assert!(matches!(err.source(), ErrorSource::ModelNotFound(_)));
    }

    #[test]
    fn test_diode_curve_from_dc() {
        let data = DcData {
            sweep: signal(&[-1.0, 0.0, 1.0]),
            data: HashMap::from([
                ("v(out)".to_string(), signal(&[-1.0, 0.0, 0.7])),
                ("i(vinput)".to_string(), signal(&[1e-9, 0.0, -0.3])),
            ]),
        };
        let curve = DiodeCurve::from_dc(&data, "v(out)", "i(Vinput)").unwrap();
        assert_eq!(curve.len(), 3);
        assert_eq!(curve.voltage, vec![-1.0, 0.0, 0.7]);
        assert_eq!(curve.current, vec![-1e-9, -0.0, 0.3]);

        let err = DiodeCurve::from_dc(&data, "v(in)", "i(vinput)").unwrap_err();
        assert!(matches!(err.source(), ErrorSource::SignalNotFound(_)));
    }

    #[test]
    fn test_mismatched_lengths() {
        let data = DcData {
            sweep: signal(&[-1.0, 0.0, 1.0]),
            data: HashMap::from([
                ("v(out)".to_string(), signal(&[-1.0, 0.0])),
                ("i(vinput)".to_string(), signal(&[1e-9, 0.0, -0.3])),
            ]),
        };
        let err = DiodeCurve::from_dc(&data, "v(out)", "i(vinput)").unwrap_err();
        assert!(matches!(err.source(), ErrorSource::SimOutputParsing(_)));
    }

    #[test]
    fn test_temperature_dir() {
        assert_eq!(temperature_dir(25.0), "t25");
        assert_eq!(temperature_dir(-40.0), "t-40");
        assert_eq!(temperature_dir(0.5), "t0.5");
    }
}
