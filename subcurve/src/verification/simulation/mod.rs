use std::collections::HashMap;
use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorSource, Result};

pub mod context;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimInput {
    pub work_dir: PathBuf,
    /// Written as the first line of the generated netlist.
    pub title: String,
    pub opts: SimOpts,
    pub includes: Vec<PathBuf>,
    pub libs: Vec<Lib>,
    pub analyses: Vec<Analysis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimOutput {
    /// One entry per requested analysis, in request order.
    pub data: Vec<AnalysisData>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimOpts {
    /// Simulation temperature, in degrees Celsius.
    pub temp: Option<f64>,
    /// The temperature at which model parameters were measured, in degrees Celsius.
    pub tnom: Option<f64>,
    /// Flags to pass to the simulator invocation.
    pub flags: Option<String>,
}

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Lib {
    pub path: PathBuf,
    pub section: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Analysis {
    Op(OpAnalysis),
    Dc(DcAnalysis),
}

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum AnalysisType {
    Op,
    Dc,
    Other,
}

#[derive(Debug, Default, Clone, PartialEq, Hash, Serialize, Deserialize)]
pub struct OpAnalysis {}

impl OpAnalysis {
    #[inline]
    pub fn new() -> Self {
        Self {}
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpData {
    /// All saved signals.
    pub data: HashMap<String, ScalarSignal>,
}

/// Results of a DC sweep.
///
/// Every signal, including `sweep`, has one value per sweep point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcData {
    /// The values taken by the swept source.
    pub sweep: RealSignal,
    /// All saved signals, keyed by lowercase name.
    pub data: HashMap<String, RealSignal>,
}

#[derive(Debug, Clone, Builder, PartialEq, Serialize, Deserialize)]
pub struct DcAnalysis {
    /// The name of the source to sweep, e.g. `Vinput`.
    #[builder(setter(into))]
    pub sweep: String,
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl DcAnalysis {
    #[inline]
    pub fn builder() -> DcAnalysisBuilder {
        DcAnalysisBuilder::default()
    }

    /// Checks that the sweep range is well formed.
    pub fn validate(&self) -> Result<()> {
        if self.sweep.trim().is_empty() {
            return Err(ErrorSource::InvalidArgs("DC sweep source must not be empty".into()).into());
        }
        if ![self.start, self.stop, self.step].iter().all(|x| x.is_finite()) {
            return Err(ErrorSource::InvalidArgs(format!(
                "DC sweep of {} has non-finite bounds",
                self.sweep
            ))
            .into());
        }
        if self.step <= 0.0 {
            return Err(ErrorSource::InvalidArgs(format!(
                "DC sweep step must be positive, got {}",
                self.step
            ))
            .into());
        }
        if self.stop < self.start {
            return Err(ErrorSource::InvalidArgs(format!(
                "DC sweep stop ({}) is below start ({})",
                self.stop, self.start
            ))
            .into());
        }
        Ok(())
    }

    /// The number of points the simulator produces for this sweep.
    pub fn num_points(&self) -> usize {
        ((self.stop - self.start) / self.step + 1e-6).floor() as usize + 1
    }

    /// The swept values, `start + i * step` for each point.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.num_points()).map(|i| self.start + i as f64 * self.step)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarSignal {
    pub value: f64,
    pub quantity: Quantity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealSignal {
    pub values: Vec<f64>,
    pub quantity: Quantity,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum Quantity {
    Voltage,
    Current,
    Frequency,
    Time,
    Temperature,
    Unknown,
}

impl Quantity {
    /// Maps the unit names used in SPICE output (`voltage`, `current`, ...).
    pub fn from_unit(unit: &str) -> Self {
        match unit.to_lowercase().as_str() {
            "voltage" | "v" => Self::Voltage,
            "current" | "a" => Self::Current,
            "frequency" | "hz" => Self::Frequency,
            "time" | "s" => Self::Time,
            "temp-sweep" | "temperature" => Self::Temperature,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnalysisData {
    Op(OpData),
    Dc(DcData),
    Other,
}

impl AnalysisData {
    pub fn analysis_type(&self) -> AnalysisType {
        match self {
            Self::Op(_) => AnalysisType::Op,
            Self::Dc(_) => AnalysisType::Dc,
            Self::Other => AnalysisType::Other,
        }
    }

    /// Get the results of an operating point analysis.
    pub fn op(&self) -> Result<&OpData> {
        match self {
            Self::Op(x) => Ok(x),
            _ => Err(ErrorSource::Internal(format!(
                "expected op analysis, got {:?}",
                self.analysis_type()
            ))
            .into()),
        }
    }

    /// Get the results of a DC analysis.
    pub fn dc(&self) -> Result<&DcData> {
        match self {
            Self::Dc(x) => Ok(x),
            _ => Err(ErrorSource::Internal(format!(
                "expected dc analysis, got {:?}",
                self.analysis_type()
            ))
            .into()),
        }
    }

    pub fn into_dc(self) -> Result<DcData> {
        match self {
            Self::Dc(x) => Ok(x),
            other => Err(ErrorSource::Internal(format!(
                "expected dc analysis, got {:?}",
                other.analysis_type()
            ))
            .into()),
        }
    }
}

impl From<OpData> for AnalysisData {
    fn from(value: OpData) -> Self {
        Self::Op(value)
    }
}

impl From<DcData> for AnalysisData {
    fn from(value: DcData) -> Self {
        Self::Dc(value)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorOpts {
    pub opts: HashMap<String, String>,
}

pub trait Simulator {
    fn new(opts: SimulatorOpts) -> Result<Self>
    where
        Self: Sized;
    fn simulate(&self, input: SimInput) -> Result<SimOutput>;
    /// The name under which the voltage of `node` is saved.
    fn node_voltage_string(&self, node: &str) -> String;
    /// The name under which the current through voltage source `source` is saved.
    fn branch_current_string(&self, source: &str) -> String;
}

impl SimInput {
    /// Checks every requested analysis.
    pub fn validate(&self) -> Result<()> {
        if self.analyses.is_empty() {
            return Err(ErrorSource::InvalidArgs("no analyses requested".into()).into());
        }
        for analysis in self.analyses.iter() {
            analysis.validate()?;
        }
        Ok(())
    }
}

impl Analysis {
    pub fn analysis_type(&self) -> AnalysisType {
        match self {
            Analysis::Op(_) => AnalysisType::Op,
            Analysis::Dc(_) => AnalysisType::Dc,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Analysis::Op(_) => Ok(()),
            Analysis::Dc(dc) => dc.validate(),
        }
    }
}

impl From<OpAnalysis> for Analysis {
    fn from(value: OpAnalysis) -> Self {
        Self::Op(value)
    }
}

impl From<DcAnalysis> for Analysis {
    fn from(value: DcAnalysis) -> Self {
        Self::Dc(value)
    }
}

impl RealSignal {
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl DcData {
    /// Looks up a signal by name.
    ///
    /// Matching ignores case. Branch currents may be named either `i(vsrc)`
    /// or `vsrc#branch`, and node voltages either `v(node)` or `node`.
    pub fn signal(&self, name: &str) -> Option<&RealSignal> {
        let name = name.trim().to_lowercase();
        if let Some(sig) = self.data.get(&name) {
            return Some(sig);
        }
        signal_aliases(&name)
            .into_iter()
            .find_map(|alias| self.data.get(&alias))
    }

    /// Like [`DcData::signal`], but fails with [`ErrorSource::SignalNotFound`].
    pub fn try_signal(&self, name: &str) -> Result<&RealSignal> {
        self.signal(name)
            .ok_or_else(|| ErrorSource::SignalNotFound(name.to_string()).into())
    }

    /// The number of sweep points.
    #[inline]
    pub fn len(&self) -> usize {
        self.sweep.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sweep.is_empty()
    }
}

fn unwrap_call<'a>(name: &'a str, func: &str) -> Option<&'a str> {
    name.strip_prefix(func)?
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn signal_aliases(name: &str) -> Vec<String> {
    if let Some(src) = unwrap_call(name, "i") {
        vec![format!("{src}#branch")]
    } else if let Some(src) = name.strip_suffix("#branch") {
        vec![format!("i({src})")]
    } else if let Some(node) = unwrap_call(name, "v") {
        vec![node.to_string()]
    } else {
        vec![format!("v({name})")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(values: &[f64], quantity: Quantity) -> RealSignal {
        RealSignal {
            values: values.to_vec(),
            quantity,
        }
    }

    fn dc_data() -> DcData {
        let sweep = signal(&[0.0, 1.0, 2.0], Quantity::Voltage);
        let data = HashMap::from([
            ("v(v-sweep)".to_string(), sweep.clone()),
            ("v(out)".to_string(), signal(&[0.0, 0.6, 0.7], Quantity::Voltage)),
            (
                "vinput#branch".to_string(),
                signal(&[0.0, -0.4, -1.3], Quantity::Current),
            ),
        ]);
        DcData { sweep, data }
    }

    #[test]
    fn test_dc_builder() {
        let dc = DcAnalysis::builder()
            .sweep("Vinput")
            .start(-2.0)
            .stop(5.0)
            .step(0.01)
            .build()
            .unwrap();
        assert_eq!(dc.sweep, "Vinput");
        dc.validate().unwrap();
        assert_eq!(dc.num_points(), 701);
        assert_eq!(dc.values().count(), 701);

        assert!(DcAnalysis::builder().sweep("Vinput").build().is_err());
    }

    #[test]
    fn test_dc_validation() {
        let dc = |start, stop, step| DcAnalysis {
            sweep: "Vinput".to_string(),
            start,
            stop,
            step,
        };
        for bad in [
            dc(0.0, 1.0, 0.0),
            dc(0.0, 1.0, -0.1),
            dc(1.0, 0.0, 0.1),
            dc(0.0, f64::NAN, 0.1),
        ] {
            let err = bad.validate().unwrap_err();
            assert!(matches!(err.source(), ErrorSource::InvalidArgs(_)));
        }
        dc(1.0, 1.0, 0.1).validate().unwrap();
        assert_eq!(dc(1.0, 1.0, 0.1).num_points(), 1);
    }

    #[test]
    fn test_signal_aliases() {
        let data = dc_data();
        assert_eq!(data.len(), 3);
        assert_eq!(data.signal("V(OUT)"), data.signal("out"));
        assert!(data.signal("out").is_some());
        assert_eq!(data.signal("i(Vinput)").unwrap().values[2], -1.3);
        assert_eq!(data.signal("vinput#branch"), data.signal("i(vinput)"));
        assert!(data.signal("in").is_none());

        let err = data.try_signal("i(vfoo)").unwrap_err();
        assert!(matches!(err.source(), ErrorSource::SignalNotFound(name) if name == "i(vfoo)"));
    }

    #[test]
    fn test_input_validation() {
        let mut input = SimInput::default();
        assert!(input.validate().is_err());
        input.analyses.push(OpAnalysis::new().into());
        input.validate().unwrap();
        input.analyses.push(
            DcAnalysis {
                sweep: "Vinput".to_string(),
                start: 1.0,
                stop: 0.0,
                step: 0.1,
            }
            .into(),
        );
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_analysis_data_accessors() {
        let data = AnalysisData::from(dc_data());
        assert_eq!(data.analysis_type(), AnalysisType::Dc);
        assert!(data.dc().is_ok());
        assert!(data.op().is_err());
        assert!(AnalysisData::Other.into_dc().is_err());
        assert_eq!(Quantity::from_unit("Current"), Quantity::Current);
        assert_eq!(Quantity::from_unit("widgets"), Quantity::Unknown);
    }
}
