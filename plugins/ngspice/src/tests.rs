use std::path::{Path, PathBuf};

use float_eq::assert_float_eq;
use subcurve::error::ErrorSource;
use subcurve::library::SpiceLibrary;
use subcurve::schematic::circuit::Circuit;
use subcurve::schematic::netlist::impls::spice::SpiceNetlister;
use subcurve::units::{SiPrefix, SiValue};
use subcurve::verification::simulation::context::PreSimCtx;
use subcurve::verification::simulation::{
    Analysis, AnalysisType, DcAnalysis, OpAnalysis, SimInput, Simulator, SimulatorOpts,
};

use crate::templates::{render_netlist_string, NetlistCtx};
use crate::{analysis_line, arrange_rawfile, get_directives, stderr_tail, Ngspice, EXECUTABLE_OPT};

pub(crate) const TEST_BUILD_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/build");
pub(crate) const LIBRARIES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../libraries");

const DIODE_RAWFILE: &str = "Title: * diode characteristic curve
Date: Sun Oct 18 10:12:44  2026
Plotname: DC transfer characteristic
Flags: real
No. Variables: 3
No. Points: 3
Variables:
\t0\tv(v-sweep)\tvoltage
\t1\tv(out)\tvoltage
\t2\ti(vinput)\tcurrent
Values:
 0\t-1.000000000000000e+00
\t-9.999999000000000e-01
\t1.000000000000000e-09
 1\t0.000000000000000e+00
\t0.000000000000000e+00
\t0.000000000000000e+00
 2\t1.000000000000000e+00
\t6.500000000000000e-01
\t-3.500000000000000e-01
";

fn diode_sweep() -> DcAnalysis {
    DcAnalysis::builder()
        .sweep("Vinput")
        .start(-2.0)
        .stop(5.0)
        .step(0.01)
        .build()
        .unwrap()
}

#[test]
fn test_analysis_lines() {
    assert_eq!(
        analysis_line(&Analysis::Dc(diode_sweep())),
        ".dc Vinput -2 5 0.01"
    );
    assert_eq!(analysis_line(&Analysis::Op(OpAnalysis::new())), ".op");
}

#[test]
fn test_directives() {
    let mut ctx = PreSimCtx::new("unused");
    ctx.set_temp(100.0).set_tnom(100.0);
    assert_eq!(
        get_directives(ctx.inner()),
        vec![".temp 100".to_string(), ".options tnom=100".to_string()]
    );
    assert!(get_directives(&SimInput::default()).is_empty());
}

#[test]
fn test_render_netlist() {
    let includes = vec![PathBuf::from("/work/circuit.spice")];
    let directives = vec![".temp 25".to_string(), ".options tnom=25".to_string()];
    let analyses = vec![".dc Vinput -2 5 0.01".to_string()];
    let netlist = render_netlist_string(&NetlistCtx {
        title: "Diode Characteristic Curve",
        libs: &[],
        includes: &includes,
        analyses: &analyses,
        directives: &directives,
    })
    .unwrap();

    let lines = netlist
        .lines()
        .filter(|l| !l.trim().is_empty())
        .collect::<Vec<_>>();
    assert_eq!(
        lines,
        [
            "* Diode Characteristic Curve",
            ".include \"/work/circuit.spice\"",
            ".temp 25",
            ".options tnom=25",
            ".dc Vinput -2 5 0.01",
            ".end",
        ]
    );
}

#[test]
fn test_arrange_dc_rawfile() {
    let mut ctx = PreSimCtx::new("unused");
    ctx.add_analysis(diode_sweep());
    let raw = spice_rawfile::parse(DIODE_RAWFILE.as_bytes()).unwrap();

    let out = arrange_rawfile(ctx.inner(), raw).unwrap();
    assert_eq!(out.len(), 1);
    let dc = out[0].dc().unwrap();
    assert_eq!(dc.len(), 3);
    assert_eq!(dc.sweep.values, vec![-1.0, 0.0, 1.0]);
    assert_float_eq!(dc.signal("out").unwrap().values[2], 0.65, abs <= 1e-15);
    assert_float_eq!(
        dc.signal("vinput#branch").unwrap().values[2],
        -0.35,
        abs <= 1e-15
    );
}

#[test]
fn test_missing_analysis_output() {
    let mut ctx = PreSimCtx::new("unused");
    ctx.add_analysis(OpAnalysis::new()).add_analysis(diode_sweep());
    let raw = spice_rawfile::parse(DIODE_RAWFILE.as_bytes()).unwrap();

    let err = arrange_rawfile(ctx.inner(), raw).unwrap_err();
    assert!(matches!(err.source(), ErrorSource::SimOutputParsing(_)));
}

#[test]
fn test_executable_option() {
    let default = Ngspice::new(SimulatorOpts::default()).unwrap();
    assert_eq!(default.executable(), Path::new("ngspice"));

    let mut opts = SimulatorOpts::default();
    opts.opts
        .insert(EXECUTABLE_OPT.to_string(), "/opt/ngspice/bin/ngspice".to_string());
    let custom = Ngspice::new(opts).unwrap();
    assert_eq!(custom.executable(), Path::new("/opt/ngspice/bin/ngspice"));
    assert_eq!(custom.node_voltage_string("out"), "v(out)");
    assert_eq!(custom.branch_current_string("Vinput"), "i(Vinput)");
}

#[test]
fn test_missing_executable() {
    let simulator = Ngspice::with_executable("/nonexistent/ngspice");
    let mut ctx = PreSimCtx::new(PathBuf::from(TEST_BUILD_PATH).join("missing_executable"));
    ctx.add_analysis(OpAnalysis::new());

    let err = simulator.simulate(ctx.into_inner()).unwrap_err();
    assert!(matches!(err.source(), ErrorSource::SimulatorFailed(_)));
}

#[test]
fn test_invalid_sweep_is_rejected() {
    let simulator = Ngspice::with_executable("/nonexistent/ngspice");
    let mut ctx = PreSimCtx::new(PathBuf::from(TEST_BUILD_PATH).join("invalid_sweep"));
    ctx.add_analysis(DcAnalysis {
        sweep: "Vinput".to_string(),
        start: 5.0,
        stop: -2.0,
        step: 0.01,
    });

    let err = simulator.simulate(ctx.into_inner()).unwrap_err();
    assert!(matches!(err.source(), ErrorSource::InvalidArgs(_)));
}

#[test]
fn test_stderr_tail() {
    let stderr = (0..30).map(|i| format!("line {i}\n")).collect::<String>();
    let tail = stderr_tail(stderr.as_bytes());
    assert!(tail.starts_with("line 10"));
    assert!(tail.ends_with("line 29"));
}

#[test]
#[ignore = "requires ngspice"]
fn diode_dc_sweep() {
    let work_dir = PathBuf::from(TEST_BUILD_PATH).join("diode_dc_sweep");
    let library = SpiceLibrary::new(LIBRARIES_PATH).unwrap();

    let mut ckt = Circuit::new("Diode Characteristic Curve");
    ckt.include_model(&library, "1N4148").unwrap();
    ckt.vdc("input", "in", Circuit::GROUND, SiValue::new(10, SiPrefix::None))
        .unwrap()
        .resistor("1", "in", "out", SiValue::new(1, SiPrefix::None))
        .unwrap()
        .instance("D1", "1N4148", ["out", Circuit::GROUND])
        .unwrap();
    std::fs::create_dir_all(&work_dir).unwrap();
    let circuit_path = work_dir.join("circuit.spice");
    ckt.write_netlist_to_file(&SpiceNetlister::new(), &circuit_path)
        .unwrap();

    let mut ctx = PreSimCtx::new(&work_dir);
    ctx.set_title("Diode Characteristic Curve")
        .include(&circuit_path)
        .set_temp(25.0)
        .set_tnom(25.0)
        .add_analysis(diode_sweep());

    let simulator = Ngspice::default();
    let out = simulator.simulate(ctx.into_inner()).unwrap();
    assert_eq!(out.data.len(), 1);
    assert_eq!(out.data[0].analysis_type(), AnalysisType::Dc);

    let dc = out.data[0].dc().unwrap();
    assert_eq!(dc.len(), 701);
    let current = dc
        .signal(&simulator.branch_current_string("Vinput"))
        .unwrap();
    // The diode conducts at the top of the sweep.
    assert!(-current.values[700] > 1.0);
}
