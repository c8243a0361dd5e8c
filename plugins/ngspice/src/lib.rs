//! Runs [ngspice](https://ngspice.sourceforge.io/) in batch mode.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info, warn};
use spice_rawfile::{Analysis as RawAnalysis, Rawfile};
use subcurve::error::{with_err_context, ErrorContext, ErrorSource};
pub(crate) use subcurve::error::Result;
use subcurve::io::{create_dir_all, create_file, read};
use subcurve::verification::simulation::{
    Analysis, AnalysisData, AnalysisType, DcData, OpData, Quantity, RealSignal, ScalarSignal,
    SimInput, SimOutput, Simulator, SimulatorOpts,
};
use templates::{render_netlist, NetlistCtx};

pub(crate) mod templates;
#[cfg(test)]
mod tests;

/// The [`SimulatorOpts`] key that overrides the ngspice executable.
pub const EXECUTABLE_OPT: &str = "executable";

pub const RAWFILE_NAME: &str = "rawspice.raw";
pub const LOG_NAME: &str = "ngspice.log";

/// Lines of simulator stderr kept in error messages.
const STDERR_TAIL_LINES: usize = 20;

pub struct Ngspice {
    executable: PathBuf,
}

impl Ngspice {
    pub fn with_executable(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    #[inline]
    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl Default for Ngspice {
    fn default() -> Self {
        Self::with_executable("ngspice")
    }
}

impl Simulator for Ngspice {
    fn new(opts: SimulatorOpts) -> Result<Self>
    where
        Self: Sized,
    {
        Ok(match opts.opts.get(EXECUTABLE_OPT) {
            Some(exe) if !exe.trim().is_empty() => Self::with_executable(exe),
            _ => Self::default(),
        })
    }

    fn simulate(&self, input: SimInput) -> Result<SimOutput> {
        input.validate()?;
        create_dir_all(&input.work_dir)?;

        let analyses = get_analyses(&input.analyses);
        let directives = get_directives(&input);
        let ctx = NetlistCtx {
            title: title(&input),
            libs: &input.libs,
            includes: &input.includes,
            directives: &directives,
            analyses: &analyses,
        };
        let path = render_netlist(&ctx, &input.work_dir)?;
        let rawpath = input.work_dir.join(RAWFILE_NAME);

        let mut cmd = Command::new(&self.executable);
        cmd.arg("-n").arg("-b").arg("-r").arg(RAWFILE_NAME);
        if let Some(flags) = &input.opts.flags {
            cmd.args(flags.split_whitespace());
        }
        cmd.arg(NETLIST_FILE_ARG).current_dir(&input.work_dir);

        info!("running {:?} on {:?}", self.executable, path);
        let output = cmd.output().map_err(|e| {
            ErrorSource::SimulatorFailed(format!(
                "failed to launch {:?}: {e}",
                self.executable
            ))
        })?;
        write_log(&input.work_dir, &output.stdout, &output.stderr)?;

        if !output.status.success() {
            return Err(ErrorSource::SimulatorFailed(format!(
                "{:?} exited with {}:\n{}",
                self.executable,
                output.status,
                stderr_tail(&output.stderr)
            ))
            .into());
        }

        let out = read_rawfile(&input, &rawpath)?;
        debug!("read {} analyses from {:?}", out.data.len(), rawpath);

        Ok(out)
    }

    fn node_voltage_string(&self, node: &str) -> String {
        format!("v({node})")
    }

    fn branch_current_string(&self, source: &str) -> String {
        format!("i({source})")
    }
}

const NETLIST_FILE_ARG: &str = templates::NETLIST_TEMPLATE;

fn title(input: &SimInput) -> &str {
    if input.title.trim().is_empty() {
        "subcurve simulation"
    } else {
        input.title.trim()
    }
}

fn get_analyses(input: &[Analysis]) -> Vec<String> {
    input.iter().map(analysis_line).collect()
}

fn get_directives(input: &SimInput) -> Vec<String> {
    let mut directives = Vec::new();
    if let Some(t) = input.opts.temp {
        directives.push(format!(".temp {t}"));
    }
    if let Some(t) = input.opts.tnom {
        directives.push(format!(".options tnom={t}"));
    }
    directives
}

fn analysis_line(input: &Analysis) -> String {
    match input {
        Analysis::Op(_) => String::from(".op"),
        Analysis::Dc(a) => format!(".dc {} {} {} {}", a.sweep, a.start, a.stop, a.step),
    }
}

fn write_log(work_dir: &Path, stdout: &[u8], stderr: &[u8]) -> Result<()> {
    use std::io::Write;

    let path = work_dir.join(LOG_NAME);
    let mut file = create_file(&path)?;
    with_err_context(
        file.write_all(stdout).and_then(|_| file.write_all(stderr)),
        || ErrorContext::CreateFile(path.clone()),
    )
}

fn stderr_tail(stderr: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let lines = stderr.lines().collect::<Vec<_>>();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

fn read_rawfile(input: &SimInput, path: impl AsRef<Path>) -> Result<SimOutput> {
    let data = read(path)?;
    let raw = spice_rawfile::parse(&data)
        .map_err(|e| ErrorSource::SimOutputParsing(e.to_string()))?;

    let out = arrange_rawfile(input, raw)?;

    Ok(SimOutput { data: out })
}

/// Matches each plot in the rawfile to the first requested analysis
/// of the same type that has not been matched yet.
fn arrange_rawfile(input: &SimInput, raw: Rawfile) -> Result<Vec<AnalysisData>> {
    let mut out = vec![AnalysisData::Other; input.analyses.len()];
    for an in raw.analyses {
        let t = atype(&an);
        let slot = input
            .analyses
            .iter()
            .enumerate()
            .find(|(idx, a)| {
                a.analysis_type() == t && out[*idx].analysis_type() == AnalysisType::Other
            })
            .map(|(idx, _)| idx);
        match slot {
            Some(idx) => out[idx] = parse_analysis(t, an)?,
            None => warn!("ignoring unrequested plot {:?}", an.plotname),
        }
    }

    if let Some(idx) = out
        .iter()
        .position(|d| d.analysis_type() == AnalysisType::Other)
    {
        return Err(ErrorSource::SimOutputParsing(format!(
            "no output for analysis {idx} ({:?})",
            input.analyses[idx].analysis_type()
        ))
        .into());
    }
    Ok(out)
}

fn atype(raw: &RawAnalysis) -> AnalysisType {
    let name = raw.plotname.to_lowercase();
    if name.contains("operating") {
        AnalysisType::Op
    } else if name.contains("dc transfer") {
        AnalysisType::Dc
    } else {
        AnalysisType::Other
    }
}

fn parse_analysis(t: AnalysisType, output: RawAnalysis) -> Result<AnalysisData> {
    Ok(match t {
        AnalysisType::Op => AnalysisData::Op(parse_op(output)?),
        AnalysisType::Dc => AnalysisData::Dc(parse_dc(output)?),
        AnalysisType::Other => AnalysisData::Other,
    })
}

fn real_data(output: &RawAnalysis) -> Result<Vec<Vec<f64>>> {
    output.data.clone().into_real().ok_or_else(|| {
        ErrorSource::SimOutputParsing(format!(
            "expected real data in plot {:?}",
            output.plotname
        ))
        .into()
    })
}

fn parse_dc(output: RawAnalysis) -> Result<DcData> {
    let data = real_data(&output)?;
    let mut map = HashMap::with_capacity(output.variables.len());
    let mut sweep = None;
    for (sig, var) in data.into_iter().zip(output.variables.iter()) {
        let sig = RealSignal {
            values: sig,
            quantity: Quantity::from_unit(var.unit.trim()),
        };
        // ngspice writes the swept quantity first.
        if sweep.is_none() {
            sweep = Some(sig.clone());
        }
        map.insert(var.name.trim().to_lowercase(), sig);
    }

    let sweep = sweep.ok_or_else(|| {
        ErrorSource::SimOutputParsing(format!("plot {:?} has no variables", output.plotname))
    })?;
    Ok(DcData { sweep, data: map })
}

fn parse_op(output: RawAnalysis) -> Result<OpData> {
    let data = real_data(&output)?;
    let mut map = HashMap::with_capacity(output.variables.len());
    for (sig, var) in data.into_iter().zip(output.variables.iter()) {
        let value = match sig.as_slice() {
            [value] => *value,
            _ => {
                return Err(ErrorSource::SimOutputParsing(format!(
                    "expected one point for {} in an operating point analysis, got {}",
                    var.name,
                    sig.len()
                ))
                .into())
            }
        };
        let sig = ScalarSignal {
            value,
            quantity: Quantity::from_unit(var.unit.trim()),
        };
        map.insert(var.name.trim().to_lowercase(), sig);
    }

    Ok(OpData { data: map })
}
