use std::path::PathBuf;

use super::{Analysis, Lib, SimInput};

/// Collects everything a simulator needs before it runs.
pub struct PreSimCtx {
    pub(crate) input: SimInput,
}

impl PreSimCtx {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: SimInput {
                work_dir: work_dir.into(),
                ..Default::default()
            },
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.input.title = title.into();
        self
    }

    pub fn add_analysis(&mut self, analysis: impl Into<Analysis>) -> &mut Self {
        self.input.analyses.push(analysis.into());
        self
    }

    pub fn include(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.input.includes.push(path.into());
        self
    }

    pub fn set_temp(&mut self, temp: f64) -> &mut Self {
        self.input.opts.temp = Some(temp);
        self
    }

    pub fn set_tnom(&mut self, tnom: f64) -> &mut Self {
        self.input.opts.tnom = Some(tnom);
        self
    }

    pub fn set_flags(&mut self, flags: impl Into<String>) -> &mut Self {
        self.input.opts.flags = Some(flags.into());
        self
    }

    pub fn include_lib(
        &mut self,
        path: impl Into<PathBuf>,
        section: impl Into<String>,
    ) -> &mut Self {
        self.input.libs.push(Lib {
            path: path.into(),
            section: section.into(),
        });
        self
    }

    #[inline]
    pub fn inner(&self) -> &SimInput {
        &self.input
    }

    #[inline]
    pub fn into_inner(self) -> SimInput {
        self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verification::simulation::{DcAnalysis, SimOpts};

    #[test]
    fn test_pre_sim_ctx() {
        let mut ctx = PreSimCtx::new("build/t25");
        ctx.set_title("diode")
            .include("circuit.spice")
            .set_temp(25.0)
            .set_tnom(25.0)
            .add_analysis(DcAnalysis {
                sweep: "Vinput".to_string(),
                start: -2.0,
                stop: 5.0,
                step: 0.01,
            });
        assert_eq!(ctx.inner().analyses.len(), 1);

        let input = ctx.into_inner();
        assert_eq!(input.work_dir, PathBuf::from("build/t25"));
        assert_eq!(input.includes, vec![PathBuf::from("circuit.spice")]);
        assert_eq!(
            input.opts,
            SimOpts {
                temp: Some(25.0),
                tnom: Some(25.0),
                flags: None,
            }
        );
        input.validate().unwrap();
    }
}
