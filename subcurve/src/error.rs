use std::fmt::{Debug, Display};
use std::path::PathBuf;

use thiserror::Error;

use crate::deps::arcstr::ArcStr;
use crate::schematic::netlist::interface::NetlistError;

pub type Result<T> = std::result::Result<T, SubcurveError>;

pub struct SubcurveError {
    pub(crate) source: ErrorSource,
    pub(crate) context: Vec<ErrorContext>,
}

impl SubcurveError {
    pub fn source(&self) -> &ErrorSource {
        &self.source
    }

    pub fn context(&self) -> &[ErrorContext] {
        &self.context
    }
}

impl std::error::Error for SubcurveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl Display for SubcurveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Error:\n{}", self.source)?;
        if !self.context.is_empty() {
            writeln!(f, "\nError occurred:")?;
            for item in self.context.iter() {
                writeln!(f, "\twhile {}", item)?;
            }
        }
        Ok(())
    }
}

impl Debug for SubcurveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.source)?;
        if !self.context.is_empty() {
            writeln!(f, "\nError occurred:")?;
            for (i, item) in self.context.iter().enumerate() {
                writeln!(f, "\t{}: {:?}", i, item)?;
            }
        }
        Ok(())
    }
}

impl<T> From<T> for SubcurveError
where
    T: Into<ErrorSource>,
{
    fn from(value: T) -> Self {
        Self {
            source: value.into(),
            context: Vec::new(),
        }
    }
}

impl SubcurveError {
    pub fn new(source: impl Into<ErrorSource>) -> Self {
        Self {
            source: source.into(),
            context: Vec::new(),
        }
    }

    pub fn from_context(source: impl Into<ErrorSource>, ctx: impl Into<ErrorContext>) -> Self {
        Self {
            source: source.into(),
            context: vec![ctx.into()],
        }
    }

    pub fn with_context(mut self, ctx: impl Into<ErrorContext>) -> Self {
        self.context.push(ctx.into());
        self
    }

    #[inline]
    pub fn into_inner(self) -> ErrorSource {
        self.source
    }
}

#[inline]
pub fn with_err_context<T, E, C>(result: std::result::Result<T, E>, ctx: C) -> Result<T>
where
    C: FnOnce() -> ErrorContext,
    E: Into<SubcurveError>,
{
    result.map_err(|err| err.into().with_context(ctx()))
}

#[derive(Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorContext {
    CreateDir(PathBuf),
    CreateFile(PathBuf),
    ReadFile(PathBuf),
    ReadDir(PathBuf),
    Task(ArcStr),
}

impl Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ErrorContext::*;
        match self {
            CreateDir(path) => write!(f, "creating directory {path:?}"),
            CreateFile(path) => write!(f, "creating file {path:?}"),
            ReadFile(path) => write!(f, "reading file {path:?}"),
            ReadDir(path) => write!(f, "reading directory {path:?}"),
            Task(task) => write!(f, "{task}"),
        }
    }
}

impl From<ArcStr> for ErrorContext {
    fn from(value: ArcStr) -> Self {
        Self::Task(value)
    }
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorSource {
    #[error("internal error: {0}")]
    Internal(String),

    #[error("error while generating netlist: {0}")]
    Netlist(#[from] NetlistError),

    #[error("no such model or subcircuit: {0}")]
    ModelNotFound(String),

    #[error("no such signal: {0}")]
    SignalNotFound(String),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("already exists: {0}")]
    AlreadyExists(ArcStr),

    #[error("simulator failed: {0}")]
    SimulatorFailed(String),

    #[error("failed to parse simulation output: {0}")]
    SimOutputParsing(String),

    #[error("error rendering chart: {0}")]
    Render(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("error parsing SPICE: {0}")]
    SpiceParsing(#[from] subspice::error::Error),

    #[error("error parsing TOML: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("unexpected error: {0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("unexpected error: {0}")]
    Anyhow(#[from] anyhow::Error),
}
