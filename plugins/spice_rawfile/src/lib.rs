//! A reader for the rawfile format written by `ngspice -r`.
//!
//! A rawfile holds one or more plots, each made of a textual header
//! followed by the data section. The data is either ASCII (`Values:`)
//! or little-endian doubles (`Binary:`).

pub use error::{Error, Result};
pub use parser::{Analysis, ComplexSignal, Data, Variable};
use serde::Serialize;

pub mod error;
pub mod parser;

/// The parsed contents of a rawfile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rawfile<'a> {
    pub analyses: Vec<Analysis<'a>>,
}

/// Parse the given rawfile data.
pub fn parse(input: &[u8]) -> Result<Rawfile<'_>> {
    let analyses = parser::parse_rawfile(input)?;
    Ok(Rawfile { analyses })
}
