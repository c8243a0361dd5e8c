use error::{Error, Result};
use parser::{ModelLine, SpiceLine, SubcktLine};
use serde::Serialize;

pub mod error;
pub mod parser;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedSpice<'a> {
    pub lines: Vec<SpiceLine<'a>>,
}

/// Parse the given SPICE netlist or model library.
pub fn parse<T>(input: &T) -> Result<ParsedSpice<'_>>
where
    T: AsRef<str> + ?Sized,
{
    match parser::parse_spice(input.as_ref()) {
        Ok((_, lines)) => Ok(ParsedSpice { lines }),
        Err(_) => Err(Error::Parse),
    }
}

impl<'a> ParsedSpice<'a> {
    /// Return an iterator over the lines in the parsed SPICE netlist.
    pub fn lines(&self) -> impl Iterator<Item = &SpiceLine> {
        self.lines.iter()
    }

    /// Return an iterator over the subcircuit definitions in the netlist.
    pub fn subcircuits(&self) -> impl Iterator<Item = &SubcktLine> {
        self.lines.iter().filter_map(|line| line.subckt())
    }

    /// Return an iterator over the `.model` cards in the netlist.
    ///
    /// Models nested inside a subcircuit body are included.
    pub fn models(&self) -> impl Iterator<Item = &ModelLine> {
        self.lines.iter().filter_map(|line| line.model())
    }

    /// Return the subcircuit definition with the given name.
    ///
    /// Note that this operation takes `O(N)` time, where `N`
    /// is the number of lines in the parsed netlist.
    ///
    /// If you need to query for multiple subcircuits, you may wish to
    /// collect the [`subcircuits`](ParsedSpice::subcircuits) into a
    /// [`HashMap`](std::collections::HashMap), and query the map instead.
    pub fn subcircuit_named(&self, name: impl AsRef<str>) -> Option<&SubcktLine> {
        let name = name.as_ref();
        self.subcircuits()
            .find(|ckt| ckt.name.eq_ignore_ascii_case(name))
    }

    /// Return the model card with the given name.
    ///
    /// SPICE names are case insensitive, so `1n4148` matches `1N4148`.
    pub fn model_named(&self, name: impl AsRef<str>) -> Option<&ModelLine> {
        let name = name.as_ref();
        self.models().find(|m| m.name.eq_ignore_ascii_case(name))
    }
}
