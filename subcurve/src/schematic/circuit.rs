//! A flat SPICE circuit.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::elements::{Element, Resistor, SchematicElement, SubcktInstance, Vdc};
use super::netlist::interface::Netlister;
use crate::deps::arcstr::ArcStr;
use crate::error::{with_err_context, ErrorContext, ErrorSource, Result};
use crate::io::create_file;
use crate::library::{LibraryEntry, SpiceLibrary};
use crate::units::SiValue;

/// A flat circuit made of primitive elements and subcircuit instances.
///
/// Elements are netlisted in insertion order, after the include directives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    title: ArcStr,
    includes: Vec<PathBuf>,
    elements: Vec<Element>,
}

impl Circuit {
    /// The name of the global ground node.
    pub const GROUND: &'static str = "0";

    pub fn new(title: impl Into<ArcStr>) -> Self {
        Self {
            title: title.into(),
            includes: Vec::new(),
            elements: Vec::new(),
        }
    }

    #[inline]
    pub fn gnd() -> ArcStr {
        arcstr::literal!("0")
    }

    #[inline]
    pub fn title(&self) -> &ArcStr {
        &self.title
    }

    #[inline]
    pub fn includes(&self) -> &[PathBuf] {
        &self.includes
    }

    #[inline]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Looks up an element by its netlisted name (e.g. `Vinput`), ignoring case.
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements
            .iter()
            .find(|e| e.name().eq_ignore_ascii_case(name))
    }

    /// All nodes referenced by the circuit's elements.
    pub fn nodes(&self) -> BTreeSet<ArcStr> {
        self.elements
            .iter()
            .flat_map(|e| e.nodes().iter().cloned())
            .collect()
    }

    /// Adds an include directive. Duplicate paths are only included once.
    pub fn include(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        let path = path.into();
        if !self.includes.contains(&path) {
            self.includes.push(path);
        }
        self
    }

    /// Includes the library file that defines `name`.
    pub fn include_model<'a>(
        &mut self,
        library: &'a SpiceLibrary,
        name: &str,
    ) -> Result<&'a LibraryEntry> {
        let entry = library.entry(name)?;
        self.include(entry.path.clone());
        Ok(entry)
    }

    /// Adds a DC voltage source named `V<name>`.
    pub fn vdc(
        &mut self,
        name: &str,
        p: impl Into<ArcStr>,
        n: impl Into<ArcStr>,
        value: SiValue,
    ) -> Result<&mut Self> {
        self.add(Vdc::new(name, p, n, value).into())
    }

    /// Adds a resistor named `R<name>`.
    pub fn resistor(
        &mut self,
        name: &str,
        p: impl Into<ArcStr>,
        n: impl Into<ArcStr>,
        value: SiValue,
    ) -> Result<&mut Self> {
        self.add(Resistor::new(name, p, n, value).into())
    }

    /// Adds an instance named `X<name>` of the subcircuit `subckt`.
    pub fn instance<I, S>(
        &mut self,
        name: &str,
        subckt: impl Into<ArcStr>,
        ports: I,
    ) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<ArcStr>,
    {
        self.add(SubcktInstance::new(name, subckt, ports).into())
    }

    fn add(&mut self, element: Element) -> Result<&mut Self> {
        // The SPICE prefix alone is not a name.
        if element.name().len() < 2 {
            return Err(ErrorSource::InvalidArgs("element name must not be empty".into()).into());
        }
        if element.nodes().iter().any(|n| n.trim().is_empty()) {
            return Err(ErrorSource::InvalidArgs(format!(
                "element {} has an empty node name",
                element.name()
            ))
            .into());
        }
        if self.element(element.name()).is_some() {
            return Err(ErrorSource::AlreadyExists(element.name().clone()).into());
        }
        self.elements.push(element);
        Ok(self)
    }

    /// Writes this circuit using the given netlister.
    pub fn write_netlist(&self, netlister: &dyn Netlister, out: &mut dyn Write) -> Result<()> {
        netlister.emit_begin(out, &self.title)?;
        for include in self.includes.iter() {
            netlister.emit_include(out, include)?;
        }
        if !self.includes.is_empty() {
            writeln!(out)?;
        }
        for element in self.elements.iter() {
            element.netlist(netlister, out)?;
        }
        netlister.emit_end(out)?;
        Ok(())
    }

    /// Writes this circuit to the file at `path`.
    pub fn write_netlist_to_file(
        &self,
        netlister: &dyn Netlister,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let path = path.as_ref();
        let mut file = create_file(path)?;
        with_err_context(self.write_netlist(netlister, &mut file), || {
            ErrorContext::CreateFile(path.to_path_buf())
        })
    }
}
