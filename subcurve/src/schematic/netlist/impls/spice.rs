//! A built-in SPICE netlister implementation.

use std::io::Write;
use std::path::Path;

use crate::schematic::netlist::interface::{InstanceInfo, Netlister, PrimitiveInfo, Result};

/// A SPICE netlister.
#[derive(Clone, Debug, Default)]
pub struct SpiceNetlister;

impl SpiceNetlister {
    /// Creates a new [`SpiceNetlister`].
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Netlister for SpiceNetlister {
    fn emit_comment(&self, out: &mut dyn Write, comment: &str) -> Result<()> {
        writeln!(out, "* {comment}")?;
        Ok(())
    }

    fn emit_primitive(&self, out: &mut dyn Write, primitive: PrimitiveInfo) -> Result<()> {
        write!(out, "{}", primitive.name)?;
        for node in primitive.nodes {
            write!(out, " {node}")?;
        }
        writeln!(out, " {}", primitive.value)?;
        Ok(())
    }

    fn emit_instance(&self, out: &mut dyn Write, instance: InstanceInfo) -> Result<()> {
        writeln!(out, "{}", instance.name)?;
        for port in instance.ports {
            writeln!(out, "+ {port}")?;
        }
        writeln!(out, "+ {}", instance.subcircuit_name)?;
        Ok(())
    }

    fn emit_include(&self, out: &mut dyn Write, include: &Path) -> Result<()> {
        writeln!(out, ".include \"{}\"", include.display())?;
        Ok(())
    }

    fn emit_begin(&self, out: &mut dyn Write, title: &str) -> Result<()> {
        self.emit_comment(out, title)?;
        writeln!(out)?;
        Ok(())
    }
}
