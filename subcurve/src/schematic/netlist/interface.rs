//! Trait definitions and types for netlisters.

use std::io::Write;
use std::path::Path;

use thiserror::Error;

use crate::deps::arcstr::ArcStr;

/// A trait representing the expected functionality of a netlister.
pub trait Netlister {
    /// Emits a comment to the provided output stream.
    fn emit_comment(&self, out: &mut dyn Write, comment: &str) -> Result<()>;

    /// Emits a primitive element (source, resistor) to the provided output stream.
    fn emit_primitive(&self, out: &mut dyn Write, primitive: PrimitiveInfo) -> Result<()>;

    /// Emits an instance to the provided output stream.
    fn emit_instance(&self, out: &mut dyn Write, instance: InstanceInfo) -> Result<()>;

    /// Emits an include directive to the provided output stream.
    fn emit_include(&self, out: &mut dyn Write, include: &Path) -> Result<()>;

    /// Emits a prologue to the provided output stream.
    #[allow(unused_variables)]
    fn emit_begin(&self, out: &mut dyn Write, title: &str) -> Result<()> {
        Ok(())
    }

    /// Emits an epilogue to the provided output stream.
    #[allow(unused_variables)]
    fn emit_end(&self, out: &mut dyn Write) -> Result<()> {
        Ok(())
    }
}

/// A description of a primitive element.
pub struct PrimitiveInfo<'a> {
    /// The element name, including its SPICE prefix.
    pub name: &'a str,
    /// The connected nodes, in order.
    pub nodes: &'a [ArcStr],
    /// The element value, already formatted.
    pub value: &'a str,
}

/// A description of a subcircuit instance.
pub struct InstanceInfo<'a> {
    /// The instance name.
    pub name: &'a str,
    /// The nodes connected to the subcircuit ports, in port order.
    pub ports: &'a [ArcStr],
    /// The name of the subcircuit that the instance is associated with.
    pub subcircuit_name: &'a str,
}

/// An enumeration of netlisting errors.
#[derive(Debug, Error)]
pub enum NetlistError {
    /// General I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Unexpected errors.
    #[error("unexpected error: {0}")]
    Other(String),
}

/// The netlisting `Result` type.
pub type Result<T> = std::result::Result<T, NetlistError>;
