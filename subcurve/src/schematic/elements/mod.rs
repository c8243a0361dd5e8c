//! Primitive schematic elements.

use std::io::Write;

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use crate::deps::arcstr::ArcStr;
use crate::schematic::netlist::interface::{Netlister, Result};

pub mod resistor;
pub mod subckt;
pub mod vdc;

pub use resistor::Resistor;
pub use subckt::SubcktInstance;
pub use vdc::Vdc;

/// Behavior shared by everything that can be placed in a [`Circuit`](super::circuit::Circuit).
#[enum_dispatch]
pub trait SchematicElement {
    /// The element name as written to the netlist, including its SPICE prefix.
    fn name(&self) -> &ArcStr;

    /// The nodes this element connects to, in netlist order.
    fn nodes(&self) -> &[ArcStr];

    /// Writes this element using the given netlister.
    fn netlist(&self, netlister: &dyn Netlister, out: &mut dyn Write) -> Result<()>;
}

#[enum_dispatch(SchematicElement)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    Vdc(Vdc),
    Resistor(Resistor),
    SubcktInstance(SubcktInstance),
}

/// Prepends a SPICE element prefix to a user-supplied name.
pub(crate) fn prefixed(prefix: char, name: &str) -> ArcStr {
    arcstr::format!("{prefix}{name}")
}
