//! A primitive resistor.

use std::io::Write;

use serde::{Deserialize, Serialize};

use super::{prefixed, SchematicElement};
use crate::deps::arcstr::ArcStr;
use crate::schematic::netlist::interface::{Netlister, PrimitiveInfo, Result};
use crate::units::SiValue;

/// A resistor parametrized by resistance, in ohms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resistor {
    name: ArcStr,
    nodes: [ArcStr; 2],
    value: SiValue,
}

impl Resistor {
    pub fn new(name: &str, p: impl Into<ArcStr>, n: impl Into<ArcStr>, value: SiValue) -> Self {
        Self {
            name: prefixed('R', name),
            nodes: [p.into(), n.into()],
            value,
        }
    }

    #[inline]
    pub fn value(&self) -> SiValue {
        self.value
    }
}

impl SchematicElement for Resistor {
    fn name(&self) -> &ArcStr {
        &self.name
    }

    fn nodes(&self) -> &[ArcStr] {
        &self.nodes
    }

    fn netlist(&self, netlister: &dyn Netlister, out: &mut dyn Write) -> Result<()> {
        netlister.emit_primitive(
            out,
            PrimitiveInfo {
                name: &self.name,
                nodes: &self.nodes,
                value: &self.value.to_string(),
            },
        )
    }
}
