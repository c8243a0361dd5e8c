//! A primitive DC voltage source.

use std::io::Write;

use serde::{Deserialize, Serialize};

use super::{prefixed, SchematicElement};
use crate::deps::arcstr::ArcStr;
use crate::schematic::netlist::interface::{Netlister, PrimitiveInfo, Result};
use crate::units::SiValue;

/// A DC voltage source between `p` and `n`.
///
/// A source named `input` is netlisted as `Vinput`; its branch current
/// is reported by simulators as `i(vinput)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vdc {
    name: ArcStr,
    nodes: [ArcStr; 2],
    value: SiValue,
}

impl Vdc {
    pub fn new(name: &str, p: impl Into<ArcStr>, n: impl Into<ArcStr>, value: SiValue) -> Self {
        Self {
            name: prefixed('V', name),
            nodes: [p.into(), n.into()],
            value,
        }
    }

    #[inline]
    pub fn value(&self) -> SiValue {
        self.value
    }
}

impl SchematicElement for Vdc {
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
                value: &format!("DC {}", self.value),
            },
        )
    }
}
