//! Instances of externally defined subcircuits.

use std::io::Write;

use serde::{Deserialize, Serialize};

use super::{prefixed, SchematicElement};
use crate::deps::arcstr::ArcStr;
use crate::schematic::netlist::interface::{InstanceInfo, Netlister, Result};

/// An instance of a subcircuit defined in an included file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubcktInstance {
    name: ArcStr,
    subckt: ArcStr,
    ports: Vec<ArcStr>,
}

impl SubcktInstance {
    pub fn new<I, S>(name: &str, subckt: impl Into<ArcStr>, ports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ArcStr>,
    {
        Self {
            name: prefixed('X', name),
            subckt: subckt.into(),
            ports: ports.into_iter().map(Into::into).collect(),
        }
    }

    #[inline]
    pub fn subckt(&self) -> &ArcStr {
        &self.subckt
    }
}

impl SchematicElement for SubcktInstance {
    fn name(&self) -> &ArcStr {
        &self.name
    }

    fn nodes(&self) -> &[ArcStr] {
        &self.ports
    }

    fn netlist(&self, netlister: &dyn Netlister, out: &mut dyn Write) -> Result<()> {
        netlister.emit_instance(
            out,
            InstanceInfo {
                name: &self.name,
                ports: &self.ports,
                subcircuit_name: &self.subckt,
            },
        )
    }
}
