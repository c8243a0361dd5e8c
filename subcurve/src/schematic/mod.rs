//! Netlist construction.

pub mod circuit;
pub mod elements;
pub mod netlist;
