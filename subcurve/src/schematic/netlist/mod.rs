//! Netlisting utilities and implementations.

pub mod impls;
pub mod interface;
