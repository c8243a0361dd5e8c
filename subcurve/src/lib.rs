pub mod deps;
pub mod error;
pub mod io;
pub mod library;
pub mod schematic;
pub mod units;
pub mod verification;

pub(crate) mod log;
