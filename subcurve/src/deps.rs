//! Re-exports of dependencies that appear in public signatures.

pub use arcstr;
