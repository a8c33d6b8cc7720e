//! Shipped service definitions.

mod glacier;
mod import_export;

pub use glacier::*;
pub use import_export::*;
