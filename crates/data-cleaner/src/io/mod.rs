//! Reading input tables and writing cleaned output.

mod exporter;
mod loader;

pub use exporter::Exporter;
pub use loader::{TableFormat, TableLoader};
