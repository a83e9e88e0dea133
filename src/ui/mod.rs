pub mod formatting;
pub mod renderers;

pub use formatting::*;
pub use renderers::build_columns;
