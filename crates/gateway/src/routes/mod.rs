pub mod observations;
pub mod stations;

pub use observations::*;
pub use stations::*;
