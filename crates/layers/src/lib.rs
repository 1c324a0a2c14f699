pub mod binder;
pub mod trend;

pub use binder::*;
pub use trend::*;
