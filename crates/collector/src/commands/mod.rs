mod analyze;
mod collect;

pub use analyze::*;
pub use collect::*;
