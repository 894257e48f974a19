mod analyze;

pub use analyze::*;
