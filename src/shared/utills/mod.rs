pub mod fallback;

pub use fallback::*;
