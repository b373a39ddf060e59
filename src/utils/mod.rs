pub mod strings;
pub use strings::*;
