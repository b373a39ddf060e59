pub mod row;
pub use row::*;

pub mod frame;
pub use frame::*;
