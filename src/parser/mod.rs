pub mod path_parser;
pub use path_parser::*;

pub mod parse_error;
pub use parse_error::*;

pub mod ast;

pub mod analyzer;

pub mod functions;
