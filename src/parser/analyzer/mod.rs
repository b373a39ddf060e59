pub mod parse_result;
pub use parse_result::*;

pub mod parser_context;
pub use parser_context::*;

pub mod path_traversal;
pub use path_traversal::*;

pub mod expression_parser;
pub use expression_parser::*;
