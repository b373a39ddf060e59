pub mod literal;
pub use literal::*;

pub mod path_expr;
pub use path_expr::*;

pub mod literal_parsers;
pub use literal_parsers::*;

pub mod identifier_parser;
pub use identifier_parser::*;

pub mod path_expr_parser;
pub use path_expr_parser::*;
