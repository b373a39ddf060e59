pub mod config;
pub use config::PlannerConfig;

pub mod error;
pub use error::{PlanError, SchemaError};

pub mod utils;

pub mod schema;
pub use schema::{ResourceDefinitions, SchemaProvider};

pub mod parser;
pub use parser::analyzer::{ExpressionParser, ParseResult, ParserContext};

pub mod planner;
pub use planner::{AggregateQuery, PlanBuilder, QueryPlan};

pub mod executor;
pub use executor::{Frame, Row};
