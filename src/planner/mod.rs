pub mod join;
pub use join::*;

pub mod join_graph;
pub use join_graph::*;

pub mod lateral_views;
pub use lateral_views::*;

pub mod aggregate_query;
pub use aggregate_query::*;

pub mod query_plan;
pub use query_plan::*;

pub mod plan_builder;
pub use plan_builder::*;
