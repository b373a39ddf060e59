pub mod path_function;
pub use path_function::*;

pub mod function_registry;
pub use function_registry::*;

pub mod count_impl;
pub use count_impl::*;

pub mod resolve_impl;
pub use resolve_impl::*;

pub mod reverse_resolve_impl;
pub use reverse_resolve_impl::*;
