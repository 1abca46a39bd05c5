//! Built-in lints for manifest validation.

mod admin_scope;
mod function_handler;
mod resource_naming;

pub use admin_scope::AdminScopeLint;
pub use function_handler::FunctionHandlerLint;
pub use resource_naming::ResourceNamingLint;
