//! Application layer: script runner and use-case errors
//!
//! This layer drives the domain tree on behalf of callers such as the CLI.

pub mod error;
pub mod error_ext;
pub mod script;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use script::{Command, Outcome, Renderer, Script, ScriptRunner, ScriptTree, ScriptValue, Step};
