//! Built-in helpers for gitdown directives.
//!
//! - [`IncludeHelper`]: `{"gitdown": "include", "file": "path/to/file.md"}` inlines a file
//! - [`VariableHelper`]: `{"gitdown": "variable", "name": "project.name"}` prints a variable
//! - [`TestHelper`]: `{"gitdown": "test"}` prints `test`
//!
//! [`registry`] returns a [`HelperRegistry`] with all of them registered. Callers can
//! register their own helpers on top of it to add or override behavior.
//!
//! # Example
//!
//! ```
//! use gitdown_engine::{Engine, EngineConfig};
//!
//! let engine = Engine::new(EngineConfig::default()).with_registry(gitdown_helpers::registry());
//! assert!(engine.registry().has("include"));
//! assert!(engine.validate(r#"{"gitdown": "test"}"#).is_ok());
//! ```

mod include;
mod options;
mod test_helper;
mod variable;

use gitdown_engine::HelperRegistry;

pub use include::IncludeHelper;
pub use test_helper::TestHelper;
pub use variable::VariableHelper;

/// Build a registry containing every built-in helper.
#[must_use]
pub fn registry() -> HelperRegistry {
    HelperRegistry::new()
        .with_helper(IncludeHelper)
        .with_helper(VariableHelper)
        .with_helper(TestHelper)
}
