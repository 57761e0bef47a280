//! Directive resolution engine for gitdown markdown documents.
//!
//! Gitdown documents embed JSON directives such as `{"gitdown": "include", "file": "intro.md"}`
//! in otherwise opaque markdown. The [`Engine`] finds those directives, hands each one to
//! the named [`Helper`], and splices the helper's output back into the document.
//!
//! # Architecture
//!
//! Resolution runs as a fixpoint loop. Every pass:
//!
//! 1. partitions the current document into active and inactive [`Region`]s using the
//!    `<!-- gitdown: off -->` / `<!-- gitdown: on -->` markers,
//! 2. locates and validates every [`Directive`] inside the active regions,
//! 3. checks every directive's helper against the [`HelperRegistry`],
//! 4. resolves exactly one directive (lowest helper weight, then leftmost offset)
//!    and splices the output into the document.
//!
//! The loop stops when a pass finds no directives. Because every pass re-scans the
//! spliced document, helper output that itself contains directives is resolved too.
//!
//! # Example
//!
//! ```
//! use async_trait::async_trait;
//! use gitdown_engine::{Engine, EngineConfig, Helper, HelperContext, HelperError, Options};
//!
//! struct Shout;
//!
//! #[async_trait]
//! impl Helper for Shout {
//!     fn name(&self) -> &str { "shout" }
//!     fn weight(&self) -> u32 { 10 }
//!
//!     async fn compile(&self, options: &Options, _ctx: &HelperContext<'_>) -> Result<String, HelperError> {
//!         let text = options.get("text").and_then(|v| v.as_str()).unwrap_or_default();
//!         Ok(text.to_uppercase())
//!     }
//! }
//!
//! let engine = Engine::new(EngineConfig::default()).with_helper(Shout);
//! let directives = engine.validate(r#"Say {"gitdown": "shout", "text": "hi"}!"#).unwrap();
//! assert_eq!(directives.len(), 1);
//! assert_eq!(directives[0].helper, "shout");
//! ```

mod context;
mod engine;
mod error;
mod helper;
mod locator;
mod registry;
mod toggle;

pub use context::{EngineConfig, HelperContext, ReadFileFn};
pub use engine::Engine;
pub use error::{Error, ErrorKind, HelperError};
pub use helper::{Helper, Options};
pub use locator::{DIRECTIVE_KEY, DIRECTIVE_MARKER, Directive, Directives, locate_directives};
pub use registry::HelperRegistry;
pub use toggle::{OFF_MARKER, ON_MARKER, Region, scan_regions};
