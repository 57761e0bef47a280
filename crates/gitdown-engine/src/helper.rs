//! Helper trait.
//!
//! Helpers turn a directive's options into replacement text:
//! `{"gitdown": "name", ...options}`

use async_trait::async_trait;

use super::{HelperContext, HelperError};

/// Options passed to a helper: the directive's JSON object without the
/// `"gitdown"` key, in source order.
pub type Options = serde_json::Map<String, serde_json::Value>;

/// A named, weighted transformation from directive options to text.
///
/// Within a pass, the directive whose helper has the lowest [`weight`](Self::weight)
/// is resolved first; ties go to the leftmost directive. Output is spliced into the
/// document and re-scanned, so a helper may emit further directives.
///
/// # Thread Safety
///
/// Helpers are `Send + Sync` so that a registry can be shared behind `Arc` and the
/// resolve future stays `Send`. Compile calls take `&self`; the engine never runs two
/// of them at once.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use gitdown_engine::{Helper, HelperContext, HelperError, Options};
///
/// struct Greeting;
///
/// #[async_trait]
/// impl Helper for Greeting {
///     fn name(&self) -> &str { "greeting" }
///     fn weight(&self) -> u32 { 10 }
///
///     async fn compile(&self, options: &Options, _ctx: &HelperContext<'_>) -> Result<String, HelperError> {
///         let who = options
///             .get("who")
///             .and_then(|v| v.as_str())
///             .ok_or(HelperError::MissingOption("who"))?;
///         Ok(format!("Hello, {who}!"))
///     }
/// }
/// ```
#[async_trait]
pub trait Helper: Send + Sync {
    /// Helper name, matched against the directive's `"gitdown"` value.
    fn name(&self) -> &str;

    /// Resolution priority. Lower weights resolve first.
    fn weight(&self) -> u32;

    /// Produce the replacement text for a directive.
    ///
    /// May suspend (for example while reading a file); the engine awaits the
    /// result before starting the next pass.
    async fn compile(&self, options: &Options, ctx: &HelperContext<'_>)
    -> Result<String, HelperError>;
}
