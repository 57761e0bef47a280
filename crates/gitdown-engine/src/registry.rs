//! Helper registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::Helper;

/// Lookup table from helper name to helper.
///
/// The engine only reads the registry, so the set of helpers cannot change while a
/// document is being resolved. Registering a name twice replaces the earlier helper,
/// which lets callers override defaults (for example with a mock in tests).
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use gitdown_engine::{Helper, HelperContext, HelperError, HelperRegistry, Options};
///
/// struct Fixed;
///
/// #[async_trait]
/// impl Helper for Fixed {
///     fn name(&self) -> &str { "fixed" }
///     fn weight(&self) -> u32 { 10 }
///     async fn compile(&self, _: &Options, _: &HelperContext<'_>) -> Result<String, HelperError> {
///         Ok("fixed".to_owned())
///     }
/// }
///
/// let registry = HelperRegistry::new().with_helper(Fixed);
/// assert!(registry.has("fixed"));
/// assert!(registry.get("missing").is_none());
/// ```
#[derive(Clone, Default)]
pub struct HelperRegistry {
    helpers: HashMap<String, Arc<dyn Helper>>,
}

impl HelperRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a helper, replacing any helper with the same name.
    #[must_use]
    pub fn with_helper<H: Helper + 'static>(mut self, helper: H) -> Self {
        self.register(helper);
        self
    }

    /// Register a helper, replacing any helper with the same name.
    pub fn register<H: Helper + 'static>(&mut self, helper: H) {
        self.register_shared(Arc::new(helper));
    }

    /// Register an already shared helper.
    pub fn register_shared(&mut self, helper: Arc<dyn Helper>) {
        self.helpers.insert(helper.name().to_owned(), helper);
    }

    /// Whether a helper with this name is registered.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    /// Get a helper by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Helper>> {
        self.helpers.get(name)
    }

    /// Registered helper names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.helpers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered helpers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    /// Whether no helpers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.helpers.is_empty()
    }
}

impl fmt::Debug for HelperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperRegistry")
            .field("helpers", &self.names())
            .finish()
    }
}
