//! Engine configuration and the context handed to helpers.
//!
//! Provides file system access, source location and configured variables to helpers.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Type alias for the file reading callback function.
pub type ReadFileFn = dyn Fn(&Path) -> io::Result<String> + Send + Sync;

/// Default ceiling on resolution passes.
const DEFAULT_MAX_PASSES: usize = 10_000;

/// Configuration for the [`Engine`](super::Engine).
///
/// Everything here is read-only while a document is being resolved; helpers see it
/// through a [`HelperContext`].
pub struct EngineConfig {
    /// Base directory for resolving relative paths (e.g., for `include`).
    pub base_dir: PathBuf,
    /// Path to the source document being resolved (if known).
    pub source_path: Option<PathBuf>,
    /// Callback to read files from the file system.
    ///
    /// Default: `std::fs::read_to_string`
    pub read_file: Option<Box<ReadFileFn>>,
    /// Maximum number of resolution passes before the run fails.
    ///
    /// `None` disables the limit. Default: 10 000
    pub max_passes: Option<usize>,
    /// Variables available to helpers, keyed by dotted name.
    pub variables: BTreeMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            source_path: None,
            read_file: None,
            max_passes: Some(DEFAULT_MAX_PASSES),
            variables: BTreeMap::new(),
        }
    }

    /// Set the base directory for resolving relative paths.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Set the source document path.
    #[must_use]
    pub fn with_source_path(mut self, source_path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(source_path.into());
        self
    }

    /// Set the file reading callback.
    #[must_use]
    pub fn with_read_file<F>(mut self, read_file: F) -> Self
    where
        F: Fn(&Path) -> io::Result<String> + Send + Sync + 'static,
    {
        self.read_file = Some(Box::new(read_file));
        self
    }

    /// Set the pass ceiling, or disable it with `None`.
    #[must_use]
    pub fn with_max_passes(mut self, max_passes: Option<usize>) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Set a single variable.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Replace all variables.
    #[must_use]
    pub fn with_variables(mut self, variables: BTreeMap<String, String>) -> Self {
        self.variables = variables;
        self
    }

    /// Build the context passed to a helper for a directive on `line`.
    #[must_use]
    pub fn create_context(&self, line: usize) -> HelperContext<'_> {
        HelperContext {
            source_path: self.source_path.as_deref(),
            base_dir: &self.base_dir,
            line,
            read_file: self.read_file.as_ref().map_or_else(
                || &default_read_file as &ReadFileFn,
                |f| f.as_ref(),
            ),
            variables: &self.variables,
        }
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("base_dir", &self.base_dir)
            .field("source_path", &self.source_path)
            .field("read_file", &self.read_file.as_ref().map(|_| "<callback>"))
            .field("max_passes", &self.max_passes)
            .field("variables", &self.variables)
            .finish()
    }
}

/// Default file reading function.
fn default_read_file(path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
}

/// Context provided to helpers.
///
/// Created by the engine for each compile call and provides:
///
/// - Source file information for error messages
/// - Base directory for resolving relative paths
/// - File reading callback for `include` and similar helpers
/// - Configured variables
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use std::path::Path;
/// use gitdown_engine::HelperContext;
///
/// let variables = BTreeMap::new();
/// let ctx = HelperContext {
///     source_path: Some(Path::new("docs/README.md")),
///     base_dir: Path::new("docs"),
///     line: 3,
///     read_file: &|path| std::fs::read_to_string(path),
///     variables: &variables,
/// };
///
/// assert_eq!(ctx.resolve_path("intro.md"), Path::new("docs/intro.md"));
/// ```
pub struct HelperContext<'a> {
    /// Path to the source document (if known).
    pub source_path: Option<&'a Path>,
    /// Base directory for resolving relative paths.
    pub base_dir: &'a Path,
    /// Line number where the directive starts (1-indexed).
    pub line: usize,
    /// Callback to read a file.
    pub read_file: &'a ReadFileFn,
    /// Variables keyed by dotted name.
    pub variables: &'a BTreeMap<String, String>,
}

impl HelperContext<'_> {
    /// Resolve a path against the base directory.
    ///
    /// Absolute paths are returned unchanged.
    #[must_use]
    pub fn resolve_path(&self, relative: &str) -> PathBuf {
        self.base_dir.join(relative)
    }

    /// Read a file using the context's `read_file` callback.
    pub fn read(&self, path: &Path) -> io::Result<String> {
        (self.read_file)(path)
    }

    /// Look up a variable by dotted name.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }
}
