//! `include` helper.
//!
//! Inlines the contents of a file: `{"gitdown": "include", "file": "./docs/intro.md"}`

use async_trait::async_trait;
use gitdown_engine::{Helper, HelperContext, HelperError, Options};

use crate::options::required_str;

/// Inlines a file, resolved against the base directory.
///
/// The contents are inserted verbatim. Directives inside the included file are
/// resolved by later passes like any other directive. Runs after lower-weight
/// helpers such as `variable`.
#[derive(Debug, Default, Clone, Copy)]
pub struct IncludeHelper;

#[async_trait]
impl Helper for IncludeHelper {
    fn name(&self) -> &'static str {
        "include"
    }

    fn weight(&self) -> u32 {
        20
    }

    async fn compile(
        &self,
        options: &Options,
        ctx: &HelperContext<'_>,
    ) -> Result<String, HelperError> {
        let file = required_str(options, "file")?;
        let path = ctx.resolve_path(file);

        tracing::debug!(path = %path.display(), line = ctx.line, "Including file");

        ctx.read(&path)
            .map_err(|source| HelperError::Io { path, source })
    }
}
