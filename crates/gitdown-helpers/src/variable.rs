//! `variable` helper.
//!
//! Prints a configured variable: `{"gitdown": "variable", "name": "project.name"}`

use async_trait::async_trait;
use gitdown_engine::{Helper, HelperContext, HelperError, Options};

use crate::options::required_str;

/// Prints the value of a variable from the configuration.
///
/// Variables are addressed by dotted name, as flattened from the `[variables]`
/// table of `gitdown.toml`.
#[derive(Debug, Default, Clone, Copy)]
pub struct VariableHelper;

#[async_trait]
impl Helper for VariableHelper {
    fn name(&self) -> &'static str {
        "variable"
    }

    fn weight(&self) -> u32 {
        10
    }

    async fn compile(
        &self,
        options: &Options,
        ctx: &HelperContext<'_>,
    ) -> Result<String, HelperError> {
        let name = required_str(options, "name")?;

        ctx.variable(name)
            .map(str::to_owned)
            .ok_or_else(|| HelperError::UndefinedVariable(name.to_owned()))
    }
}
