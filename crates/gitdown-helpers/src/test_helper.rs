//! `test` helper.

use async_trait::async_trait;
use gitdown_engine::{Helper, HelperContext, HelperError, Options};

/// Prints the literal `test`.
///
/// Syntax: `{"gitdown": "test"}`. Any options are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct TestHelper;

#[async_trait]
impl Helper for TestHelper {
    fn name(&self) -> &'static str {
        "test"
    }

    fn weight(&self) -> u32 {
        10
    }

    async fn compile(
        &self,
        _options: &Options,
        _ctx: &HelperContext<'_>,
    ) -> Result<String, HelperError> {
        Ok("test".to_owned())
    }
}
