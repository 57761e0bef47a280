//! Fixpoint resolution of directives.
//!
//! Each pass re-scans the current document, validates every directive, resolves the
//! one with the lowest helper weight (leftmost on ties) and splices its output in.

use std::sync::Arc;

use super::{Directive, Directives, EngineConfig, Error, Helper, HelperRegistry, scan_regions};

/// Directive resolution engine.
///
/// Holds the helper registry and the configuration shared with helpers. Both are
/// read-only during a run, so one engine can resolve any number of documents.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use gitdown_engine::{Engine, EngineConfig, Helper, HelperContext, HelperError, Options};
///
/// struct Version;
///
/// #[async_trait]
/// impl Helper for Version {
///     fn name(&self) -> &str { "version" }
///     fn weight(&self) -> u32 { 10 }
///     async fn compile(&self, _: &Options, _: &HelperContext<'_>) -> Result<String, HelperError> {
///         Ok("1.0.0".to_owned())
///     }
/// }
///
/// let engine = Engine::new(EngineConfig::default()).with_helper(Version);
///
/// // Validation runs without invoking helpers.
/// assert!(engine.validate(r#"v{"gitdown": "version"}"#).is_ok());
/// assert!(engine.validate(r#"v{"gitdown": "missing"}"#).is_err());
/// ```
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    registry: HelperRegistry,
}

/// A located directive bound to its helper.
struct Candidate<'r> {
    directive: Directive,
    helper: &'r Arc<dyn Helper>,
}

impl Engine {
    /// Create an engine with an empty helper registry.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            registry: HelperRegistry::new(),
        }
    }

    /// Replace the helper registry.
    #[must_use]
    pub fn with_registry(mut self, registry: HelperRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Register a single helper, replacing any helper with the same name.
    #[must_use]
    pub fn with_helper<H: Helper + 'static>(mut self, helper: H) -> Self {
        self.registry.register(helper);
        self
    }

    /// Configuration shared with helpers.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registered helpers.
    #[must_use]
    pub fn registry(&self) -> &HelperRegistry {
        &self.registry
    }

    /// Run one validation sweep over `document` without invoking any helper.
    ///
    /// Returns the directives the next pass would consider, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDirective`] or [`Error::UnknownHelper`] for the first
    /// offending directive.
    pub fn validate(&self, document: &str) -> Result<Vec<Directive>, Error> {
        Ok(self
            .sweep(document)?
            .into_iter()
            .map(|candidate| candidate.directive)
            .collect())
    }

    /// Resolve every directive in `markdown` and return the final document.
    ///
    /// Passes repeat until one finds no directive. Within a pass, every directive
    /// is validated and bound to its helper before any helper runs, so validation
    /// errors are reported before helper side effects. Exactly one helper is
    /// awaited per pass; its output replaces the directive's source span and
    /// everything else is preserved byte for byte.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDirective`] if a directive is not valid JSON
    /// - [`Error::UnknownHelper`] if a directive names an unregistered helper
    /// - [`Error::Helper`] if a helper fails
    /// - [`Error::PassLimitExceeded`] if `max_passes` is reached first
    pub async fn resolve(&self, markdown: &str) -> Result<String, Error> {
        let mut document = markdown.to_owned();
        let mut passes = 0;

        loop {
            let Some(next) = select(self.sweep(&document)?) else {
                tracing::debug!(passes, "Directive resolution complete");
                return Ok(document);
            };

            if let Some(limit) = self.config.max_passes
                && passes >= limit
            {
                return Err(Error::PassLimitExceeded { limit });
            }
            passes += 1;

            let Candidate { directive, helper } = next;
            tracing::debug!(
                pass = passes,
                helper = %directive.helper,
                weight = helper.weight(),
                offset = directive.start,
                "Resolving directive"
            );

            let ctx = self.config.create_context(directive.line);
            let output = helper
                .compile(&directive.options, &ctx)
                .await
                .map_err(|source| Error::Helper {
                    name: directive.helper.clone(),
                    line: directive.line,
                    source,
                })?;

            document.replace_range(directive.range(), &output);
        }
    }

    /// Locate every directive and bind it to its helper.
    ///
    /// Directives are bound one at a time in document order, so the first fault of
    /// either kind is the one reported.
    fn sweep(&self, document: &str) -> Result<Vec<Candidate<'_>>, Error> {
        let regions = scan_regions(document);

        Directives::new(document, &regions)
            .map(|located| {
                located.and_then(|directive| match self.registry.get(&directive.helper) {
                    Some(helper) => Ok(Candidate { directive, helper }),
                    None => Err(Error::UnknownHelper {
                        name: directive.helper,
                    }),
                })
            })
            .collect()
    }
}

/// Pick the directive to resolve: lowest helper weight, then leftmost.
fn select(candidates: Vec<Candidate<'_>>) -> Option<Candidate<'_>> {
    candidates
        .into_iter()
        .min_by_key(|c| (c.helper.weight(), c.directive.start))
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{ErrorKind, HelperContext, HelperError, Options};

    type CallLog = Arc<Mutex<Vec<(String, Options)>>>;

    /// Returns a fixed string and records every call.
    struct Recorder {
        name: &'static str,
        weight: u32,
        output: &'static str,
        calls: CallLog,
    }

    impl Recorder {
        fn new(name: &'static str, weight: u32, output: &'static str, calls: &CallLog) -> Self {
            Self {
                name,
                weight,
                output,
                calls: Arc::clone(calls),
            }
        }
    }

    #[async_trait]
    impl Helper for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn weight(&self) -> u32 {
            self.weight
        }

        async fn compile(
            &self,
            options: &Options,
            _ctx: &HelperContext<'_>,
        ) -> Result<String, HelperError> {
            self.calls
                .lock()
                .unwrap()
                .push((self.name.to_owned(), options.clone()));
            tokio::task::yield_now().await;
            Ok(self.output.to_owned())
        }
    }

    /// Reads the `file` option through the context.
    struct Include;

    #[async_trait]
    impl Helper for Include {
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
            let file = options
                .get("file")
                .and_then(|v| v.as_str())
                .ok_or(HelperError::MissingOption("file"))?;
            let path = ctx.resolve_path(file);
            ctx.read(&path)
                .map_err(|source| HelperError::Io { path, source })
        }
    }

    /// Emits its own directive again.
    struct Echo;

    #[async_trait]
    impl Helper for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn weight(&self) -> u32 {
            10
        }

        async fn compile(
            &self,
            _options: &Options,
            _ctx: &HelperContext<'_>,
        ) -> Result<String, HelperError> {
            Ok(r#"{"gitdown": "echo"}"#.to_owned())
        }
    }

    fn calls() -> CallLog {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn test_engine(calls: &CallLog) -> Engine {
        Engine::new(EngineConfig::new()).with_helper(Recorder::new("test", 10, "test", calls))
    }

    fn called(calls: &CallLog) -> Vec<String> {
        calls
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_returns_input_without_directives() {
        let engine = test_engine(&calls());
        let input = "# Title\n\nSome *markdown* with {braces} and \"gitdown\" words.\n";

        assert_eq!(engine.resolve(input).await.unwrap(), input);
    }

    #[tokio::test]
    async fn test_adjacent_directives() {
        let engine = test_engine(&calls());

        let output = engine
            .resolve(r#"{"gitdown": "test"}{"gitdown": "test"}"#)
            .await
            .unwrap();
        assert_eq!(output, "testtest");
    }

    #[tokio::test]
    async fn test_ignores_content_after_off_marker() {
        let engine = test_engine(&calls());

        let output = engine
            .resolve(r#"{"gitdown": "test"}<!-- gitdown: off -->{"gitdown": "test"}"#)
            .await
            .unwrap();
        assert_eq!(
            output,
            r#"test<!-- gitdown: off -->{"gitdown": "test"}"#
        );
    }

    #[tokio::test]
    async fn test_ignores_content_between_off_and_on_markers() {
        let calls = calls();
        let engine = test_engine(&calls);
        let input = r#"<!-- gitdown: off -->{"gitdown": "test"}<!-- gitdown: on --><!-- gitdown: off -->{"gitdown": "test"}<!-- gitdown: on -->"#;

        assert_eq!(engine.resolve(input).await.unwrap(), input);
        assert!(called(&calls).is_empty());
    }

    #[tokio::test]
    async fn test_inactive_invalid_json_is_not_validated() {
        let engine = test_engine(&calls());
        let input = r#"<!-- gitdown: off -->{"gitdown": invalid}<!-- gitdown: on -->"#;

        assert_eq!(engine.resolve(input).await.unwrap(), input);
    }

    #[tokio::test]
    async fn test_invalid_json_error() {
        let engine = test_engine(&calls());

        let err = engine.resolve(r#"{"gitdown": invalid}"#).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDirective);
        assert_eq!(err.to_string(), r#"Invalid Gitdown JSON ("{"gitdown": invalid}")."#);
    }

    #[tokio::test]
    async fn test_unknown_helper_error() {
        let engine = test_engine(&calls());

        let err = engine
            .resolve(r#"{"gitdown": "does-not-exist"}"#)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownHelper);
        assert_eq!(err.to_string(), r#"Unknown helper "does-not-exist"."#);
    }

    #[tokio::test]
    async fn test_validation_errors_precede_helper_calls() {
        let calls = calls();
        let engine = test_engine(&calls);

        let err = engine
            .resolve(r#"{"gitdown": "test"} {"gitdown": invalid}"#)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDirective);

        let err = engine
            .resolve(r#"{"gitdown": "test"} {"gitdown": "does-not-exist"}"#)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownHelper);

        assert!(called(&calls).is_empty());
    }

    #[tokio::test]
    async fn test_unknown_helper_reported_before_later_invalid_json() {
        let calls = calls();
        let engine = test_engine(&calls);
        let input = r#"{"gitdown": "test"} {"gitdown": "does-not-exist"} later {"gitdown": invalid}"#;

        let err = engine.validate(input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownHelper);

        let err = engine.resolve(input).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownHelper);
        assert_eq!(err.to_string(), r#"Unknown helper "does-not-exist"."#);

        assert!(called(&calls).is_empty());
    }

    #[tokio::test]
    async fn test_invalid_json_reported_before_later_unknown_helper() {
        let calls = calls();
        let engine = test_engine(&calls);
        let input = r#"{"gitdown": "test"} {"gitdown": invalid} later {"gitdown": "does-not-exist"}"#;

        let err = engine.validate(input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDirective);

        let err = engine.resolve(input).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDirective);
        assert!(matches!(err, Error::InvalidDirective { offset: 20, .. }));

        assert!(called(&calls).is_empty());
    }

    #[tokio::test]
    async fn test_helper_receives_options_without_discriminator() {
        let calls = calls();
        let engine = test_engine(&calls);

        engine
            .resolve(r#"{"gitdown": "test", "foo": "bar"}"#)
            .await
            .unwrap();

        let mut expected = Options::new();
        expected.insert("foo".to_owned(), "bar".into());

        let recorded = calls.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].1, expected);
    }

    #[tokio::test]
    async fn test_lowest_weight_resolves_first() {
        let calls = calls();
        let engine = Engine::new(EngineConfig::new())
            .with_helper(Recorder::new("heavy", 30, "H", &calls))
            .with_helper(Recorder::new("light", 5, "L", &calls));

        let output = engine
            .resolve(r#"{"gitdown": "heavy"} {"gitdown": "light"}"#)
            .await
            .unwrap();

        assert_eq!(output, "H L");
        assert_eq!(called(&calls), vec!["light", "heavy"]);
    }

    #[tokio::test]
    async fn test_equal_weight_resolves_leftmost_first() {
        let calls = calls();
        let engine = Engine::new(EngineConfig::new())
            .with_helper(Recorder::new("second", 10, "2", &calls))
            .with_helper(Recorder::new("first", 10, "1", &calls));

        let output = engine
            .resolve(r#"{"gitdown": "first"}{"gitdown": "second"}{"gitdown": "first"}"#)
            .await
            .unwrap();

        assert_eq!(output, "121");
        assert_eq!(called(&calls), vec!["first", "second", "first"]);
    }

    #[tokio::test]
    async fn test_descends_to_lowest_weight_after_each_pass() {
        // include (weight 20) pulls in a test (weight 10) directive.
        let config = EngineConfig::new()
            .with_base_dir("/fixtures")
            .with_read_file(|path| {
                if path.ends_with("include_test_weight_10.txt") {
                    Ok(r#"{"gitdown": "test"}"#.to_owned())
                } else {
                    Err(io::Error::new(io::ErrorKind::NotFound, "not found"))
                }
            });
        let calls = calls();
        let engine = Engine::new(config)
            .with_helper(Include)
            .with_helper(Recorder::new("test", 10, "test", &calls));

        let output = engine
            .resolve(r#"{"gitdown": "include", "file": "./include_test_weight_10.txt"}"#)
            .await
            .unwrap();

        assert_eq!(output, "test");
        assert_eq!(called(&calls), vec!["test"]);
    }

    #[tokio::test]
    async fn test_splice_preserves_surrounding_text() {
        let engine = test_engine(&calls());
        let input = "# Title\n\nBefore {\"gitdown\": \"test\"} after.\n<!-- gitdown: off -->\nraw\n";

        let output = engine.resolve(input).await.unwrap();
        assert_eq!(
            output,
            "# Title\n\nBefore test after.\n<!-- gitdown: off -->\nraw\n"
        );
    }

    #[tokio::test]
    async fn test_helper_output_markers_take_effect() {
        let calls = calls();
        let engine = Engine::new(EngineConfig::new())
            .with_helper(Recorder::new("disable", 1, "<!-- gitdown: off -->", &calls))
            .with_helper(Recorder::new("test", 10, "test", &calls));

        let output = engine
            .resolve(r#"{"gitdown": "disable"}{"gitdown": "test"}"#)
            .await
            .unwrap();

        assert_eq!(output, r#"<!-- gitdown: off -->{"gitdown": "test"}"#);
        assert_eq!(called(&calls), vec!["disable"]);
    }

    #[tokio::test]
    async fn test_idempotent_on_resolved_output() {
        let engine = test_engine(&calls());

        let once = engine
            .resolve("a {\"gitdown\": \"test\"} b")
            .await
            .unwrap();
        let twice = engine.resolve(&once).await.unwrap();

        assert_eq!(once, "a test b");
        assert_eq!(twice, once);
    }

    #[tokio::test]
    async fn test_helper_failure_propagates() {
        let config = EngineConfig::new()
            .with_read_file(|_| Err(io::Error::new(io::ErrorKind::NotFound, "not found")));
        let engine = Engine::new(config).with_helper(Include);

        let err = engine
            .resolve("intro\n\n{\"gitdown\": \"include\", \"file\": \"missing.md\"}")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Helper);
        match err {
            Error::Helper { name, line, source } => {
                assert_eq!(name, "include");
                assert_eq!(line, 3);
                assert!(matches!(source, HelperError::Io { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_pass_limit() {
        let config = EngineConfig::new().with_max_passes(Some(5));
        let engine = Engine::new(config).with_helper(Echo);

        let err = engine
            .resolve(r#"{"gitdown": "echo"}"#)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PassLimitExceeded);
        assert!(matches!(err, Error::PassLimitExceeded { limit: 5 }));
    }

    #[tokio::test]
    async fn test_pass_limit_not_hit_at_fixpoint() {
        let config = EngineConfig::new().with_max_passes(Some(2));
        let engine = Engine::new(config).with_helper(Recorder::new("test", 10, "ok", &calls()));

        let output = engine
            .resolve(r#"{"gitdown": "test"}{"gitdown": "test"}"#)
            .await
            .unwrap();
        assert_eq!(output, "okok");
    }

    #[test]
    fn test_validate_lists_directives() {
        let calls = calls();
        let engine = test_engine(&calls);

        let directives = engine
            .validate(r#"{"gitdown": "test"} and {"gitdown": "test", "n": 1}"#)
            .unwrap();

        assert_eq!(directives.len(), 2);
        assert_eq!(directives[1].options["n"], 1);
        assert!(called(&calls).is_empty());
    }

    #[test]
    fn test_resolve_future_is_send() {
        fn assert_send<T: Send>(_: &T) {}

        let engine = test_engine(&calls());
        let future = engine.resolve("text");
        assert_send(&future);
    }
}
