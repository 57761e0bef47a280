//! Option accessors shared by the helpers.

use gitdown_engine::{HelperError, Options};

/// Get a required string option.
pub(crate) fn required_str<'a>(
    options: &'a Options,
    name: &'static str,
) -> Result<&'a str, HelperError> {
    match options.get(name) {
        None => Err(HelperError::MissingOption(name)),
        Some(value) => value.as_str().ok_or_else(|| HelperError::InvalidOption {
            name,
            message: format!("expected a string, got {value}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn options(value: serde_json::Value) -> Options {
        match value {
            serde_json::Value::Object(map) => map,
            _ => Options::new(),
        }
    }

    #[test]
    fn test_required_str_present() {
        let opts = options(json!({"file": "README.md"}));
        assert_eq!(required_str(&opts, "file").unwrap(), "README.md");
    }

    #[test]
    fn test_required_str_missing() {
        let opts = Options::new();
        let err = required_str(&opts, "file").unwrap_err();
        assert!(matches!(err, HelperError::MissingOption("file")));
    }

    #[test]
    fn test_required_str_wrong_type() {
        let opts = options(json!({"file": 3}));
        let err = required_str(&opts, "file").unwrap_err();
        assert_eq!(err.to_string(), r#"invalid option "file": expected a string, got 3"#);
    }
}
