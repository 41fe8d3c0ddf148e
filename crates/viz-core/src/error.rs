//! Error taxonomy for chart preparation and reloads.
//!
//! Nothing here is fatal to the page: callers log the error and keep the
//! previous render of the affected instance.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Malformed config JSON: {source}")]
    ConfigParse {
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed dataset JSON: {source}")]
    DatasetParse {
        #[source]
        source: serde_json::Error,
    },

    #[error("Config does not match the {kind} template: {source}")]
    ConfigShape {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Container already hosts chart {0}")]
    DuplicateInit(String),

    #[error("Unknown chart kind: {0}")]
    UnknownChartKind(String),

    #[error("No chart instance registered under {0}")]
    UnknownInstance(String),

    #[error("Container is missing the `{0}` attribute")]
    MissingAttribute(&'static str),
}

impl ChartError {
    /// Parse failures leave the last good render in place
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::ConfigParse { .. } | Self::DatasetParse { .. })
    }
}

pub type Result<T> = std::result::Result<T, ChartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_classification() {
        let source = serde_json::from_str::<serde_json::Value>("{bad").unwrap_err();
        let err = ChartError::ConfigParse { source };
        assert!(err.is_parse_error());
        assert!(err.to_string().starts_with("Malformed config JSON"));

        let dup = ChartError::DuplicateInit("abc".into());
        assert!(!dup.is_parse_error());
        assert_eq!(dup.to_string(), "Container already hosts chart abc");
    }
}
