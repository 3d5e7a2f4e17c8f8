//! Flat string-keyed connector configuration with introspectable specs.
//!
//! Every connector declares its options as a static [`OptionSpec`] table
//! (name, kind, default, help) so an external CLI can auto-generate help
//! text. Connectors parse only their own declared keys into typed option
//! structs; the registry rejects keys unknown to every registered
//! connector.

use indexmap::IndexMap;
use regex::Regex;

use crate::errors::ImportError;

/// Flat string-keyed option map passed into a resolve call.
pub type OptionMap = IndexMap<String, String>;

/// Value kind of a declared option, for help generation and validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionKind {
    /// Plain text value.
    Text,
    /// Regular-expression pattern, compiled at connector construction.
    Pattern,
    /// Comma-separated list of column names.
    ColumnList,
}

/// Declared connector option: name, kind, default, and help text.
#[derive(Clone, Copy, Debug)]
pub struct OptionSpec {
    /// Option key in the flat map.
    pub name: &'static str,
    /// Value kind.
    pub kind: OptionKind,
    /// Default used when the key is absent.
    pub default: &'static str,
    /// Short usage description.
    pub help: &'static str,
}

/// Read a text option, falling back to `default` when absent.
pub(crate) fn text_option(options: &OptionMap, name: &str, default: &str) -> String {
    options
        .get(name)
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

/// Read and compile a pattern option, failing loudly on an invalid pattern.
pub(crate) fn pattern_option(
    options: &OptionMap,
    name: &str,
    default: &str,
) -> Result<Regex, ImportError> {
    let pattern = text_option(options, name, default);
    Regex::new(&pattern).map_err(|err| {
        ImportError::Configuration(format!("option '{name}' is not a valid pattern: {err}"))
    })
}

/// Read a comma-separated column-list option; absent or empty means "all".
pub(crate) fn column_list_option(options: &OptionMap, name: &str) -> Vec<String> {
    options
        .get(name)
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|column| !column.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Read a single-byte separator option (CSV field separators).
pub(crate) fn separator_byte_option(
    options: &OptionMap,
    name: &str,
    default: &str,
) -> Result<u8, ImportError> {
    let value = text_option(options, name, default);
    let bytes = value.as_bytes();
    if bytes.len() != 1 {
        return Err(ImportError::Configuration(format!(
            "option '{name}' must be a single character, got '{value}'"
        )));
    }
    Ok(bytes[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_option_falls_back_to_default() {
        let mut options = OptionMap::new();
        assert_eq!(text_option(&options, "text_column", "text"), "text");
        options.insert("text_column".to_string(), "body".to_string());
        assert_eq!(text_option(&options, "text_column", "text"), "body");
    }

    #[test]
    fn pattern_option_rejects_invalid_patterns() {
        let mut options = OptionMap::new();
        options.insert("conversation_pattern".to_string(), "#(".to_string());
        let err = pattern_option(&options, "conversation_pattern", r"#\w+#").unwrap_err();
        assert!(matches!(err, ImportError::Configuration(_)));
    }

    #[test]
    fn column_list_option_splits_and_trims() {
        let mut options = OptionMap::new();
        options.insert("metadata_columns".to_string(), "date, author,".to_string());
        assert_eq!(
            column_list_option(&options, "metadata_columns"),
            vec!["date".to_string(), "author".to_string()]
        );
        assert!(column_list_option(&options, "missing").is_empty());
    }

    #[test]
    fn separator_byte_option_requires_one_character() {
        let mut options = OptionMap::new();
        assert_eq!(separator_byte_option(&options, "csv_separator", ",").unwrap(), b',');
        options.insert("csv_separator".to_string(), "||".to_string());
        assert!(matches!(
            separator_byte_option(&options, "csv_separator", ","),
            Err(ImportError::Configuration(_))
        ));
    }
}
