use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DiffError, DiffResult};
use crate::filter::IgnoreRules;
use crate::options::DiffOptions;

/// Declarative diff configuration, typically read from a TOML file.
///
/// ```toml
/// order_independent = true
/// ignore = ["meta.updated_at", "users.*.password"]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Compare sequences as unordered collections.
    pub order_independent: bool,
    /// Dotted path patterns whose nodes are never compared.
    pub ignore: Vec<String>,
}

impl DiffConfig {
    /// A configuration that treats every sequence as unordered.
    pub fn order_independent() -> Self {
        Self {
            order_independent: true,
            ..Default::default()
        }
    }

    pub fn from_toml_str(text: &str) -> DiffResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> DiffResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DiffError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Compile the `ignore` patterns.
    pub fn ignore_rules(&self) -> DiffResult<IgnoreRules> {
        IgnoreRules::parse(self.ignore.as_slice())
    }

    /// Per-call options for this configuration, using compiled `rules`.
    pub fn options<'a>(&self, rules: &'a IgnoreRules) -> DiffOptions<'a> {
        let options = DiffOptions::new().with_order_independent(self.order_independent);
        if rules.is_empty() {
            options
        } else {
            options.with_prefilter(rules)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_compare_in_order_without_filters() {
        let config = DiffConfig::default();
        let rules = config.ignore_rules().unwrap();
        let options = config.options(&rules);
        assert!(!options.order_independent);
        assert!(options.prefilter.is_none());
    }

    #[test]
    fn parses_toml() {
        let config = DiffConfig::from_toml_str(
            "order_independent = true\nignore = [\"a.b\", \"c\"]\n",
        )
        .unwrap();
        assert_eq!(
            config,
            DiffConfig {
                order_independent: true,
                ignore: vec!["a.b".into(), "c".into()],
            }
        );
        let rules = config.ignore_rules().unwrap();
        assert!(config.options(&rules).prefilter.is_some());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config = DiffConfig::from_toml_str("ignore = [\"x\"]").unwrap();
        assert!(!config.order_independent);
        assert_eq!(DiffConfig::from_toml_str("").unwrap(), DiffConfig::default());
    }

    #[test]
    fn rejects_bad_toml() {
        assert!(matches!(
            DiffConfig::from_toml_str("order_independent = \"yes\""),
            Err(DiffError::Config(_))
        ));
    }

    #[test]
    fn bad_pattern_surfaces_when_compiled() {
        let config = DiffConfig {
            ignore: vec!["a.".into()],
            ..Default::default()
        };
        assert!(config.ignore_rules().is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "order_independent = true").unwrap();
        let config = DiffConfig::load(file.path()).unwrap();
        assert_eq!(config, DiffConfig::order_independent());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DiffConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, DiffError::Io { .. }));
    }
}
