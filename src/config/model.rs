// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

/// Flat formatter options object (prettier-style camelCase keys).
///
/// Built once per run from the built-in defaults plus whatever the nearest
/// config file provides, then handed to every formatter call.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleOptions {
    values: Map<String, Value>,
    /// Executable config the formatter must load itself.
    script_config: Option<PathBuf>,
}

impl StyleOptions {
    /// The built-in defaults: single quotes, tabs, tab width 4.
    pub fn defaults() -> Self {
        let mut values = Map::new();
        values.insert("singleQuote".to_string(), Value::Bool(true));
        values.insert("useTabs".to_string(), Value::Bool(true));
        values.insert("tabWidth".to_string(), Value::from(4));
        Self {
            values,
            script_config: None,
        }
    }

    /// Defaults overlaid with a discovered config (if any).
    pub fn from_discovered(discovered: Option<DiscoveredConfig>) -> Self {
        let mut options = Self::defaults();
        if let Some(discovered) = discovered {
            match discovered.source {
                ConfigSource::Options(values) => options.merge(values),
                ConfigSource::Script => options.script_config = Some(discovered.path),
            }
        }
        options
    }

    /// Overlay `overrides` on top of the current values; overrides win.
    pub fn merge(&mut self, overrides: Map<String, Value>) {
        for (key, value) in overrides {
            self.values.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn script_config(&self) -> Option<&PathBuf> {
        self.script_config.as_ref()
    }
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::defaults()
    }
}

/// How a candidate config file is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    /// `package.json`, using its `"prettier"` field.
    PackageField,
    /// Extension-less `.prettierrc`: JSON5, then YAML, then TOML.
    AnyData,
    /// JavaScript config; only the formatter can evaluate it.
    Script,
    Json5,
    Yaml,
    Toml,
}

/// Candidate file names checked in every directory, in precedence order.
pub const CONFIG_CANDIDATES: &[(&str, CandidateKind)] = &[
    ("package.json", CandidateKind::PackageField),
    (".prettierrc", CandidateKind::AnyData),
    (".prettierrc.js", CandidateKind::Script),
    (".prettierrc.cjs", CandidateKind::Script),
    ("prettier.config.js", CandidateKind::Script),
    ("prettier.config.cjs", CandidateKind::Script),
    (".prettierrc.json", CandidateKind::Json5),
    (".prettierrc.json5", CandidateKind::Json5),
    (".prettierrc.yaml", CandidateKind::Yaml),
    (".prettierrc.yml", CandidateKind::Yaml),
    (".prettierrc.toml", CandidateKind::Toml),
];

/// What a usable config file contributed.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    Options(Map<String, Value>),
    Script,
}

/// The first usable config file found while walking up from the start dir.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredConfig {
    pub path: PathBuf,
    pub source: ConfigSource,
}

/// The slice of `package.json` we care about.
#[derive(Debug, Deserialize)]
pub(crate) struct PackageManifest {
    #[serde(default)]
    pub prettier: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn discovered_values_override_defaults() {
        let mut overrides = Map::new();
        overrides.insert("tabWidth".to_string(), json!(2));
        overrides.insert("semi".to_string(), json!(false));

        let options = StyleOptions::from_discovered(Some(DiscoveredConfig {
            path: PathBuf::from("/proj/.prettierrc"),
            source: ConfigSource::Options(overrides),
        }));

        assert_eq!(options.get("tabWidth"), Some(&json!(2)));
        assert_eq!(options.get("semi"), Some(&json!(false)));
        assert_eq!(options.get("singleQuote"), Some(&json!(true)));
        assert_eq!(options.get("useTabs"), Some(&json!(true)));
        assert!(options.script_config().is_none());
    }

    #[test]
    fn script_configs_keep_defaults_and_record_path() {
        let options = StyleOptions::from_discovered(Some(DiscoveredConfig {
            path: PathBuf::from("/proj/prettier.config.js"),
            source: ConfigSource::Script,
        }));
        assert_eq!(options.values(), StyleOptions::defaults().values());
        assert_eq!(
            options.script_config(),
            Some(&PathBuf::from("/proj/prettier.config.js"))
        );
    }
}
