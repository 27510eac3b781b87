// src/config/loader.rs

use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::config::model::{
    CandidateKind, ConfigSource, DiscoveredConfig, PackageManifest, StyleOptions,
    CONFIG_CANDIDATES,
};
use crate::errors::{FmtwatchError, Result};
use crate::fs::FileSystem;

/// Walk upward from `start` and return the first usable config file.
///
/// In each directory the candidates in [`CONFIG_CANDIDATES`] are tried in
/// order; the nearest directory with a usable candidate wins and the search
/// stops there. Candidates that fail to read or parse, or that parse to
/// something other than an object, are skipped.
pub fn discover_config(fs: &dyn FileSystem, start: &Path) -> Option<DiscoveredConfig> {
    for dir in start.ancestors() {
        for (name, kind) in CONFIG_CANDIDATES {
            let path = dir.join(name);
            if !fs.is_file(&path) {
                continue;
            }
            match load_candidate(fs, &path, *kind) {
                Ok(Some(source)) => {
                    debug!(?path, "using formatter config");
                    return Some(DiscoveredConfig { path, source });
                }
                Ok(None) => debug!(?path, "config candidate has no usable options"),
                Err(err) => debug!(?path, error = %err, "skipping unparsable config candidate"),
            }
        }
    }
    None
}

/// Discover the nearest config from `start` and merge it over the defaults.
pub fn load_style_options(fs: &dyn FileSystem, start: &Path) -> StyleOptions {
    let discovered = discover_config(fs, start);
    match &discovered {
        Some(found) => info!(path = ?found.path, "loaded formatter config"),
        None => info!("no formatter config found; using defaults"),
    }
    StyleOptions::from_discovered(discovered)
}

/// Interpret a single candidate file.
///
/// `Ok(None)` means the file parsed but holds no options object.
pub fn load_candidate(
    fs: &dyn FileSystem,
    path: &Path,
    kind: CandidateKind,
) -> Result<Option<ConfigSource>> {
    if kind == CandidateKind::Script {
        return Ok(Some(ConfigSource::Script));
    }

    let text = fs.read_to_string(path)?;
    let parsed = match kind {
        CandidateKind::PackageField => {
            let manifest: PackageManifest = serde_json::from_str(&text)?;
            manifest.prettier.and_then(into_object)
        }
        CandidateKind::Json5 => into_object(parse_json5(&text)?),
        CandidateKind::Yaml => into_object(serde_yaml_ng::from_str(&text)?),
        CandidateKind::Toml => Some(toml::from_str::<Map<String, Value>>(&text)?),
        CandidateKind::AnyData => parse_any(&text),
        CandidateKind::Script => None,
    };
    Ok(parsed.map(ConfigSource::Options))
}

/// Try each data format in turn; the first one yielding an object wins.
fn parse_any(text: &str) -> Option<Map<String, Value>> {
    if let Some(map) = parse_json5(text).ok().and_then(into_object) {
        return Some(map);
    }
    if let Some(map) = serde_yaml_ng::from_str::<Value>(text).ok().and_then(into_object) {
        return Some(map);
    }
    toml::from_str::<Map<String, Value>>(text).ok()
}

fn parse_json5(text: &str) -> Result<Value> {
    json5::from_str(text).map_err(|e| FmtwatchError::ConfigError(format!("invalid JSON5: {e}")))
}

fn into_object(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use serde_json::json;
    use std::path::PathBuf;

    fn options_of(found: Option<DiscoveredConfig>) -> Map<String, Value> {
        match found.map(|f| f.source) {
            Some(ConfigSource::Options(map)) => map,
            other => panic!("expected options, got {other:?}"),
        }
    }

    #[test]
    fn package_json_field_is_used() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "/proj/package.json",
            r#"{ "name": "demo", "prettier": { "semi": false } }"#,
        );

        let found = discover_config(&fs, Path::new("/proj"));
        assert_eq!(options_of(found)["semi"], json!(false));
    }

    #[test]
    fn package_json_without_field_falls_through_to_rc_files() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/package.json", r#"{ "name": "demo" }"#);
        fs.add_file("/proj/.prettierrc.yaml", "printWidth: 100\n");

        let found = discover_config(&fs, Path::new("/proj")).unwrap();
        assert_eq!(found.path, PathBuf::from("/proj/.prettierrc.yaml"));
        assert_eq!(options_of(Some(found))["printWidth"], json!(100));
    }

    #[test]
    fn extensionless_rc_accepts_json5_yaml_and_toml() {
        for (body, key, expected) in [
            ("{ semi: false, // comment\n }", "semi", json!(false)),
            ("tabWidth: 2\n", "tabWidth", json!(2)),
            ("printWidth = 120\n", "printWidth", json!(120)),
        ] {
            let fs = MockFileSystem::new();
            fs.add_file("/proj/.prettierrc", body);
            let found = discover_config(&fs, Path::new("/proj"));
            assert_eq!(options_of(found)[key], expected, "body: {body}");
        }
    }

    #[test]
    fn nearest_directory_wins() {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/.prettierrc.json", r#"{ "tabWidth": 8 }"#);
        fs.add_file("/repo/web/.prettierrc.toml", "tabWidth = 3\n");
        fs.add_dir("/repo/web/src");

        let found = discover_config(&fs, Path::new("/repo/web/src")).unwrap();
        assert_eq!(found.path, PathBuf::from("/repo/web/.prettierrc.toml"));

        let found = discover_config(&fs, Path::new("/repo")).unwrap();
        assert_eq!(found.path, PathBuf::from("/repo/.prettierrc.json"));
    }

    #[test]
    fn broken_candidate_is_skipped_for_next_one() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/.prettierrc.json", "{ not valid");
        fs.add_file("/proj/.prettierrc.yml", "semi: false\n");

        let found = discover_config(&fs, Path::new("/proj")).unwrap();
        assert_eq!(found.path, PathBuf::from("/proj/.prettierrc.yml"));
    }

    #[test]
    fn script_config_is_passed_through() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/prettier.config.js", "module.exports = {};");

        let found = discover_config(&fs, Path::new("/proj")).unwrap();
        assert_eq!(found.source, ConfigSource::Script);
    }

    #[test]
    fn no_config_means_defaults() {
        let fs = MockFileSystem::new();
        fs.add_dir("/proj");

        assert!(discover_config(&fs, Path::new("/proj")).is_none());
        assert_eq!(
            load_style_options(&fs, Path::new("/proj")),
            StyleOptions::defaults()
        );
    }
}
