// src/format/command.rs

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::config::StyleOptions;
use crate::errors::{FmtwatchError, Result};
use crate::format::Formatter;

/// Formatter backed by an external prettier-compatible executable.
///
/// The text goes in on stdin and the formatted text comes back on stdout.
/// Options are passed as CLI flags so the process never goes looking for its
/// own config files; a discovered JavaScript config is handed over explicitly.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: String,
}

impl CommandFormatter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, text: String, parser: &str, style: &StyleOptions) -> Result<String> {
        let args = build_args(parser, style);
        debug!(program = %self.program, ?args, "invoking formatter");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                FmtwatchError::formatter(parser, format!("spawning {}: {e}", self.program))
            })?;

        // Feed stdin from a separate task so a large output can't deadlock
        // against a full stdin pipe.
        let stdin_writer = child.stdin.take().map(|mut stdin| {
            tokio::spawn(async move {
                let res = stdin.write_all(text.as_bytes()).await;
                drop(stdin);
                res
            })
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| FmtwatchError::formatter(parser, format!("waiting for formatter: {e}")))?;

        if let Some(writer) = stdin_writer {
            if let Ok(Err(err)) = writer.await {
                trace!(error = %err, "formatter closed stdin early");
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FmtwatchError::formatter(
                parser,
                format!("exit status {}: {}", output.status, stderr.trim()),
            ));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| FmtwatchError::formatter(parser, format!("non UTF-8 output: {e}")))
    }
}

impl Formatter for CommandFormatter {
    fn format<'a>(
        &'a self,
        text: String,
        parser: &'a str,
        style: &'a StyleOptions,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(self.run(text, parser, style))
    }
}

/// Translate a parser id and style options into formatter CLI arguments.
///
/// `tabWidth: 4` becomes `--tab-width 4`, `singleQuote: true` becomes
/// `--single-quote`, `semi: false` becomes `--no-semi`. Array and object
/// values have no flag form and are skipped.
pub fn build_args(parser: &str, style: &StyleOptions) -> Vec<String> {
    let mut args = vec!["--parser".to_string(), parser.to_string()];

    for (key, value) in style.values() {
        let flag = kebab_case(key);
        match value {
            Value::Bool(true) => args.push(format!("--{flag}")),
            Value::Bool(false) => args.push(format!("--no-{flag}")),
            Value::Number(n) => {
                args.push(format!("--{flag}"));
                args.push(n.to_string());
            }
            Value::String(s) => {
                args.push(format!("--{flag}"));
                args.push(s.clone());
            }
            Value::Null | Value::Array(_) | Value::Object(_) => {
                trace!(key = %key, "option has no CLI form; skipping");
            }
        }
    }

    match style.script_config() {
        Some(path) => {
            args.push("--config".to_string());
            args.push(path.to_string_lossy().into_owned());
            args.push("--config-precedence".to_string());
            args.push("file-override".to_string());
        }
        None => args.push("--no-config".to_string()),
    }
    args.push("--no-editorconfig".to_string());
    args
}

fn kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigSource, DiscoveredConfig};
    use serde_json::{json, Map};
    use std::path::PathBuf;

    #[test]
    fn default_options_become_flags() {
        let args = build_args("babel-ts", &StyleOptions::defaults());
        assert_eq!(&args[..2], ["--parser", "babel-ts"]);
        assert!(args.contains(&"--single-quote".to_string()));
        assert!(args.contains(&"--use-tabs".to_string()));
        let tab = args.iter().position(|a| a == "--tab-width").unwrap();
        assert_eq!(args[tab + 1], "4");
        assert!(args.contains(&"--no-config".to_string()));
    }

    #[test]
    fn false_and_string_values() {
        let mut overrides = Map::new();
        overrides.insert("semi".to_string(), json!(false));
        overrides.insert("trailingComma".to_string(), json!("all"));
        overrides.insert("overrides".to_string(), json!([]));
        let style = StyleOptions::from_discovered(Some(DiscoveredConfig {
            path: PathBuf::from("/proj/.prettierrc"),
            source: ConfigSource::Options(overrides),
        }));

        let args = build_args("css", &style);
        assert!(args.contains(&"--no-semi".to_string()));
        let pos = args.iter().position(|a| a == "--trailing-comma").unwrap();
        assert_eq!(args[pos + 1], "all");
        assert!(!args.iter().any(|a| a == "--overrides"));
    }

    #[test]
    fn script_config_is_forwarded() {
        let style = StyleOptions::from_discovered(Some(DiscoveredConfig {
            path: PathBuf::from("/proj/prettier.config.js"),
            source: ConfigSource::Script,
        }));
        let args = build_args("babel", &style);
        let pos = args.iter().position(|a| a == "--config").unwrap();
        assert_eq!(args[pos + 1], "/proj/prettier.config.js");
        assert!(args.contains(&"file-override".to_string()));
        assert!(!args.contains(&"--no-config".to_string()));
    }

    #[test]
    fn kebab_case_conversion() {
        assert_eq!(kebab_case("singleQuote"), "single-quote");
        assert_eq!(kebab_case("printWidth"), "print-width");
        assert_eq!(kebab_case("semi"), "semi");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn external_process_output_is_returned() {
        // Ignores every flag and echoes stdin back.
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-prettier");
        std::fs::write(&script, "#!/bin/sh\ncat\n").unwrap();
        make_executable(&script);

        let formatter = CommandFormatter::new(script.to_string_lossy());
        let out = formatter
            .format("let x = 1;\n".to_string(), "babel", &StyleOptions::defaults())
            .await
            .unwrap();
        assert_eq!(out, "let x = 1;\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_process_is_a_formatter_error() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("broken-prettier");
        std::fs::write(&script, "#!/bin/sh\necho 'SyntaxError: nope' >&2\nexit 2\n").unwrap();
        make_executable(&script);

        let formatter = CommandFormatter::new(script.to_string_lossy());
        let err = formatter
            .format("let x=".to_string(), "babel", &StyleOptions::defaults())
            .await
            .unwrap_err();
        match err {
            FmtwatchError::FormatterError { parser, message } => {
                assert_eq!(parser, "babel");
                assert!(message.contains("SyntaxError"));
            }
            other => panic!("expected FormatterError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_a_formatter_error() {
        let formatter = CommandFormatter::new("definitely-not-a-formatter-binary");
        let res = formatter
            .format("x".to_string(), "json", &StyleOptions::defaults())
            .await;
        assert!(matches!(res, Err(FmtwatchError::FormatterError { .. })));
    }

    #[cfg(unix)]
    fn make_executable(path: &std::path::Path) {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms).unwrap();
    }
}
