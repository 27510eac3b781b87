use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use fmtwatch::config::StyleOptions;
use fmtwatch::errors::{FmtwatchError, Result};
use fmtwatch::format::Formatter;

type Rule = dyn Fn(&str, &str) -> Result<String> + Send + Sync;
type Hook = dyn Fn(&str) + Send + Sync;

/// One recorded formatter invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatCall {
    pub text: String,
    pub parser: String,
}

/// An in-process formatter that:
/// - records every call (text + parser)
/// - transforms text with a configurable rule
/// - optionally runs a hook while "formatting", to simulate edits that land
///   while the formatter is busy
pub struct FakeFormatter {
    rule: Box<Rule>,
    hook: Option<Box<Hook>>,
    calls: Arc<Mutex<Vec<FormatCall>>>,
}

impl FakeFormatter {
    pub fn new<F>(rule: F) -> Self
    where
        F: Fn(&str, &str) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            rule: Box::new(rule),
            hook: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns the input unchanged.
    pub fn identity() -> Self {
        Self::new(|text, _| Ok(text.to_string()))
    }

    /// Always fails, like a formatter hitting a syntax error.
    pub fn failing() -> Self {
        Self::new(|_, parser| Err(FmtwatchError::formatter(parser, "SyntaxError: unexpected token")))
    }

    /// Normalises `a=b` to `a = b`, adds a trailing `;` and newline.
    ///
    /// `let x=1` becomes `let x = 1;\n`; already formatted text is a fixed
    /// point.
    pub fn toy_script() -> Self {
        Self::new(|text, _| {
            let mut out = String::new();
            for line in text.lines() {
                let line = line.trim_end().trim_end_matches(';');
                let spaced = line
                    .split('=')
                    .map(str::trim)
                    .collect::<Vec<_>>()
                    .join(" = ");
                if spaced.is_empty() {
                    out.push('\n');
                } else {
                    out.push_str(&spaced);
                    out.push_str(";\n");
                }
            }
            Ok(out)
        })
    }

    /// Run `hook` with the input text during every format call.
    pub fn with_hook<H>(mut self, hook: H) -> Self
    where
        H: Fn(&str) + Send + Sync + 'static,
    {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn calls(&self) -> Vec<FormatCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Formatter for FakeFormatter {
    fn format<'a>(
        &'a self,
        text: String,
        parser: &'a str,
        _style: &'a StyleOptions,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(FormatCall {
                text: text.clone(),
                parser: parser.to_string(),
            });
            if let Some(hook) = &self.hook {
                hook(&text);
            }
            (self.rule)(&text, parser)
        })
    }
}
