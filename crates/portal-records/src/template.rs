//! Request-body templates.
//!
//! Request bodies are JSON documents with mustache-style placeholders. The
//! renderer is pluggable through [`TemplateRenderer`]; [`MustacheRenderer`]
//! covers the variable subset of mustache that body templates use:
//!
//! - `{{name}}` substitutes the value, HTML-escaped
//! - `{{{name}}}` and `{{& name}}` substitute the value unescaped
//! - `{{! comment}}` renders nothing
//! - `{{a.b}}` walks nested objects
//!
//! Missing and `null` values render as the empty string. Sections and
//! partials are not supported and fail with `InvalidInput`.

use std::path::Path;
use std::sync::LazyLock;

use portal_api_client::ERROR_LOG_TARGET;
use regex_lite::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, ErrorKind, Result};

/// Renders a template against a context.
pub trait TemplateRenderer: Send + Sync {
    /// Render `template`, substituting values from `context`.
    fn render(&self, template: &str, context: &TemplateContext) -> Result<String>;
}

/// Values available to a template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateContext {
    values: Map<String, Value>,
}

impl TemplateContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from caller values.
    ///
    /// `values` must serialize to a JSON object or to `null` (empty context).
    pub fn from_values<T: Serialize + ?Sized>(values: &T) -> Result<Self> {
        match serde_json::to_value(values)? {
            Value::Object(values) => Ok(Self { values }),
            Value::Null => Ok(Self::default()),
            other => Err(Error::new(ErrorKind::InvalidInput(format!(
                "template values must be a JSON object, got {}",
                json_type(&other)
            )))),
        }
    }

    /// Set a value, replacing any existing one under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a (possibly dotted) name.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        let mut parts = name.split('.');
        let mut current = self.values.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// The underlying values.
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }
}

/// Mustache variable renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MustacheRenderer;

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{\{\s*(.*?)\s*\}\}\}|\{\{\s*([!&#^/>=]?)\s*(.*?)\s*\}\}")
        .expect("static tag pattern is valid")
});

impl TemplateRenderer for MustacheRenderer {
    fn render(&self, template: &str, context: &TemplateContext) -> Result<String> {
        let mut out = String::with_capacity(template.len());
        let mut last = 0;

        for caps in TAG.captures_iter(template) {
            let Some(whole) = caps.get(0) else { continue };
            let literal = &template[last..whole.start()];
            check_literal(literal)?;
            out.push_str(literal);
            last = whole.end();

            if let Some(name) = caps.get(1) {
                out.push_str(&value_text(context.lookup(name.as_str())));
                continue;
            }

            let sigil = caps.get(2).map_or("", |m| m.as_str());
            let name = caps.get(3).map_or("", |m| m.as_str());
            match sigil {
                "!" => {}
                "&" => out.push_str(&value_text(context.lookup(name))),
                "" => out.push_str(&escape_html(&value_text(context.lookup(name)))),
                other => {
                    return Err(Error::new(ErrorKind::InvalidInput(format!(
                        "unsupported template tag '{{{{{other}{name}}}}}'"
                    ))))
                }
            }
        }

        let tail = &template[last..];
        check_literal(tail)?;
        out.push_str(tail);
        Ok(out)
    }
}

/// How much of a malformed body goes into the error log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetPolicy {
    /// At most this many characters.
    Truncated(usize),
    /// The whole body.
    Full,
}

impl SnippetPolicy {
    /// Policy for search bodies.
    pub const READ: Self = SnippetPolicy::Truncated(80);
    /// Policy for insert/update bodies.
    pub const WRITE: Self = SnippetPolicy::Full;

    /// Cut `body` down according to the policy.
    pub fn snippet(self, body: &str) -> String {
        match self {
            SnippetPolicy::Truncated(max) => body.chars().take(max).collect(),
            SnippetPolicy::Full => body.to_string(),
        }
    }
}

/// Read a template file and render it into a JSON request body.
///
/// The file is read on every call. A missing file is `TemplateMissing`; a
/// rendered body that is not valid JSON is `MalformedBody`. Both are
/// written to the error log.
pub async fn render_file(
    renderer: &dyn TemplateRenderer,
    path: &Path,
    context: &TemplateContext,
    policy: SnippetPolicy,
) -> Result<String> {
    let template = match tokio::fs::read_to_string(path).await {
        Ok(template) => template,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(target: ERROR_LOG_TARGET, path = %path.display(), "JSON: The file does not exist");
            return Err(Error::with_source(
                ErrorKind::TemplateMissing {
                    path: path.display().to_string(),
                },
                e,
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let body = renderer.render(&template, context)?;

    if let Err(e) = serde_json::from_str::<serde::de::IgnoredAny>(&body) {
        let snippet = policy.snippet(&body);
        debug!(target: ERROR_LOG_TARGET, "JSON: Not valid JSON{}...", snippet);
        return Err(Error::with_source(ErrorKind::MalformedBody { snippet }, e));
    }

    Ok(body)
}

fn check_literal(literal: &str) -> Result<()> {
    if literal.contains("{{") {
        return Err(Error::new(ErrorKind::InvalidInput(
            "unterminated template tag".to_string(),
        )));
    }
    Ok(())
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
