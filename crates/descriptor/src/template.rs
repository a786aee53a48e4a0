// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt template compilation.
//!
//! Two syntactic forms: `{{dotted.variable}}` substitution against a JSON
//! context, and the `{{include uri key=value}}` / `{{rawInclude uri}}`
//! helpers. Unknown variables stay verbatim; helper failures render as
//! inline error markers so the subprocess sees them instead of the
//! dispatch aborting.

use regex::Regex;
use relay_core::Clock;
use relay_resource::{resolve_relative, ResourceLoader};
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::LazyLock;

/// Maximum nesting depth of the include tree.
pub const MAX_INCLUDE_DEPTH: usize = 10;

// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static HELPER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*(include|rawInclude)\s+([^}]+?)\s*\}\}")
        .expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_.-]*)\s*\}\}")
        .expect("constant regex pattern is valid")
});

/// Compiles prompt templates, fetching includes through the loader.
pub struct TemplateEngine<'a, C: Clock> {
    loader: &'a ResourceLoader<C>,
}

impl<'a, C: Clock> TemplateEngine<'a, C> {
    pub fn new(loader: &'a ResourceLoader<C>) -> Self {
        Self { loader }
    }

    /// Compile a template body against a JSON context. `base_uri` anchors
    /// relative include targets.
    pub async fn compile(&self, body: &str, context: &Value, base_uri: &str) -> String {
        let mut active = Vec::new();
        self.compile_inner(body, context, base_uri, &mut active, 0).await
    }

    fn compile_inner<'b>(
        &'b self,
        body: &'b str,
        context: &'b Value,
        base_uri: &'b str,
        active: &'b mut Vec<String>,
        depth: usize,
    ) -> Pin<Box<dyn Future<Output = String> + Send + 'b>> {
        Box::pin(async move {
            let expanded = self.expand_helpers(body, context, base_uri, active, depth).await;
            substitute_vars(&expanded, context)
        })
    }

    async fn expand_helpers(
        &self,
        body: &str,
        context: &Value,
        base_uri: &str,
        active: &mut Vec<String>,
        depth: usize,
    ) -> String {
        let mut output = String::with_capacity(body.len());
        let mut cursor = 0;

        for captures in HELPER_PATTERN.captures_iter(body).collect::<Vec<_>>() {
            let whole = match captures.get(0) {
                Some(m) => m,
                None => continue,
            };
            output.push_str(&body[cursor..whole.start()]);
            cursor = whole.end();

            let helper = &captures[1];
            let (uri_arg, params) = parse_helper_args(&captures[2]);
            let uri = resolve_relative(&uri_arg, base_uri);

            let rendered = match helper {
                "rawInclude" => self.render_raw(&uri).await,
                _ => {
                    self.render_include(&uri, params, context, base_uri, active, depth)
                        .await
                }
            };
            output.push_str(&rendered);
        }
        output.push_str(&body[cursor..]);
        output
    }

    async fn render_raw(&self, uri: &str) -> String {
        match self.loader.load_utf8(uri).await {
            Ok(Some(content)) => content,
            Ok(None) => error_marker(&format!("include not found: {uri}")),
            Err(e) => error_marker(&format!("include failed: {e}")),
        }
    }

    async fn render_include(
        &self,
        uri: &str,
        params: Map<String, Value>,
        context: &Value,
        parent_uri: &str,
        active: &mut Vec<String>,
        depth: usize,
    ) -> String {
        if depth >= MAX_INCLUDE_DEPTH {
            return error_marker(&format!("include depth limit reached at {uri}"));
        }
        if active.iter().any(|a| a == uri) {
            return error_marker(&format!("circular include: {uri}"));
        }
        let content = match self.loader.load_utf8(uri).await {
            Ok(Some(content)) => content,
            Ok(None) => return error_marker(&format!("include not found: {uri}")),
            Err(e) => return error_marker(&format!("include failed: {e}")),
        };

        let merged = merged_context(context, params, parent_uri, uri, depth + 1);
        active.push(uri.to_string());
        let rendered = self
            .compile_inner(&content, &merged, uri, active, depth + 1)
            .await;
        active.pop();
        rendered
    }
}

/// Split helper arguments into the target URI and `key=value` params.
fn parse_helper_args(raw: &str) -> (String, Map<String, Value>) {
    let mut parts = raw.split_whitespace();
    let uri = parts.next().unwrap_or_default();
    let mut params = Map::new();
    for part in parts {
        if let Some((key, value)) = part.split_once('=') {
            params.insert(key.to_string(), Value::String(unquote(value).to_string()));
        }
    }
    (unquote(uri).to_string(), params)
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(s)
}

fn merged_context(
    parent: &Value,
    params: Map<String, Value>,
    parent_uri: &str,
    uri: &str,
    depth: usize,
) -> Value {
    let mut merged = match parent {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    for (key, value) in params {
        merged.insert(key, value);
    }
    merged.insert(
        "_includeSource".to_string(),
        Value::String(parent_uri.to_string()),
    );
    merged.insert("_includeDepth".to_string(), Value::from(depth));
    merged.insert("_baseUri".to_string(), Value::String(uri.to_string()));
    Value::Object(merged)
}

/// Replace `{{dotted.path}}` expressions without helper expansion.
///
/// Used for command-line templates, which never include files.
pub fn render_vars(body: &str, context: &Value) -> String {
    substitute_vars(body, context)
}

/// Replace `{{dotted.path}}` expressions; unknown paths stay verbatim.
fn substitute_vars(body: &str, context: &Value) -> String {
    VAR_PATTERN
        .replace_all(body, |captures: &regex::Captures| {
            let path = &captures[1];
            match lookup(context, path) {
                Some(value) => render_value(value),
                None => captures[0].to_string(),
            }
        })
        .to_string()
}

fn lookup<'v>(context: &'v Value, dotted: &str) -> Option<&'v Value> {
    let mut current = context;
    for key in dotted.split('.') {
        current = current.get(key)?;
    }
    Some(current)
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

fn error_marker(message: &str) -> String {
    format!("[template error: {message}]")
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
