//! Template rendering for tokenized document values.
//!
//! A value node's template string is rendered against a flat scope of
//! already-evaluated variables. Rendering is delegated to `minijinja`;
//! undefined variables render as empty per the engine's own semantics,
//! which the evaluation engine relies on for optional substitutions.

use minijinja::Environment;
use serde_json::{Map, Value};

use crate::document::scalar_string;

/// Renders a template value against a variable scope.
///
/// Non-string values are stringified before rendering, and the rendered
/// result is trimmed of surrounding whitespace.
///
/// # Errors
///
/// Returns the underlying render error for malformed template syntax.
///
/// # Examples
///
/// ```
/// use serde_json::{json, Map};
/// use strata::template::render;
///
/// let mut scope = Map::new();
/// scope.insert("region".to_string(), json!("us-east-1"));
///
/// let rendered = render(&json!("  {{ region }}-a  "), &scope).unwrap();
/// assert_eq!(rendered, "us-east-1-a");
/// ```
pub fn render(template: &Value, scope: &Map<String, Value>) -> Result<String, minijinja::Error> {
    let source = match template {
        Value::String(s) => s.clone(),
        other => scalar_string(other),
    };
    let env = Environment::new();
    let rendered = env.render_str(&source, scope)?;
    Ok(rendered.trim().to_string())
}
