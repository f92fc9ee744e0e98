//! Stencil Render
//!
//! Thin adapter over the Handlebars engine: compile a template string and
//! render it against a JSON data object, with optional custom helper
//! functions scoped to the single call.
//!
//! Each call builds its own engine registry, so helpers registered for
//! one render never leak into another.

use std::collections::HashMap;
use std::sync::Arc;

use handlebars::{Context, Handlebars, Helper, HelperDef, RenderContext, ScopedJson};
use serde_json::Value;

/// A custom helper: receives the evaluated positional arguments and
/// produces a value.
pub type HelperFn = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Per-call rendering options.
#[derive(Default, Clone)]
pub struct InterpolateOptions {
    pub helpers: HashMap<String, HelperFn>,
}

impl InterpolateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a helper under `name`.
    pub fn helper<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.helpers.insert(name.to_string(), Arc::new(f));
        self
    }
}

/// Rendering failure, either at template compile time or while
/// evaluating it against the data.
#[derive(Debug, thiserror::Error)]
#[error("Render error: {source}")]
pub struct RenderError {
    #[from]
    source: handlebars::RenderError,
}

/// Render `content` against `variables`.
///
/// With no data object the template is returned unchanged; interpolation
/// without variables has nothing to substitute.
pub fn interpolate(
    content: &str,
    variables: Option<&Value>,
    options: Option<&InterpolateOptions>,
) -> Result<String, RenderError> {
    let Some(data) = variables else {
        return Ok(content.to_string());
    };

    let mut registry = Handlebars::new();
    if let Some(options) = options {
        for (name, func) in &options.helpers {
            registry.register_helper(name, Box::new(ValueHelper(func.clone())));
        }
    }

    let rendered = registry.render_template(content, data)?;
    Ok(rendered)
}

/// Adapts a plain value-producing closure to the engine's helper trait.
struct ValueHelper(HelperFn);

impl HelperDef for ValueHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, handlebars::RenderError> {
        let args: Vec<Value> = h.params().iter().map(|p| p.value().clone()).collect();
        Ok(ScopedJson::Derived((self.0)(&args)))
    }
}
