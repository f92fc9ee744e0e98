//! WASM bindings for the Stencil template tools.
//!
//! Exposes `tokenize()`, `extract()` and `interpolate()` to JavaScript
//! via wasm-bindgen. Structured results cross the boundary as plain JS
//! objects; failures throw.

use wasm_bindgen::prelude::*;

/// Tokenize a template into highlight tokens.
///
/// Returns a JS array of `{ type, value, start, end }` objects whose
/// values concatenate back to the input.
#[wasm_bindgen]
pub fn tokenize(source: &str) -> Result<JsValue, JsError> {
    let tokens = stencil_highlight::tokenize(source);
    serde_wasm_bindgen::to_value(&tokens).map_err(|e| JsError::new(&e.to_string()))
}

/// Extract the variables a template references.
///
/// Returns a JS object `{ variables, rootVariables }`.
#[wasm_bindgen]
pub fn extract(source: &str) -> Result<JsValue, JsError> {
    let extraction = stencil_extract::extract(source);
    serde_wasm_bindgen::to_value(&extraction).map_err(|e| JsError::new(&e.to_string()))
}

/// Render a template against a data object.
///
/// `variables` is a plain JS object (or `null`/`undefined` to return the
/// template unchanged). Throws a JS error when the template fails to
/// compile or render.
#[wasm_bindgen]
pub fn interpolate(source: &str, variables: JsValue) -> Result<String, JsError> {
    let data: Option<serde_json::Value> = if variables.is_null() || variables.is_undefined() {
        None
    } else {
        Some(serde_wasm_bindgen::from_value(variables).map_err(|e| JsError::new(&e.to_string()))?)
    };

    stencil_render::interpolate(source, data.as_ref(), None)
        .map_err(|e| JsError::new(&e.to_string()))
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::version;

    // =========================================================================
    // Native tests (non-WASM) — verify the underlying pipeline works
    // =========================================================================

    #[test]
    fn test_tokenize_round_trips() {
        let source = "Hello {{name}}, {{#each items}}{{title}}{{/each}}";
        let joined: String = stencil_highlight::tokenize(source)
            .iter()
            .map(|t| t.value.as_str())
            .collect();
        assert_eq!(joined, source);
    }

    #[test]
    fn test_extract_finds_scoped_paths() {
        let result = stencil_extract::extract("{{#each items}}{{name}}{{/each}}");
        assert_eq!(result.root_variables, vec!["items"]);
        assert_eq!(result.variables[1].path, "items[].name");
    }

    #[test]
    fn test_interpolate_renders() {
        let data = serde_json::json!({"name": "Ada"});
        let out = stencil_render::interpolate("Hi {{name}}", Some(&data), None).unwrap();
        assert_eq!(out, "Hi Ada");
    }

    #[test]
    fn test_version() {
        let v = version();
        assert!(!v.is_empty());
        assert!(v.contains('.'));
    }
}
