//! Stencil Extract
//!
//! Groups the scanner's token stream into whole template expressions and
//! extracts the set of variables a template references, with full dotted
//! paths and block-scoping context.
//!
//! Extraction is best-effort and total: templates with scattered syntax
//! errors still yield every well-formed expression (the parser
//! resynchronizes at the next `{{` after a failure), and `extract` never
//! returns an error.
//!
//! # Example
//!
//! ```
//! use stencil_extract::extract;
//!
//! let result = extract("{{#each items}}{{name}}{{/each}}");
//! assert_eq!(result.root_variables, vec!["items"]);
//! assert_eq!(result.variables[1].path, "items[].name");
//! ```

pub mod expression;
pub mod variables;

pub use expression::{Expression, ExpressionKind};
pub use variables::{extract, BlockType, ExtractedVariable, Extraction, VariableKind};
