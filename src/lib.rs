//! # Kiln - JSON to ClickHouse Schema Compiler
//!
//! Infers a columnar table schema from sample JSON documents and compiles it
//! into a ClickHouse `CREATE TABLE` statement, so a table definition can be
//! bootstrapped from a payload without hand-writing column types.
//!
//! ## Modules
//!
//! - **schema**: the two-stage compiler (type inference and DDL rendering)
//! - **generator**: configuration surface plus file/folder adapters
//! - **error**: typed error taxonomy with stable codes and metadata
//!
//! ## Quick Start
//!
//! ```rust
//! use kiln::generate_schema;
//! use serde_json::json;
//!
//! # fn main() -> kiln::Result<()> {
//! let sample = json!({
//!     "id": 1,
//!     "name": "Test",
//!     "price": 10.99,
//!     "details": {"color": "red"}
//! });
//!
//! let ddl = generate_schema(&sample, "products", 0)?;
//! assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS products ("));
//! assert!(ddl.contains("`price` Float64"));
//! # Ok(())
//! # }
//! ```
//!
//! ### From a file
//!
//! ```rust,no_run
//! use kiln::{GeneratorConfig, SchemaGenerator};
//!
//! # fn main() -> kiln::Result<()> {
//! let generator = SchemaGenerator::new(GeneratorConfig::default());
//! let ddl = generator.generate_from_file("sample.json", "products")?;
//! println!("{}", ddl);
//! # Ok(())
//! # }
//! ```

use serde_json::Value;

pub mod error;
pub mod generator;
pub mod schema;

// Re-export commonly used types for convenience
pub use error::{Error, ErrorCode, Result};
pub use generator::{validate_table_name, GeneratorConfig, SchemaGenerator};
pub use schema::{infer_structure, render_schema, ColumnType, FieldMap, ScalarKind};

/// One-shot entry point: validate the table name, infer the field map from a
/// parsed JSON value, and render the `CREATE TABLE` statement.
///
/// `max_depth` of 0 or negative means unlimited nesting depth.
pub fn generate_schema(value: &Value, table_name: &str, max_depth: i32) -> Result<String> {
    validate_table_name(table_name)?;
    let structure = infer_structure(value, "", max_depth, 0)?;
    Ok(render_schema(&structure, table_name))
}
