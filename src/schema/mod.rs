//! Schema compiler: type inference over JSON value trees plus DDL rendering
//!
//! The two stages share a single intermediate representation, the ordered
//! field-path → [`ColumnType`] map produced by [`infer::infer_structure`] and
//! consumed by [`render::render_schema`].

pub mod infer;
pub mod render;
pub mod types;

pub use infer::{infer_structure, is_identifier_field, widen_scalar_kinds, FieldMap};
pub use render::render_schema;
pub use types::{ColumnType, ScalarKind};
