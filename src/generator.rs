//! Configuration surface and file/folder adapters around the schema compiler
//!
//! The compiler core never touches the filesystem; this module supplies the
//! thin adapters that read UTF-8 JSON, surface parse failures as typed
//! errors, and write the rendered DDL out.

use crate::error::{Error, Result};
use crate::schema::infer::infer_structure;
use crate::schema::render::render_schema;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

static TABLE_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap());

/// Validate a table name eagerly, before any JSON is read.
pub fn validate_table_name(table_name: &str) -> Result<()> {
    if TABLE_NAME_REGEX.is_match(table_name) {
        Ok(())
    } else {
        Err(Error::invalid_table_name(table_name))
    }
}

/// Configuration for [`SchemaGenerator`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Default input: a JSON file, or a folder of JSON files for batch mode.
    pub json_path: Option<PathBuf>,

    /// Default output: a `.sql` file, or a folder for batch mode.
    pub output_path: Option<PathBuf>,

    /// Maximum nesting depth (0 or negative = unlimited).
    pub max_depth: i32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            json_path: None,
            output_path: None,
            max_depth: 10,
        }
    }
}

/// Compiles JSON samples into ClickHouse `CREATE TABLE` statements.
pub struct SchemaGenerator {
    config: GeneratorConfig,
}

impl SchemaGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        SchemaGenerator { config }
    }

    /// The pure pipeline: validate the table name, infer the field map, render.
    pub fn generate_from_value(&self, value: &Value, table_name: &str) -> Result<String> {
        validate_table_name(table_name)?;
        let structure = infer_structure(value, "", self.config.max_depth, 0)?;
        Ok(render_schema(&structure, table_name))
    }

    /// Parse raw JSON text and compile it.
    pub fn generate_from_str(&self, json: &str, table_name: &str) -> Result<String> {
        validate_table_name(table_name)?;
        let value = parse_json(json, "<string>")?;
        let structure = infer_structure(&value, "", self.config.max_depth, 0)?;
        Ok(render_schema(&structure, table_name))
    }

    /// Read a UTF-8 JSON file and compile it.
    pub fn generate_from_file(
        &self,
        path: impl AsRef<Path>,
        table_name: &str,
    ) -> Result<String> {
        validate_table_name(table_name)?;
        let path = path.as_ref();
        let json = read_json_file(path)?;
        let value = parse_json(&json, &path.display().to_string())?;
        let structure = infer_structure(&value, "", self.config.max_depth, 0)?;
        Ok(render_schema(&structure, table_name))
    }

    /// Compile one JSON file and write the statement to `output_path`.
    pub fn generate_and_write(
        &self,
        json_path: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
        table_name: &str,
    ) -> Result<()> {
        let ddl = self.generate_from_file(json_path, table_name)?;
        std::fs::write(output_path.as_ref(), ddl).map_err(|e| Error::Unknown {
            source: Box::new(e),
            metadata: write_metadata(output_path.as_ref(), table_name),
        })
    }

    /// Batch mode: every `*.json` file in `json_dir` becomes `<stem>.sql` in
    /// `out_dir`, with the file stem as the table name.
    pub fn generate_folder(
        &self,
        json_dir: impl AsRef<Path>,
        out_dir: impl AsRef<Path>,
    ) -> Result<()> {
        let json_dir = json_dir.as_ref();
        let out_dir = out_dir.as_ref();

        if !json_dir.is_dir() {
            return Err(Error::file_not_found(json_dir, None));
        }
        std::fs::create_dir_all(out_dir).map_err(|e| Error::Unknown {
            source: Box::new(e),
            metadata: write_metadata(out_dir, ""),
        })?;

        let mut entries: Vec<PathBuf> = std::fs::read_dir(json_dir)
            .map_err(|e| Error::file_not_found(json_dir, Some(e)))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
            .collect();
        entries.sort();

        for json_file in entries {
            let stem = json_file
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| Error::invalid_table_name(json_file.display().to_string()))?
                .to_string();
            let out_file = out_dir.join(format!("{}.sql", stem));
            self.generate_and_write(&json_file, &out_file, &stem)?;
        }

        Ok(())
    }

    /// Compile the configured `json_path`. Fails fast with an
    /// invalid-configuration error when it was never provided.
    pub fn generate(&self, table_name: &str) -> Result<String> {
        let json_path = self.configured_json_path()?;
        self.generate_from_file(json_path, table_name)
    }

    /// Compile the configured `json_path` and write to the configured
    /// `output_path`. Both paths must be present in the configuration.
    pub fn generate_and_write_configured(&self, table_name: &str) -> Result<()> {
        let json_path = self.configured_json_path()?.to_path_buf();
        let output_path = self
            .config
            .output_path
            .as_deref()
            .ok_or_else(|| Error::invalid_configuration("output_path"))?
            .to_path_buf();

        if json_path.is_dir() {
            self.generate_folder(&json_path, &output_path)
        } else {
            self.generate_and_write(&json_path, &output_path, table_name)
        }
    }

    fn configured_json_path(&self) -> Result<&Path> {
        self.config
            .json_path
            .as_deref()
            .ok_or_else(|| Error::invalid_configuration("json_path"))
    }
}

/// Read a JSON file, mapping a missing file to the file-not-found kind.
fn read_json_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::file_not_found(path, Some(e)))
}

/// Parse JSON text. The SIMD parser is tried first; on failure the input is
/// re-parsed with serde_json, whose error carries line/column diagnostics.
fn parse_json(json: &str, path: &str) -> Result<Value> {
    let mut bytes = json.as_bytes().to_vec();
    if let Ok(value) = simd_json::serde::from_slice::<Value>(&mut bytes) {
        return Ok(value);
    }
    serde_json::from_str(json).map_err(|e| Error::invalid_json(path, e))
}

fn write_metadata(path: &Path, table_name: &str) -> serde_json::Map<String, Value> {
    let mut meta = serde_json::Map::new();
    meta.insert(
        "output_path".into(),
        Value::String(path.display().to_string()),
    );
    if !table_name.is_empty() {
        meta.insert("table_name".into(), Value::String(table_name.to_string()));
    }
    meta
}
