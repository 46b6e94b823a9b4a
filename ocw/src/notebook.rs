//! Minimal nbformat 4 document model.
//!
//! Only the cell type and source are interpreted; everything else is carried
//! through untouched so rewritten notebooks keep their metadata and outputs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Type of a notebook cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    Code,
    Markdown,
    Raw,
}

/// A notebook cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub cell_type: CellType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Stored as a list of lines on disk, joined here
    #[serde(with = "multiline")]
    pub source: String,
    /// Outputs, execution count, attachments...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Cell {
    /// A new, never executed code cell
    pub fn code(id: impl Into<String>, source: impl Into<String>) -> Self {
        let mut extra = Map::new();
        extra.insert("execution_count".to_string(), Value::Null);
        extra.insert("outputs".to_string(), Value::Array(Vec::new()));
        Self {
            cell_type: CellType::Code,
            id: Some(id.into()),
            metadata: Map::new(),
            source: source.into(),
            extra,
        }
    }

    pub fn markdown(source: impl Into<String>) -> Self {
        Self {
            cell_type: CellType::Markdown,
            id: None,
            metadata: Map::new(),
            source: source.into(),
            extra: Map::new(),
        }
    }

    pub fn is_code(&self) -> bool {
        self.cell_type == CellType::Code
    }

    pub fn is_markdown(&self) -> bool {
        self.cell_type == CellType::Markdown
    }
}

/// A Jupyter notebook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    /// Notebook metadata and format version
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Notebook {
    pub fn new(cells: Vec<Cell>) -> Self {
        let mut extra = Map::new();
        extra.insert("metadata".to_string(), Value::Object(Map::new()));
        extra.insert("nbformat".to_string(), Value::from(4));
        extra.insert("nbformat_minor".to_string(), Value::from(5));
        Self { cells, extra }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse notebook JSON")
    }

    /// Serialize the way nbformat does: one space indent, sorted keys, final newline
    pub fn to_json(&self) -> Result<String> {
        // Going through Value sorts the keys
        let value = serde_json::to_value(self).context("Failed to serialize notebook")?;
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        value
            .serialize(&mut serializer)
            .context("Failed to serialize notebook")?;
        let mut json = String::from_utf8(buffer).context("Notebook JSON is not UTF-8")?;
        json.push('\n');
        Ok(json)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read notebook: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse notebook: {}", path.display()))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write notebook: {}", path.display()))
    }
}

mod multiline {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Source {
        Text(String),
        Lines(Vec<String>),
    }

    pub fn serialize<S: Serializer>(source: &str, serializer: S) -> Result<S::Ok, S::Error> {
        let lines: Vec<&str> = source.split_inclusive('\n').collect();
        lines.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Source::deserialize(deserializer)? {
            Source::Text(text) => text,
            Source::Lines(lines) => lines.concat(),
        })
    }
}
