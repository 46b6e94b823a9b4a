use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to create a temporary work directory with notebooks
pub struct TempProject {
    pub dir: TempDir,
}

impl TempProject {
    /// Create a new, empty work directory
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        Self { dir }
    }

    /// Get the path to the work directory
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create a file in the work directory with the given content
    pub fn create_file(&self, relative_path: &str, content: impl AsRef<[u8]>) {
        let file_path = self.file_path(relative_path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Create a notebook from (cell type, source) pairs
    pub fn create_notebook(&self, relative_path: &str, cells: &[(&str, &str)]) {
        let cells: Vec<Value> = cells
            .iter()
            .map(|(cell_type, source)| match *cell_type {
                "code" => json!({
                    "cell_type": "code",
                    "execution_count": null,
                    "metadata": {},
                    "outputs": [],
                    "source": source,
                }),
                _ => json!({
                    "cell_type": cell_type,
                    "metadata": {},
                    "source": source,
                }),
            })
            .collect();
        let notebook = json!({
            "cells": cells,
            "metadata": {"kernelspec": {"name": "python3"}},
            "nbformat": 4,
            "nbformat_minor": 5,
        });
        self.create_file(relative_path, notebook.to_string());
    }

    /// Get the absolute path to a file in the work directory
    pub fn file_path(&self, relative_path: &str) -> PathBuf {
        self.dir.path().join(relative_path)
    }

    /// Read back a notebook as JSON
    pub fn read_notebook(&self, relative_path: &str) -> Value {
        let content =
            fs::read_to_string(self.file_path(relative_path)).expect("Failed to read notebook");
        serde_json::from_str(&content).expect("Failed to parse notebook")
    }

    /// Joined source of the cell at the given position
    pub fn cell_source(&self, relative_path: &str, position: usize) -> String {
        let notebook = self.read_notebook(relative_path);
        match &notebook["cells"][position]["source"] {
            Value::Array(lines) => lines.iter().filter_map(Value::as_str).collect(),
            Value::String(source) => source.clone(),
            other => panic!("unexpected source {other}"),
        }
    }
}

impl Default for TempProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Work directory with a notebook importing numpy and one importing nothing
pub fn create_temp_project_with_notebooks() -> TempProject {
    let project = TempProject::new();
    project.create_notebook(
        "intro.ipynb",
        &[
            ("markdown", "# Introduction\nSee [the next one](sub/mesh.ipynb)."),
            ("code", "import numpy as np\nprint(np.pi)"),
        ],
    );
    project.create_notebook(
        "sub/mesh.ipynb",
        &[
            ("markdown", "![mesh](images/mesh.png)\n[Back](../intro.ipynb)"),
            ("code", "print('hello')"),
        ],
    );
    project
}

/// PNG signature, enough for base64 embedding
pub const PNG: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
