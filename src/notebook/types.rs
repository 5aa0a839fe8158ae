//! nbformat v4 document types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One output record attached to a code cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
pub enum CellOutput {
    Stream {
        name: String,
        text: String,
    },
    DisplayData {
        data: Map<String, Value>,
        #[serde(default)]
        metadata: Map<String, Value>,
    },
    ExecuteResult {
        #[serde(default)]
        execution_count: Option<u64>,
        data: Map<String, Value>,
        #[serde(default)]
        metadata: Map<String, Value>,
    },
    Error {
        ename: String,
        evalue: String,
        #[serde(default)]
        traceback: Vec<String>,
    },
}

impl CellOutput {
    /// A stream record for one chunk of output text.
    pub fn stream(name: &str, text: impl Into<String>) -> Self {
        CellOutput::Stream {
            name: name.to_string(),
            text: text.into(),
        }
    }

    /// A display record normalized from a mime bundle: the plain-text
    /// representation as a one-element line list, plus the raw image
    /// payload when present.
    pub fn display(bundle: &Map<String, Value>) -> Self {
        let mut data = Map::new();
        if let Some(plain) = bundle.get("text/plain") {
            let lines = match plain {
                Value::String(s) => Value::Array(vec![Value::String(s.clone())]),
                other => other.clone(),
            };
            data.insert("text/plain".to_string(), lines);
        }
        if let Some(image) = bundle.get("image/png") {
            data.insert("image/png".to_string(), image.clone());
        }
        CellOutput::DisplayData {
            data,
            metadata: Map::new(),
        }
    }
}

/// One notebook cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub cell_type: String,
    // Serialized as null; the server manages execution counts.
    pub execution_count: Option<u64>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub outputs: Vec<CellOutput>,
    pub source: String,
}

/// An nbformat v4 notebook document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub nbformat: u64,
    pub nbformat_minor: u64,
}

impl Notebook {
    /// An empty notebook, as provisioned alongside a new kernel.
    pub fn empty() -> Self {
        Self {
            cells: Vec::new(),
            metadata: Map::new(),
            nbformat: 4,
            nbformat_minor: 2,
        }
    }

    /// Append one code cell with its collected outputs.
    pub fn push_code_cell(&mut self, source: impl Into<String>, outputs: Vec<CellOutput>) {
        self.cells.push(Cell {
            cell_type: "code".to_string(),
            execution_count: None,
            metadata: Map::new(),
            outputs,
            source: source.into(),
        });
    }
}

/// Wrapper returned by the contents API for a notebook resource.
#[derive(Debug, Deserialize)]
pub(crate) struct NotebookResource {
    pub content: Notebook,
}
