//! The registry of known block types and their parameters.
//!
//! The registry is loaded once and then only read, so a single value is
//! shared by reference between every network being converted.
//!
//! Signature files are JSON documents of the form
//!
//! ```json
//! {"functions": [{"name": "CTU", "parameters": [
//!     {"name": "CU", "type": "Bool"},
//!     {"name": "PV", "type": "Int", "default": 0}
//! ]}]}
//! ```
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use lad2scl_problems::Problem;

use crate::diagnostic::{Diagnostic, Label};

/// Errors that can occur while loading signature files.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("unable to read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed signature data in {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl From<SignatureError> for Diagnostic {
    fn from(err: SignatureError) -> Self {
        match &err {
            SignatureError::Unreadable { path, .. } => Diagnostic::problem(
                Problem::SignatureFileUnreadable,
                Label::file(path.display().to_string(), err.to_string()),
            ),
            SignatureError::Malformed { path, .. } => Diagnostic::problem(
                Problem::SignatureMalformed,
                Label::file(path.display().to_string(), err.to_string()),
            ),
        }
    }
}

/// One declared parameter of a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterSignature {
    pub name: String,
    pub data_type: Option<String>,
    pub required: bool,
    /// Literal text injected when the parameter is not wired.
    pub default_literal: Option<String>,
}

/// The ordered parameters of one block type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockSignature {
    pub block_type: String,
    pub parameters: Vec<ParameterSignature>,
    /// System blocks are called by their bare name. User blocks are quoted.
    pub system: bool,
}

impl BlockSignature {
    pub fn parameter(&self, name: &str) -> Option<&ParameterSignature> {
        self.parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Deserialize)]
struct SignatureFile {
    #[serde(default)]
    functions: Vec<FunctionRecord>,
}

#[derive(Deserialize)]
struct FunctionRecord {
    name: String,
    #[serde(default)]
    parameters: Vec<ParameterRecord>,
    #[serde(default)]
    system: bool,
}

#[derive(Deserialize)]
struct ParameterRecord {
    name: String,
    #[serde(rename = "type")]
    data_type: Option<String>,
    default: Option<serde_json::Value>,
    required: Option<bool>,
}

impl From<FunctionRecord> for BlockSignature {
    fn from(record: FunctionRecord) -> Self {
        BlockSignature {
            block_type: record.name,
            parameters: record
                .parameters
                .into_iter()
                .map(|p| {
                    let default_literal = p.default.as_ref().map(literal_text);
                    ParameterSignature {
                        name: p.name,
                        data_type: p.data_type,
                        required: p.required.unwrap_or(default_literal.is_none()),
                        default_literal,
                    }
                })
                .collect(),
            system: record.system,
        }
    }
}

/// Converts a JSON default into the literal text it stands for.
fn literal_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Bool(true) => "TRUE".to_string(),
        serde_json::Value::Bool(false) => "FALSE".to_string(),
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Case-insensitive lookup of block signatures.
#[derive(Clone, Debug, Default)]
pub struct SignatureRegistry {
    blocks: HashMap<String, BlockSignature>,
}

impl SignatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The IEC standard timers, counters, edge triggers and bistables.
    pub fn builtin() -> Self {
        fn param(name: &str, data_type: &str, default: Option<&str>) -> ParameterSignature {
            ParameterSignature {
                name: name.to_string(),
                data_type: Some(data_type.to_string()),
                required: default.is_none(),
                default_literal: default.map(str::to_string),
            }
        }
        fn block(name: &str, parameters: Vec<ParameterSignature>) -> BlockSignature {
            BlockSignature {
                block_type: name.to_string(),
                parameters,
                system: true,
            }
        }
        fn timer(name: &str) -> BlockSignature {
            block(name, vec![param("IN", "Bool", None), param("PT", "Time", None)])
        }

        let mut registry = Self::new();
        for signature in [
            timer("TON"),
            timer("TOF"),
            timer("TP"),
            block(
                "CTU",
                vec![
                    param("CU", "Bool", None),
                    param("R", "Bool", Some("FALSE")),
                    param("PV", "Int", Some("0")),
                ],
            ),
            block(
                "CTD",
                vec![
                    param("CD", "Bool", None),
                    param("LD", "Bool", Some("FALSE")),
                    param("PV", "Int", Some("0")),
                ],
            ),
            block(
                "CTUD",
                vec![
                    param("CU", "Bool", None),
                    param("CD", "Bool", None),
                    param("R", "Bool", Some("FALSE")),
                    param("LD", "Bool", Some("FALSE")),
                    param("PV", "Int", Some("0")),
                ],
            ),
            block("R_TRIG", vec![param("CLK", "Bool", None)]),
            block("F_TRIG", vec![param("CLK", "Bool", None)]),
            block("SR", vec![param("S1", "Bool", None), param("R", "Bool", None)]),
            block("RS", vec![param("S", "Bool", None), param("R1", "Bool", None)]),
        ] {
            registry.insert(signature);
        }
        registry
    }

    pub fn from_json_str(text: &str, origin: &Path) -> Result<Self, SignatureError> {
        let file: SignatureFile =
            serde_json::from_str(text).map_err(|source| SignatureError::Malformed {
                path: origin.to_path_buf(),
                source,
            })?;

        let mut registry = Self::new();
        for record in file.functions {
            registry.insert(record.into());
        }
        Ok(registry)
    }

    pub fn from_file(path: &Path) -> Result<Self, SignatureError> {
        let text = fs::read_to_string(path).map_err(|source| SignatureError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_json_str(&text, path)?;
        debug!(
            "Loaded {} signatures from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Loads every `*.json` file of a directory in file name order. Files
    /// that cannot be loaded are skipped and returned as diagnostics.
    pub fn from_dir(dir: &Path) -> (Self, Vec<Diagnostic>) {
        let mut registry = Self::new();
        let mut diagnostics = vec![];

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(source) => {
                let err = SignatureError::Unreadable {
                    path: dir.to_path_buf(),
                    source,
                };
                return (registry, vec![err.into()]);
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().map_or(false, |ext| ext == "json"))
            .collect();
        paths.sort();

        for path in paths {
            match Self::from_file(&path) {
                Ok(loaded) => registry = registry.merge(loaded),
                Err(err) => {
                    let diagnostic: Diagnostic = err.into();
                    log::warn!("{}", diagnostic);
                    diagnostics.push(diagnostic);
                }
            }
        }

        info!(
            "Loaded {} signatures from {}",
            registry.len(),
            dir.display()
        );
        (registry, diagnostics)
    }

    /// Combines two registries. Records of `other` replace records of the
    /// same block type.
    pub fn merge(mut self, other: SignatureRegistry) -> Self {
        self.blocks.extend(other.blocks);
        self
    }

    pub fn get(&self, block_type: &str) -> Option<&BlockSignature> {
        self.blocks.get(&block_type.to_ascii_uppercase())
    }

    pub fn contains(&self, block_type: &str) -> bool {
        self.get(block_type).is_some()
    }

    /// Whether the block is a known system block.
    pub fn is_system(&self, block_type: &str) -> bool {
        self.get(block_type).map_or(false, |block| block.system)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    fn insert(&mut self, block: BlockSignature) {
        self.blocks.insert(block.block_type.to_ascii_uppercase(), block);
    }
}
