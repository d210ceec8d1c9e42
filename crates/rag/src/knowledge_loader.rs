//! Knowledge Base Loader
//!
//! Reads knowledge documents from a directory:
//! - `.yaml` / `.yml` / `.json`: a `documents` array of [`KnowledgeDocument`]
//! - `.md` / `.txt`: one document per file, titled after the file stem
//!
//! Files that fail to parse are logged and skipped.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::RagError;

/// Knowledge document format for YAML/JSON files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    /// Unique document ID
    pub id: String,
    /// Document title
    pub title: String,
    /// Document content (will be chunked and embedded)
    pub content: String,
    /// Category (e.g. "disease", "fertilizer", "scheme")
    #[serde(default)]
    pub category: Option<String>,
    /// Keywords
    #[serde(default)]
    pub keywords: Vec<String>,
    /// File the document was read from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Knowledge base file format
#[derive(Debug, Serialize, Deserialize)]
pub struct KnowledgeFile {
    /// Version for format compatibility
    #[serde(default)]
    pub version: Option<String>,
    /// List of documents
    pub documents: Vec<KnowledgeDocument>,
}

/// Knowledge loader
pub struct KnowledgeLoader;

impl KnowledgeLoader {
    /// Load every supported file in a directory, sorted by file name
    ///
    /// A missing directory yields no documents.
    pub fn load_directory(knowledge_dir: &Path) -> Result<Vec<KnowledgeDocument>, RagError> {
        if !knowledge_dir.exists() {
            tracing::warn!(
                path = %knowledge_dir.display(),
                "Knowledge directory does not exist"
            );
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(knowledge_dir)
            .map_err(|e| RagError::Index(format!("Failed to read directory: {}", e)))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| RagError::Index(format!("Failed to read entry: {}", e)))?;
            let path = entry.path();
            if path.is_file() && Self::is_supported(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut documents = Vec::new();
        for path in paths {
            match Self::load_file(&path) {
                Ok(docs) => {
                    tracing::info!(
                        file = %path.display(),
                        documents = docs.len(),
                        "Loaded knowledge file"
                    );
                    documents.extend(docs);
                },
                Err(e) => {
                    tracing::error!(
                        file = %path.display(),
                        error = %e,
                        "Failed to load knowledge file"
                    );
                },
            }
        }

        tracing::info!(
            directory = %knowledge_dir.display(),
            total_documents = documents.len(),
            "Knowledge base loading complete"
        );

        Ok(documents)
    }

    fn extension(path: &Path) -> String {
        path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
    }

    fn is_supported(path: &Path) -> bool {
        matches!(
            Self::extension(path).as_str(),
            "yaml" | "yml" | "json" | "md" | "txt"
        )
    }

    /// Load a single knowledge file
    pub fn load_file(path: &Path) -> Result<Vec<KnowledgeDocument>, RagError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RagError::Index(format!("Failed to read file: {}", e)))?;
        let source = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        let extension = Self::extension(path);
        let mut documents = match extension.as_str() {
            "json" => {
                serde_json::from_str::<KnowledgeFile>(&content)
                    .map_err(|e| RagError::Index(format!("JSON parse error: {}", e)))?
                    .documents
            },
            "yaml" | "yml" => {
                serde_yaml::from_str::<KnowledgeFile>(&content)
                    .map_err(|e| RagError::Index(format!("YAML parse error: {}", e)))?
                    .documents
            },
            "md" | "txt" => {
                if content.trim().is_empty() {
                    Vec::new()
                } else {
                    let stem = path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or("document")
                        .to_string();
                    vec![KnowledgeDocument {
                        id: stem.clone(),
                        title: stem.replace(['_', '-'], " "),
                        content,
                        category: None,
                        keywords: Vec::new(),
                        source: None,
                    }]
                }
            },
            _ => {
                return Err(RagError::Index(format!(
                    "Unsupported file type: {}",
                    extension
                )))
            },
        };

        documents.retain(|d| !d.content.trim().is_empty());
        for doc in &mut documents {
            doc.source.get_or_insert_with(|| source.clone());
        }
        Ok(documents)
    }
}
