use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(default = "default_section")]
    pub section: String,
    #[serde(default)]
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for ChunkMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self { section: default_section(), order: 0, created_at: now, updated_at: now }
    }
}

fn default_section() -> String {
    "Body".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub author: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self { author: None, status: default_status(), created_at: now, updated_at: now }
    }
}

fn default_status() -> String {
    "draft".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryMetadata {
    #[serde(default)]
    pub is_public: bool,
    #[serde(default = "default_language")]
    pub language: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for LibraryMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self { is_public: false, language: default_language(), created_at: now, updated_at: now }
    }
}

fn default_language() -> String {
    "en".to_string()
}
