//! Schema store and validator
//!
//! Schemas are loaded once and never mutated, so validation needs no locks.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use contracts::{SchemaValidator, TopicName, ValidationError};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::error::SchemaError;
use crate::keywords;

const SCHEMA_EXTENSION: &str = "json";

/// Topic name -> schema document
#[derive(Debug, Clone)]
pub struct SchemaStore {
    dir: PathBuf,
    schemas: HashMap<TopicName, Value>,
}

impl SchemaStore {
    /// Create an empty store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            schemas: HashMap::new(),
        }
    }

    /// Load every `<TopicName>.json` in `dir`
    ///
    /// # Errors
    /// An unreadable directory or an unparsable schema file fails the whole
    /// load; a broken schema is a configuration problem.
    #[instrument(name = "schema_store_load", skip(dir), fields(dir = %dir.as_ref().display()))]
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let dir = dir.as_ref();
        let mut store = Self::new(dir);

        let entries = std::fs::read_dir(dir).map_err(|source| SchemaError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries {
            let path = entry
                .map_err(|source| SchemaError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?
                .path();

            if path.extension().and_then(|e| e.to_str()) != Some(SCHEMA_EXTENSION) {
                continue;
            }
            let Some(topic) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let schema = read_schema(&path)?;
            debug!(topic, path = %path.display(), "Schema loaded");
            store.schemas.insert(TopicName::from(topic), schema);
        }

        info!(schemas = store.schemas.len(), "Schema store loaded");
        Ok(store)
    }

    /// Deterministic resource path for a topic's schema
    pub fn path_for(&self, topic: &str) -> PathBuf {
        self.dir.join(format!("{topic}.{SCHEMA_EXTENSION}"))
    }

    pub fn get(&self, topic: &str) -> Option<&Value> {
        self.schemas.get(topic)
    }

    pub fn insert(&mut self, topic: impl Into<TopicName>, schema: Value) {
        self.schemas.insert(topic.into(), schema);
    }

    /// Topics with a schema, sorted
    pub fn topics(&self) -> Vec<TopicName> {
        let mut topics: Vec<_> = self.schemas.keys().cloned().collect();
        topics.sort();
        topics
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

fn read_schema(path: &Path) -> Result<Value, SchemaError> {
    let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let schema: Value = serde_json::from_str(&content).map_err(|e| SchemaError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if !schema.is_object() {
        return Err(SchemaError::NotObject {
            path: path.to_path_buf(),
        });
    }
    Ok(schema)
}

/// `SchemaValidator` backed by a `SchemaStore`
#[derive(Debug, Clone)]
pub struct JsonSchemaValidator {
    store: SchemaStore,
}

impl JsonSchemaValidator {
    pub fn new(store: SchemaStore) -> Self {
        Self { store }
    }

    /// Load all schemas from `dir`
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, SchemaError> {
        SchemaStore::load(dir).map(Self::new)
    }

    /// Add an in-memory schema (builder style)
    pub fn with_schema(mut self, topic: impl Into<TopicName>, schema: Value) -> Self {
        self.store.insert(topic, schema);
        self
    }

    pub fn store(&self) -> &SchemaStore {
        &self.store
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, topic: &TopicName, payload: &[u8]) -> Result<(), ValidationError> {
        let schema = self
            .store
            .get(topic)
            .ok_or_else(|| ValidationError::SchemaNotFound {
                topic: topic.clone(),
                path: self.store.path_for(topic).display().to_string(),
            })?;

        let document: Value =
            serde_json::from_slice(payload).map_err(|e| ValidationError::MalformedPayload {
                topic: topic.clone(),
                message: e.to_string(),
            })?;

        let mut violations = Vec::new();
        keywords::check(schema, &document, "$", &mut violations);

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Invalid {
                topic: topic.clone(),
                violations,
            })
        }
    }
}
