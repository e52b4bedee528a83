use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppResult;

/// The persisted form inputs. Keys match the ones the web form used, so a
/// hand-migrated localStorage dump loads as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    SourceText,
    TranslatedText,
    ApiKey,
    ProjectId,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::SourceText,
        FormField::TranslatedText,
        FormField::ApiKey,
        FormField::ProjectId,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FormField::SourceText => "originalText",
            FormField::TranslatedText => "translatedText",
            FormField::ApiKey => "apiKey",
            FormField::ProjectId => "projectId",
        }
    }
}

/// Durable string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> AppResult<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> AppResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// A flat JSON object on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Missing file starts empty; a corrupt one is logged and ignored.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "form store unreadable, starting empty");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    /// `values` only changes once the file write has succeeded.
    fn set(&mut self, key: &str, value: &str) -> AppResult<()> {
        let mut next = self.values.clone();
        next.insert(key.to_string(), value.to_string());
        let s = serde_json::to_string_pretty(&next)?;
        fs::write(&self.path, s)?;
        self.values = next;
        Ok(())
    }
}

/// Everything the form shows. `cleaned_html` is output only and never
/// persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub source_text: String,
    pub translated_text: String,
    pub api_key: String,
    pub project_id: String,
    pub cleaned_html: String,
}

impl FormState {
    pub fn restore(store: &dyn KeyValueStore) -> Self {
        let mut state = FormState::default();
        for field in FormField::ALL {
            *state.field_mut(field) = store.get(field.key()).unwrap_or_default();
        }
        state
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::SourceText => &self.source_text,
            FormField::TranslatedText => &self.translated_text,
            FormField::ApiKey => &self.api_key,
            FormField::ProjectId => &self.project_id,
        }
    }

    fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::SourceText => &mut self.source_text,
            FormField::TranslatedText => &mut self.translated_text,
            FormField::ApiKey => &mut self.api_key,
            FormField::ProjectId => &mut self.project_id,
        }
    }

    /// The field takes the new value even when the write fails.
    pub fn set(
        &mut self,
        store: &mut dyn KeyValueStore,
        field: FormField,
        value: impl Into<String>,
    ) -> AppResult<()> {
        *self.field_mut(field) = value.into();
        self.persist(store, field)
    }

    /// Write a field the UI already edited in place.
    pub fn persist(&self, store: &mut dyn KeyValueStore, field: FormField) -> AppResult<()> {
        store.set(field.key(), self.get(field))
    }

    pub fn clear_api_key(&mut self, store: &mut dyn KeyValueStore) -> AppResult<()> {
        self.set(store, FormField::ApiKey, "")
    }

    /// Clears the three text areas; credentials stay.
    pub fn clear_all(&mut self, store: &mut dyn KeyValueStore) -> AppResult<()> {
        self.set(store, FormField::SourceText, "")?;
        self.set(store, FormField::TranslatedText, "")?;
        self.cleaned_html.clear();
        Ok(())
    }
}
