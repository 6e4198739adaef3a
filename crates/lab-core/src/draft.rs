//! Unpersisted study and component definitions.
//!
//! Drafts carry submitted form data (or a decoded exchange file) into the
//! store. `validate()` runs before anything is persisted, so a rejected draft
//! never leaves partial state behind.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Submitted definition of a study.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StudyDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub json_data: Option<String>,
}

impl StudyDraft {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn json_data(mut self, json_data: impl Into<String>) -> Self {
        self.json_data = Some(json_data.into());
        self
    }

    /// Check required fields: non-blank title, well-formed JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_title("study", &self.title)?;
        validate_json("study", self.json_data.as_deref())
    }
}

/// Submitted definition of a component.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ComponentDraft {
    pub title: String,
    #[serde(default)]
    pub html_file_path: Option<String>,
    #[serde(default)]
    pub json_data: Option<String>,
    #[serde(default)]
    pub reloadable: bool,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

impl ComponentDraft {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            html_file_path: None,
            json_data: None,
            reloadable: false,
            active: true,
        }
    }

    #[must_use]
    pub fn html_file_path(mut self, path: impl Into<String>) -> Self {
        self.html_file_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn json_data(mut self, json_data: impl Into<String>) -> Self {
        self.json_data = Some(json_data.into());
        self
    }

    #[must_use]
    pub const fn reloadable(mut self, reloadable: bool) -> Self {
        self.reloadable = reloadable;
        self
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_title("component", &self.title)?;
        validate_json("component", self.json_data.as_deref())?;
        if let Some(path) = self.html_file_path.as_deref()
            && (path.starts_with('/') || path.split(['/', '\\']).any(|part| part == ".."))
        {
            return Err(CoreError::Validation(format!(
                "component html file path '{path}' must stay inside the study's asset directory"
            )));
        }
        Ok(())
    }
}

fn validate_title(kind: &str, title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation(format!("{kind} title must not be empty")));
    }
    Ok(())
}

/// Blank JSON configuration is treated as absent.
fn validate_json(kind: &str, json_data: Option<&str>) -> Result<(), CoreError> {
    match json_data {
        Some(text) if !text.trim().is_empty() => serde_json::from_str::<serde_json::Value>(text)
            .map(|_| ())
            .map_err(|e| CoreError::Validation(format!("{kind} JSON data is malformed: {e}"))),
        _ => Ok(()),
    }
}
