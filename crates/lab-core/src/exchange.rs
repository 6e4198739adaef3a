//! Portable structural definition of a study.
//!
//! Export writes a study's title, description, configuration and ordered
//! components as a pretty-printed JSON document. Import decodes the document
//! and runs the same validation as study creation. Ids, members, lock state
//! and results are not part of the format: an import is a
//! structural clone.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::draft::{ComponentDraft, StudyDraft};
use crate::entities::{Component, Study};
use crate::errors::CoreError;

/// Current exchange format version.
pub const EXCHANGE_VERSION: u32 = 1;

/// File suffix of the structural definition inside an export archive.
pub const STUDY_FILE_SUFFIX: &str = "study";

const fn default_exchange_version() -> u32 {
    EXCHANGE_VERSION
}

/// Exchange document for one study.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StudyExchange {
    /// Format version. Documents without the field are version 1.
    #[serde(default = "default_exchange_version")]
    pub version: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub json_data: Option<String>,
    /// In study order.
    #[serde(default)]
    pub components: Vec<ComponentDraft>,
}

impl StudyExchange {
    /// Build the document from a study and its components.
    ///
    /// Components are sorted by position, whatever order they are passed in.
    #[must_use]
    pub fn from_study(study: &Study, components: &[Component]) -> Self {
        let mut ordered: Vec<&Component> = components.iter().collect();
        ordered.sort_by_key(|c| c.position);
        Self {
            version: EXCHANGE_VERSION,
            title: study.title.clone(),
            description: study.description.clone(),
            json_data: study.json_data.clone(),
            components: ordered
                .into_iter()
                .map(|c| ComponentDraft {
                    title: c.title.clone(),
                    html_file_path: c.html_file_path.clone(),
                    json_data: c.json_data.clone(),
                    reloadable: c.reloadable,
                    active: c.active,
                })
                .collect(),
        }
    }

    /// Study-level fields as a draft.
    #[must_use]
    pub fn study_draft(&self) -> StudyDraft {
        StudyDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            json_data: self.json_data.clone(),
        }
    }

    /// Structural validity: known version, valid study fields, valid components.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` describing the first problem found.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.version != EXCHANGE_VERSION {
            return Err(CoreError::Validation(format!(
                "unsupported study file version {} (expected {EXCHANGE_VERSION})",
                self.version
            )));
        }
        self.study_draft().validate()?;
        for (index, component) in self.components.iter().enumerate() {
            component.validate().map_err(|e| {
                CoreError::Validation(format!("component #{index}: {e}"))
            })?;
        }
        Ok(())
    }
}

/// Serialize a study's structural definition.
///
/// # Errors
///
/// Returns `CoreError::Exchange` if JSON encoding fails.
pub fn to_exchange_format(study: &Study, components: &[Component]) -> Result<Vec<u8>, CoreError> {
    let doc = StudyExchange::from_study(study, components);
    Ok(serde_json::to_vec_pretty(&doc)?)
}

/// Decode and validate a structural definition.
///
/// # Errors
///
/// Returns `CoreError::Validation` for undecodable or structurally invalid input.
pub fn from_exchange_format(bytes: &[u8]) -> Result<StudyExchange, CoreError> {
    let doc: StudyExchange = serde_json::from_slice(bytes)
        .map_err(|e| CoreError::Validation(format!("study file is not a valid study: {e}")))?;
    doc.validate()?;
    Ok(doc)
}
