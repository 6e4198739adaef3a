//! Study update builder.

use lab_core::draft::StudyDraft;
use lab_core::entities::Study;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct StudyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `Some(None)` clears the configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_data: Option<Option<String>>,
}

impl StudyUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.json_data.is_none()
    }

    /// The study as it would look after this update, for validation.
    #[must_use]
    pub fn apply_to(&self, study: &Study) -> StudyDraft {
        StudyDraft {
            title: self.title.clone().unwrap_or_else(|| study.title.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| study.description.clone()),
            json_data: self
                .json_data
                .clone()
                .unwrap_or_else(|| study.json_data.clone()),
        }
    }
}

pub struct StudyUpdateBuilder(StudyUpdate);

impl StudyUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(StudyUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.0.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn json_data(mut self, json_data: Option<String>) -> Self {
        self.0.json_data = Some(json_data);
        self
    }

    #[must_use]
    pub fn build(self) -> StudyUpdate {
        self.0
    }
}

impl Default for StudyUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
