//! List-of-lines sections (competencias, estrategias, referencias)

use serde::{Deserialize, Serialize};

use super::{FieldFocus, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineList {
    #[serde(default)]
    pub items: Vec<String>,
}

impl LineList {
    pub fn new(items: Vec<String>) -> Self {
        Self { items }
    }

    /// Build from editor text, one item per line
    pub fn from_text(text: &str) -> Self {
        Self {
            items: text.lines().map(str::to_string).collect(),
        }
    }

    /// Items with surrounding whitespace removed, skipping blank lines
    pub fn non_empty(&self) -> impl Iterator<Item = &str> {
        self.items
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// Copy with blank lines dropped and items trimmed
    pub fn normalized(&self) -> Self {
        Self {
            items: self.non_empty().map(str::to_string).collect(),
        }
    }

    /// "At least one non-empty line"
    pub fn validate(&self, empty_message: &str) -> Result<(), ValidationError> {
        if self.non_empty().next().is_none() {
            return Err(ValidationError::new(empty_message).at(FieldFocus::Line(0)));
        }
        Ok(())
    }
}

pub(super) fn default_strategies() -> LineList {
    LineList::new(vec![
        "Aprendizaje basado en problemas".to_string(),
        "Clases expositivas participativas".to_string(),
        "Trabajo colaborativo en equipos".to_string(),
        "Estudio de casos".to_string(),
    ])
}
