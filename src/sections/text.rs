//! Free-text sections (sumilla, evaluación)

use serde::{Deserialize, Serialize};

use super::{FieldFocus, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(rename = "contenido", default)]
    pub content: String,
}

impl TextBlock {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn validate(&self, empty_message: &str) -> Result<(), ValidationError> {
        if self.content.trim().is_empty() {
            return Err(ValidationError::new(empty_message).at(FieldFocus::Line(0)));
        }
        Ok(())
    }
}

pub(super) fn default_evaluation() -> TextBlock {
    TextBlock::new(
        "La evaluación es permanente e integral.\n\
         Evaluación continua (EC): prácticas calificadas y participación, 40%.\n\
         Examen parcial (EP): 30%.\n\
         Examen final (EF): 30%.\n\
         Promedio final = 0.4 × EC + 0.3 × EP + 0.3 × EF.",
    )
}
