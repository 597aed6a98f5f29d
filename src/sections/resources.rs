//! Step 6: teaching resources, grouped by kind

use serde::{Deserialize, Serialize};

use super::{FieldFocus, ValidationError};

/// Group used for editor lines without an explicit `Grupo:` prefix
pub const DEFAULT_GROUP: &str = "General";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroup {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "recursos", default)]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroups {
    #[serde(rename = "grupos", default)]
    pub groups: Vec<ResourceGroup>,
}

impl ResourceGroups {
    /// Parse editor text, one `Grupo: recurso` per line.
    ///
    /// Groups keep first-appearance order; items keep line order.
    pub fn from_text(text: &str) -> Self {
        let mut groups: Vec<ResourceGroup> = Vec::new();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (group, item) = match line.split_once(':') {
                Some((g, i)) if !g.trim().is_empty() => (g.trim(), i.trim()),
                _ => (DEFAULT_GROUP, line),
            };
            if item.is_empty() {
                continue;
            }
            match groups.iter_mut().find(|g| g.name == group) {
                Some(existing) => existing.items.push(item.to_string()),
                None => groups.push(ResourceGroup {
                    name: group.to_string(),
                    items: vec![item.to_string()],
                }),
            }
        }
        Self { groups }
    }

    pub fn to_text(&self) -> String {
        self.groups
            .iter()
            .flat_map(|g| g.items.iter().map(move |i| format!("{}: {}", g.name, i)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn total_resources(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| g.items.iter())
            .filter(|i| !i.trim().is_empty())
            .count()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.total_resources() == 0 {
            return Err(ValidationError::new(
                "Agrega al menos un recurso didáctico antes de continuar.",
            )
            .at(FieldFocus::Line(0)));
        }
        Ok(())
    }
}
