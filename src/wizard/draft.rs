//! Local editable copy of a section

use crate::sections::{SectionKind, SectionPayload};

/// Where the local value of a section came from
#[derive(Debug, Clone, PartialEq)]
pub enum DraftState<T> {
    /// Last value read from the server
    Loaded(T),
    /// Canonical default shown because the server has no value yet.
    /// Persisted only if the user advances without replacing it.
    Defaulted(T),
    /// Changed by the user since it was loaded or defaulted
    Edited(T),
}

impl<T> DraftState<T> {
    pub fn value(&self) -> &T {
        match self {
            DraftState::Loaded(v) | DraftState::Defaulted(v) | DraftState::Edited(v) => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            DraftState::Loaded(v) | DraftState::Defaulted(v) | DraftState::Edited(v) => v,
        }
    }
}

/// A section's local draft alongside the server copy it started from
#[derive(Debug, Clone, PartialEq)]
pub struct SectionDraft {
    kind: SectionKind,
    state: DraftState<SectionPayload>,
    server: Option<SectionPayload>,
}

impl SectionDraft {
    /// Initialize from what the server returned (`None` for 404 / no record).
    ///
    /// A missing or empty server value falls back to the section's canonical
    /// default, or to an empty payload, as `Defaulted`.
    pub fn from_server(kind: SectionKind, server: Option<SectionPayload>) -> Self {
        let state = match &server {
            Some(value) if !value.is_empty() => DraftState::Loaded(value.clone()),
            _ => DraftState::Defaulted(
                kind.canonical_default()
                    .unwrap_or_else(|| kind.empty_payload()),
            ),
        };
        Self {
            kind,
            state,
            server,
        }
    }

    /// Draft built locally without a server round trip (e.g. a scaffold)
    pub fn defaulted(kind: SectionKind, value: SectionPayload) -> Self {
        Self {
            kind,
            state: DraftState::Defaulted(value),
            server: None,
        }
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    pub fn state(&self) -> &DraftState<SectionPayload> {
        &self.state
    }

    pub fn value(&self) -> &SectionPayload {
        self.state.value()
    }

    pub fn server_copy(&self) -> Option<&SectionPayload> {
        self.server.as_ref()
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self.state, DraftState::Defaulted(_))
    }

    pub fn is_edited(&self) -> bool {
        matches!(self.state, DraftState::Edited(_))
    }

    /// Replace the local value with a user edit
    pub fn set(&mut self, value: SectionPayload) {
        if &value != self.value() {
            self.state = DraftState::Edited(value);
        }
    }

    /// Apply an in-place edit; the draft becomes `Edited` only if the value changed
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut SectionPayload) -> R) -> R {
        let mut value = self.value().clone();
        let result = f(&mut value);
        self.set(value);
        result
    }

    /// Adopt the server-normalized value after a successful save
    pub fn reconcile(&mut self, server: SectionPayload) {
        self.state = DraftState::Loaded(server.clone());
        self.server = Some(server);
    }
}
