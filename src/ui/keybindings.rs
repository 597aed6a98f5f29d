//! Keyboard shortcuts registry.
//!
//! Single source of truth for the wizard's shortcuts, consumed by
//! `HelpDialog` and by the controls bar.

use crossterm::event::{KeyCode, KeyModifiers};

/// A keyboard shortcut definition
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
    /// Alternative key, same modifiers
    pub alt_key: Option<KeyCode>,
    pub description: &'static str,
    pub category: ShortcutCategory,
    pub context: ShortcutContext,
}

/// Categories for organizing shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutCategory {
    General,
    Navigation,
    Editing,
}

/// Contexts where shortcuts are active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutContext {
    /// Every step
    Wizard,
    /// The weekly programming step
    Programme,
}

impl ShortcutCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            ShortcutCategory::General => "General",
            ShortcutCategory::Navigation => "Navegación",
            ShortcutCategory::Editing => "Edición",
        }
    }

    /// All categories in display order
    pub fn all() -> &'static [ShortcutCategory] {
        &[
            ShortcutCategory::General,
            ShortcutCategory::Navigation,
            ShortcutCategory::Editing,
        ]
    }
}

impl ShortcutContext {
    pub fn display_name(&self) -> &'static str {
        match self {
            ShortcutContext::Wizard => "Asistente",
            ShortcutContext::Programme => "Programación semanal",
        }
    }

    pub fn all() -> &'static [ShortcutContext] {
        &[ShortcutContext::Wizard, ShortcutContext::Programme]
    }
}

impl Shortcut {
    /// Format key for display (e.g., "Ctrl+N", "↑/↓")
    pub fn key_display(&self) -> String {
        let primary = format_key(&self.key, self.modifiers);
        match &self.alt_key {
            Some(alt) => format!("{}/{}", primary, format_key(alt, self.modifiers)),
            None => primary,
        }
    }

    /// Format key for help dialog (left-padded to 12 chars)
    pub fn key_display_padded(&self) -> String {
        format!("{:<12}", self.key_display())
    }
}

fn format_keycode(key: &KeyCode) -> String {
    match key {
        KeyCode::Char(c) => c.to_uppercase().to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "Shift+Tab".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::Delete => "Del".to_string(),
        KeyCode::Insert => "Ins".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => format!("{:?}", key),
    }
}

fn format_key(key: &KeyCode, modifiers: KeyModifiers) -> String {
    let mut out = String::new();
    if modifiers.contains(KeyModifiers::CONTROL) {
        out.push_str("Ctrl+");
    }
    if modifiers.contains(KeyModifiers::ALT) {
        out.push_str("Alt+");
    }
    out.push_str(&format_keycode(key));
    out
}

/// Static registry of all keyboard shortcuts
pub static SHORTCUTS: &[Shortcut] = &[
    // === Wizard Context ===
    Shortcut {
        key: KeyCode::F(1),
        modifiers: KeyModifiers::NONE,
        alt_key: None,
        description: "Mostrar u ocultar la ayuda",
        category: ShortcutCategory::General,
        context: ShortcutContext::Wizard,
    },
    Shortcut {
        key: KeyCode::Char('q'),
        modifiers: KeyModifiers::CONTROL,
        alt_key: None,
        description: "Salir (el avance guardado se conserva)",
        category: ShortcutCategory::General,
        context: ShortcutContext::Wizard,
    },
    Shortcut {
        key: KeyCode::Char('r'),
        modifiers: KeyModifiers::CONTROL,
        alt_key: None,
        description: "Recargar la sección desde el servidor",
        category: ShortcutCategory::General,
        context: ShortcutContext::Wizard,
    },
    Shortcut {
        key: KeyCode::Char('e'),
        modifiers: KeyModifiers::CONTROL,
        alt_key: None,
        description: "Enviar el sílabo a revisión",
        category: ShortcutCategory::General,
        context: ShortcutContext::Wizard,
    },
    Shortcut {
        key: KeyCode::Char('n'),
        modifiers: KeyModifiers::CONTROL,
        alt_key: None,
        description: "Guardar y continuar",
        category: ShortcutCategory::Navigation,
        context: ShortcutContext::Wizard,
    },
    Shortcut {
        key: KeyCode::Char('p'),
        modifiers: KeyModifiers::CONTROL,
        alt_key: None,
        description: "Paso anterior (sin guardar)",
        category: ShortcutCategory::Navigation,
        context: ShortcutContext::Wizard,
    },
    Shortcut {
        key: KeyCode::Char('1'),
        modifiers: KeyModifiers::ALT,
        alt_key: Some(KeyCode::Char('9')),
        description: "Ir a un paso ya visitado",
        category: ShortcutCategory::Navigation,
        context: ShortcutContext::Wizard,
    },
    Shortcut {
        key: KeyCode::Tab,
        modifiers: KeyModifiers::NONE,
        alt_key: Some(KeyCode::BackTab),
        description: "Siguiente / anterior campo",
        category: ShortcutCategory::Editing,
        context: ShortcutContext::Wizard,
    },
    // === Programme Context ===
    Shortcut {
        key: KeyCode::Up,
        modifiers: KeyModifiers::NONE,
        alt_key: Some(KeyCode::Down),
        description: "Cambiar de semana",
        category: ShortcutCategory::Navigation,
        context: ShortcutContext::Programme,
    },
    Shortcut {
        key: KeyCode::Left,
        modifiers: KeyModifiers::NONE,
        alt_key: Some(KeyCode::Right),
        description: "Cambiar de actividad",
        category: ShortcutCategory::Navigation,
        context: ShortcutContext::Programme,
    },
    Shortcut {
        key: KeyCode::Char('a'),
        modifiers: KeyModifiers::NONE,
        alt_key: None,
        description: "Agregar actividad de 1 hora",
        category: ShortcutCategory::Editing,
        context: ShortcutContext::Programme,
    },
    Shortcut {
        key: KeyCode::Char('+'),
        modifiers: KeyModifiers::NONE,
        alt_key: Some(KeyCode::Char('-')),
        description: "Subir / bajar horas de la actividad",
        category: ShortcutCategory::Editing,
        context: ShortcutContext::Programme,
    },
    Shortcut {
        key: KeyCode::Delete,
        modifiers: KeyModifiers::NONE,
        alt_key: Some(KeyCode::Char('d')),
        description: "Quitar actividad",
        category: ShortcutCategory::Editing,
        context: ShortcutContext::Programme,
    },
];

/// Get shortcuts grouped by category for a given context
pub fn shortcuts_by_category_for_context(
    context: ShortcutContext,
) -> Vec<(ShortcutCategory, Vec<&'static Shortcut>)> {
    let mut result = Vec::new();
    for category in ShortcutCategory::all() {
        let shortcuts: Vec<&Shortcut> = SHORTCUTS
            .iter()
            .filter(|s| s.context == context && s.category == *category)
            .collect();
        if !shortcuts.is_empty() {
            result.push((*category, shortcuts));
        }
    }
    result
}
