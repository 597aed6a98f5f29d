pub mod dialogs;
pub mod form_field;
pub mod keybindings;
mod terminal_guard;
pub mod wizard;

pub use terminal_guard::{install_panic_hook, TerminalGuard, WizardTerminal};
pub use wizard::{WizardCommand, WizardScreen};
