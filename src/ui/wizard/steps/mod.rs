//! Render methods for the wizard frame and each step body

mod general;
mod layout;
mod programme;
mod text;
