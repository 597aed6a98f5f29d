//! Syllabus - terminal wizard for drafting course syllabi
//!
//! The library holds the wizard engine, the section model and the backend
//! client; `main.rs` wires them to the terminal.

pub mod api;
pub mod app;
pub mod config;
pub mod logging;
pub mod review;
pub mod sections;
pub mod ui;
pub mod wizard;
