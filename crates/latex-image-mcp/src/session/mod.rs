//! Preference state and rendering for the running server.

pub mod manager;

pub use manager::LatexSession;
