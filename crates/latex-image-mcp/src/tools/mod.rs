//! MCP tool implementations.

pub mod latex_getprefs;
pub mod latex_render;
pub mod latex_setprefs;
pub mod registry;

pub use registry::ToolRegistry;
