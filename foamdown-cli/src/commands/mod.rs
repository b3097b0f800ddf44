//! CLI command implementations.

pub mod list;
pub mod render;
pub mod resolve;

pub use list::list_resources;
pub use render::render_note;
pub use resolve::resolve_identifier;
