//! Ordered tree for hierarchical tab relationships, with memoized ASCII
//! rendering and collapse-aware depth-first traversal.
//!
//! Nodes live in an arena owned by [`Tree`] and are addressed by [`NodeId`]
//! handles; parent links are plain back-indices, so the whole tree drops as
//! one unit and reference cycles cannot form. Sibling order is significant
//! and preserved by every operation.
//!
//! Feature flags:
//! - `serde`: serde derives for [`NodeId`] and [`TraverseOrder`].

mod error;
mod glyphs;
pub mod prelude;
mod render;
mod traverse;
mod tree;

pub use error::TreeError;
pub use glyphs::TreeGlyphs;
pub use render::RenderLine;
pub use traverse::{Traverse, TraverseOrder};
pub use tree::{DisplayPath, NodeId, Tree};
