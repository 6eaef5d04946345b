pub use crate::{
    DisplayPath, NodeId, RenderLine, Traverse, TraverseOrder, Tree, TreeError, TreeGlyphs,
};
