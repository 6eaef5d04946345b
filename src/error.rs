use thiserror::Error;

use crate::tree::NodeId;

/// Errors returned by structural mutations.
///
/// Both variants are raised before any state is touched, so a failed
/// mutation leaves the tree exactly as it was.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The assigned children list contains the same node more than once.
    #[error("duplicate child {node:?} in assigned children list")]
    DuplicateChild {
        /// The repeated entry.
        node: NodeId,
    },
    /// The operation would make a node its own ancestor.
    #[error("attaching {node:?} here would make it its own ancestor")]
    WouldCycle {
        /// The entry that is already on the ancestor path.
        node: NodeId,
    },
}
