/// Connector symbols used when rendering a subtree listing.
///
/// Glyphs are fixed per tree at construction time so that memoized render
/// results stay consistent with live recomputations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeGlyphs {
    /// Connector for the last child in a sibling group.
    pub corner: &'static str,
    /// Connector for a child with further siblings below it.
    pub intersection: &'static str,
    /// Continuation drawn in front of a non-last child's subtree lines.
    pub pipe: &'static str,
}

impl TreeGlyphs {
    /// Box-drawing glyphs. This is the default set.
    pub const fn unicode() -> Self {
        Self {
            corner: "└─",
            intersection: "├─",
            pipe: "│",
        }
    }

    /// Plain-ASCII fallback for terminals without box-drawing support.
    pub const fn ascii() -> Self {
        Self {
            corner: "`-",
            intersection: "|-",
            pipe: "|",
        }
    }
}

impl Default for TreeGlyphs {
    fn default() -> Self {
        Self::unicode()
    }
}
