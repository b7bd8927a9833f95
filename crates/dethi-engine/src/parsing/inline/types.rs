/// A render token produced from one content string.
///
/// The presentation layer maps these to styled output, resolving image and
/// formula ids through the asset map, with visible fallbacks for unknown
/// ids: resolution failures are never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineToken {
    /// Literal text between constructs.
    Text(String),
    /// A bold run.
    Bold(String),
    /// An image reference by asset id.
    Image { id: String },
    /// A formula reference by asset id.
    Formula { id: String },
}
