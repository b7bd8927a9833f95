use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// What an asset id resolves to.
///
/// The upstream conversion step encodes this as `"type": "image"` or
/// `"type": "math"` in the sidecar JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Math,
}

/// One entry of the asset map.
///
/// `src` is an opaque source reference for images (the upstream emits data
/// URLs); `latex` is the formula markup when the converter could recover
/// it. Unknown fields from newer converters are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(rename = "type")]
    pub kind: AssetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latex: Option<String>,
}

/// How a formula reference should be rendered, best source first.
///
/// Resolution is total: an unknown id degrades to a visible badge, never
/// an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormulaSource {
    /// Render the LaTeX markup.
    Latex(String),
    /// No markup available; fall back to the captured image.
    Image(String),
    /// Nothing usable; show the id itself as a badge.
    Badge(String),
}

/// The external id → asset resolution table.
///
/// Produced by the upstream conversion step; read-only to this engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetMap(HashMap<String, Asset>);

impl AssetMap {
    /// An empty map, for exams with no captured assets.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses the sidecar JSON the converter writes next to the exam text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn get(&self, id: &str) -> Option<&Asset> {
        self.0.get(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The image source for an id, when the id names an image with one.
    pub fn image_src(&self, id: &str) -> Option<&str> {
        match self.get(id) {
            Some(Asset {
                kind: AssetKind::Image,
                src: Some(src),
                ..
            }) => Some(src),
            _ => None,
        }
    }

    /// Resolves a formula reference: LaTeX if present, else the captured
    /// image, else an id badge.
    pub fn formula(&self, id: &str) -> FormulaSource {
        match self.get(id) {
            Some(asset) => {
                if let Some(latex) = asset.latex.as_ref().filter(|l| !l.trim().is_empty()) {
                    FormulaSource::Latex(latex.clone())
                } else if let Some(src) = &asset.src {
                    FormulaSource::Image(src.clone())
                } else {
                    FormulaSource::Badge(id.to_string())
                }
            }
            None => FormulaSource::Badge(id.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIDECAR: &str = r#"{
        "img_1": {"type": "image", "src": "data:image/png;base64,AAAA"},
        "mathtype_1": {"type": "math", "latex": "x^2 + 1", "placeholder": "[Công thức]"},
        "mathtype_2": {"type": "math", "src": "data:image/png;base64,BBBB", "latex": ""}
    }"#;

    #[test]
    fn parses_upstream_sidecar_format() {
        let map = AssetMap::from_json(SIDECAR).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("img_1").unwrap().kind, AssetKind::Image);
        assert_eq!(map.get("mathtype_1").unwrap().kind, AssetKind::Math);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        // "placeholder" is not modeled; deserialization must not fail.
        assert!(AssetMap::from_json(SIDECAR).is_ok());
    }

    #[test]
    fn image_src_lookup() {
        let map = AssetMap::from_json(SIDECAR).unwrap();
        assert_eq!(map.image_src("img_1"), Some("data:image/png;base64,AAAA"));
        assert_eq!(map.image_src("mathtype_1"), None);
        assert_eq!(map.image_src("missing"), None);
    }

    #[test]
    fn formula_prefers_latex() {
        let map = AssetMap::from_json(SIDECAR).unwrap();
        assert_eq!(
            map.formula("mathtype_1"),
            FormulaSource::Latex("x^2 + 1".to_string())
        );
    }

    #[test]
    fn formula_falls_back_to_image_when_latex_empty() {
        let map = AssetMap::from_json(SIDECAR).unwrap();
        assert_eq!(
            map.formula("mathtype_2"),
            FormulaSource::Image("data:image/png;base64,BBBB".to_string())
        );
    }

    #[test]
    fn unresolved_id_degrades_to_badge() {
        let map = AssetMap::empty();
        assert_eq!(
            map.formula("mathtype_9"),
            FormulaSource::Badge("mathtype_9".to_string())
        );
    }

    #[test]
    fn serialization_roundtrip() {
        let map = AssetMap::from_json(SIDECAR).unwrap();
        let json = serde_json::to_string(&map).unwrap();
        let back = AssetMap::from_json(&json).unwrap();
        assert_eq!(map, back);
    }
}
