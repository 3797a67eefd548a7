use serde::{Deserialize, Serialize};

/// Container node types whose names carry structural context worth
/// surfacing to the model.
pub const CONTAINER_TYPES: [&str; 4] = ["FRAME", "COMPONENT", "INSTANCE", "GROUP"];

/// A node in a pre-fetched Figma document tree. The network fetch happens
/// at the edge; the core only ever sees this decoded shape.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct FigmaNode {
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default)]
    pub name: String,
    /// Text content, present on TEXT nodes.
    #[serde(default)]
    pub characters: Option<String>,
    #[serde(default)]
    pub children: Vec<FigmaNode>,
}

impl FigmaNode {
    pub fn is_container(&self) -> bool {
        CONTAINER_TYPES.contains(&self.node_type.as_str())
    }
}

/// The top of a fetched Figma file: a document node whose children are
/// pages, whose children in turn are the top-level frames.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct FigmaFile {
    #[serde(default)]
    pub name: String,
    pub document: FigmaNode,
}

impl FigmaFile {
    /// Counts frames directly under the document's pages. Zero means the
    /// file has nothing a UI test could be derived from.
    pub fn top_level_frame_count(&self) -> usize {
        self.document
            .children
            .iter()
            .flat_map(|page| page.children.iter())
            .filter(|node| node.node_type == "FRAME")
            .count()
    }
}
