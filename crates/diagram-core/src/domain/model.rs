//! The diagram model tree.
//!
//! A diagram is a tree of [`SModelElement`]s.  The root carries the model
//! `revision` (bumped by the server every time a new model is installed) and,
//! once a client has rendered it, the `canvasBounds` of the viewport.
//!
//! # Element capabilities
//!
//! Not every element can be moved or resized.  Edges, for example, are routed
//! between their endpoints and have no bounds of their own.  The capability of
//! an element is derived from the prefix of its `type` string (the part before
//! the first `:`), so `"node:bean"` and `"node"` are both nodes:
//!
//! | prefix         | kind          | bounds-aware | alignable |
//! |----------------|---------------|--------------|-----------|
//! | `graph`        | Graph         | yes          | no        |
//! | `node`         | Node          | yes          | no        |
//! | `comp`         | Compartment   | yes          | no        |
//! | `port`         | Port          | yes          | no        |
//! | `button`       | Button        | yes          | no        |
//! | `label`        | Label         | yes          | yes       |
//! | `pre-rendered` | PreRendered   | yes          | no        |
//! | `edge`         | Edge          | no           | no        |
//! | anything else  | Other         | no           | no        |
//!
//! # JSON representation
//!
//! ```json
//! {"type":"graph","id":"root","revision":3,"children":[
//!   {"type":"node:bean","id":"n1","position":{"x":0.0,"y":0.0},"size":{"width":80.0,"height":30.0},
//!    "children":[{"type":"label","id":"n1_label","text":"helloBean"}]}
//! ]}
//! ```
//!
//! Properties the server does not interpret (`text`, `cssClasses`, `sourceId`,
//! `targetId`, ...) are kept in [`SModelElement::properties`] and written back
//! unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::geometry::{Bounds, Dimension, Point};

/// Type string of the placeholder model installed before any model exists.
pub const EMPTY_GRAPH_TYPE: &str = "NONE";

/// Id of the placeholder model installed before any model exists.
pub const EMPTY_GRAPH_ID: &str = "EMPTY";

/// Errors raised while loading or validating a model tree.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The JSON text could not be parsed into a model tree.
    #[error("invalid model JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An element in the tree has an empty `id`.
    #[error("element of type '{element_type}' has an empty id")]
    EmptyId { element_type: String },
}

/// Structural kind of an element, derived from its type prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Graph,
    Node,
    Compartment,
    Port,
    Button,
    Label,
    PreRendered,
    Edge,
    Other,
}

impl ElementKind {
    /// Classifies a `type` string such as `"node:bean"`.
    pub fn from_type(element_type: &str) -> Self {
        let prefix = element_type.split(':').next().unwrap_or_default();
        match prefix {
            "graph" => ElementKind::Graph,
            "node" => ElementKind::Node,
            "comp" => ElementKind::Compartment,
            "port" => ElementKind::Port,
            "button" => ElementKind::Button,
            "label" => ElementKind::Label,
            "pre-rendered" => ElementKind::PreRendered,
            "edge" => ElementKind::Edge,
            _ => ElementKind::Other,
        }
    }

    /// Returns `true` if elements of this kind carry a position and a size.
    pub fn is_bounds_aware(self) -> bool {
        !matches!(self, ElementKind::Edge | ElementKind::Other)
    }

    /// Returns `true` if elements of this kind carry a text alignment point.
    pub fn is_alignable(self) -> bool {
        matches!(self, ElementKind::Label)
    }
}

/// One element of the model tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SModelElement {
    /// Type string, e.g. `"node:bean"`.  Determines the [`ElementKind`].
    #[serde(rename = "type")]
    pub element_type: String,

    /// Identifier, unique within the tree.
    pub id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SModelElement>,

    /// Top-left corner relative to the parent (bounds-aware elements only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,

    /// Rendered size (bounds-aware elements only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Dimension>,

    /// Text anchor offset (alignable elements only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Point>,

    /// Model revision.  Only meaningful on the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<u64>,

    /// Viewport bounds reported by the client.  Only meaningful on the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_bounds: Option<Bounds>,

    /// All remaining JSON properties, preserved verbatim.
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

/// The root of a model tree.
///
/// Roots and inner elements share one representation; the alias documents
/// which end of the tree a function expects.
pub type SModelRoot = SModelElement;

/// Returns the placeholder model a server holds before any model is generated.
pub fn empty_graph() -> SModelRoot {
    SModelElement::new(EMPTY_GRAPH_TYPE, EMPTY_GRAPH_ID)
}

impl SModelElement {
    /// Creates an element with no children, geometry, or extra properties.
    pub fn new(element_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            element_type: element_type.into(),
            id: id.into(),
            children: Vec::new(),
            position: None,
            size: None,
            alignment: None,
            revision: None,
            canvas_bounds: None,
            properties: Map::new(),
        }
    }

    /// Builder-style helper that appends a child.
    pub fn with_child(mut self, child: SModelElement) -> Self {
        self.children.push(child);
        self
    }

    /// Builder-style helper that sets an extra JSON property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Parses a model tree from JSON and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Json`] for malformed JSON and
    /// [`ModelError::EmptyId`] if any element has an empty id.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let root: SModelElement = serde_json::from_str(json)?;
        root.validate()?;
        Ok(root)
    }

    /// Checks that every element in the tree has a non-empty id.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.id.is_empty() {
            return Err(ModelError::EmptyId {
                element_type: self.element_type.clone(),
            });
        }
        self.children.iter().try_for_each(SModelElement::validate)
    }

    /// Returns the structural kind derived from the type prefix.
    pub fn kind(&self) -> ElementKind {
        ElementKind::from_type(&self.element_type)
    }

    /// Returns `true` if this is the placeholder produced by [`empty_graph`].
    pub fn is_empty_graph(&self) -> bool {
        self.element_type == EMPTY_GRAPH_TYPE
    }

    /// Returns the current bounds, if both position and size are known.
    pub fn bounds(&self) -> Option<Bounds> {
        match (self.position, self.size) {
            (Some(p), Some(s)) => Some(Bounds::from_parts(p, s)),
            _ => None,
        }
    }

    /// Calls `visit` for this element and every descendant in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a SModelElement)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Returns the ids of this element and all descendants in pre-order.
    pub fn element_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        self.walk(&mut |e| ids.push(e.id.clone()));
        ids
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
