//! The action vocabulary of the diagram protocol.
//!
//! Only the actions the server consumes or produces are modelled.  Anything
//! else a client sends deserializes to [`Action::Unknown`] and is ignored.
//!
//! # JSON discriminant
//!
//! Every action is a JSON object with a `"kind"` field that identifies the
//! variant.  All other fields sit in the same object:
//!
//! ```json
//! {"kind":"requestModel","options":{"diagramType":"beans","needsClientLayout":true},"requestId":"r1"}
//! {"kind":"computedBounds","bounds":[{"elementId":"n1","newSize":{"width":80.0,"height":20.0}}],"alignments":[],"revision":2,"responseId":"server_1"}
//! ```
//!
//! # Request/response pairing
//!
//! Actions that expect an answer carry a `requestId`; the answer echoes it as
//! `responseId`.  An empty string means "no pairing".

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::geometry::{Bounds, Dimension, Point};
use crate::domain::model::SModelRoot;

/// Request option that tells the server whether the client measures bounds.
pub const OPTION_NEEDS_CLIENT_LAYOUT: &str = "needsClientLayout";

/// Request option that tells the server whether it must lay out after measuring.
pub const OPTION_NEEDS_SERVER_LAYOUT: &str = "needsServerLayout";

/// Request option naming the kind of diagram the client wants.
pub const OPTION_DIAGRAM_TYPE: &str = "diagramType";

/// All actions understood by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Action {
    /// Client → server: please send me a model.
    RequestModel(RequestModelAction),
    /// Server → client: replace your model.
    SetModel(SetModelAction),
    /// Server → client: morph your model into this one.
    UpdateModel(UpdateModelAction),
    /// Server → client: measure this model and report the bounds.
    RequestBounds(RequestBoundsAction),
    /// Client → server: measured bounds for a `requestBounds`.
    ComputedBounds(ComputedBoundsAction),
    /// Client → server: hover popup for an element.
    RequestPopupModel(RequestPopupModelAction),
    /// Server → client: the popup model.
    SetPopupModel(SetPopupModelAction),
    /// Client → server: selection changed.
    ElementSelected(SelectAction),
    /// Client → server: everything was selected or deselected.
    AllSelected(SelectAllAction),
    /// Any action kind the server does not handle.
    #[serde(other)]
    Unknown,
}

impl Action {
    /// Returns the wire `kind` of this action.
    ///
    /// Used in log messages so that model payloads are not dumped into logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::RequestModel(_) => "requestModel",
            Action::SetModel(_) => "setModel",
            Action::UpdateModel(_) => "updateModel",
            Action::RequestBounds(_) => "requestBounds",
            Action::ComputedBounds(_) => "computedBounds",
            Action::RequestPopupModel(_) => "requestPopupModel",
            Action::SetPopupModel(_) => "setPopupModel",
            Action::ElementSelected(_) => "elementSelected",
            Action::AllSelected(_) => "allSelected",
            Action::Unknown => "unknown",
        }
    }

    /// Returns the `requestId` of request actions, if any.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Action::RequestModel(a) => Some(&a.request_id),
            Action::RequestBounds(a) => Some(&a.request_id),
            Action::RequestPopupModel(a) => Some(&a.request_id),
            _ => None,
        }
    }
}

// ── Client → server ───────────────────────────────────────────────────────────

/// Sent by the client when a diagram view opens or reloads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestModelAction {
    /// Free-form options.  Flags may be JSON booleans or `"true"`/`"false"`.
    #[serde(default)]
    pub options: Map<String, Value>,
    #[serde(default)]
    pub request_id: String,
}

impl RequestModelAction {
    /// Reads a boolean option, accepting `true` and `"true"` alike.
    ///
    /// Returns `default` when the option is absent or not a boolean.
    pub fn flag(&self, key: &str, default: bool) -> bool {
        option_flag(&self.options, key, default)
    }

    /// Reads a string option.
    pub fn string_option(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }

    pub fn diagram_type(&self) -> Option<&str> {
        self.string_option(OPTION_DIAGRAM_TYPE)
    }
}

/// Reads a boolean from an options map, accepting JSON booleans and the
/// strings `"true"` / `"false"`.
pub fn option_flag(options: &Map<String, Value>, key: &str, default: bool) -> bool {
    match options.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => true,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => false,
        _ => default,
    }
}

/// One measured element in a [`ComputedBoundsAction`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementAndBounds {
    pub element_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_position: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_size: Option<Dimension>,
}

/// One measured label alignment in a [`ComputedBoundsAction`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementAndAlignment {
    pub element_id: String,
    pub new_alignment: Point,
}

/// The client's answer to a `requestBounds`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedBoundsAction {
    #[serde(default)]
    pub bounds: Vec<ElementAndBounds>,
    #[serde(default)]
    pub alignments: Vec<ElementAndAlignment>,
    /// Revision of the model the bounds were measured on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<u64>,
    #[serde(default)]
    pub response_id: String,
}

/// Hover request for a single element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPopupModelAction {
    pub element_id: String,
    /// Where the popup should appear, in client coordinates.
    #[serde(default)]
    pub bounds: Bounds,
    #[serde(default)]
    pub request_id: String,
}

/// Selection delta.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectAction {
    #[serde(rename = "selectedElementsIDs", default)]
    pub selected_elements_ids: Vec<String>,
    #[serde(rename = "deselectedElementsIDs", default)]
    pub deselected_elements_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectAllAction {
    #[serde(default = "default_true")]
    pub select: bool,
}

fn default_true() -> bool {
    true
}

// ── Server → client ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetModelAction {
    pub new_root: SModelRoot,
    #[serde(default)]
    pub response_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateModelAction {
    pub new_root: SModelRoot,
    #[serde(default = "default_true")]
    pub animate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBoundsAction {
    pub new_root: SModelRoot,
    #[serde(default)]
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPopupModelAction {
    pub new_root: SModelRoot,
    #[serde(default)]
    pub response_id: String,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
