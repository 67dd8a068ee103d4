//! # diagram-core
//!
//! Shared library for the diagram server containing the in-memory model tree,
//! the element index, the computed-bounds corrector, and the JSON action
//! types exchanged with remote diagram clients.
//!
//! It has zero dependencies on async runtimes, sockets, or the file system.
//!
//! # Architecture overview (for beginners)
//!
//! A remote diagram client (typically a browser view) renders a *model tree*
//! that a server generates.  The two sides talk by exchanging *actions*: the
//! client asks for a model, the server answers with one, the client measures
//! text and shapes and reports the resulting bounds back, and so on.
//!
//! This crate (`diagram-core`) is the shared foundation.  It defines:
//!
//! - **`domain`** – The model tree ([`SModelElement`]), the geometry types,
//!   the id → element index, and the [`ComputedBoundsApplicator`] that writes
//!   client-measured positions, sizes and alignments back into the tree.
//!
//! - **`protocol`** – The action vocabulary ([`Action`]) and the envelope
//!   ([`ActionMessage`]) that pairs an action with the client it belongs to.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `diagram_core::SModelElement` instead of `diagram_core::domain::model::SModelElement`.
pub use domain::bounds::{AppliedBounds, ComputedBoundsApplicator, CorrectedBoundsApplicator};
pub use domain::geometry::{Bounds, Dimension, Point};
pub use domain::index::SModelIndex;
pub use domain::model::{empty_graph, ElementKind, ModelError, SModelElement, SModelRoot};
pub use protocol::actions::{
    Action, ComputedBoundsAction, ElementAndAlignment, ElementAndBounds, RequestModelAction,
    RequestPopupModelAction,
};
pub use protocol::message::ActionMessage;
