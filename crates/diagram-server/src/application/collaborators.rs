//! Collaborator seams of the diagram server.
//!
//! The server itself only moves models and actions around.  Producing a
//! model, laying it out, and building hover popups are the job of the
//! implementations plugged in here, so they can be swapped (or faked in
//! tests) without touching the routing code.

use std::sync::Arc;

use diagram_core::protocol::actions::{Action, RequestModelAction, RequestPopupModelAction};
use diagram_core::{ActionMessage, SModelElement, SModelRoot};

/// Callback that carries an outbound message to the remote client.
pub type RemoteEndpoint = Arc<dyn Fn(ActionMessage) + Send + Sync>;

/// Produces the model tree a client asked for.
///
/// Implementations decide what to do when they cannot produce anything; the
/// usual answer is [`diagram_core::empty_graph`].
#[cfg_attr(test, mockall::automock)]
pub trait DiagramGenerator: Send + Sync {
    fn generate_model(&self, client_id: &str, request: &RequestModelAction) -> SModelRoot;
}

/// Assigns positions (and possibly sizes) to the elements of a model.
pub trait LayoutEngine: Send + Sync {
    /// Lays out `root` in place.  `cause` is the action that triggered the
    /// submission, when there is one.
    fn layout(&self, root: &mut SModelRoot, cause: Option<&Action>);
}

/// Builds the popup shown when the user hovers an element.
pub trait PopupModelFactory: Send + Sync {
    /// Returns `None` when the element has nothing to show.
    fn create_popup_model(
        &self,
        element: &SModelElement,
        request: &RequestPopupModelAction,
    ) -> Option<SModelRoot>;
}
