//! The per-client diagram server.
//!
//! A [`DefaultDiagramServer`] owns the current model of one client and runs
//! the model handshake with it:
//!
//! ```text
//! client                              server
//!   │ requestModel ─────────────────────►│  store options
//!   │                                    │  needsClientLayout?
//!   │◄──────────────────── requestBounds │    yes: ask the client to measure
//!   │ computedBounds ───────────────────►│      (needsServerLayout: apply bounds,
//!   │                                    │       layout, then answer)
//!   │◄──────────────── setModel/update   │    no: layout and answer directly
//! ```
//!
//! Options come from the `requestModel` action.  `needsClientLayout`
//! defaults to `true`, `needsServerLayout` to `false`.
//!
//! # Threading
//!
//! All state sits behind one mutex.  Outbound actions are collected while the
//! lock is held and handed to the remote endpoint only after it is released,
//! so an endpoint that calls back into the server cannot deadlock.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, trace};

use diagram_core::protocol::actions::{
    option_flag, Action, ComputedBoundsAction, RequestBoundsAction, RequestPopupModelAction,
    SelectAction, SetModelAction, SetPopupModelAction, UpdateModelAction,
    OPTION_NEEDS_CLIENT_LAYOUT, OPTION_NEEDS_SERVER_LAYOUT,
};
use diagram_core::{
    empty_graph, ActionMessage, ComputedBoundsApplicator, CorrectedBoundsApplicator, SModelIndex,
    SModelRoot,
};

use super::collaborators::{LayoutEngine, PopupModelFactory, RemoteEndpoint};

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors raised by a diagram server.
#[derive(Debug, Error, PartialEq)]
pub enum ServerError {
    /// A server cannot be created for an empty client id.
    #[error("client id must not be empty")]
    EmptyClientId,

    /// A message addressed to another client reached this server.
    #[error("message for client '{actual}' delivered to server of client '{expected}'")]
    ClientIdMismatch { expected: String, actual: String },
}

// ── Trait ─────────────────────────────────────────────────────────────────────

/// A stateful handler for one client's diagram messages.
pub trait DiagramServer: Send + Sync {
    fn client_id(&self) -> &str;

    /// Returns a copy of the current model.
    fn model(&self) -> SModelRoot;

    /// Installs a new model under the next revision without notifying the client.
    fn set_model(&self, root: SModelRoot);

    /// Installs a new model and pushes it to the client as an update.
    fn update_model(&self, root: SModelRoot);

    /// Handles one inbound message.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::ClientIdMismatch`] if the message belongs to
    /// another client.
    fn accept(&self, message: ActionMessage) -> Result<(), ServerError>;
}

// ── State ─────────────────────────────────────────────────────────────────────

/// A submission parked until the client reports computed bounds.
#[derive(Debug)]
struct PendingSubmission {
    request_id: String,
    revision: u64,
    update: bool,
    cause: Option<Action>,
}

#[derive(Debug)]
struct ServerState {
    model: SModelRoot,
    revision: u64,
    options: Map<String, Value>,
    pending: Option<PendingSubmission>,
    last_submitted_revision: Option<u64>,
    selection: BTreeSet<String>,
    request_counter: u64,
}

impl ServerState {
    fn new() -> Self {
        Self {
            model: empty_graph(),
            revision: 0,
            options: Map::new(),
            pending: None,
            last_submitted_revision: None,
            selection: BTreeSet::new(),
            request_counter: 0,
        }
    }

    fn next_request_id(&mut self) -> String {
        self.request_counter += 1;
        format!("server_{}", self.request_counter)
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Wires a [`DefaultDiagramServer`] to its collaborators.
pub struct DiagramServerBuilder {
    client_id: String,
    remote_endpoint: Option<RemoteEndpoint>,
    layout_engine: Option<Arc<dyn LayoutEngine>>,
    popup_factory: Option<Arc<dyn PopupModelFactory>>,
    bounds_applicator: Box<dyn ComputedBoundsApplicator>,
}

impl DiagramServerBuilder {
    pub fn remote_endpoint(mut self, endpoint: RemoteEndpoint) -> Self {
        self.remote_endpoint = Some(endpoint);
        self
    }

    pub fn layout_engine(mut self, engine: Option<Arc<dyn LayoutEngine>>) -> Self {
        self.layout_engine = engine;
        self
    }

    pub fn popup_factory(mut self, factory: Option<Arc<dyn PopupModelFactory>>) -> Self {
        self.popup_factory = factory;
        self
    }

    pub fn bounds_applicator(mut self, applicator: Box<dyn ComputedBoundsApplicator>) -> Self {
        self.bounds_applicator = applicator;
        self
    }

    /// Creates the server.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::EmptyClientId`] if the client id is empty.
    pub fn build(self) -> Result<DefaultDiagramServer, ServerError> {
        if self.client_id.is_empty() {
            return Err(ServerError::EmptyClientId);
        }
        let remote_endpoint = self
            .remote_endpoint
            .unwrap_or_else(|| Arc::new(|_: ActionMessage| {}) as RemoteEndpoint);
        Ok(DefaultDiagramServer {
            client_id: self.client_id,
            remote_endpoint,
            layout_engine: self.layout_engine,
            popup_factory: self.popup_factory,
            bounds_applicator: self.bounds_applicator,
            state: Mutex::new(ServerState::new()),
        })
    }
}

// ── Server ────────────────────────────────────────────────────────────────────

/// The default [`DiagramServer`] implementation.
pub struct DefaultDiagramServer {
    client_id: String,
    remote_endpoint: RemoteEndpoint,
    layout_engine: Option<Arc<dyn LayoutEngine>>,
    popup_factory: Option<Arc<dyn PopupModelFactory>>,
    bounds_applicator: Box<dyn ComputedBoundsApplicator>,
    state: Mutex<ServerState>,
}

impl DefaultDiagramServer {
    /// Starts building a server for `client_id`.
    ///
    /// Without further configuration the server has no layout engine, no
    /// popup factory, drops outbound messages, and applies computed bounds
    /// with [`CorrectedBoundsApplicator`].
    pub fn builder(client_id: impl Into<String>) -> DiagramServerBuilder {
        DiagramServerBuilder {
            client_id: client_id.into(),
            remote_endpoint: None,
            layout_engine: None,
            popup_factory: None,
            bounds_applicator: Box::new(CorrectedBoundsApplicator),
        }
    }

    /// Ids of the currently selected elements, sorted.
    pub fn selection(&self) -> Vec<String> {
        self.lock_state().selection.iter().cloned().collect()
    }

    /// Revision of the model most recently sent to the client.
    pub fn last_submitted_revision(&self) -> Option<u64> {
        self.lock_state().last_submitted_revision
    }

    /// Returns `true` while a server-layout submission waits for bounds.
    pub fn awaiting_bounds(&self) -> bool {
        self.lock_state().pending.is_some()
    }

    fn lock_state(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, outbox: Vec<Action>) {
        for action in outbox {
            debug!("client {}: → {}", self.client_id, action.kind());
            (self.remote_endpoint)(ActionMessage::new(self.client_id.clone(), action));
        }
    }

    // ── Submission ────────────────────────────────────────────────────────────

    fn submit(
        &self,
        state: &mut ServerState,
        update: bool,
        cause: Option<Action>,
        outbox: &mut Vec<Action>,
    ) {
        if !option_flag(&state.options, OPTION_NEEDS_CLIENT_LAYOUT, true) {
            self.finish_submission(state, update, cause, outbox);
            return;
        }

        if option_flag(&state.options, OPTION_NEEDS_SERVER_LAYOUT, false) {
            let request_id = state.next_request_id();
            state.pending = Some(PendingSubmission {
                request_id: request_id.clone(),
                revision: state.revision,
                update,
                cause,
            });
            outbox.push(Action::RequestBounds(RequestBoundsAction {
                new_root: state.model.clone(),
                request_id,
            }));
        } else {
            // The client measures, lays out and installs the model itself.
            state.last_submitted_revision = Some(state.revision);
            outbox.push(Action::RequestBounds(RequestBoundsAction {
                new_root: state.model.clone(),
                request_id: String::new(),
            }));
        }
    }

    fn finish_submission(
        &self,
        state: &mut ServerState,
        update: bool,
        cause: Option<Action>,
        outbox: &mut Vec<Action>,
    ) {
        if let Some(engine) = &self.layout_engine {
            engine.layout(&mut state.model, cause.as_ref());
        }
        state.last_submitted_revision = Some(state.revision);

        let new_root = state.model.clone();
        outbox.push(if update {
            Action::UpdateModel(UpdateModelAction {
                new_root,
                animate: true,
            })
        } else {
            let response_id = cause
                .as_ref()
                .and_then(Action::request_id)
                .unwrap_or_default()
                .to_string();
            Action::SetModel(SetModelAction {
                new_root,
                response_id,
            })
        });
    }

    // ── Handlers ──────────────────────────────────────────────────────────────

    fn handle_computed_bounds(
        &self,
        state: &mut ServerState,
        action: &ComputedBoundsAction,
        outbox: &mut Vec<Action>,
    ) {
        let revision_matches = action.revision.map_or(true, |r| r == state.revision);

        let answers_pending = state.pending.as_ref().is_some_and(|p| {
            if action.response_id.is_empty() {
                action.revision == Some(p.revision)
            } else {
                action.response_id == p.request_id
            }
        });

        if answers_pending {
            let Some(pending) = state.pending.take() else {
                return;
            };
            if revision_matches && pending.revision == state.revision {
                let tally = self.bounds_applicator.apply_bounds(&mut state.model, action);
                debug!(
                    "client {}: applied bounds ({} resized, {} aligned, {} skipped)",
                    self.client_id, tally.resized, tally.aligned, tally.skipped
                );
                self.finish_submission(state, pending.update, pending.cause, outbox);
            } else {
                debug!(
                    "client {}: dropping stale bounds for revision {}",
                    self.client_id, pending.revision
                );
            }
        } else if revision_matches {
            self.bounds_applicator.apply_bounds(&mut state.model, action);
        } else {
            trace!(
                "client {}: ignoring bounds for revision {:?} (current {})",
                self.client_id,
                action.revision,
                state.revision
            );
        }
    }

    fn handle_popup_request(
        &self,
        state: &ServerState,
        request: &RequestPopupModelAction,
        outbox: &mut Vec<Action>,
    ) {
        let Some(factory) = &self.popup_factory else {
            trace!("client {}: no popup factory configured", self.client_id);
            return;
        };
        let index = SModelIndex::new(&state.model);
        let Some(element) = index.get(&state.model, &request.element_id) else {
            return;
        };
        if let Some(popup) = factory.create_popup_model(element, request) {
            outbox.push(Action::SetPopupModel(SetPopupModelAction {
                new_root: popup,
                response_id: request.request_id.clone(),
            }));
        }
    }

    fn handle_select(state: &mut ServerState, action: &SelectAction) {
        for id in &action.deselected_elements_ids {
            state.selection.remove(id);
        }
        state
            .selection
            .extend(action.selected_elements_ids.iter().cloned());
    }

    fn handle_select_all(state: &mut ServerState, select: bool) {
        state.selection.clear();
        if select {
            let root_id = state.model.id.clone();
            state.selection.extend(
                state
                    .model
                    .element_ids()
                    .into_iter()
                    .filter(|id| *id != root_id),
            );
        }
    }

    fn install(state: &mut ServerState, mut root: SModelRoot) {
        state.revision += 1;
        root.revision = Some(state.revision);
        let ids: BTreeSet<String> = root.element_ids().into_iter().collect();
        state.selection.retain(|id| ids.contains(id));
        state.model = root;
    }
}

impl DiagramServer for DefaultDiagramServer {
    fn client_id(&self) -> &str {
        &self.client_id
    }

    fn model(&self) -> SModelRoot {
        self.lock_state().model.clone()
    }

    fn set_model(&self, root: SModelRoot) {
        let mut state = self.lock_state();
        Self::install(&mut state, root);
        debug!(
            "client {}: model installed at revision {}",
            self.client_id, state.revision
        );
    }

    fn update_model(&self, root: SModelRoot) {
        let mut outbox = Vec::new();
        {
            let mut state = self.lock_state();
            Self::install(&mut state, root);
            self.submit(&mut state, true, None, &mut outbox);
        }
        self.emit(outbox);
    }

    fn accept(&self, message: ActionMessage) -> Result<(), ServerError> {
        if message.client_id != self.client_id {
            return Err(ServerError::ClientIdMismatch {
                expected: self.client_id.clone(),
                actual: message.client_id,
            });
        }

        let action = message.action;
        debug!("client {}: ← {}", self.client_id, action.kind());

        let mut outbox = Vec::new();
        {
            let mut state = self.lock_state();
            match &action {
                Action::RequestModel(request) => {
                    state.options = request.options.clone();
                    let cause = Some(action.clone());
                    self.submit(&mut state, false, cause, &mut outbox);
                }
                Action::ComputedBounds(computed) => {
                    self.handle_computed_bounds(&mut state, computed, &mut outbox);
                }
                Action::RequestPopupModel(request) => {
                    self.handle_popup_request(&state, request, &mut outbox);
                }
                Action::ElementSelected(select) => Self::handle_select(&mut state, select),
                Action::AllSelected(all) => Self::handle_select_all(&mut state, all.select),
                other => {
                    debug!(
                        "client {}: ignoring unhandled action {}",
                        self.client_id,
                        other.kind()
                    );
                }
            }
        }
        self.emit(outbox);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use diagram_core::protocol::actions::{
        ElementAndBounds, RequestModelAction, SelectAllAction,
    };
    use diagram_core::{Dimension, Point, SModelElement};
    use serde_json::json;

    // ── Test doubles ──────────────────────────────────────────────────────────

    #[derive(Default)]
    struct Outbox {
        sent: Mutex<Vec<ActionMessage>>,
    }

    impl Outbox {
        fn endpoint(self: &Arc<Self>) -> RemoteEndpoint {
            let me = Arc::clone(self);
            Arc::new(move |m: ActionMessage| me.sent.lock().unwrap().push(m))
        }

        fn kinds(&self) -> Vec<&'static str> {
            self.sent.lock().unwrap().iter().map(|m| m.action.kind()).collect()
        }

        fn last(&self) -> ActionMessage {
            self.sent.lock().unwrap().last().cloned().expect("nothing sent")
        }
    }

    /// Moves every root child to x = 100 and records how often it ran.
    #[derive(Default)]
    struct ShiftingLayout {
        calls: Mutex<u32>,
    }

    impl LayoutEngine for ShiftingLayout {
        fn layout(&self, root: &mut SModelRoot, _cause: Option<&Action>) {
            *self.calls.lock().unwrap() += 1;
            for child in &mut root.children {
                child.position = Some(Point::new(100.0, 0.0));
            }
        }
    }

    struct TextPopup;

    impl PopupModelFactory for TextPopup {
        fn create_popup_model(
            &self,
            element: &SModelElement,
            _request: &RequestPopupModelAction,
        ) -> Option<SModelRoot> {
            Some(SModelElement::new("html", format!("{}_popup", element.id)))
        }
    }

    fn model() -> SModelRoot {
        SModelElement::new("graph", "g")
            .with_child(SModelElement::new("node", "a"))
            .with_child(SModelElement::new("node", "b"))
    }

    fn request(options: serde_json::Value) -> ActionMessage {
        let options = options.as_object().cloned().unwrap_or_default();
        ActionMessage::new(
            "c1",
            Action::RequestModel(RequestModelAction {
                options,
                request_id: "r1".into(),
            }),
        )
    }

    fn server_with(
        outbox: &Arc<Outbox>,
        layout: Option<Arc<dyn LayoutEngine>>,
    ) -> DefaultDiagramServer {
        DefaultDiagramServer::builder("c1")
            .remote_endpoint(outbox.endpoint())
            .layout_engine(layout)
            .build()
            .unwrap()
    }

    // ── Construction ──────────────────────────────────────────────────────────

    #[test]
    fn test_build_rejects_empty_client_id() {
        let result = DefaultDiagramServer::builder("").build();
        assert_eq!(result.err(), Some(ServerError::EmptyClientId));
    }

    #[test]
    fn test_new_server_holds_empty_graph() {
        let server = DefaultDiagramServer::builder("c1").build().unwrap();
        assert!(server.model().is_empty_graph());
        assert_eq!(server.last_submitted_revision(), None);
    }

    // ── Model installation ────────────────────────────────────────────────────

    #[test]
    fn test_set_model_bumps_revision_without_sending() {
        let outbox = Arc::new(Outbox::default());
        let server = server_with(&outbox, None);

        server.set_model(model());
        server.set_model(model());

        assert_eq!(server.model().revision, Some(2));
        assert!(outbox.kinds().is_empty());
    }

    #[test]
    fn test_update_model_without_client_layout_sends_update() {
        // Arrange
        let outbox = Arc::new(Outbox::default());
        let server = server_with(&outbox, None);
        server.accept(request(json!({"needsClientLayout": false}))).unwrap();

        // Act
        server.update_model(model());

        // Assert
        assert_eq!(outbox.kinds(), vec!["setModel", "updateModel"]);
        let Action::UpdateModel(update) = outbox.last().action else {
            panic!("expected updateModel");
        };
        assert!(update.animate);
        assert_eq!(update.new_root.revision, Some(1));
    }

    // ── requestModel ──────────────────────────────────────────────────────────

    #[test]
    fn test_request_model_defaults_to_client_layout() {
        let outbox = Arc::new(Outbox::default());
        let server = server_with(&outbox, None);
        server.set_model(model());

        server.accept(request(json!({}))).unwrap();

        assert_eq!(outbox.kinds(), vec!["requestBounds"]);
        let Action::RequestBounds(rb) = outbox.last().action else {
            panic!("expected requestBounds");
        };
        assert_eq!(rb.request_id, "");
        assert_eq!(server.last_submitted_revision(), Some(1));
        assert!(!server.awaiting_bounds());
    }

    #[test]
    fn test_request_model_without_client_layout_runs_layout_and_sets_model() {
        // Arrange
        let outbox = Arc::new(Outbox::default());
        let layout = Arc::new(ShiftingLayout::default());
        let server = server_with(&outbox, Some(layout.clone()));
        server.set_model(model());

        // Act
        server.accept(request(json!({"needsClientLayout": "false"}))).unwrap();

        // Assert
        assert_eq!(*layout.calls.lock().unwrap(), 1);
        let msg = outbox.last();
        assert_eq!(msg.client_id, "c1");
        let Action::SetModel(set) = msg.action else {
            panic!("expected setModel");
        };
        assert_eq!(set.response_id, "r1");
        assert_eq!(set.new_root.children[0].position, Some(Point::new(100.0, 0.0)));
    }

    // ── Server layout handshake ───────────────────────────────────────────────

    #[test]
    fn test_server_layout_waits_for_bounds_then_sets_model() {
        // Arrange
        let outbox = Arc::new(Outbox::default());
        let layout = Arc::new(ShiftingLayout::default());
        let server = server_with(&outbox, Some(layout.clone()));
        server.set_model(model());

        // Act 1: request with server layout
        server
            .accept(request(json!({"needsClientLayout": true, "needsServerLayout": true})))
            .unwrap();

        // Assert 1: bounds requested, nothing laid out yet
        let Action::RequestBounds(rb) = outbox.last().action else {
            panic!("expected requestBounds");
        };
        assert_eq!(rb.request_id, "server_1");
        assert!(server.awaiting_bounds());
        assert_eq!(*layout.calls.lock().unwrap(), 0);

        // Act 2: client answers
        let answer = ComputedBoundsAction {
            bounds: vec![ElementAndBounds {
                element_id: "b".into(),
                new_position: None,
                new_size: Some(Dimension::new(50.0, 20.0)),
            }],
            alignments: vec![],
            revision: Some(1),
            response_id: "server_1".into(),
        };
        server
            .accept(ActionMessage::new("c1", Action::ComputedBounds(answer)))
            .unwrap();

        // Assert 2: bounds applied, layout ran, model sent with the original request id
        assert!(!server.awaiting_bounds());
        assert_eq!(*layout.calls.lock().unwrap(), 1);
        let Action::SetModel(set) = outbox.last().action else {
            panic!("expected setModel");
        };
        assert_eq!(set.response_id, "r1");
        assert_eq!(set.new_root.children[1].size, Some(Dimension::new(50.0, 20.0)));
        assert_eq!(server.last_submitted_revision(), Some(1));
    }

    #[test]
    fn test_stale_bounds_answer_is_dropped() {
        let outbox = Arc::new(Outbox::default());
        let server = server_with(&outbox, None);
        server.set_model(model());
        server
            .accept(request(json!({"needsServerLayout": true})))
            .unwrap();

        // A new model arrives before the client answers.
        server.set_model(model());
        let answer = ComputedBoundsAction {
            revision: Some(1),
            response_id: "server_1".into(),
            ..Default::default()
        };
        server
            .accept(ActionMessage::new("c1", Action::ComputedBounds(answer)))
            .unwrap();

        assert_eq!(outbox.kinds(), vec!["requestBounds"]);
        assert!(!server.awaiting_bounds());
    }

    #[test]
    fn test_unsolicited_bounds_update_current_model_silently() {
        let outbox = Arc::new(Outbox::default());
        let server = server_with(&outbox, None);
        server.set_model(model());

        let answer = ComputedBoundsAction {
            bounds: vec![ElementAndBounds {
                element_id: "a".into(),
                new_position: Some(Point::new(7.0, 8.0)),
                new_size: None,
            }],
            revision: Some(1),
            ..Default::default()
        };
        server
            .accept(ActionMessage::new("c1", Action::ComputedBounds(answer)))
            .unwrap();

        assert_eq!(server.model().children[0].position, Some(Point::new(7.0, 8.0)));
        assert!(outbox.kinds().is_empty());
    }

    // ── Popups and selection ──────────────────────────────────────────────────

    #[test]
    fn test_popup_request_answers_with_factory_model() {
        let outbox = Arc::new(Outbox::default());
        let server = DefaultDiagramServer::builder("c1")
            .remote_endpoint(outbox.endpoint())
            .popup_factory(Some(Arc::new(TextPopup)))
            .build()
            .unwrap();
        server.set_model(model());

        let req = RequestPopupModelAction {
            element_id: "a".into(),
            request_id: "p1".into(),
            ..Default::default()
        };
        server
            .accept(ActionMessage::new("c1", Action::RequestPopupModel(req)))
            .unwrap();

        let Action::SetPopupModel(popup) = outbox.last().action else {
            panic!("expected setPopupModel");
        };
        assert_eq!(popup.new_root.id, "a_popup");
        assert_eq!(popup.response_id, "p1");
    }

    #[test]
    fn test_popup_request_without_factory_sends_nothing() {
        let outbox = Arc::new(Outbox::default());
        let server = server_with(&outbox, None);
        server.set_model(model());
        let req = RequestPopupModelAction {
            element_id: "a".into(),
            ..Default::default()
        };
        server
            .accept(ActionMessage::new("c1", Action::RequestPopupModel(req)))
            .unwrap();
        assert!(outbox.kinds().is_empty());
    }

    #[test]
    fn test_selection_tracks_deltas_and_select_all() {
        let server = DefaultDiagramServer::builder("c1").build().unwrap();
        server.set_model(model());

        server
            .accept(ActionMessage::new(
                "c1",
                Action::ElementSelected(SelectAction {
                    selected_elements_ids: vec!["a".into(), "b".into()],
                    deselected_elements_ids: vec![],
                }),
            ))
            .unwrap();
        server
            .accept(ActionMessage::new(
                "c1",
                Action::ElementSelected(SelectAction {
                    selected_elements_ids: vec![],
                    deselected_elements_ids: vec!["a".into()],
                }),
            ))
            .unwrap();
        assert_eq!(server.selection(), vec!["b"]);

        server
            .accept(ActionMessage::new(
                "c1",
                Action::AllSelected(SelectAllAction { select: true }),
            ))
            .unwrap();
        assert_eq!(server.selection(), vec!["a", "b"]);

        server
            .accept(ActionMessage::new(
                "c1",
                Action::AllSelected(SelectAllAction { select: false }),
            ))
            .unwrap();
        assert!(server.selection().is_empty());
    }

    #[test]
    fn test_new_model_drops_selection_of_removed_elements() {
        let server = DefaultDiagramServer::builder("c1").build().unwrap();
        server.set_model(model());
        server
            .accept(ActionMessage::new(
                "c1",
                Action::AllSelected(SelectAllAction { select: true }),
            ))
            .unwrap();

        server.set_model(SModelElement::new("graph", "g").with_child(SModelElement::new("node", "b")));

        assert_eq!(server.selection(), vec!["b"]);
    }

    // ── Errors and unknown actions ────────────────────────────────────────────

    #[test]
    fn test_accept_rejects_foreign_client_id() {
        let server = DefaultDiagramServer::builder("c1").build().unwrap();
        let err = server
            .accept(ActionMessage::new("c2", Action::Unknown))
            .unwrap_err();
        assert_eq!(
            err,
            ServerError::ClientIdMismatch {
                expected: "c1".into(),
                actual: "c2".into()
            }
        );
    }

    #[test]
    fn test_unknown_action_is_ignored() {
        let outbox = Arc::new(Outbox::default());
        let server = server_with(&outbox, None);
        server.accept(ActionMessage::new("c1", Action::Unknown)).unwrap();
        assert!(outbox.kinds().is_empty());
    }
}
