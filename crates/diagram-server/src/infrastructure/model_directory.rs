//! ModelDirectory: a [`DiagramGenerator`] backed by JSON files on disk.
//!
//! A `requestModel` action names its diagram through the `diagramType`
//! option.  The generator loads `<models_dir>/<diagramType>.json`, parses it
//! as a model tree, and hands it to the server.
//!
//! Any failure (missing option, unsafe name, missing file, invalid JSON) is
//! logged and answered with the empty graph, so a client always gets a model
//! back.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use diagram_core::{empty_graph, RequestModelAction, SModelElement, SModelRoot};

use crate::application::DiagramGenerator;

/// Loads models from `<dir>/<diagramType>.json`.
#[derive(Debug, Clone)]
pub struct ModelDirectory {
    dir: PathBuf,
}

impl ModelDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the file for `diagram_type`, or `None` if the name could
    /// escape the models directory.
    fn model_path(&self, diagram_type: &str) -> Option<PathBuf> {
        let unsafe_name = diagram_type.is_empty()
            || diagram_type.contains('/')
            || diagram_type.contains('\\')
            || diagram_type.contains("..");
        if unsafe_name {
            return None;
        }
        Some(self.dir.join(format!("{diagram_type}.json")))
    }

    fn load(&self, client_id: &str, diagram_type: &str) -> Option<SModelRoot> {
        let Some(path) = self.model_path(diagram_type) else {
            warn!("client {client_id}: rejected diagram type {diagram_type:?}");
            return None;
        };

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!("client {client_id}: cannot read {}: {e}", path.display());
                return None;
            }
        };

        match SModelElement::from_json(&text) {
            Ok(model) => {
                debug!("client {client_id}: loaded model from {}", path.display());
                Some(model)
            }
            Err(e) => {
                warn!("client {client_id}: invalid model in {}: {e}", path.display());
                None
            }
        }
    }
}

impl DiagramGenerator for ModelDirectory {
    fn generate_model(&self, client_id: &str, request: &RequestModelAction) -> SModelRoot {
        match request.diagram_type() {
            Some(diagram_type) => self
                .load(client_id, diagram_type)
                .unwrap_or_else(empty_graph),
            None => {
                warn!("client {client_id}: requestModel without diagramType");
                empty_graph()
            }
        }
    }
}
