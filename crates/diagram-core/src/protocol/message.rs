//! The envelope that carries an action to or from one client.

use serde::{Deserialize, Serialize};

use super::actions::Action;

/// An action addressed to (or sent by) a single diagram client.
///
/// ```json
/// {"clientId":"sprotty-1","action":{"kind":"requestModel","options":{},"requestId":""}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMessage {
    /// Opaque client identifier chosen by the client.
    pub client_id: String,
    pub action: Action,
}

impl ActionMessage {
    pub fn new(client_id: impl Into<String>, action: Action) -> Self {
        Self {
            client_id: client_id.into(),
            action,
        }
    }
}
