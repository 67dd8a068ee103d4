//! Wire types exchanged between diagram clients and the server.
//!
//! - **`actions`** – the [`Action`](actions::Action) enum, tagged by `kind`.
//! - **`message`** – the [`ActionMessage`](message::ActionMessage) envelope.

pub mod actions;
pub mod message;
