//! Domain entities for the diagram server.
//!
//! This module contains pure model logic with no infrastructure dependencies.
//!
//! # What lives here? (for beginners)
//!
//! - **`geometry`** – points, dimensions and rectangles in diagram coordinates.
//! - **`model`** – the model tree sent to clients and the capability rules
//!   that say which elements carry bounds or an alignment.
//! - **`index`** – a lookup table from element id to its place in the tree.
//! - **`bounds`** – applies client-computed bounds back onto the tree.
//!
//! Code in outer layers (the server, the WebSocket relay) depends on these
//! types, but nothing here depends on them.

pub mod bounds;
pub mod geometry;
pub mod index;
pub mod model;
