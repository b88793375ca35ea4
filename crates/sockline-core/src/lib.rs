//! Core types for the sockline WebSocket client.
//!
//! This crate provides the units of communication shared by the
//! connection manager and its consumers:
//! - `Message`: the typed payload exchanged with the server
//! - `codec`: the JSON text-frame wire format

pub mod codec;
pub mod error;
pub mod message;

pub use codec::{decode, encode};
pub use error::{CodecError, Result};
pub use message::{Message, AUTHORIZATION_KIND};
