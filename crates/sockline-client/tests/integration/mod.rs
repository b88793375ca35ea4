//! Integration tests for sockline-client.
//!
//! These tests exercise the full connection lifecycle against a real
//! WebSocket server: authorization handshake, queue flushing,
//! reconnection, and subscriber dispatch.

pub mod common;
