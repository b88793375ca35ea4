//! WebSocket client error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WsError {
    #[error("Connection closed: code={code}, reason={reason}")]
    ConnectionClosed { code: u16, reason: String },

    #[error("Reconnection attempts exhausted after {attempts} attempts")]
    ReconnectExhausted { attempts: u32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Codec error: {0}")]
    Codec(#[from] sockline_core::CodecError),

    #[error("Tungstenite error: {0}")]
    Tungstenite(#[from] tokio_tungstenite::tungstenite::Error),
}

pub type WsResult<T> = Result<T, WsError>;
