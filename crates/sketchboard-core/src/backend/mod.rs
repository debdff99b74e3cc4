//! Persistence collaborator interface.
//!
//! The scene is owned by a remote service that stores shapes and keeps the
//! undo log. The editor only talks to it through [`Backend`]: one request,
//! one reply, and every scene-changing reply carries the complete scene.

mod memory;

pub use memory::MemoryBackend;

use crate::intent::Intent;
use crate::wire::CodecError;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Backend errors.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Persistence service unavailable: {0}")]
    Unavailable(String),
    #[error("Request rejected: {0}")]
    Rejected(String),
    #[error("Out-of-order request: sequence {got} after {last}")]
    OutOfOrder { last: u64, got: u64 },
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("Backend error: {0}")]
    Other(String),
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A sequence-tagged intent. Sequence numbers increase monotonically per
/// session so the service can apply relative deltas in issue order.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub seq: u64,
    pub intent: Intent,
}

impl Request {
    pub fn new(seq: u64, intent: Intent) -> Self {
        Self { seq, intent }
    }
}

/// Reply from the persistence service.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The complete current scene, as shape records.
    Scene(Vec<Value>),
    /// Acknowledgement without a scene (import).
    Ack,
    /// Opaque encoded payload (export).
    Payload(Vec<u8>),
}

/// Trait for persistence service connections.
///
/// Implementations may talk to a remote service or keep the scene in
/// memory. The editor is single-threaded, so no `Send` bound is required.
///
/// Shape ids in scene records must be UUID strings. Records with any other
/// id are dropped when the scene is decoded.
pub trait Backend {
    /// Send one request and wait for its reply.
    fn send(&self, request: Request) -> BoxFuture<'_, BackendResult<Reply>>;
}
