//! Sketchboard Core Library
//!
//! Platform-agnostic scene engine for the Sketchboard drawing surface: the
//! shape model, geometry, the tool interaction state machine and the cache
//! that mirrors the authoritative shape list held by the persistence service.

pub mod backend;
pub mod config;
pub mod editor;
pub mod geometry;
pub mod intent;
pub mod scene;
pub mod shapes;
pub mod tools;
pub mod wire;

pub use backend::{Backend, BackendError, BackendResult, MemoryBackend, Reply, Request};
pub use config::EditorConfig;
pub use editor::{Editor, EditorError, EditorResult, FlushSummary};
pub use intent::{Intent, ResizeAnchor};
pub use scene::SceneCache;
pub use shapes::{Geometry, Shape, ShapeDraft, ShapeId, ShapeKind, ShapeStyle};
pub use tools::{Draft, Reaction, ToolKind, ToolManager, ToolState};
pub use wire::{CodecError, DecodeError, ExportFormat};
