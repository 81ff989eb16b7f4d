//! # Postcap
//!
//! Core of a capture-first HTTP client: saved requests organised in
//! collections, captured traffic, and cURL interop.
//!
//! ## Features
//! - cURL import (tolerant, flag-order independent) and export
//! - Request tree with collections: create, rename, move, duplicate, delete
//! - Captured request log with import into saved requests
//! - Workspace persistence (YAML) and JSON export
//!
//! ## Architecture
//! - Codec (`curl`) - pure text <-> request translation
//! - Tree store (`tree`) - invariant-preserving mutations over the workspace
//! - Interaction layer (`interaction`) - UI state machine emitting tree commands

pub mod models;
pub mod ids;
pub mod curl;
pub mod tree;
pub mod interaction;
pub mod capture;
pub mod query;
pub mod storage;
pub mod constants;

// Re-export commonly used types
pub use models::{
    BodyType, CapturedBody, CollectionItem, Header, HttpMethod, HttpRequest, KeyValue,
    LoggedRequest, RequestDraft,
};
pub use curl::{parse_curl, to_curl, ToCurl};
pub use tree::{import_logged_request, Container, RequestTree, TreeCommand};
pub use interaction::{DropTarget, Interaction, MenuAction, MenuEffect, NodeRef};
pub use capture::CaptureLog;
pub use ids::IdAllocator;
pub use storage::Storage;
