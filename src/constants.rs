//! Application constants
//!
//! Centralized location for file names and configuration defaults.

/// Data directory created under the user's home directory
pub const DATA_DIR_NAME: &str = ".postcap";

/// Saved collections and root requests
pub const WORKSPACE_FILE: &str = "workspace.yaml";

/// Captured traffic log
pub const CAPTURE_FILE: &str = "capture.json";

/// Log file written by the binary, inside the data directory
pub const LOG_FILE: &str = "postcap.log";

/// Captured entries kept before the oldest is dropped
pub const MAX_CAPTURED: usize = 500;

/// Appended to the name of a duplicated request
pub const COPY_SUFFIX: &str = " (Copy)";

/// Name used when a collection is created with a blank name
pub const DEFAULT_COLLECTION_NAME: &str = "New Collection";
