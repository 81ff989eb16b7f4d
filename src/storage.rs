use crate::capture::CaptureLog;
use crate::constants::{CAPTURE_FILE, DATA_DIR_NAME, WORKSPACE_FILE};
use crate::tree::RequestTree;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Persists the request tree and the capture log in a data directory
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    /// Storage in `~/.postcap`
    pub fn new() -> Self {
        let data_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DATA_DIR_NAME);
        Self::at(data_dir)
    }

    pub fn at(data_dir: impl Into<PathBuf>) -> Self {
        Storage {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Ensure data directory exists
    pub fn ensure_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir).with_context(|| {
                format!("Failed to create data directory `{}`", self.data_dir.display())
            })?;
        }
        Ok(())
    }

    /// Load the saved tree. A missing file is an empty tree.
    pub fn load_tree(&self) -> Result<RequestTree> {
        let path = self.data_dir.join(WORKSPACE_FILE);
        if !path.exists() {
            return Ok(RequestTree::new());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read workspace `{}`", path.display()))?;
        let tree: RequestTree = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse workspace `{}`", path.display()))?;
        validate(&tree).with_context(|| format!("Invalid workspace `{}`", path.display()))?;
        tracing::info!(
            path = %path.display(),
            collections = tree.collections.len(),
            root_requests = tree.root_requests.len(),
            "Loaded workspace"
        );
        Ok(tree)
    }

    pub fn save_tree(&self, tree: &RequestTree) -> Result<()> {
        self.ensure_dir()?;
        let path = self.data_dir.join(WORKSPACE_FILE);
        let content = serde_yaml::to_string(tree).context("Failed to serialize workspace")?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write workspace `{}`", path.display()))?;
        tracing::info!(path = %path.display(), "Saved workspace");
        Ok(())
    }

    /// Load the capture log. A missing file is an empty, recording log.
    pub fn load_capture(&self) -> Result<CaptureLog> {
        let path = self.data_dir.join(CAPTURE_FILE);
        if !path.exists() {
            return Ok(CaptureLog::new());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read capture log `{}`", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse capture log `{}`", path.display()))
    }

    pub fn save_capture(&self, log: &CaptureLog) -> Result<()> {
        self.ensure_dir()?;
        let path = self.data_dir.join(CAPTURE_FILE);
        let content = serde_json::to_string_pretty(log).context("Failed to serialize capture log")?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write capture log `{}`", path.display()))?;
        tracing::info!(path = %path.display(), entries = log.len(), "Saved capture log");
        Ok(())
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

/// Whole tree as a JSON document, for sharing with other tools
pub fn export_json(tree: &RequestTree) -> Result<String> {
    serde_json::to_string_pretty(tree).context("Failed to serialize workspace")
}

/// Parse a document written by `export_json`.
///
/// The top level must be an object; every id must be held once.
pub fn import_json(json: &str) -> Result<RequestTree> {
    let value: serde_json::Value = serde_json::from_str(json).context("Invalid workspace document")?;
    if !value.is_object() {
        bail!("Invalid workspace document: expected an object with `collections` and `rootRequests`");
    }
    let tree: RequestTree = serde_json::from_value(value).context("Invalid workspace document")?;
    validate(&tree).context("Invalid workspace document")?;
    Ok(tree)
}

fn validate(tree: &RequestTree) -> Result<()> {
    if let Some(id) = tree.duplicate_id() {
        bail!("Duplicate id `{}`", id);
    }
    Ok(())
}
