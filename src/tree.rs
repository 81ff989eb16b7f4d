//! Request tree: root-level requests plus a flat list of collections.
//!
//! Every request lives in exactly one container. All operations are atomic:
//! they either fully apply or, when an id cannot be found, do nothing.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::constants::{COPY_SUFFIX, DEFAULT_COLLECTION_NAME};
use crate::ids::IdAllocator;
use crate::models::{CollectionItem, HttpMethod, HttpRequest, KeyValue, LoggedRequest, RequestDraft};
use crate::models::{BodyType, Header};
use crate::query::split_url;

/// Where a request currently lives
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Container {
    Root,
    /// Index into `collections`
    Collection(usize),
}

/// A structural change requested by the UI layer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeCommand {
    MoveRequest { id: String, target: Option<String> },
    RenameCollection { id: String, name: String },
    RenameRequest { id: String, name: String },
    DuplicateRequest { id: String },
    DeleteRequest { id: String },
    DeleteCollection { id: String },
}

/// In-memory owner of collections and root requests
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTree {
    #[serde(default)]
    pub collections: Vec<CollectionItem>,
    #[serde(default)]
    pub root_requests: Vec<HttpRequest>,
    #[serde(skip)]
    ids: IdAllocator,
}

impl RequestTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty tree with a caller-supplied id allocator
    pub fn with_ids(ids: IdAllocator) -> Self {
        RequestTree {
            collections: Vec::new(),
            root_requests: Vec::new(),
            ids,
        }
    }

    // ========================
    // Lookup
    // ========================

    pub fn find_collection(&self, id: &str) -> Option<&CollectionItem> {
        self.collections.iter().find(|c| c.id == id)
    }

    pub fn find_request(&self, id: &str) -> Option<&HttpRequest> {
        let (container, index) = self.locate(id)?;
        self.container(container).get(index)
    }

    /// Container currently holding the request
    pub fn container_of(&self, id: &str) -> Option<Container> {
        self.locate(id).map(|(container, _)| container)
    }

    /// All requests, root first, then each collection in order
    pub fn requests(&self) -> impl Iterator<Item = &HttpRequest> {
        self.root_requests
            .iter()
            .chain(self.collections.iter().flat_map(|c| c.requests.iter()))
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.collections.iter().any(|c| c.id == id)
            || self
                .requests()
                .any(|r| r.id == id || r.headers.iter().chain(&r.body_form).any(|kv| kv.id == id))
    }

    /// First collection or request id held more than once, if any.
    ///
    /// A restored document must not place one request in two containers.
    pub fn duplicate_id(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.collections
            .iter()
            .map(|c| c.id.as_str())
            .chain(self.requests().map(|r| r.id.as_str()))
            .find(|id| !seen.insert(*id))
    }

    fn locate(&self, id: &str) -> Option<(Container, usize)> {
        if let Some(i) = self.root_requests.iter().position(|r| r.id == id) {
            return Some((Container::Root, i));
        }
        self.collections.iter().enumerate().find_map(|(ci, c)| {
            c.requests
                .iter()
                .position(|r| r.id == id)
                .map(|i| (Container::Collection(ci), i))
        })
    }

    fn collection_index(&self, id: &str) -> Option<usize> {
        self.collections.iter().position(|c| c.id == id)
    }

    fn container(&self, container: Container) -> &Vec<HttpRequest> {
        match container {
            Container::Root => &self.root_requests,
            Container::Collection(i) => &self.collections[i].requests,
        }
    }

    fn container_mut(&mut self, container: Container) -> &mut Vec<HttpRequest> {
        match container {
            Container::Root => &mut self.root_requests,
            Container::Collection(i) => &mut self.collections[i].requests,
        }
    }

    /// Resolve an optional collection id into a container. `None` is root.
    fn target_container(&self, parent: Option<&str>) -> Option<Container> {
        match parent {
            None => Some(Container::Root),
            Some(id) => self.collection_index(id).map(Container::Collection),
        }
    }

    /// Next id not already used anywhere in the tree
    fn fresh_id(&mut self) -> String {
        loop {
            let id = self.ids.next_id();
            if !self.contains_id(&id) {
                return id;
            }
        }
    }

    fn fresh_rows(&mut self, rows: &[KeyValue]) -> Vec<KeyValue> {
        rows.iter()
            .map(|kv| KeyValue {
                id: self.fresh_id(),
                ..kv.clone()
            })
            .collect()
    }

    // ========================
    // Collections
    // ========================

    /// Append an empty, expanded collection. Returns its id.
    pub fn create_collection(&mut self, name: &str) -> String {
        let name = match name.trim() {
            "" => DEFAULT_COLLECTION_NAME,
            _ => name,
        };
        let id = self.fresh_id();
        self.collections.push(CollectionItem::new(id.clone(), name));
        tracing::debug!(id = %id, name, "Created collection");
        id
    }

    pub fn rename_collection(&mut self, id: &str, new_name: &str) -> bool {
        if new_name.trim().is_empty() {
            return false;
        }
        match self.collections.iter_mut().find(|c| c.id == id) {
            Some(collection) => {
                collection.name = new_name.to_string();
                true
            }
            None => {
                tracing::debug!(id, "Rename of unknown collection ignored");
                false
            }
        }
    }

    /// Remove a collection together with every request inside it
    pub fn delete_collection(&mut self, id: &str) -> bool {
        match self.collection_index(id) {
            Some(index) => {
                let removed = self.collections.remove(index);
                tracing::debug!(id, requests = removed.requests.len(), "Deleted collection");
                true
            }
            None => {
                tracing::debug!(id, "Delete of unknown collection ignored");
                false
            }
        }
    }

    pub fn toggle_collapse(&mut self, id: &str) -> bool {
        match self.collections.iter_mut().find(|c| c.id == id) {
            Some(collection) => {
                collection.collapsed = !collection.collapsed;
                true
            }
            None => false,
        }
    }

    // ========================
    // Requests
    // ========================

    /// Append a blank GET request to root (`None`) or to a collection.
    pub fn create_request(&mut self, parent: Option<&str>) -> Option<String> {
        let Some(container) = self.target_container(parent) else {
            tracing::debug!(collection = ?parent, "Create in unknown collection ignored");
            return None;
        };
        let id = self.fresh_id();
        self.container_mut(container).push(HttpRequest::blank(id.clone()));
        tracing::debug!(id = %id, ?container, "Created request");
        Some(id)
    }

    /// Materialize a decoded or imported draft as a new request
    pub fn insert_request(&mut self, parent: Option<&str>, draft: RequestDraft) -> Option<String> {
        let Some(container) = self.target_container(parent) else {
            tracing::debug!(collection = ?parent, "Insert into unknown collection ignored");
            return None;
        };

        let id = self.fresh_id();
        let url = draft.url.unwrap_or_default();
        let name = draft.name.unwrap_or_else(|| suggested_name(&draft.method, &url));
        let mut request = HttpRequest {
            name,
            method: draft.method,
            url,
            body_type: draft.body_type,
            body_raw: draft.body_raw,
            ..HttpRequest::blank(id.clone())
        };
        for header in draft.headers {
            request.headers.push(KeyValue {
                id: self.fresh_id(),
                key: header.key,
                value: header.value,
                enabled: header.enabled,
            });
        }

        self.container_mut(container).push(request);
        tracing::debug!(id = %id, ?container, "Inserted request");
        Some(id)
    }

    pub fn rename_request(&mut self, id: &str, new_name: &str) -> bool {
        if new_name.trim().is_empty() {
            return false;
        }
        let Some((container, index)) = self.locate(id) else {
            tracing::debug!(id, "Rename of unknown request ignored");
            return false;
        };
        self.container_mut(container)[index].name = new_name.to_string();
        true
    }

    /// Apply field edits. The request keeps its id whatever the closure does.
    pub fn edit_request<F>(&mut self, id: &str, edit: F) -> bool
    where
        F: FnOnce(&mut HttpRequest),
    {
        let Some((container, index)) = self.locate(id) else {
            return false;
        };
        let request = &mut self.container_mut(container)[index];
        edit(request);
        request.id = id.to_string();
        true
    }

    /// Remove a request from whichever container holds it
    pub fn delete_request(&mut self, id: &str) -> bool {
        let Some((container, index)) = self.locate(id) else {
            tracing::debug!(id, "Delete of unknown request ignored");
            return false;
        };
        self.container_mut(container).remove(index);
        tracing::debug!(id, ?container, "Deleted request");
        true
    }

    /// Insert a copy right after the original. Returns the copy's id.
    pub fn duplicate_request(&mut self, id: &str) -> Option<String> {
        let Some((container, index)) = self.locate(id) else {
            tracing::debug!(id, "Duplicate of unknown request ignored");
            return None;
        };
        let original = self.container(container)[index].clone();

        let copy_id = self.fresh_id();
        let copy = HttpRequest {
            id: copy_id.clone(),
            name: format!("{}{}", original.name, COPY_SUFFIX),
            headers: self.fresh_rows(&original.headers),
            body_form: self.fresh_rows(&original.body_form),
            ..original
        };
        self.container_mut(container).insert(index + 1, copy);
        tracing::debug!(id, copy = %copy_id, "Duplicated request");
        Some(copy_id)
    }

    /// Move a request to the end of another container (`None` is root)
    pub fn move_request(&mut self, id: &str, target: Option<&str>) -> bool {
        let Some((from, index)) = self.locate(id) else {
            tracing::debug!(id, "Move of unknown request ignored");
            return false;
        };
        let Some(to) = self.target_container(target) else {
            tracing::debug!(id, to = ?target, "Move to unknown collection ignored");
            return false;
        };
        if from == to {
            return false;
        }

        let request = self.container_mut(from).remove(index);
        self.container_mut(to).push(request);
        tracing::debug!(id, ?from, ?to, "Moved request");
        true
    }

    /// Empty the whole tree
    pub fn reset(&mut self) {
        self.collections.clear();
        self.root_requests.clear();
        tracing::info!("Workspace reset");
    }

    /// Execute a command produced by the interaction layer
    pub fn apply(&mut self, command: TreeCommand) -> bool {
        match command {
            TreeCommand::MoveRequest { id, target } => self.move_request(&id, target.as_deref()),
            TreeCommand::RenameCollection { id, name } => self.rename_collection(&id, &name),
            TreeCommand::RenameRequest { id, name } => self.rename_request(&id, &name),
            TreeCommand::DuplicateRequest { id } => self.duplicate_request(&id).is_some(),
            TreeCommand::DeleteRequest { id } => self.delete_request(&id),
            TreeCommand::DeleteCollection { id } => self.delete_collection(&id),
        }
    }
}

/// Initial field values for a saved request built from a capture.
///
/// The capture itself is left untouched.
pub fn import_logged_request(log: &LoggedRequest) -> RequestDraft {
    let body = log.body_text();
    RequestDraft {
        name: None,
        method: HttpMethod::parse(&log.method),
        url: Some(log.url.clone()),
        headers: log
            .request_headers
            .iter()
            .map(|(k, v)| Header::new(k.clone(), v.clone()))
            .collect(),
        body_type: if body.is_some() { BodyType::Raw } else { BodyType::None },
        body_raw: body.unwrap_or_default(),
    }
}

fn suggested_name(method: &HttpMethod, url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    let (_, path) = split_url(url);
    match path.split('?').next() {
        Some(p) if !p.is_empty() && p != "/" => format!("{} {}", method, p),
        _ => url.to_string(),
    }
}
