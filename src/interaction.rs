//! Sidebar interaction state machine.
//!
//! Drag and drop, inline rename and the context menu are modeled as one
//! tagged state. Intermediate transitions only change the state; terminal
//! ones (drop, rename commit, menu action) yield a [`TreeCommand`] for the
//! request tree. Menu actions on a captured log yield a [`MenuEffect`] the
//! caller resolves against the capture log.

use crate::tree::TreeCommand;

/// Where a dragged request may be dropped
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropTarget {
    Root,
    Collection(String),
}

impl DropTarget {
    fn into_collection_id(self) -> Option<String> {
        match self {
            DropTarget::Root => None,
            DropTarget::Collection(id) => Some(id),
        }
    }
}

/// A node of the sidebar: a saved collection or request, or a captured log
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeRef {
    Collection(String),
    Request(String),
    Log(String),
}

/// Context menu entries
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Rename,
    Duplicate,
    Delete,
    /// Import a captured log as a root request
    SaveToRoot,
    /// Render a captured log as a cURL command
    CopyCurl,
}

/// Outcome of a context menu choice
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuEffect {
    Tree(TreeCommand),
    SaveLog { log_id: String },
    CopyCurl { log_id: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Dragging {
        request_id: String,
    },
    HoverTarget {
        request_id: String,
        target: DropTarget,
    },
    Editing {
        target: NodeRef,
        buffer: String,
    },
    ContextMenu {
        target: NodeRef,
    },
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    /// Drop target currently highlighted, if any
    pub fn hovered(&self) -> Option<&DropTarget> {
        match self {
            Interaction::HoverTarget { target, .. } => Some(target),
            _ => None,
        }
    }

    // ========================
    // Drag and drop
    // ========================

    pub fn start_drag(&mut self, request_id: impl Into<String>) {
        *self = Interaction::Dragging {
            request_id: request_id.into(),
        };
    }

    pub fn drag_over(&mut self, target: DropTarget) {
        if let Some(request_id) = self.dragged_request() {
            *self = Interaction::HoverTarget { request_id, target };
        }
    }

    pub fn drag_leave(&mut self) {
        if let Some(request_id) = self.dragged_request() {
            *self = Interaction::Dragging { request_id };
        }
    }

    /// Finish a drag over `target`. Returns the move to perform.
    pub fn drop_on(&mut self, target: DropTarget) -> Option<TreeCommand> {
        let request_id = self.dragged_request()?;
        *self = Interaction::Idle;
        Some(TreeCommand::MoveRequest {
            id: request_id,
            target: target.into_collection_id(),
        })
    }

    fn dragged_request(&self) -> Option<String> {
        match self {
            Interaction::Dragging { request_id } | Interaction::HoverTarget { request_id, .. } => {
                Some(request_id.clone())
            }
            _ => None,
        }
    }

    // ========================
    // Inline rename
    // ========================

    pub fn begin_rename(&mut self, target: NodeRef, current_name: impl Into<String>) {
        *self = Interaction::Editing {
            target,
            buffer: current_name.into(),
        };
    }

    pub fn edit(&mut self, text: impl Into<String>) {
        if let Interaction::Editing { buffer, .. } = self {
            *buffer = text.into();
        }
    }

    /// Leave edit mode. A blank buffer commits nothing.
    pub fn commit(&mut self) -> Option<TreeCommand> {
        if !matches!(self, Interaction::Editing { .. }) {
            return None;
        }
        let Interaction::Editing { target, buffer } = std::mem::take(self) else {
            return None;
        };
        if buffer.trim().is_empty() {
            return None;
        }
        match target {
            NodeRef::Collection(id) => Some(TreeCommand::RenameCollection { id, name: buffer }),
            NodeRef::Request(id) => Some(TreeCommand::RenameRequest { id, name: buffer }),
            NodeRef::Log(_) => None,
        }
    }

    // ========================
    // Context menu
    // ========================

    pub fn open_context_menu(&mut self, target: NodeRef) {
        *self = Interaction::ContextMenu { target };
    }

    /// Pick a menu entry. Rename switches to edit mode and yields nothing yet.
    ///
    /// Entries that do not apply to the node (renaming a log, saving a
    /// collection) close the menu without an effect.
    pub fn choose(&mut self, action: MenuAction, current_name: &str) -> Option<MenuEffect> {
        if !matches!(self, Interaction::ContextMenu { .. }) {
            return None;
        }
        let Interaction::ContextMenu { target } = std::mem::take(self) else {
            return None;
        };
        let command = match (action, target) {
            (MenuAction::Rename, NodeRef::Log(_)) => return None,
            (MenuAction::Rename, target) => {
                self.begin_rename(target, current_name);
                return None;
            }
            (MenuAction::SaveToRoot, NodeRef::Log(log_id)) => return Some(MenuEffect::SaveLog { log_id }),
            (MenuAction::CopyCurl, NodeRef::Log(log_id)) => return Some(MenuEffect::CopyCurl { log_id }),
            (MenuAction::Duplicate, NodeRef::Request(id)) => TreeCommand::DuplicateRequest { id },
            (MenuAction::Delete, NodeRef::Request(id)) => TreeCommand::DeleteRequest { id },
            (MenuAction::Delete, NodeRef::Collection(id)) => TreeCommand::DeleteCollection { id },
            _ => return None,
        };
        Some(MenuEffect::Tree(command))
    }

    /// Abandon whatever is in progress
    pub fn cancel(&mut self) {
        *self = Interaction::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureLog;
    use crate::ids::IdAllocator;
    use crate::models::LoggedRequest;
    use crate::tree::RequestTree;

    #[test]
    fn test_drag_hover_drop() {
        let mut ui = Interaction::default();
        ui.start_drag("r1");
        ui.drag_over(DropTarget::Collection("c1".into()));
        assert_eq!(ui.hovered(), Some(&DropTarget::Collection("c1".into())));
        ui.drag_leave();
        assert_eq!(ui, Interaction::Dragging { request_id: "r1".into() });

        let cmd = ui.drop_on(DropTarget::Root);
        assert_eq!(cmd, Some(TreeCommand::MoveRequest { id: "r1".into(), target: None }));
        assert!(ui.is_idle());
    }

    #[test]
    fn test_drop_without_drag_does_nothing() {
        let mut ui = Interaction::default();
        ui.drag_over(DropTarget::Root);
        assert!(ui.is_idle());
        assert_eq!(ui.drop_on(DropTarget::Root), None);
    }

    #[test]
    fn test_rename_commit_and_cancel() {
        let mut ui = Interaction::default();
        ui.begin_rename(NodeRef::Collection("c1".into()), "Auth");
        ui.edit("Accounts");
        assert_eq!(
            ui.commit(),
            Some(TreeCommand::RenameCollection { id: "c1".into(), name: "Accounts".into() })
        );
        assert!(ui.is_idle());

        ui.begin_rename(NodeRef::Request("r1".into()), "Login");
        ui.edit("   ");
        assert_eq!(ui.commit(), None);
        assert!(ui.is_idle());

        ui.begin_rename(NodeRef::Request("r1".into()), "Login");
        ui.cancel();
        assert_eq!(ui.commit(), None);
    }

    #[test]
    fn test_context_menu_actions() {
        let mut ui = Interaction::default();
        ui.open_context_menu(NodeRef::Request("r1".into()));
        assert_eq!(
            ui.choose(MenuAction::Duplicate, "Login"),
            Some(MenuEffect::Tree(TreeCommand::DuplicateRequest { id: "r1".into() }))
        );
        assert!(ui.is_idle());

        ui.open_context_menu(NodeRef::Collection("c1".into()));
        assert_eq!(ui.choose(MenuAction::SaveToRoot, "Auth"), None);
        assert!(ui.is_idle());

        ui.open_context_menu(NodeRef::Collection("c1".into()));
        assert_eq!(ui.choose(MenuAction::Rename, "Auth"), None);
        assert_eq!(
            ui,
            Interaction::Editing { target: NodeRef::Collection("c1".into()), buffer: "Auth".into() }
        );
    }

    #[test]
    fn test_log_menu_saves_and_copies() {
        let mut capture = CaptureLog::new();
        let entry: LoggedRequest = serde_json::from_str(
            r#"{"id":"l1","method":"POST","url":"https://x.dev/login","timestamp":0,"status":200,
                "requestHeaders":{"Accept":"json"},"requestBody":"a=1"}"#,
        )
        .unwrap();
        capture.record(entry);
        let mut tree = RequestTree::with_ids(IdAllocator::with_prefix("t"));

        let mut ui = Interaction::default();
        ui.open_context_menu(NodeRef::Log("l1".into()));
        let effect = ui.choose(MenuAction::SaveToRoot, "");
        assert_eq!(effect, Some(MenuEffect::SaveLog { log_id: "l1".into() }));
        assert!(ui.is_idle());

        let draft = capture.import("l1").unwrap();
        let id = tree.insert_request(None, draft).unwrap();
        let saved = tree.find_request(&id).unwrap();
        assert_eq!(saved.url, "https://x.dev/login");
        assert_eq!(saved.body_raw, "a=1");
        assert_eq!(tree.root_requests.len(), 1);

        ui.open_context_menu(NodeRef::Log("l1".into()));
        assert_eq!(ui.choose(MenuAction::CopyCurl, ""), Some(MenuEffect::CopyCurl { log_id: "l1".into() }));
        assert!(capture.to_curl("l1").unwrap().contains("--data-raw 'a=1'"));

        ui.open_context_menu(NodeRef::Log("l1".into()));
        assert_eq!(ui.choose(MenuAction::Rename, "l1"), None);
        assert!(ui.is_idle());

        ui.begin_rename(NodeRef::Log("l1".into()), "x");
        assert_eq!(ui.commit(), None);
    }

    #[test]
    fn test_drop_moves_request_in_tree() {
        let mut tree = RequestTree::with_ids(IdAllocator::with_prefix("t"));
        let col = tree.create_collection("Auth");
        let req = tree.create_request(None).unwrap();

        let mut ui = Interaction::default();
        ui.start_drag(req.clone());
        ui.drag_over(DropTarget::Collection(col.clone()));
        let cmd = ui.drop_on(DropTarget::Collection(col.clone())).unwrap();
        assert!(tree.apply(cmd));
        assert_eq!(tree.find_collection(&col).unwrap().requests[0].id, req);
        assert!(tree.root_requests.is_empty());
    }
}
