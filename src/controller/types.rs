//! Types for the screen controller: inputs, outputs and surfaces.

use crate::api::{ApprovalItem, AuthError, Credentials, Decision, ServiceError, SessionToken};
use std::time::{Duration, Instant};

/// The four buttons of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Up,
    Down,
    Select,
    Back,
}

/// I/O the controller asks the runtime to perform.
/// Each effect produces at most one [`Completion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Login(Credentials),
    ListItems {
        token: SessionToken,
        username: String,
    },
    Decide {
        token: SessionToken,
        item_id: String,
        decision: Decision,
    },
    /// Wait out the outcome glyph's exit animation.
    Transition(Duration),
    Quit,
}

/// Result of an [`Effect`], fed back into the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    LoggedIn(Result<SessionToken, AuthError>),
    Listed(Result<Vec<ApprovalItem>, ServiceError>),
    Decided {
        item_id: String,
        result: Result<(), ServiceError>,
    },
    TransitionElapsed,
}

/// Body text of the main card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MainStatus {
    Connecting,
    Connected,
    Loading,
    Loaded,
    NothingToApprove,
    Failed(String),
}

impl MainStatus {
    pub fn body(&self) -> String {
        match self {
            MainStatus::Connecting => "Connecting ...".to_string(),
            MainStatus::Connected => "Connected.".to_string(),
            MainStatus::Loading => "Loading ...".to_string(),
            MainStatus::Loaded => "Loaded.".to_string(),
            MainStatus::NothingToApprove => "Nothing to approve.".to_string(),
            MainStatus::Failed(detail) => format!("Failed:\n{}", detail),
        }
    }
}

/// The approval list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    items: Vec<ApprovalItem>,
    selected: usize,
}

impl Menu {
    pub const TITLE: &'static str = "Approval List";

    pub fn new(items: Vec<ApprovalItem>) -> Self {
        Self { items, selected: 0 }
    }

    pub fn items(&self) -> &[ApprovalItem] {
        &self.items
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&ApprovalItem> {
        self.items.get(self.selected)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Remove the item with `id`. Returns whether it was present.
    /// The selection stays on the same row, or the last row if that was
    /// the one removed.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.items.iter().position(|i| i.id == id) {
            Some(index) => {
                self.items.remove(index);
                if self.selected >= self.items.len() {
                    self.selected = self.items.len().saturating_sub(1);
                }
                true
            }
            None => false,
        }
    }
}

/// One display surface in an item's window stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Surface {
    /// Scrollable `Name: Value` card
    Detail { scroll: u16 },
    /// "Approve?" card, up approves, down rejects
    Confirm,
    /// Approve/reject glyph; `leaving_since` is set once the server acked
    Outcome {
        decision: Decision,
        leaving_since: Option<Instant>,
    },
    /// Error card pushed by the error presenter
    Error { message: String, scroll: u16 },
}

/// The surfaces opened for one item, last in first out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowStack {
    item: ApprovalItem,
    surfaces: Vec<Surface>,
}

impl WindowStack {
    /// Open the stack with the item's detail card.
    pub fn open(item: ApprovalItem) -> Self {
        Self {
            item,
            surfaces: vec![Surface::Detail { scroll: 0 }],
        }
    }

    pub fn item(&self) -> &ApprovalItem {
        &self.item
    }

    pub fn push(&mut self, surface: Surface) {
        self.surfaces.push(surface);
    }

    pub fn pop(&mut self) -> Option<Surface> {
        self.surfaces.pop()
    }

    pub fn top(&self) -> Option<&Surface> {
        self.surfaces.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Surface> {
        self.surfaces.last_mut()
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Hide every surface, newest first.
    pub fn collapse(&mut self) -> usize {
        let mut hidden = 0;
        while self.surfaces.pop().is_some() {
            hidden += 1;
        }
        hidden
    }
}

/// What is in the foreground, derived from the controller's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen<'a> {
    /// Main card. Covers connecting, login failure, list failure and the
    /// empty list.
    Main {
        status: &'a MainStatus,
        reload_enabled: bool,
        scroll: u16,
    },
    Loaded(&'a Menu),
    ItemDetail {
        item: &'a ApprovalItem,
        scroll: u16,
    },
    Confirming(&'a ApprovalItem),
    Submitting {
        item: &'a ApprovalItem,
        decision: Decision,
    },
    Result {
        decision: Decision,
        leaving_since: Instant,
    },
    Error {
        message: &'a str,
        scroll: u16,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> ApprovalItem {
        ApprovalItem {
            id: id.to_string(),
            object_name: "Expense".to_string(),
            title: id.to_uppercase(),
            fields: vec![],
        }
    }

    #[test]
    fn test_status_bodies() {
        assert_eq!(MainStatus::Connecting.body(), "Connecting ...");
        assert_eq!(MainStatus::NothingToApprove.body(), "Nothing to approve.");
        assert_eq!(
            MainStatus::Failed(r#"{"error":"invalid_grant"}"#.to_string()).body(),
            "Failed:\n{\"error\":\"invalid_grant\"}"
        );
    }

    #[test]
    fn test_menu_remove_keeps_selection_in_range() {
        let mut menu = Menu::new(vec![item("a"), item("b"), item("c")]);
        menu.select_next();
        menu.select_next();
        menu.select_next();
        assert_eq!(menu.selected(), 2);

        assert!(menu.remove("c"));
        assert_eq!(menu.selected(), 1);
        assert_eq!(menu.selected_item().unwrap().id, "b");

        assert!(!menu.remove("zzz"));
        assert!(menu.remove("a"));
        assert!(menu.remove("b"));
        assert!(menu.is_empty());
        assert_eq!(menu.selected(), 0);
        assert!(menu.selected_item().is_none());
    }

    #[test]
    fn test_window_stack_collapse() {
        let mut stack = WindowStack::open(item("a"));
        stack.push(Surface::Confirm);
        stack.push(Surface::Outcome {
            decision: Decision::Approve,
            leaving_since: None,
        });
        assert_eq!(stack.surfaces().len(), 3);
        assert_eq!(stack.collapse(), 3);
        assert!(stack.is_empty());
    }
}
