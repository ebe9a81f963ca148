//! Screen controller — the state machine behind the UI.
//!
//! Startup logs in, login loads the list, the list opens per-item window
//! stacks (detail → confirm → outcome glyph), and every decision is sent to
//! the server before the item leaves the list.
//!
//! The controller does no I/O. Button presses and network completions go
//! in, [`Effect`]s come out; the runtime executes them and feeds the
//! [`Completion`]s back. Everything runs on one logical thread.

pub mod runner;
pub mod types;

use crate::api::{ApprovalItem, Credentials, Decision, SessionToken};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub use runner::{execute, run_until_idle};
pub use types::*;

/// How long the outcome glyph takes to slide off before the stack collapses.
pub const RESULT_TRANSITION: Duration = Duration::from_millis(300);

/// Request currently on the wire (or the glyph animation after a decide ack).
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    Login,
    List,
    Decide { item_id: String },
    Transition { item_id: String },
}

pub struct Controller {
    credentials: Credentials,
    token: Option<SessionToken>,
    status: MainStatus,
    main_scroll: u16,
    reload_enabled: bool,
    menu: Option<Menu>,
    stack: Option<WindowStack>,
    pending: Option<Pending>,
    /// Largest scroll offset of the foreground card, in wrapped rows, as
    /// last measured by the renderer. `None` until the first measurement.
    scroll_limit: Option<u16>,
    transition: Duration,
    quit: bool,
}

impl Controller {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            token: None,
            status: MainStatus::Connecting,
            main_scroll: 0,
            reload_enabled: false,
            menu: None,
            stack: None,
            pending: None,
            scroll_limit: None,
            transition: RESULT_TRANSITION,
            quit: false,
        }
    }

    /// Override the outcome glyph's exit animation (tests use zero).
    pub fn with_transition(mut self, transition: Duration) -> Self {
        self.transition = transition;
        self
    }

    // ── Accessors ──

    pub fn status(&self) -> &MainStatus {
        &self.status
    }

    /// Main card body text.
    pub fn main_body(&self) -> String {
        self.status.body()
    }

    pub fn reload_enabled(&self) -> bool {
        self.reload_enabled
    }

    pub fn menu(&self) -> Option<&Menu> {
        self.menu.as_ref()
    }

    /// Items currently listed (empty when no menu is open).
    pub fn items(&self) -> &[ApprovalItem] {
        self.menu.as_ref().map(|m| m.items()).unwrap_or(&[])
    }

    pub fn window_stack(&self) -> Option<&WindowStack> {
        self.stack.as_ref()
    }

    pub fn transition(&self) -> Duration {
        self.transition
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Id of the item whose decision is on the wire, if any.
    pub fn in_flight(&self) -> Option<&str> {
        match &self.pending {
            Some(Pending::Decide { item_id }) | Some(Pending::Transition { item_id }) => {
                Some(item_id)
            }
            _ => None,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// The surface in the foreground.
    pub fn screen(&self) -> Screen<'_> {
        if let Some(stack) = &self.stack {
            if let Some(top) = stack.top() {
                let item = stack.item();
                return match top {
                    Surface::Detail { scroll } => Screen::ItemDetail {
                        item,
                        scroll: *scroll,
                    },
                    Surface::Confirm => Screen::Confirming(item),
                    Surface::Outcome {
                        decision,
                        leaving_since: None,
                    } => Screen::Submitting {
                        item,
                        decision: *decision,
                    },
                    Surface::Outcome {
                        decision,
                        leaving_since: Some(since),
                    } => Screen::Result {
                        decision: *decision,
                        leaving_since: *since,
                    },
                    Surface::Error { message, scroll } => Screen::Error {
                        message,
                        scroll: *scroll,
                    },
                };
            }
        }
        match &self.menu {
            Some(menu) => Screen::Loaded(menu),
            None => Screen::Main {
                status: &self.status,
                reload_enabled: self.reload_enabled,
                scroll: self.main_scroll,
            },
        }
    }

    // ── Inputs ──

    /// Record how far the foreground card can scroll at the current
    /// terminal size. The current offset is pulled back inside the limit.
    pub fn set_scroll_limit(&mut self, limit: u16) {
        self.scroll_limit = Some(limit);
        match self.stack.as_mut().and_then(|s| s.top_mut()) {
            Some(Surface::Detail { scroll }) | Some(Surface::Error { scroll, .. }) => {
                *scroll = (*scroll).min(limit)
            }
            Some(_) => {}
            None if self.menu.is_none() => self.main_scroll = self.main_scroll.min(limit),
            None => {}
        }
    }

    /// Begin the session: show `Connecting ...` and log in.
    pub fn start(&mut self) -> Option<Effect> {
        if self.pending.is_some() || self.token.is_some() {
            return None;
        }
        self.set_status(MainStatus::Connecting);
        self.pending = Some(Pending::Login);
        info!(username = %self.credentials.username, "Connecting");
        Some(Effect::Login(self.credentials.clone()))
    }

    /// Handle a button press on whatever is in the foreground.
    pub fn press(&mut self, button: Button) -> Option<Effect> {
        if self.stack.is_some() {
            return self.press_on_stack(button);
        }
        if self.menu.is_some() {
            return self.press_on_menu(button);
        }
        self.press_on_main(button)
    }

    /// Feed back the result of an effect.
    pub fn complete(&mut self, completion: Completion) -> Option<Effect> {
        match completion {
            Completion::LoggedIn(result) => self.on_logged_in(result),
            Completion::Listed(result) => self.on_listed(result),
            Completion::Decided { item_id, result } => self.on_decided(item_id, result),
            Completion::TransitionElapsed => self.on_transition_elapsed(),
        }
    }

    /// Error presenter: put a scrollable `Failed` card in front of the
    /// current item's surfaces. Outside an item flow the message goes to
    /// the main card.
    pub fn show_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        if let Some(stack) = self.stack.as_mut() {
            stack.push(Surface::Error { message, scroll: 0 });
            return;
        }
        self.set_status(MainStatus::Failed(message));
    }

    fn set_status(&mut self, status: MainStatus) {
        self.status = status;
        self.main_scroll = 0;
    }

    fn scroll_down(&self, scroll: u16) -> u16 {
        scroll.saturating_add(1).min(self.scroll_limit.unwrap_or(u16::MAX))
    }

    // ── Button handling ──

    fn press_on_main(&mut self, button: Button) -> Option<Effect> {
        match button {
            Button::Select if self.reload_enabled && self.pending.is_none() => {
                debug!("Manual reload");
                self.load()
            }
            Button::Back => {
                self.quit = true;
                Some(Effect::Quit)
            }
            Button::Up => {
                self.main_scroll = self.main_scroll.saturating_sub(1);
                None
            }
            Button::Down => {
                self.main_scroll = self.scroll_down(self.main_scroll);
                None
            }
            Button::Select => None,
        }
    }

    fn press_on_menu(&mut self, button: Button) -> Option<Effect> {
        let menu = self.menu.as_mut()?;
        match button {
            Button::Up => menu.select_prev(),
            Button::Down => menu.select_next(),
            Button::Select => {
                if let Some(item) = menu.selected_item() {
                    debug!(item_id = %item.id, "Opening work item");
                    self.stack = Some(WindowStack::open(item.clone()));
                }
            }
            Button::Back => self.menu = None,
        }
        None
    }

    fn press_on_stack(&mut self, button: Button) -> Option<Effect> {
        let limit = self.scroll_limit.unwrap_or(u16::MAX);
        let stack = self.stack.as_mut()?;
        let top = match stack.top_mut() {
            Some(top) => top,
            None => {
                self.stack = None;
                return None;
            }
        };

        match top {
            Surface::Detail { scroll } => match button {
                Button::Up => *scroll = scroll.saturating_sub(1),
                Button::Down => *scroll = scroll.saturating_add(1).min(limit),
                Button::Select => stack.push(Surface::Confirm),
                Button::Back => self.pop_surface(),
            },
            Surface::Confirm => match button {
                Button::Up => return self.submit(Decision::Approve),
                Button::Down => return self.submit(Decision::Reject),
                Button::Select => {}
                Button::Back => self.pop_surface(),
            },
            // The decision is on the wire; nothing to do until it lands.
            Surface::Outcome { .. } => {}
            Surface::Error { scroll, .. } => match button {
                Button::Up => *scroll = scroll.saturating_sub(1),
                Button::Down => *scroll = scroll.saturating_add(1).min(limit),
                Button::Select | Button::Back => self.pop_surface(),
            },
        }
        None
    }

    fn pop_surface(&mut self) {
        if let Some(stack) = self.stack.as_mut() {
            stack.pop();
            if stack.is_empty() {
                self.stack = None;
            }
        }
    }

    // ── Network-backed transitions ──

    fn load(&mut self) -> Option<Effect> {
        let token = self.token.clone()?;
        self.set_status(MainStatus::Loading);
        self.pending = Some(Pending::List);
        Some(Effect::ListItems {
            token,
            username: self.credentials.username.clone(),
        })
    }

    fn submit(&mut self, decision: Decision) -> Option<Effect> {
        if self.pending.is_some() {
            return None;
        }
        let token = self.token.clone()?;
        let stack = self.stack.as_mut()?;
        let item_id = stack.item().id.clone();

        stack.push(Surface::Outcome {
            decision,
            leaving_since: None,
        });
        self.pending = Some(Pending::Decide {
            item_id: item_id.clone(),
        });
        info!(item_id = %item_id, %decision, "Submitting decision");
        Some(Effect::Decide {
            token,
            item_id,
            decision,
        })
    }

    fn on_logged_in(
        &mut self,
        result: Result<SessionToken, crate::api::AuthError>,
    ) -> Option<Effect> {
        if self.pending != Some(Pending::Login) {
            warn!("Ignoring unexpected login completion");
            return None;
        }
        self.pending = None;
        match result {
            Ok(token) => {
                self.token = Some(token);
                self.set_status(MainStatus::Connected);
                self.reload_enabled = true;
                self.load()
            }
            Err(e) => {
                // No reload path: the session is over until restart.
                warn!(detail = %e.detail, "Login failed");
                self.set_status(MainStatus::Failed(e.detail));
                None
            }
        }
    }

    fn on_listed(
        &mut self,
        result: Result<Vec<ApprovalItem>, crate::api::ServiceError>,
    ) -> Option<Effect> {
        if self.pending != Some(Pending::List) {
            warn!("Ignoring unexpected list completion");
            return None;
        }
        self.pending = None;
        match result {
            Ok(items) if items.is_empty() => {
                self.menu = None;
                self.set_status(MainStatus::NothingToApprove);
            }
            Ok(items) => {
                self.set_status(MainStatus::Loaded);
                self.menu = Some(Menu::new(items));
            }
            Err(e) => {
                warn!(detail = %e.detail, "Loading work items failed");
                self.menu = None;
                self.set_status(MainStatus::Failed(e.detail));
            }
        }
        None
    }

    fn on_decided(
        &mut self,
        item_id: String,
        result: Result<(), crate::api::ServiceError>,
    ) -> Option<Effect> {
        let expected = Some(Pending::Decide {
            item_id: item_id.clone(),
        });
        if self.pending != expected {
            warn!(item_id = %item_id, "Ignoring unexpected decide completion");
            return None;
        }

        match result {
            Ok(()) => {
                if let Some(Surface::Outcome { leaving_since, .. }) =
                    self.stack.as_mut().and_then(|s| s.top_mut())
                {
                    *leaving_since = Some(Instant::now());
                }
                self.pending = Some(Pending::Transition { item_id });
                Some(Effect::Transition(self.transition))
            }
            Err(e) => {
                // The glyph goes, the detail and confirm cards stay so the
                // user can back out or try again. The item stays listed.
                warn!(item_id = %item_id, detail = %e.detail, "Decision failed");
                self.pending = None;
                if let Some(stack) = self.stack.as_mut() {
                    if matches!(stack.top(), Some(Surface::Outcome { .. })) {
                        stack.pop();
                    }
                }
                self.show_error(e.detail);
                None
            }
        }
    }

    fn on_transition_elapsed(&mut self) -> Option<Effect> {
        let item_id = match self.pending.take() {
            Some(Pending::Transition { item_id }) => item_id,
            other => {
                self.pending = other;
                return None;
            }
        };

        if let Some(mut stack) = self.stack.take() {
            let hidden = stack.collapse();
            debug!(item_id = %item_id, hidden, "Window stack collapsed");
        }

        if let Some(menu) = self.menu.as_mut() {
            menu.remove(&item_id);
            if menu.is_empty() {
                self.menu = None;
                self.set_status(MainStatus::NothingToApprove);
            }
        }
        None
    }
}
