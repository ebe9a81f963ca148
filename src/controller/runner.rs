//! Executes controller effects against a backend.
//!
//! The terminal runtime spawns [`execute`] per effect and posts the
//! completion back to its loop. [`run_until_idle`] chains effects inline,
//! which is what the headless tests use.

use crate::api::ApprovalBackend;
use crate::controller::{Completion, Controller, Effect};

/// Perform one effect. Exactly one backend call per network effect, no
/// retries. `Quit` has no completion.
pub async fn execute(backend: &dyn ApprovalBackend, effect: Effect) -> Option<Completion> {
    match effect {
        Effect::Login(credentials) => {
            Some(Completion::LoggedIn(backend.login(&credentials).await))
        }
        Effect::ListItems { token, username } => Some(Completion::Listed(
            backend.list_items(&token, &username).await,
        )),
        Effect::Decide {
            token,
            item_id,
            decision,
        } => {
            let result = backend.decide(&token, &item_id, decision.approve()).await;
            Some(Completion::Decided { item_id, result })
        }
        Effect::Transition(duration) => {
            tokio::time::sleep(duration).await;
            Some(Completion::TransitionElapsed)
        }
        Effect::Quit => None,
    }
}

/// Run `effect` and every effect it leads to until the controller waits
/// for input again.
pub async fn run_until_idle(
    controller: &mut Controller,
    backend: &dyn ApprovalBackend,
    effect: Option<Effect>,
) {
    let mut next = effect;
    while let Some(effect) = next.take() {
        next = match execute(backend, effect).await {
            Some(completion) => controller.complete(completion),
            None => None,
        };
    }
}
