//! Interactive terminal client.
//!
//! One cooperative loop owns the controller: render, then wait on the next
//! of key press, effect completion or render tick. Network effects run in
//! spawned tasks and report back over a channel, so the screen keeps
//! drawing (and animating) while a request is out.

pub mod keys;
pub mod render;

use crate::api::ApprovalBackend;
use crate::controller::{execute, Completion, Controller, Effect};
use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute as term_execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use keys::KeyAction;
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Redraw rate; fast enough for the outcome glyph animation.
const TICK_RATE: Duration = Duration::from_millis(30);

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Run the client until the user quits.
pub async fn run_interactive(
    controller: Controller,
    backend: Arc<dyn ApprovalBackend>,
) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, controller, backend).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    term_execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    term_execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

async fn event_loop(
    terminal: &mut Tui,
    mut controller: Controller,
    backend: Arc<dyn ApprovalBackend>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(TICK_RATE);

    dispatch(controller.start(), &backend, &tx);

    while !controller.should_quit() {
        let size = terminal.size().context("Failed to read terminal size")?;
        let area = Rect::new(0, 0, size.width, size.height);
        controller.set_scroll_limit(render::scroll_limit(&controller, area));
        terminal.draw(|frame| render::draw(frame, &controller))?;

        tokio::select! {
            _ = tick.tick() => {}
            Some(completion) = rx.recv() => {
                let effect = controller.complete(completion);
                dispatch(effect, &backend, &tx);
            }
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    let action = keys::map_key(&key, &controller.screen());
                    match action {
                        Some(KeyAction::Press(button)) => {
                            let effect = controller.press(button);
                            dispatch(effect, &backend, &tx);
                        }
                        Some(KeyAction::Quit) => break,
                        None => {}
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("Failed to read terminal input"),
                None => break,
            },
        }
    }

    Ok(())
}

/// Start an effect in the background; its completion comes back on `tx`.
fn dispatch(
    effect: Option<Effect>,
    backend: &Arc<dyn ApprovalBackend>,
    tx: &mpsc::UnboundedSender<Completion>,
) {
    let effect = match effect {
        Some(Effect::Quit) | None => return,
        Some(effect) => effect,
    };
    let backend = Arc::clone(backend);
    let tx = tx.clone();
    tokio::spawn(async move {
        if let Some(completion) = execute(backend.as_ref(), effect).await {
            // The loop has exited if the receiver is gone; nothing to do.
            let _ = tx.send(completion);
        }
    });
}
