//! Drawing the controller's foreground surface.

use crate::api::Decision;
use crate::controller::{Controller, MainStatus, Menu, Screen};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use std::time::{Duration, Instant};

const APPROVE_GLYPH: &[&str] = &[
    "            ██",
    "           ██ ",
    "          ██  ",
    " ██      ██   ",
    "  ██    ██    ",
    "   ██  ██     ",
    "    ████      ",
    "     ██       ",
];

const REJECT_GLYPH: &[&str] = &[
    " ██        ██ ",
    "   ██    ██   ",
    "     ████     ",
    "      ██      ",
    "     ████     ",
    "   ██    ██   ",
    " ██        ██ ",
];

/// Draw whatever is in the foreground.
pub fn draw(frame: &mut Frame, controller: &Controller) {
    let [header, body, footer] = regions(frame.area());

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("SFDC ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled("Approvals", Style::default().fg(Color::DarkGray)),
        ])),
        header,
    );

    let screen = controller.screen();
    match screen {
        Screen::Main { status, scroll, .. } => draw_main(frame, body, status, scroll),
        Screen::Loaded(menu) => draw_menu(frame, body, menu),
        Screen::ItemDetail { item, scroll } => {
            let block = card(&item.object_name, Color::White).title_bottom(
                Line::from(item.title.as_str()).style(Style::default().fg(Color::DarkGray)),
            );
            let text = item.detail_text();
            let scroll = scroll.min(max_scroll(&text, block.inner(body)));
            frame.render_widget(
                Paragraph::new(text)
                    .block(block)
                    .wrap(Wrap { trim: false })
                    .scroll((scroll, 0)),
                body,
            );
        }
        Screen::Confirming(item) => draw_confirm(frame, body, &item.title),
        Screen::Submitting { decision, .. } => draw_outcome(frame, body, decision, 0.0),
        Screen::Result {
            decision,
            leaving_since,
        } => {
            let progress = transition_progress(leaving_since, controller.transition());
            draw_outcome(frame, body, decision, progress);
        }
        Screen::Error { message, scroll } => draw_error(frame, body, message, scroll),
    }

    frame.render_widget(
        Paragraph::new(hints(&screen)).style(Style::default().fg(Color::DarkGray)),
        footer,
    );
}

/// Error presenter: a scrollable `Failed` card holding the message as-is.
pub fn draw_error(frame: &mut Frame, area: Rect, message: &str, scroll: u16) {
    let block = card("Failed", Color::Red);
    let scroll = scroll.min(max_scroll(message, block.inner(area)));
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(message.to_string())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        area,
    );
}

/// How far the foreground card can scroll in a terminal of `area`, in
/// wrapped rows. Zero for surfaces that do not scroll.
pub fn scroll_limit(controller: &Controller, area: Rect) -> u16 {
    let [_, body, _] = regions(area);
    let text = match controller.screen() {
        Screen::Main { status, .. } => status.body(),
        Screen::ItemDetail { item, .. } => item.detail_text(),
        Screen::Error { message, .. } => message.to_string(),
        _ => return 0,
    };
    max_scroll(&text, card("", Color::White).inner(body))
}

fn regions(area: Rect) -> [Rect; 3] {
    Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(area)
}

/// Rows `text` overflows `inner` by once wrapped.
fn max_scroll(text: &str, inner: Rect) -> u16 {
    let rows = Paragraph::new(text.to_string())
        .wrap(Wrap { trim: false })
        .line_count(inner.width);
    u16::try_from(rows.saturating_sub(usize::from(inner.height))).unwrap_or(u16::MAX)
}

fn draw_main(frame: &mut Frame, area: Rect, status: &MainStatus, scroll: u16) {
    let color = match status {
        MainStatus::Failed(_) => Color::Red,
        MainStatus::NothingToApprove | MainStatus::Loaded => Color::Green,
        _ => Color::Yellow,
    };
    let block = card("SFDC", Color::White);
    let text = status.body();
    let scroll = scroll.min(max_scroll(&text, block.inner(area)));
    let body = Text::from(text).style(Style::default().fg(color));
    frame.render_widget(
        Paragraph::new(body)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        area,
    );
}

fn draw_menu(frame: &mut Frame, area: Rect, menu: &Menu) {
    let rows: Vec<ListItem> = menu
        .items()
        .iter()
        .map(|item| {
            ListItem::new(Text::from(vec![
                Line::from(Span::styled(
                    item.object_name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("  {}", item.title),
                    Style::default().fg(Color::Gray),
                )),
            ]))
        })
        .collect();

    let list = List::new(rows)
        .block(card(Menu::TITLE, Color::White))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("▶ ");
    let mut state = ListState::default().with_selected(Some(menu.selected()));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_confirm(frame: &mut Frame, area: Rect, title: &str) {
    let text = Text::from(vec![
        Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "▲  Approve",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "▼  Reject",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
    ]);
    frame.render_widget(Paragraph::new(text).block(card("Approve?", Color::White)), area);
}

/// Draw the glyph, pushed down by `progress` (0.0..=1.0) of the area height.
fn draw_outcome(frame: &mut Frame, area: Rect, decision: Decision, progress: f64) {
    let (glyph, color) = match decision {
        Decision::Approve => (APPROVE_GLYPH, Color::Green),
        Decision::Reject => (REJECT_GLYPH, Color::Red),
    };
    let height = glyph.len() as u16;
    let top = area.y + area.height.saturating_sub(height) / 2;
    let offset = ((area.bottom().saturating_sub(top)) as f64 * progress.clamp(0.0, 1.0)) as u16;
    let y = top.saturating_add(offset);
    if y >= area.bottom() {
        return;
    }

    let glyph_area = Rect {
        x: area.x,
        y,
        width: area.width,
        height: height.min(area.bottom() - y),
    };
    let lines: Vec<Line> = glyph
        .iter()
        .map(|l| Line::from(Span::styled(*l, Style::default().fg(color))))
        .collect();
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), glyph_area);
}

fn transition_progress(since: Instant, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (since.elapsed().as_secs_f64() / duration.as_secs_f64()).min(1.0)
}

fn card<'a>(title: &str, color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().add_modifier(Modifier::BOLD),
        ))
}

fn hints(screen: &Screen<'_>) -> &'static str {
    match screen {
        Screen::Main {
            reload_enabled: true,
            ..
        } => "↑↓ scroll · enter reload · esc quit",
        Screen::Main { .. } => "↑↓ scroll · esc quit",
        Screen::Loaded(_) => "↑↓ move · enter open · esc back",
        Screen::ItemDetail { .. } => "↑↓ scroll · enter decide · esc back",
        Screen::Confirming(_) => "↑/a approve · ↓/r reject · esc back",
        Screen::Submitting { .. } | Screen::Result { .. } => "",
        Screen::Error { .. } => "↑↓ scroll · esc dismiss",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApprovalItem, Credentials, ItemField, SessionToken};
    use crate::controller::{Button, Completion};
    use ratatui::{backend::TestBackend, Terminal};

    const WIDTH: u16 = 48;
    const HEIGHT: u16 = 20;

    fn screen_text(controller: &Controller) -> String {
        let mut terminal = Terminal::new(TestBackend::new(WIDTH, HEIGHT)).unwrap();
        terminal.draw(|f| draw(f, controller)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn logged_in(items: Vec<ApprovalItem>) -> Controller {
        let mut c = Controller::new(Credentials {
            username: "sam".to_string(),
            password: "pw".to_string(),
        });
        c.start();
        c.complete(Completion::LoggedIn(Ok(SessionToken::new("t"))));
        c.complete(Completion::Listed(Ok(items)));
        c
    }

    fn expense() -> ApprovalItem {
        ApprovalItem {
            id: "04i1".to_string(),
            object_name: "Expense".to_string(),
            title: "Team dinner".to_string(),
            fields: vec![
                ItemField {
                    name: "Amount".to_string(),
                    value: "120.50".to_string(),
                },
                ItemField {
                    name: "Owner".to_string(),
                    value: "Sam".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_main_card_shows_status() {
        let c = Controller::new(Credentials {
            username: "sam".to_string(),
            password: "pw".to_string(),
        });
        assert!(screen_text(&c).contains("Connecting ..."));

        let c = logged_in(vec![]);
        assert!(screen_text(&c).contains("Nothing to approve."));
    }

    #[test]
    fn test_menu_and_detail_render_item() {
        let mut c = logged_in(vec![expense()]);
        let text = screen_text(&c);
        assert!(text.contains("Approval List"));
        assert!(text.contains("Team dinner"));

        c.press(Button::Select);
        let text = screen_text(&c);
        assert!(text.contains("Amount: 120.50"));
        assert!(text.contains("Owner: Sam"));
        let amount = text.find("Amount").unwrap();
        let owner = text.find("Owner").unwrap();
        assert!(amount < owner);
    }

    #[test]
    fn test_error_card_renders_message() {
        let mut c = logged_in(vec![expense()]);
        c.press(Button::Select);
        c.press(Button::Select);
        c.press(Button::Up);
        c.complete(Completion::Decided {
            item_id: "04i1".to_string(),
            result: Err(crate::api::ServiceError::new("INVALID_SESSION_ID")),
        });
        let text = screen_text(&c);
        assert!(text.contains("Failed"));
        assert!(text.contains("INVALID_SESSION_ID"));
    }

    /// Press Down `times`, feeding back the measured limit first like the
    /// event loop does.
    fn scroll_down(c: &mut Controller, times: usize) {
        for _ in 0..times {
            c.set_scroll_limit(scroll_limit(c, Rect::new(0, 0, WIDTH, HEIGHT)));
            c.press(Button::Down);
        }
    }

    #[test]
    fn test_long_field_value_scrolls_into_view() {
        let mut item = expense();
        item.fields.push(ItemField {
            name: "Notes".to_string(),
            value: format!("{}ENDMARK", "lorem ipsum dolor ".repeat(50)),
        });
        let mut c = logged_in(vec![item]);
        c.press(Button::Select);
        assert!(!screen_text(&c).contains("ENDMARK"));

        scroll_down(&mut c, 50);
        assert!(screen_text(&c).contains("ENDMARK"));
        let limit = scroll_limit(&c, Rect::new(0, 0, WIDTH, HEIGHT));
        assert!(limit > 0);
        assert!(matches!(c.screen(), Screen::ItemDetail { scroll, .. } if scroll == limit));
    }

    #[test]
    fn test_long_error_body_scrolls_into_view() {
        let mut c = logged_in(vec![expense()]);
        c.press(Button::Select);
        c.press(Button::Select);
        c.press(Button::Up);
        let body = format!(
            r#"[{{"message":"{}","errorCode":"TAILCODE"}}]"#,
            "x".repeat(880)
        );
        c.complete(Completion::Decided {
            item_id: "04i1".to_string(),
            result: Err(crate::api::ServiceError::new(body)),
        });
        assert!(!screen_text(&c).contains("TAILCODE"));

        scroll_down(&mut c, 50);
        assert!(matches!(c.screen(), Screen::Error { scroll, .. } if scroll > 0));
        assert!(screen_text(&c).contains("TAILCODE"));
    }

    #[test]
    fn test_failed_main_card_scrolls() {
        let mut c = Controller::new(Credentials {
            username: "sam".to_string(),
            password: "pw".to_string(),
        });
        c.start();
        c.complete(Completion::LoggedIn(Err(crate::api::AuthError::new(format!(
            "{}TAILCODE",
            "y".repeat(900)
        )))));
        assert!(!screen_text(&c).contains("TAILCODE"));
        scroll_down(&mut c, 50);
        assert!(screen_text(&c).contains("TAILCODE"));
    }

    #[test]
    fn test_scroll_limit_is_zero_for_short_text() {
        let mut c = logged_in(vec![expense()]);
        c.press(Button::Select);
        assert_eq!(scroll_limit(&c, Rect::new(0, 0, WIDTH, HEIGHT)), 0);
    }

    #[test]
    fn test_transition_progress_bounds() {
        assert_eq!(transition_progress(Instant::now(), Duration::ZERO), 1.0);
        let p = transition_progress(Instant::now(), Duration::from_secs(60));
        assert!((0.0..0.1).contains(&p));
    }
}
