pub mod view;

use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Margin, Rect},
    prelude::CrosstermBackend,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame, Terminal,
};
use std::io;
use tokio_stream::StreamExt;

use super::output;
use crate::chat::{Chat, SubmitOutcome};
use crate::core::state::{ChatState, View};
use view::*;

type Term = Terminal<CrosstermBackend<io::Stdout>>;

const BG: Color = Color::Rgb(15, 15, 25);
const SURFACE: Color = Color::Rgb(22, 22, 36);
const YELLOW: Color = Color::Rgb(230, 190, 60);

const SIDEBAR_WIDTH: u16 = 34;

// ─── Entry Point ─────────────────────────────────────

pub async fn run(mut chat: Chat) -> Result<()> {
    let mut view = ViewState::new();
    if chat.state().active().is_some() {
        view.focus = Focus::Input;
        view.scroll_to_bottom();
    }
    view.set_sessions(chat.sessions().await);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_event_loop(&mut terminal, &mut chat, &mut view).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

// ─── Event Loop ──────────────────────────────────────

async fn run_event_loop(terminal: &mut Term, chat: &mut Chat, view: &mut ViewState) -> Result<()> {
    let mut event_reader = EventStream::new();

    loop {
        terminal.draw(|f| ui(f, chat.state(), view))?;
        if view.should_quit {
            return Ok(());
        }

        match event_reader.next().await {
            Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                let has_session = chat.state().active().is_some();
                let effect = handle_key(view, key, has_session);
                apply_effect(terminal, chat, view, effect).await?;
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(e.into()),
            None => return Ok(()),
        }
    }
}

/// Runs one interaction to completion. Backend calls block the loop; the
/// session list is re-fetched afterwards so the sidebar reflects the backend.
async fn apply_effect(
    terminal: &mut Term,
    chat: &mut Chat,
    view: &mut ViewState,
    effect: Effect,
) -> Result<()> {
    match effect {
        Effect::None => return Ok(()),
        Effect::Quit => {
            view.should_quit = true;
            return Ok(());
        }
        Effect::NewSession => {
            chat.new_session();
            view.focus = Focus::Input;
            view.scroll_offset = 0;
            view.status = "New session started".into();
        }
        Effect::OpenSession(summary) => {
            view.busy = true;
            view.status = format!("Loading {}...", summary.label());
            terminal.draw(|f| ui(f, chat.state(), view))?;

            chat.open_session(&summary).await;
            view.busy = false;
            view.focus = Focus::Input;
            view.scroll_to_bottom();
            view.status = format!("{} messages", chat.state().messages().len());
        }
        Effect::Submit(text) => {
            view.busy = true;
            view.status = output::THINKING.into();
            view.scroll_to_bottom();
            terminal.draw(|f| ui(f, chat.state(), view))?;

            let outcome = chat.submit(&text).await;
            view.busy = false;
            view.status = match outcome {
                SubmitOutcome::Sent(_) => "Ready".into(),
                SubmitOutcome::NoSession => output::NO_SESSION_HINT.into(),
                SubmitOutcome::Ignored => "Ready".into(),
            };
            view.scroll_to_bottom();
        }
        Effect::RefreshSessions => {
            view.status = "Sessions refreshed".into();
        }
    }

    view.set_sessions(chat.sessions().await);
    Ok(())
}

// ─── UI Rendering ────────────────────────────────────

fn ui(f: &mut Frame, state: &ChatState, view: &mut ViewState) {
    let area = f.area();
    f.render_widget(Paragraph::new("").style(Style::default().bg(BG)), area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(30)])
        .split(area);

    render_sidebar(f, state, view, columns[0]);

    match state.view() {
        View::NoSession => render_no_session(f, columns[1]),
        View::Active(session) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(2), // Header
                    Constraint::Min(5),    // Transcript
                    Constraint::Length(3), // Input
                    Constraint::Length(1), // Status
                ])
                .split(columns[1]);

            render_header(f, Some(session.session_token.as_str()), chunks[0]);
            render_transcript(f, &session.messages, view, chunks[1]);
            render_input(f, view, chunks[2]);
            render_status(f, view, chunks[3]);
        }
    }
}

fn render_sidebar(f: &mut Frame, state: &ChatState, view: &ViewState, area: Rect) {
    let focused = view.focus == Focus::Sidebar && !view.busy;
    let border = if focused { BORDER_ACTIVE } else { BORDER };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            format!(" \u{1F4AC} {} ", output::SIDEBAR_TITLE),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ));

    let mut lines = picker_lines(
        &view.sessions,
        view.selected,
        state.current_chat_db_id(),
        focused,
    );
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " ^N new  ^R refresh  Esc quit",
        Style::default().fg(DIM),
    )));

    f.render_widget(
        Paragraph::new(lines).block(block).style(Style::default().bg(BG)),
        area,
    );
}

fn render_header(f: &mut Frame, session_token: Option<&str>, area: Rect) {
    let mut lines = vec![Line::from(vec![
        Span::styled(" \u{1FA7A} ", Style::default().fg(ACCENT)),
        Span::styled(
            output::APP_TITLE,
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
    ])];
    if let Some(token) = session_token {
        lines.push(Line::from(Span::styled(
            format!("   {}", output::session_caption(token)),
            Style::default().fg(DIM),
        )));
    }
    f.render_widget(
        Paragraph::new(lines).style(Style::default().bg(SURFACE)),
        area,
    );
}

fn render_no_session(f: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(3)])
        .split(area);

    render_header(f, None, chunks[0]);
    let info = Paragraph::new(Line::from(Span::styled(
        format!("  \u{2139} {}", output::NO_SESSION_HINT),
        Style::default().fg(TEXT),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BORDER)),
    );
    f.render_widget(info, chunks[1]);
}

fn render_transcript(
    f: &mut Frame,
    messages: &[crate::core::message::Message],
    view: &mut ViewState,
    area: Rect,
) {
    let transcript =
        Paragraph::new(Text::from(transcript_lines(messages))).wrap(Wrap { trim: false });

    // Scroll range is measured in wrapped rows, not source lines.
    let inner_width = area.width.saturating_sub(2);
    let total = u16::try_from(transcript.line_count(inner_width)).unwrap_or(u16::MAX);
    let visible = area.height.saturating_sub(2);
    view.max_scroll = total.saturating_sub(visible);
    view.scroll_offset = view.scroll_offset.min(view.max_scroll);

    let transcript = transcript.scroll((view.scroll_offset, 0)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BORDER)),
    );
    f.render_widget(transcript, area);

    if view.max_scroll > 0 {
        let sb = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .thumb_style(Style::default().fg(ACCENT))
            .track_style(Style::default().fg(BORDER));
        let mut state = ScrollbarState::new(view.max_scroll as usize)
            .position(view.scroll_offset as usize);
        f.render_stateful_widget(
            sb,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut state,
        );
    }
}

fn render_input(f: &mut Frame, view: &mut ViewState, area: Rect) {
    let focused = view.focus == Focus::Input;
    view.input.set_block(input_block(focused, view.busy));
    view.input.set_cursor_style(if focused && !view.busy {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    });
    f.render_widget(&view.input, area);
}

fn render_status(f: &mut Frame, view: &ViewState, area: Rect) {
    let status_fg = if view.busy { YELLOW } else { ACCENT };
    let line = Line::from(vec![
        Span::styled(format!(" {} ", view.status), Style::default().fg(status_fg)),
        Span::styled(" \u{2502} ", Style::default().fg(BORDER)),
        Span::styled(
            "Tab focus  PgUp/PgDn scroll  ^N new  Esc quit",
            Style::default().fg(DIM),
        ),
    ]);
    f.render_widget(
        Paragraph::new(line).style(Style::default().bg(SURFACE)),
        area,
    );
}
