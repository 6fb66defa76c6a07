//! UI state, key handling and line building for the TUI.
//!
//! Nothing here touches the terminal or the backend: `handle_key` turns a key
//! press into an `Effect` for the runtime to execute, and the line builders
//! produce ratatui lines from plain data.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders},
};
use tui_textarea::TextArea;

use crate::cli::output::{AI_LABEL, NEW_SESSION_LABEL, SESSIONS_HEADING, USER_LABEL};
use crate::core::message::Message;
use crate::core::session::SessionSummary;
use crate::core::state::submittable_input;

pub const TEXT: Color = Color::Rgb(210, 210, 225);
pub const DIM: Color = Color::Rgb(90, 90, 110);
pub const BORDER: Color = Color::Rgb(50, 50, 70);
pub const BORDER_ACTIVE: Color = Color::Rgb(60, 160, 140);
pub const ACCENT: Color = Color::Rgb(80, 200, 170);
pub const USER_FG: Color = Color::Rgb(220, 248, 198);
pub const AI_FG: Color = Color::Rgb(241, 241, 241);

const SCROLL_STEP: u16 = 3;
const PAGE_STEP: u16 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Input,
}

/// One row of the session picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEntry {
    NewSession,
    Existing(SessionSummary),
}

/// Work the runtime performs after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    NewSession,
    OpenSession(SessionSummary),
    Submit(String),
    RefreshSessions,
}

pub struct ViewState {
    pub sessions: Vec<SessionSummary>,
    pub focus: Focus,
    /// Index into `picker_entries`.
    pub selected: usize,
    pub input: TextArea<'static>,
    pub scroll_offset: u16,
    pub max_scroll: u16,
    pub status: String,
    pub busy: bool,
    pub should_quit: bool,
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            sessions: Vec::new(),
            focus: Focus::Sidebar,
            selected: 0,
            input: new_input(),
            scroll_offset: 0,
            max_scroll: 0,
            status: "Ready".into(),
            busy: false,
            should_quit: false,
        }
    }

    pub fn picker_entries(&self) -> Vec<PickerEntry> {
        picker_entries(&self.sessions)
    }

    /// Replaces the session list, keeping the selection in range.
    pub fn set_sessions(&mut self, sessions: Vec<SessionSummary>) {
        self.sessions = sessions;
        self.selected = self.selected.min(self.sessions.len());
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = u16::MAX;
    }

    fn take_input(&mut self) -> String {
        let text = self.input.lines().join("\n");
        self.input = new_input();
        text
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

fn new_input() -> TextArea<'static> {
    let mut input = TextArea::default();
    input.set_placeholder_text("Write your message");
    input.set_cursor_line_style(Style::default());
    input
}

pub fn input_block(focused: bool, busy: bool) -> Block<'static> {
    let border = if focused && !busy { BORDER_ACTIVE } else { BORDER };
    let title = if busy {
        " Sending... ".to_string()
    } else {
        " Message \u{2502} Enter send \u{2502} Tab sessions ".to_string()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(title, Style::default().fg(ACCENT)))
}

pub fn picker_entries(sessions: &[SessionSummary]) -> Vec<PickerEntry> {
    std::iter::once(PickerEntry::NewSession)
        .chain(sessions.iter().cloned().map(PickerEntry::Existing))
        .collect()
}

pub fn handle_key(view: &mut ViewState, key: KeyEvent, has_session: bool) -> Effect {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Esc, _) => return Effect::Quit,
        (KeyCode::Char('n'), KeyModifiers::CONTROL) => return Effect::NewSession,
        (KeyCode::Char('r'), KeyModifiers::CONTROL) => return Effect::RefreshSessions,
        (KeyCode::Tab, _) | (KeyCode::BackTab, _) => {
            view.focus = match view.focus {
                Focus::Sidebar if has_session => Focus::Input,
                _ => Focus::Sidebar,
            };
            return Effect::None;
        }
        (KeyCode::PageUp, _) => {
            view.scroll_offset = view.scroll_offset.min(view.max_scroll).saturating_sub(PAGE_STEP);
            return Effect::None;
        }
        (KeyCode::PageDown, _) => {
            view.scroll_offset = view.scroll_offset.saturating_add(PAGE_STEP);
            return Effect::None;
        }
        _ => {}
    }

    match view.focus {
        Focus::Sidebar => handle_sidebar_key(view, key),
        Focus::Input if has_session => handle_input_key(view, key),
        Focus::Input => {
            view.focus = Focus::Sidebar;
            Effect::None
        }
    }
}

fn handle_sidebar_key(view: &mut ViewState, key: KeyEvent) -> Effect {
    let entries = view.picker_entries();
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            view.selected = view.selected.saturating_sub(1);
            Effect::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if view.selected + 1 < entries.len() {
                view.selected += 1;
            }
            Effect::None
        }
        KeyCode::Enter => match entries.into_iter().nth(view.selected) {
            Some(PickerEntry::NewSession) => Effect::NewSession,
            Some(PickerEntry::Existing(summary)) => Effect::OpenSession(summary),
            None => Effect::None,
        },
        _ => Effect::None,
    }
}

fn handle_input_key(view: &mut ViewState, key: KeyEvent) -> Effect {
    match key.code {
        KeyCode::Enter if key.modifiers.is_empty() => {
            // The form clears on submit, even when the text is blank.
            let text = view.take_input();
            if submittable_input(&text).is_some() {
                Effect::Submit(text)
            } else {
                Effect::None
            }
        }
        KeyCode::Up => {
            view.scroll_offset = view.scroll_offset.min(view.max_scroll).saturating_sub(SCROLL_STEP);
            Effect::None
        }
        KeyCode::Down => {
            view.scroll_offset = view.scroll_offset.saturating_add(SCROLL_STEP);
            Effect::None
        }
        _ => {
            view.input.input(key);
            Effect::None
        }
    }
}

// ─── Line builders ───────────────────────────────────

pub fn picker_lines(
    sessions: &[SessionSummary],
    selected: usize,
    active_db_id: Option<i64>,
    focused: bool,
) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            format!(" {SESSIONS_HEADING}"),
            Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (i, entry) in picker_entries(sessions).iter().enumerate() {
        let is_selected = focused && i == selected;
        let marker = if is_selected { "> " } else { "  " };
        let (label, current) = match entry {
            PickerEntry::NewSession => (NEW_SESSION_LABEL.to_string(), false),
            PickerEntry::Existing(s) => (s.label(), Some(s.db_id) == active_db_id),
        };
        let style = if is_selected {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else if current {
            Style::default().fg(USER_FG)
        } else {
            Style::default().fg(TEXT)
        };
        let suffix = if current { " *" } else { "" };
        lines.push(Line::from(Span::styled(format!("{marker}{label}{suffix}"), style)));

        if matches!(entry, PickerEntry::NewSession) {
            lines.push(Line::from(""));
        }
    }

    if sessions.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No sessions yet.",
            Style::default().fg(DIM),
        )));
    }

    lines
}

pub fn transcript_lines(messages: &[Message]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for msg in messages {
        lines.push(Line::from(""));
        push_block(&mut lines, USER_LABEL, &msg.user_text, USER_FG);
        push_block(&mut lines, AI_LABEL, &msg.ai_text, AI_FG);
    }
    lines
}

fn push_block(lines: &mut Vec<Line<'static>>, label: &str, text: &str, color: Color) {
    let mut rows = text.lines();
    let first = rows.next().unwrap_or("");
    lines.push(Line::from(vec![
        Span::styled(
            format!("  {label} "),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(first.to_string(), Style::default().fg(TEXT)),
    ]));
    for row in rows {
        lines.push(Line::from(Span::styled(
            format!("    {row}"),
            Style::default().fg(TEXT),
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn sessions() -> Vec<SessionSummary> {
        vec![
            SessionSummary::new(3, "33333333-cccc"),
            SessionSummary::new(5, "55555555-eeee"),
        ]
    }

    #[test]
    fn test_picker_without_sessions_only_offers_new() {
        assert_eq!(picker_entries(&[]), vec![PickerEntry::NewSession]);

        let texts: Vec<String> = picker_lines(&[], 0, None, false)
            .iter()
            .map(line_text)
            .collect();
        assert!(texts.iter().any(|t| t.contains(NEW_SESSION_LABEL)));
        assert!(!texts.iter().any(|t| t.contains("Session ")));
    }

    #[test]
    fn test_picker_labels_and_current_marker() {
        let texts: Vec<String> = picker_lines(&sessions(), 0, Some(5), false)
            .iter()
            .map(line_text)
            .collect();
        assert!(texts.contains(&"  Session 3 \u{2014} 33333333".to_string()));
        assert!(texts.contains(&"  Session 5 \u{2014} 55555555 *".to_string()));
    }

    #[test]
    fn test_sidebar_navigation_and_selection() {
        let mut view = ViewState::new();
        view.set_sessions(sessions());

        assert_eq!(handle_key(&mut view, key(KeyCode::Enter), false), Effect::NewSession);

        handle_key(&mut view, key(KeyCode::Down), false);
        handle_key(&mut view, key(KeyCode::Down), false);
        handle_key(&mut view, key(KeyCode::Down), false);
        assert_eq!(view.selected, 2);
        assert_eq!(
            handle_key(&mut view, key(KeyCode::Enter), false),
            Effect::OpenSession(SessionSummary::new(5, "55555555-eeee"))
        );

        handle_key(&mut view, key(KeyCode::Up), false);
        assert_eq!(view.selected, 1);
    }

    #[test]
    fn test_set_sessions_clamps_selection() {
        let mut view = ViewState::new();
        view.set_sessions(sessions());
        view.selected = 2;
        view.set_sessions(vec![]);
        assert_eq!(view.selected, 0);
    }

    #[test]
    fn test_tab_needs_active_session() {
        let mut view = ViewState::new();
        handle_key(&mut view, key(KeyCode::Tab), false);
        assert_eq!(view.focus, Focus::Sidebar);

        handle_key(&mut view, key(KeyCode::Tab), true);
        assert_eq!(view.focus, Focus::Input);
        handle_key(&mut view, key(KeyCode::Tab), true);
        assert_eq!(view.focus, Focus::Sidebar);
    }

    #[test]
    fn test_enter_submits_input_as_typed_and_clears() {
        let mut view = ViewState::new();
        view.focus = Focus::Input;
        view.input.insert_str("  hello  ");

        let effect = handle_key(&mut view, key(KeyCode::Enter), true);

        assert_eq!(effect, Effect::Submit("  hello  ".into()));
        assert_eq!(view.input.lines().join(""), "");
    }

    #[test]
    fn test_enter_with_blank_input_does_nothing() {
        let mut view = ViewState::new();
        view.focus = Focus::Input;
        view.input.insert_str("   ");

        assert_eq!(handle_key(&mut view, key(KeyCode::Enter), true), Effect::None);
    }

    #[test]
    fn test_typing_goes_to_input() {
        let mut view = ViewState::new();
        view.focus = Focus::Input;
        for c in "hi".chars() {
            handle_key(&mut view, key(KeyCode::Char(c)), true);
        }
        assert_eq!(view.input.lines()[0], "hi");
    }

    #[test]
    fn test_global_keys() {
        let mut view = ViewState::new();
        assert_eq!(handle_key(&mut view, ctrl('c'), true), Effect::Quit);
        assert_eq!(handle_key(&mut view, key(KeyCode::Esc), true), Effect::Quit);
        assert_eq!(handle_key(&mut view, ctrl('n'), false), Effect::NewSession);
        assert_eq!(handle_key(&mut view, ctrl('r'), false), Effect::RefreshSessions);
    }

    #[test]
    fn test_transcript_renders_user_then_ai() {
        let lines = transcript_lines(&[
            Message::new("hello", "hi there"),
            Message::new("two\nlines", ""),
        ]);
        let texts: Vec<String> = lines.iter().map(line_text).collect();

        let user = texts.iter().position(|t| t == "  You: hello").unwrap();
        let ai = texts.iter().position(|t| t == "  Holiya AI: hi there").unwrap();
        assert!(user < ai);

        assert!(texts.contains(&"  You: two".to_string()));
        assert!(texts.contains(&"    lines".to_string()));
        assert!(texts.contains(&"  Holiya AI: ".to_string()));
    }

    #[test]
    fn test_empty_transcript_has_no_lines() {
        assert!(transcript_lines(&[]).is_empty());
    }
}
