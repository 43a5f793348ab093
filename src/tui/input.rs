//! Key routing for the dashboard.
//!
//! Keys arrive as backend-neutral [`KeyInput`] values and resolve into
//! [`InputAction`]s according to the current [`InputContext`].

#![allow(missing_docs)]

/// A key press, independent of the terminal backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    /// Character typed with Control held.
    Ctrl(char),
    Function(u8),
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Enter,
    Esc,
    Backspace,
}

/// Whether typing goes to the search field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputContext {
    pub mode: InputMode,
    /// The search field holds text.
    pub has_query: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    PrevSubreddit,
    NextSubreddit,
    /// Zero-based index into the subreddit list.
    SelectSubreddit(usize),
    /// Zero-based column index.
    SortColumn(usize),
    EnterSearch,
    LeaveSearch,
    ClearSearch,
    SearchAppend(char),
    SearchBackspace,
    ScrollLines(i32),
    ScrollPages(i32),
    ScrollTop,
    ScrollBottom,
    Refresh,
}

/// Resolve a key. `None` means the key is ignored in this context.
#[must_use]
pub fn resolve_key(key: KeyInput, context: InputContext) -> Option<InputAction> {
    if let Some(action) = resolve_global_key(key) {
        return Some(action);
    }
    match context.mode {
        InputMode::Search => resolve_search_key(key, context),
        InputMode::Normal => resolve_normal_key(key, context),
    }
}

fn resolve_global_key(key: KeyInput) -> Option<InputAction> {
    match key {
        KeyInput::Ctrl('c') => Some(InputAction::Quit),
        KeyInput::Function(n @ 1..=4) => Some(InputAction::SortColumn(usize::from(n - 1))),
        KeyInput::Up => Some(InputAction::ScrollLines(-1)),
        KeyInput::Down => Some(InputAction::ScrollLines(1)),
        KeyInput::PageUp => Some(InputAction::ScrollPages(-1)),
        KeyInput::PageDown => Some(InputAction::ScrollPages(1)),
        KeyInput::Home => Some(InputAction::ScrollTop),
        KeyInput::End => Some(InputAction::ScrollBottom),
        _ => None,
    }
}

fn resolve_search_key(key: KeyInput, context: InputContext) -> Option<InputAction> {
    match key {
        KeyInput::Char(c) => Some(InputAction::SearchAppend(c)),
        KeyInput::Backspace => Some(InputAction::SearchBackspace),
        KeyInput::Enter => Some(InputAction::LeaveSearch),
        KeyInput::Esc if context.has_query => Some(InputAction::ClearSearch),
        KeyInput::Esc => Some(InputAction::LeaveSearch),
        _ => None,
    }
}

fn resolve_normal_key(key: KeyInput, context: InputContext) -> Option<InputAction> {
    match key {
        KeyInput::Char('q') => Some(InputAction::Quit),
        KeyInput::Left | KeyInput::Char('h') => Some(InputAction::PrevSubreddit),
        KeyInput::Right | KeyInput::Char('l') => Some(InputAction::NextSubreddit),
        KeyInput::Char(c @ '1'..='9') => {
            Some(InputAction::SelectSubreddit(c as usize - '1' as usize))
        }
        KeyInput::Char('u') => Some(InputAction::SortColumn(0)),
        KeyInput::Char('c') => Some(InputAction::SortColumn(1)),
        KeyInput::Char('s') => Some(InputAction::SortColumn(2)),
        KeyInput::Char('n') => Some(InputAction::SortColumn(3)),
        KeyInput::Char('/') => Some(InputAction::EnterSearch),
        KeyInput::Esc if context.has_query => Some(InputAction::ClearSearch),
        KeyInput::Char('j') => Some(InputAction::ScrollLines(1)),
        KeyInput::Char('k') => Some(InputAction::ScrollLines(-1)),
        KeyInput::Char(' ') => Some(InputAction::ScrollPages(1)),
        KeyInput::Char('g') => Some(InputAction::ScrollTop),
        KeyInput::Char('G') => Some(InputAction::ScrollBottom),
        KeyInput::Char('r') => Some(InputAction::Refresh),
        _ => None,
    }
}

/// Key hints for the footer, per mode.
#[must_use]
pub const fn key_hints(mode: InputMode) -> &'static str {
    match mode {
        InputMode::Normal => {
            "←/→ subreddit  1-9 pick  u/c/s/n sort  / search  j/k PgUp/PgDn scroll  r reload  q quit"
        }
        InputMode::Search => "type to filter  Enter done  Esc clear  ↑/↓ scroll",
    }
}
