//! Pure update function for the dashboard.
//!
//! `update()` takes the current model and a message, mutates the model, and
//! returns a command describing any side-effects the runtime should execute.
//!
//! This module performs zero I/O. All effects are described as
//! [`DashboardCmd`] values.

use super::input::{InputAction, InputContext, InputMode, resolve_key};
use super::model::{DashboardCmd, DashboardModel, DashboardMsg};

/// Apply a message to the model and return the next command for the runtime.
pub fn update(model: &mut DashboardModel, msg: DashboardMsg) -> DashboardCmd {
    match msg {
        DashboardMsg::Tick => {
            model.tick = model.tick.wrapping_add(1);
            DashboardCmd::ScheduleTick(model.refresh)
        }

        DashboardMsg::Key(key) => {
            let context = InputContext {
                mode: model.input_mode,
                has_query: !model.search_input.is_empty(),
            };
            resolve_key(key, context).map_or(DashboardCmd::None, |action| {
                apply_input_action(model, action)
            })
        }

        DashboardMsg::Resize { cols, rows } => model.on_resize(cols, rows),

        DashboardMsg::ListLoaded(result) => model.on_list_loaded(result),

        DashboardMsg::SubredditLoaded { name, result } => model.on_subreddit_data(&name, result),

        DashboardMsg::SelectSubreddit(index) => model.on_subreddit_selected(index),

        DashboardMsg::SortColumnClicked(column) => model.on_sort_column_clicked(column),

        DashboardMsg::SearchInputChanged(query) => model.on_search_input_changed(&query),

        DashboardMsg::ScrollNearEnd(token) => model.on_scroll_near_end(token),

        DashboardMsg::Refresh => model.on_refresh(),

        DashboardMsg::NotificationExpired(id) => {
            model.notifications.retain(|n| n.id != id);
            DashboardCmd::None
        }

        DashboardMsg::Quit => {
            model.quit = true;
            DashboardCmd::Quit
        }
    }
}

fn apply_input_action(model: &mut DashboardModel, action: InputAction) -> DashboardCmd {
    match action {
        InputAction::Quit => {
            model.quit = true;
            DashboardCmd::Quit
        }
        InputAction::PrevSubreddit => model.select_relative(false),
        InputAction::NextSubreddit => model.select_relative(true),
        InputAction::SelectSubreddit(index) => model.on_subreddit_selected(index),
        InputAction::SortColumn(column) => model.on_sort_column_clicked(column),
        InputAction::EnterSearch => {
            model.input_mode = InputMode::Search;
            DashboardCmd::None
        }
        InputAction::LeaveSearch => {
            model.input_mode = InputMode::Normal;
            DashboardCmd::None
        }
        InputAction::ClearSearch => model.on_search_input_changed(""),
        InputAction::SearchAppend(c) => {
            let mut query = model.search_input.clone();
            query.push(c);
            model.on_search_input_changed(&query)
        }
        InputAction::SearchBackspace => {
            let mut query = model.search_input.clone();
            if query.pop().is_none() {
                return DashboardCmd::None;
            }
            model.on_search_input_changed(&query)
        }
        InputAction::ScrollLines(delta) => model.scroll_by(i64::from(delta)),
        InputAction::ScrollPages(pages) => model.scroll_pages(pages),
        InputAction::ScrollTop => model.scroll_to_top(),
        InputAction::ScrollBottom => model.scroll_to_bottom(),
        InputAction::Refresh => model.on_refresh(),
    }
}
