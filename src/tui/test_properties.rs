//! Property-based tests for dashboard reducer invariants.
//!
//! Arbitrary sequences of selections, data arrivals, sort clicks, searches,
//! scrolls and grow continuations (current and stale) are fed through
//! `update()`. After every step the materialized table must be a prefix of the
//! loaded view and stale continuations must leave it untouched.

use proptest::prelude::*;
use serde_json::{Map, Value, json};

use super::input::KeyInput;
use super::model::{DashboardCmd, DashboardModel, DashboardMsg, DashboardSettings, Selection};
use super::update::update;
use crate::source::provider::{SubredditList, SubredditPayload};
use crate::view::state::ViewToken;

const SUBS: [&str; 3] = ["alpha", "beta", "gamma"];

// ──────────────────── strategies ────────────────────

#[derive(Debug, Clone)]
enum Step {
    Select(usize),
    Arrive(usize),
    Sort(usize),
    Search(String),
    Key(KeyInput),
    GrowCurrent,
    GrowStale,
    Resize(u16, u16),
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        2 => (0usize..4).prop_map(Step::Select),
        2 => (0usize..3).prop_map(Step::Arrive),
        2 => (0usize..5).prop_map(Step::Sort),
        1 => "[-_a-d]{0,2}".prop_map(Step::Search),
        2 => prop_oneof![
            Just(KeyInput::Down),
            Just(KeyInput::PageDown),
            Just(KeyInput::End),
            Just(KeyInput::Home),
            Just(KeyInput::Up),
        ]
        .prop_map(Step::Key),
        3 => Just(Step::GrowCurrent),
        2 => Just(Step::GrowStale),
        1 => ((20u16..200), (8u16..80)).prop_map(|(c, r)| Step::Resize(c, r)),
    ]
}

fn payload(index: usize) -> SubredditPayload {
    let users = 40 + index * 45;
    let mut map = Map::new();
    for i in 0..users {
        let prefix = ["", "_", "-", ""][i % 4];
        let letter = ['a', 'b', 'c', 'd'][i % 4];
        map.insert(
            format!("{prefix}{letter}{i}"),
            json!({ "commentScore": vec![i64::try_from(i % 9).unwrap() - 4; i % 5] }),
        );
    }
    SubredditPayload {
        users: Value::Object(map),
        timestamp: None,
    }
}

fn fresh_model() -> DashboardModel {
    let mut model = DashboardModel::new(
        DashboardSettings {
            prefetch_all: false,
            ..DashboardSettings::default()
        },
        (120, 30),
    );
    update(
        &mut model,
        DashboardMsg::ListLoaded(Ok(SubredditList {
            subs: SUBS.iter().map(|s| (*s).to_string()).collect(),
        })),
    );
    model
}

/// Remember every grow token the model asked for; replaying old ones later
/// simulates continuations that outlived their view.
fn record_grow_requests(cmd: DashboardCmd, issued: &mut Vec<ViewToken>) {
    for leaf in cmd.flatten() {
        if let DashboardCmd::RequestGrow(token) = leaf {
            issued.push(token);
        }
    }
}

fn assert_table_is_view_prefix(model: &DashboardModel) -> Result<(), TestCaseError> {
    match &model.selection {
        Selection::Loaded(loaded) => {
            let view = loaded.view.rows();
            prop_assert!(model.table.len() <= view.len());
            prop_assert_eq!(model.renderer.cursor(), model.table.len());
            for (shown, row) in model.table.rows().iter().zip(view) {
                prop_assert_eq!(&shown.username, &row.username);
                prop_assert_eq!(shown.total_score, row.total_score);
            }
        }
        _ => prop_assert!(model.table.is_empty()),
    }
    prop_assert!(model.scroll <= model.max_scroll());
    Ok(())
}

// ──────────────────── properties ────────────────────

proptest! {
    #[test]
    fn table_stays_a_prefix_of_the_loaded_view(steps in prop::collection::vec(arb_step(), 1..40)) {
        let mut model = fresh_model();
        let mut issued: Vec<ViewToken> = Vec::new();

        for step in steps {
            let msg = match step {
                Step::Select(i) => DashboardMsg::SelectSubreddit(i),
                Step::Arrive(i) => DashboardMsg::SubredditLoaded {
                    name: SUBS[i].to_string(),
                    result: Ok(payload(i)),
                },
                Step::Sort(c) => DashboardMsg::SortColumnClicked(c),
                Step::Search(q) => DashboardMsg::SearchInputChanged(q),
                Step::Key(k) => DashboardMsg::Key(k),
                Step::GrowCurrent => match model.loaded() {
                    Some(loaded) => DashboardMsg::ScrollNearEnd(loaded.view.token()),
                    None => continue,
                },
                Step::GrowStale => match issued.first() {
                    Some(token) => DashboardMsg::ScrollNearEnd(*token),
                    None => continue,
                },
                Step::Resize(c, r) => DashboardMsg::Resize { cols: c, rows: r },
            };

            let stale = matches!(
                &msg,
                DashboardMsg::ScrollNearEnd(token)
                    if model.loaded().map(|l| l.view.token()) != Some(*token)
            );
            let before = model.table.rows().to_vec();

            let cmd = update(&mut model, msg);
            record_grow_requests(cmd, &mut issued);

            if stale {
                prop_assert_eq!(model.table.rows(), before.as_slice());
            }
            assert_table_is_view_prefix(&model)?;
        }
    }

    #[test]
    fn growing_to_exhaustion_materializes_every_row(index in 0usize..3, sort in 0usize..4) {
        let mut model = fresh_model();
        update(&mut model, DashboardMsg::SelectSubreddit(index));
        update(&mut model, DashboardMsg::SubredditLoaded {
            name: SUBS[index].to_string(),
            result: Ok(payload(index)),
        });
        update(&mut model, DashboardMsg::SortColumnClicked(sort));

        let total = model.loaded().map_or(0, |l| l.view.len());
        for _ in 0..total {
            let token = model.loaded().map(|l| l.view.token()).unwrap();
            update(&mut model, DashboardMsg::ScrollNearEnd(token));
        }
        prop_assert_eq!(model.table.len(), total);
    }
}
