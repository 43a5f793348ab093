//! Canonical runtime entrypoint for the interactive dashboard.

#![allow(missing_docs)]

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::core::config::Config;
use crate::core::errors::{Result, StatsError};
use crate::logger::diagnostics::{DiagnosticEvent, Diagnostics};
use crate::source::fetcher::FetchPool;
use crate::source::provider::DataProvider;

use super::driver::DashboardDriver;
use super::input::KeyInput;
use super::model::{DashboardModel, DashboardMsg, DashboardSettings};
use super::render::draw_frame;
use super::terminal_guard::TerminalGuard;

/// Runtime configuration for the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardRuntimeConfig {
    pub settings: DashboardSettings,
    pub workers: usize,
    /// Recorded in the start event so logs can be matched to a configuration.
    pub config_hash: String,
}

impl DashboardRuntimeConfig {
    /// # Errors
    /// Returns an error if the configuration cannot be serialized for hashing.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self {
            settings: DashboardSettings::from_config(cfg),
            workers: cfg.fetch.workers,
            config_hash: cfg.stable_hash()?,
        })
    }

    /// Poll interval for terminal events.
    pub fn poll_interval(&self) -> Duration {
        self.settings.tick.max(Duration::from_millis(10))
    }
}

/// Run the dashboard until the user quits.
///
/// # Errors
/// Returns terminal I/O errors and fetch-pool failures.
pub fn run_dashboard(
    config: &DashboardRuntimeConfig,
    provider: Arc<dyn DataProvider>,
    diagnostics: Diagnostics,
) -> Result<()> {
    diagnostics.emit(DiagnosticEvent::DashboardStart {
        config_hash: config.config_hash.clone(),
    });

    let pool = FetchPool::spawn(provider, config.workers, diagnostics.clone())?;
    let guard = TerminalGuard::new().map_err(|e| StatsError::io("<terminal>", e))?;
    let model = DashboardModel::new(config.settings.clone(), TerminalGuard::terminal_size());
    let mut driver = DashboardDriver::new(model, pool, diagnostics);

    let outcome = event_loop(&mut driver, config.poll_interval());
    drop(guard);

    let reason = match &outcome {
        Ok(()) => "user quit".to_string(),
        Err(err) => format!("error: {err}"),
    };
    driver.finish(&reason);
    outcome
}

fn event_loop(driver: &mut DashboardDriver, poll: Duration) -> Result<()> {
    let mut stdout = io::stdout();
    driver.start()?;

    loop {
        draw_frame(&mut stdout, driver.model()).map_err(|e| StatsError::io("<stdout>", e))?;

        let ready = event::poll(poll).map_err(|e| StatsError::io("<terminal>", e))?;
        if ready {
            let ev = event::read().map_err(|e| StatsError::io("<terminal>", e))?;
            if let Some(msg) = translate_event(&ev) {
                driver.dispatch(msg)?;
            }
        }
        driver.pump(Instant::now())?;

        if driver.is_quit() {
            return Ok(());
        }
    }
}

/// Convert a crossterm event into a dashboard message.
fn translate_event(ev: &Event) -> Option<DashboardMsg> {
    match ev {
        Event::Key(key) if key.kind != KeyEventKind::Release => {
            translate_key(key).map(DashboardMsg::Key)
        }
        Event::Resize(cols, rows) => Some(DashboardMsg::Resize {
            cols: *cols,
            rows: *rows,
        }),
        _ => None,
    }
}

fn translate_key(key: &KeyEvent) -> Option<KeyInput> {
    let input = match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => KeyInput::Ctrl(c),
        KeyCode::Char(c) => KeyInput::Char(c),
        KeyCode::F(n) => KeyInput::Function(n),
        KeyCode::Left => KeyInput::Left,
        KeyCode::Right => KeyInput::Right,
        KeyCode::Up => KeyInput::Up,
        KeyCode::Down => KeyInput::Down,
        KeyCode::PageUp => KeyInput::PageUp,
        KeyCode::PageDown => KeyInput::PageDown,
        KeyCode::Home => KeyInput::Home,
        KeyCode::End => KeyInput::End,
        KeyCode::Enter => KeyInput::Enter,
        KeyCode::Esc => KeyInput::Esc,
        KeyCode::Backspace => KeyInput::Backspace,
        _ => return None,
    };
    Some(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn control_c_is_distinguished_from_c() {
        assert!(matches!(
            translate_event(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(DashboardMsg::Key(KeyInput::Ctrl('c')))
        ));
        assert!(matches!(
            translate_event(&key(KeyCode::Char('c'), KeyModifiers::NONE)),
            Some(DashboardMsg::Key(KeyInput::Char('c')))
        ));
    }

    #[test]
    fn resize_and_function_keys_translate() {
        assert!(matches!(
            translate_event(&Event::Resize(90, 33)),
            Some(DashboardMsg::Resize { cols: 90, rows: 33 })
        ));
        assert!(matches!(
            translate_event(&key(KeyCode::F(2), KeyModifiers::NONE)),
            Some(DashboardMsg::Key(KeyInput::Function(2)))
        ));
        assert!(translate_event(&key(KeyCode::Insert, KeyModifiers::NONE)).is_none());
    }

    #[test]
    fn runtime_config_follows_config_file_values() {
        let mut cfg = Config::default();
        cfg.fetch.workers = 3;
        cfg.dashboard.tick_ms = 1;
        let runtime = DashboardRuntimeConfig::from_config(&cfg).expect("config");
        assert_eq!(runtime.workers, 3);
        assert_eq!(runtime.poll_interval(), Duration::from_millis(10));
        assert_eq!(runtime.config_hash, cfg.stable_hash().expect("hash"));
    }
}
