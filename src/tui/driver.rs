//! Command executor connecting the pure model to the fetch pool, timers and
//! diagnostics.
//!
//! The driver owns no terminal. The crossterm runtime feeds it key and resize
//! messages; tests feed it messages directly and wait on fetch completions.

#![allow(missing_docs)]

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::core::errors::Result;
use crate::logger::diagnostics::{DiagnosticEvent, Diagnostics};
use crate::source::fetcher::FetchPool;

use super::model::{DashboardCmd, DashboardModel, DashboardMsg};
use super::update::update;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    Tick,
    ExpireNotification(u64),
}

pub struct DashboardDriver {
    model: DashboardModel,
    pool: FetchPool,
    diagnostics: Diagnostics,
    /// Messages produced by commands, delivered before new input.
    pending: VecDeque<DashboardMsg>,
    timers: Vec<(Instant, Timer)>,
}

impl DashboardDriver {
    pub fn new(model: DashboardModel, pool: FetchPool, diagnostics: Diagnostics) -> Self {
        Self {
            model,
            pool,
            diagnostics,
            pending: VecDeque::new(),
            timers: Vec::new(),
        }
    }

    pub const fn model(&self) -> &DashboardModel {
        &self.model
    }

    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub const fn is_quit(&self) -> bool {
        self.model.quit
    }

    /// Issue the model's startup commands.
    pub fn start(&mut self) -> Result<()> {
        let cmd = self.model.init();
        self.execute(cmd, Instant::now())
    }

    /// Apply one message and everything it triggers synchronously.
    pub fn dispatch(&mut self, msg: DashboardMsg) -> Result<()> {
        let now = Instant::now();
        let cmd = update(&mut self.model, msg);
        self.execute(cmd, now)?;
        self.drain_pending(now)
    }

    /// Deliver fetch completions and due timers without blocking.
    /// Returns the number of messages handled.
    pub fn pump(&mut self, now: Instant) -> Result<usize> {
        let mut handled = 0;
        while let Some(done) = self.pool.try_recv() {
            self.dispatch(done.into())?;
            handled += 1;
        }

        let mut due = Vec::new();
        self.timers.retain(|&(deadline, timer)| {
            if deadline <= now {
                due.push(timer);
                false
            } else {
                true
            }
        });
        for timer in due {
            let msg = match timer {
                Timer::Tick => DashboardMsg::Tick,
                Timer::ExpireNotification(id) => DashboardMsg::NotificationExpired(id),
            };
            self.dispatch(msg)?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Block up to `timeout` for one fetch completion and apply it.
    /// Returns `false` on timeout.
    pub fn wait_for_completion(&mut self, timeout: Duration) -> Result<bool> {
        match self.pool.recv_timeout(timeout)? {
            Some(done) => {
                self.dispatch(done.into())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Number of fetches queued or running.
    pub fn in_flight(&self) -> usize {
        self.pool.in_flight_count()
    }

    /// Stop the workers and flush diagnostics.
    pub fn finish(self, reason: &str) {
        self.diagnostics.emit(DiagnosticEvent::DashboardStop {
            reason: reason.to_string(),
        });
        self.pool.shutdown();
        self.diagnostics.flush();
    }

    fn drain_pending(&mut self, now: Instant) -> Result<()> {
        while let Some(msg) = self.pending.pop_front() {
            let cmd = update(&mut self.model, msg);
            self.execute(cmd, now)?;
        }
        Ok(())
    }

    fn execute(&mut self, cmd: DashboardCmd, now: Instant) -> Result<()> {
        for leaf in cmd.flatten() {
            match leaf {
                DashboardCmd::None | DashboardCmd::Quit | DashboardCmd::Batch(_) => {}
                DashboardCmd::FetchList => self.pool.request_list()?,
                DashboardCmd::FetchSubreddit { name } => {
                    self.pool.request(&name)?;
                }
                DashboardCmd::RequestGrow(token) => {
                    self.pending.push_back(DashboardMsg::ScrollNearEnd(token));
                }
                DashboardCmd::ScheduleTick(after) => {
                    self.timers.push((now + after, Timer::Tick));
                }
                DashboardCmd::ScheduleNotificationExpiry { id, after } => {
                    self.timers.push((now + after, Timer::ExpireNotification(id)));
                }
                DashboardCmd::Log(event) => self.diagnostics.emit(event),
            }
        }
        Ok(())
    }
}
