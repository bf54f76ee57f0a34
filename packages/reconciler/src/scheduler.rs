//! # Render Scheduler
//!
//! Decides when the queue is drained. The scheduler holds at most one
//! pending drain, either aligned to the next frame callback or to a fixed
//! delay timer. It never runs anything itself; the host drives it through
//! `Renderer::on_frame` / `Renderer::on_timer`, or the async render loop
//! does.
//!
//! Instants come from `tokio::time` so the render loop can be tested with a
//! paused clock.

use crate::config::RendererConfig;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleMode {
    /// Drain on the next frame callback
    Frame,
    /// Drain once the delay has elapsed
    Timer(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    Frame { handle: u64 },
    Timer { handle: u64, deadline: Instant },
}

impl Pending {
    pub fn handle(&self) -> u64 {
        match self {
            Pending::Frame { handle } | Pending::Timer { handle, .. } => *handle,
        }
    }
}

#[derive(Debug)]
pub struct Scheduler {
    mode: ScheduleMode,
    pending: Option<Pending>,
    next_handle: u64,
}

impl Scheduler {
    pub fn new(mode: ScheduleMode) -> Self {
        Self {
            mode,
            pending: None,
            next_handle: 0,
        }
    }

    pub fn from_config(config: &RendererConfig) -> Self {
        let mode = if config.use_raf {
            ScheduleMode::Frame
        } else {
            ScheduleMode::Timer(config.batch_delay())
        };
        Self::new(mode)
    }

    pub fn mode(&self) -> ScheduleMode {
        self.mode
    }

    pub fn pending(&self) -> Option<Pending> {
        self.pending
    }

    pub fn is_scheduled(&self) -> bool {
        self.pending.is_some()
    }

    /// Request a drain. Returns `None` when one is already pending.
    pub fn schedule(&mut self, now: Instant) -> Option<Pending> {
        if self.pending.is_some() {
            return None;
        }

        self.next_handle += 1;
        let handle = self.next_handle;
        let pending = match self.mode {
            ScheduleMode::Frame => Pending::Frame { handle },
            ScheduleMode::Timer(delay) => Pending::Timer {
                handle,
                deadline: now + delay,
            },
        };
        self.pending = Some(pending);
        Some(pending)
    }

    pub fn cancel(&mut self) -> Option<Pending> {
        self.pending.take()
    }

    /// Consume a pending frame callback, if that is what is pending
    pub fn take_frame(&mut self) -> bool {
        match self.pending {
            Some(Pending::Frame { .. }) => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Consume a pending timer whose deadline has passed
    pub fn take_due_timer(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(Pending::Timer { deadline, .. }) if deadline <= now => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match self.pending {
            Some(Pending::Timer { deadline, .. }) => Some(deadline),
            _ => None,
        }
    }

    pub fn wants_frame(&self) -> bool {
        matches!(self.pending, Some(Pending::Frame { .. }))
    }
}
