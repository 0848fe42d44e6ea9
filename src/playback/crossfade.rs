//! Background fade-out / track swap / fade-in worker.
//!
//! The worker never touches the engine. It sends [`FadeMessage`]s back to the
//! driver loop, which applies them to the session in arrival order. A fade is
//! cancelled through a shared flag that is checked at every step.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use super::events::ControlEvent;

/// Shape of one crossfade: `steps` volume changes per ramp, spread evenly
/// over `duration`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FadePlan {
    pub duration: Duration,
    pub steps: u32,
}

impl FadePlan {
    pub fn new(duration: Duration, steps: u32) -> Self {
        Self {
            duration,
            steps: steps.max(1),
        }
    }

    pub fn step_interval(&self) -> Duration {
        self.duration / self.steps
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FadeStep {
    /// Scale the nominal volume by `num / den`.
    Scale { num: u32, den: u32 },
    /// Fade-out complete: load and start the next track.
    Advance,
    /// Fade-in complete: restore nominal volume.
    Finished,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FadeMessage {
    pub fade_id: u64,
    pub step: FadeStep,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FadeOutcome {
    Completed,
    /// Stopped early after emitting `steps_done` volume steps.
    Cancelled { steps_done: u32 },
}

/// Run a fade to completion or cancellation.
///
/// `sleep` waits one step interval; `emit` delivers a step and returns `false`
/// when nobody is listening anymore, which is treated like a cancellation.
pub fn run_fade(
    plan: FadePlan,
    cancel: &AtomicBool,
    mut sleep: impl FnMut(Duration),
    mut emit: impl FnMut(FadeStep) -> bool,
) -> FadeOutcome {
    let steps = plan.steps;
    let interval = plan.step_interval();
    let mut done = 0;

    for k in 1..=steps {
        sleep(interval);
        if cancel.load(Ordering::Acquire) {
            return FadeOutcome::Cancelled { steps_done: done };
        }
        if !emit(FadeStep::Scale {
            num: steps - k,
            den: steps,
        }) {
            return FadeOutcome::Cancelled { steps_done: done };
        }
        done += 1;
    }

    if cancel.load(Ordering::Acquire) || !emit(FadeStep::Advance) {
        return FadeOutcome::Cancelled { steps_done: done };
    }

    for k in 1..=steps {
        sleep(interval);
        if cancel.load(Ordering::Acquire) {
            return FadeOutcome::Cancelled { steps_done: done };
        }
        if !emit(FadeStep::Scale { num: k, den: steps }) {
            return FadeOutcome::Cancelled { steps_done: done };
        }
        done += 1;
    }

    if cancel.load(Ordering::Acquire) || !emit(FadeStep::Finished) {
        return FadeOutcome::Cancelled { steps_done: done };
    }
    FadeOutcome::Completed
}

/// A running fade worker.
pub struct FadeHandle {
    id: u64,
    cancel: Arc<AtomicBool>,
    join: Option<JoinHandle<FadeOutcome>>,
}

impl FadeHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether the worker could not be started.
    pub fn failed_to_start(&self) -> bool {
        self.join.is_none()
    }

    /// Ask the worker to stop; it exits within one step interval.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    /// Wait for the worker to exit.
    #[cfg(test)]
    pub fn join(mut self) -> Option<FadeOutcome> {
        self.join.take().and_then(|h| h.join().ok())
    }
}

/// Spawn the fade worker on its own thread.
pub fn spawn_fade(id: u64, plan: FadePlan, tx: Sender<ControlEvent>) -> FadeHandle {
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_for_worker = cancel.clone();
    let join = thread::Builder::new()
        .name(format!("crossfade-{id}"))
        .spawn(move || {
            let outcome = run_fade(plan, &cancel_for_worker, thread::sleep, |step| {
                tx.send(ControlEvent::Fade(FadeMessage { fade_id: id, step }))
                    .is_ok()
            });
            debug!(fade_id = id, ?outcome, "crossfade worker exited");
            outcome
        })
        .ok();
    FadeHandle { id, cancel, join }
}
