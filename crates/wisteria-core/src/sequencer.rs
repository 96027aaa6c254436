//! Step sequencer on top of a [`Clock`].
//!
//! A running sequence is a chain of one-shot clock callbacks: each step fires
//! its handler and then schedules the next step. Only one callback per
//! sequence is ever pending, so stopping means cancelling that one token and
//! flipping the `active` flag the chain checks before doing anything.

use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::clock::{CancelToken, Clock};
use crate::error::{CoreError, CoreResult};
use crate::timing::Grid;

static NEXT_SEQUENCE_ID: AtomicU64 = AtomicU64::new(1);

/// How far apart steps are.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Rate {
    /// Musical grid at the clock's BPM. Starts on the next grid boundary.
    Grid(Grid),
    /// Fixed interval in seconds. Starts immediately.
    Seconds(f64),
}

/// Step handler: absolute step index and the time the step should sound at.
pub type StepFn = Box<dyn FnMut(u64, f64)>;

struct SeqShared {
    id: u64,
    active: Cell<bool>,
    pending: Cell<Option<CancelToken>>,
}

#[derive(Clone, Copy)]
struct Cadence {
    first_step: u64,
    first_time: f64,
    interval: f64,
}

impl Cadence {
    // computed from the origin each time so long runs do not drift
    fn time_of(&self, step: u64) -> f64 {
        self.first_time + (step - self.first_step) as f64 * self.interval
    }
}

/// Owner of a running sequence. Stopping (or dropping) it guarantees the
/// handler is never called again, including for steps already queued ahead.
pub struct SequenceHandle {
    shared: Rc<SeqShared>,
    clock: Rc<dyn Clock>,
}

impl SequenceHandle {
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.get()
    }

    pub fn stop(&self) {
        if !self.shared.active.replace(false) {
            return;
        }
        if let Some(token) = self.shared.pending.take() {
            self.clock.cancel(token);
        }
        log::debug!("[sequencer] stopped sequence {}", self.shared.id);
    }
}

impl Drop for SequenceHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct StepSequencer;

impl StepSequencer {
    pub fn start(
        clock: &Rc<dyn Clock>,
        rate: Rate,
        on_step: StepFn,
    ) -> CoreResult<SequenceHandle> {
        let now = clock.now();
        let cadence = match rate {
            Rate::Grid(grid) => {
                let interval = grid.step_seconds(clock.bpm());
                if !(interval.is_finite() && interval > 0.0) {
                    return Err(CoreError::invalid(
                        "bpm",
                        format!("step length {interval} is not positive"),
                    ));
                }
                let first_step = (now / interval).ceil().max(0.0) as u64;
                Cadence {
                    first_step,
                    first_time: first_step as f64 * interval,
                    interval,
                }
            }
            Rate::Seconds(interval) => {
                if !(interval.is_finite() && interval > 0.0) {
                    return Err(CoreError::invalid(
                        "interval",
                        format!("must be positive, got {interval}"),
                    ));
                }
                Cadence {
                    first_step: 0,
                    first_time: now,
                    interval,
                }
            }
        };
        let shared = Rc::new(SeqShared {
            id: NEXT_SEQUENCE_ID.fetch_add(1, Ordering::Relaxed),
            active: Cell::new(true),
            pending: Cell::new(None),
        });
        arm(
            clock,
            Rc::downgrade(clock),
            Rc::clone(&shared),
            on_step,
            cadence,
            cadence.first_step,
        );
        log::debug!(
            "[sequencer] started sequence {} at {:.3}s, step {:.3}s",
            shared.id,
            cadence.first_time,
            cadence.interval
        );
        Ok(SequenceHandle {
            shared,
            clock: Rc::clone(clock),
        })
    }
}

fn arm(
    clock: &Rc<dyn Clock>,
    weak_clock: Weak<dyn Clock>,
    shared: Rc<SeqShared>,
    mut on_step: StepFn,
    cadence: Cadence,
    step: u64,
) {
    let time = cadence.time_of(step);
    let chain = Rc::clone(&shared);
    let token = clock.schedule_at(
        time,
        Box::new(move |at| {
            if !chain.active.get() {
                return;
            }
            chain.pending.set(None);
            on_step(step, at);
            // the handler may have stopped us
            if !chain.active.get() {
                return;
            }
            if let Some(clock) = weak_clock.upgrade() {
                arm(&clock, weak_clock, chain, on_step, cadence, step + 1);
            }
        }),
    );
    shared.pending.set(Some(token));
}
