//! Look-ahead scheduling clock.
//!
//! The core never sleeps or spawns threads. Sequences hand callbacks to a
//! [`Clock`] with the time they should sound at; the host advances the
//! [`Transport`] once per frame and every callback falling inside the
//! look-ahead window fires, in time order, with its intended schedule time.
//! The synth collaborator then plays the trigger at that time on its own
//! audio clock.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use crate::config::TransportParams;

pub type ScheduledFn = Box<dyn FnOnce(f64)>;

/// Handle returned by [`Clock::schedule_at`], used to cancel a pending callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CancelToken(u64);

pub trait Clock {
    /// Current transport time in seconds.
    fn now(&self) -> f64;
    fn bpm(&self) -> f64;
    /// Queue `callback` to fire with `time` once `time` enters the
    /// look-ahead window.
    fn schedule_at(&self, time: f64, callback: ScheduledFn) -> CancelToken;
    /// Drop a pending callback. Returns false if it already fired or was
    /// cancelled before.
    fn cancel(&self, token: CancelToken) -> bool;
}

struct Entry {
    time: f64,
    id: u64,
    callback: ScheduledFn,
}

struct TransportState {
    now: f64,
    next_id: u64,
    queue: VecDeque<Entry>,
}

/// Single-threaded [`Clock`] driven by the frame loop.
pub struct Transport {
    state: RefCell<TransportState>,
    bpm: Cell<f64>,
    lookahead: f64,
    advancing: Cell<bool>,
}

impl Transport {
    pub fn new(params: &TransportParams) -> Self {
        Self {
            state: RefCell::new(TransportState {
                now: 0.0,
                next_id: 0,
                queue: VecDeque::new(),
            }),
            bpm: Cell::new(params.bpm),
            lookahead: params.lookahead_sec,
            advancing: Cell::new(false),
        }
    }

    pub fn set_bpm(&self, bpm: f64) {
        if bpm.is_finite() && bpm > 0.0 {
            self.bpm.set(bpm);
        }
    }

    pub fn lookahead(&self) -> f64 {
        self.lookahead
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Move the transport to `now` and fire every callback due up to
    /// `now + lookahead`. Returns how many fired. Time never runs backwards;
    /// a smaller `now` keeps the previous time.
    pub fn advance(&self, now: f64) -> usize {
        if self.advancing.get() {
            log::warn!("[transport] nested advance ignored");
            return 0;
        }
        self.advancing.set(true);
        let horizon = {
            let mut st = self.state.borrow_mut();
            if now.is_finite() && now > st.now {
                st.now = now;
            }
            st.now + self.lookahead
        };
        let mut fired = 0;
        loop {
            // the borrow must end before the callback runs: callbacks reschedule
            let next = {
                let mut st = self.state.borrow_mut();
                match st.queue.front() {
                    Some(e) if e.time <= horizon => st.queue.pop_front(),
                    _ => None,
                }
            };
            let Some(entry) = next else { break };
            (entry.callback)(entry.time);
            fired += 1;
        }
        self.advancing.set(false);
        fired
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(&TransportParams::default())
    }
}

impl Clock for Transport {
    fn now(&self) -> f64 {
        self.state.borrow().now
    }

    fn bpm(&self) -> f64 {
        self.bpm.get()
    }

    fn schedule_at(&self, time: f64, callback: ScheduledFn) -> CancelToken {
        let mut st = self.state.borrow_mut();
        let time = if time.is_finite() { time } else { st.now };
        let id = st.next_id;
        st.next_id += 1;
        // equal times keep insertion order
        let idx = st.queue.partition_point(|e| e.time <= time);
        st.queue.insert(idx, Entry { time, id, callback });
        CancelToken(id)
    }

    fn cancel(&self, token: CancelToken) -> bool {
        // the removed callback is dropped after the borrow ends
        let removed = {
            let mut st = self.state.borrow_mut();
            st.queue
                .iter()
                .position(|e| e.id == token.0)
                .and_then(|idx| st.queue.remove(idx))
        };
        removed.is_some()
    }
}
