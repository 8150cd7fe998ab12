//! Cancellable tween tasks.
//!
//! Every animation (view transitions, marker pulses, the plane icon) is a task
//! on a [`Timeline`] owned by the component that drives it. Tasks are sampled
//! against frame time rather than ticking on their own, so a cancelled task
//! simply stops producing samples.

use foundation::handles::Handle;
use foundation::time::Time;

use crate::easing::Easing;

/// Handle to a task on a [`Timeline`]. Stale after the task finishes or is
/// cancelled; sampling a stale handle yields nothing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TaskHandle(Handle);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Repeat {
    Once,
    Forever,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tween {
    pub duration_s: f64,
    pub easing: Easing,
    pub repeat: Repeat,
}

impl Tween {
    pub fn once(duration_s: f64, easing: Easing) -> Self {
        Self {
            duration_s,
            easing,
            repeat: Repeat::Once,
        }
    }

    pub fn forever(duration_s: f64, easing: Easing) -> Self {
        Self {
            duration_s,
            easing,
            repeat: Repeat::Forever,
        }
    }
}

/// One observation of a running task.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TweenSample {
    /// Linear progress through the current cycle, `[0, 1]`.
    pub progress: f64,
    /// `progress` passed through the tween's easing.
    pub eased: f64,
    /// Completed cycles (always 0 for one-shot tweens).
    pub cycle: u64,
    /// Set on the final sample of a one-shot tween.
    pub finished: bool,
}

#[derive(Debug)]
struct Task {
    tween: Tween,
    started: Time,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    task: Option<Task>,
}

#[derive(Debug, Default)]
pub struct Timeline {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now: Time, tween: Tween) -> TaskHandle {
        let task = Task {
            tween,
            started: now,
        };
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.task = Some(task);
        TaskHandle(Handle::new(index, slot.generation))
    }

    fn slot(&self, handle: TaskHandle) -> Option<&Slot> {
        self.slots
            .get(handle.0.index() as usize)
            .filter(|s| s.generation == handle.0.generation() && s.task.is_some())
    }

    pub fn is_active(&self, handle: TaskHandle) -> bool {
        self.slot(handle).is_some()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.task.is_some()).count()
    }

    /// Stops a task. Returns `false` if the handle was already stale.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        if !self.is_active(handle) {
            return false;
        }
        self.release(handle.0.index());
        true
    }

    /// Cancels `handle` if present and clears it.
    pub fn cancel_slot(&mut self, handle: &mut Option<TaskHandle>) {
        if let Some(h) = handle.take() {
            self.cancel(h);
        }
    }

    pub fn cancel_all(&mut self) {
        let active = self.active_count();
        for index in 0..self.slots.len() as u32 {
            if self.slots[index as usize].task.is_some() {
                self.release(index);
            }
        }
        if active > 0 {
            tracing::trace!(cancelled = active, "timeline cleared");
        }
    }

    fn release(&mut self, index: u32) {
        let slot = &mut self.slots[index as usize];
        slot.task = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
    }

    /// Samples a task at `now`.
    ///
    /// A one-shot tween yields exactly one sample with `finished` set, after
    /// which its handle goes stale.
    pub fn sample(&mut self, handle: TaskHandle, now: Time) -> Option<TweenSample> {
        let task = self.slot(handle)?.task.as_ref()?;
        let tween = task.tween;
        let elapsed = now.since(task.started);

        if tween.duration_s.is_nan() || tween.duration_s <= 0.0 {
            if tween.repeat == Repeat::Once {
                self.release(handle.0.index());
            }
            return Some(TweenSample {
                progress: 1.0,
                eased: 1.0,
                cycle: 0,
                finished: tween.repeat == Repeat::Once,
            });
        }

        let cycles = elapsed / tween.duration_s;
        let sample = match tween.repeat {
            Repeat::Once => {
                let progress = cycles.min(1.0);
                TweenSample {
                    progress,
                    eased: tween.easing.apply(progress),
                    cycle: 0,
                    finished: progress >= 1.0,
                }
            }
            Repeat::Forever => {
                let cycle = cycles.floor();
                let progress = cycles - cycle;
                TweenSample {
                    progress,
                    eased: tween.easing.apply(progress),
                    cycle: cycle as u64,
                    finished: false,
                }
            }
        };
        if sample.finished {
            self.release(handle.0.index());
        }
        Some(sample)
    }
}
