//! Animation scheduler
//!
//! One frame loop per scheduler instance, ticking every registered animation
//! once per frame. The scheduler is an explicit context object - there is no
//! process-wide singleton - so independent instances (and independent tests)
//! never interfere.
//!
//! Consumers register a tick function and control the animation through its
//! id: `idle -> running <-> paused -> finished`, with cancellation terminal
//! from any non-finished state. All spring/inertial state owned by tick
//! functions is mutated inside the tick; external code only requests target
//! changes.
//!
//! The driver thread arms itself when the first animation starts and tears
//! itself down when nothing is left running, so an idle scheduler costs no
//! CPU. Hosts that own a frame loop (or tests) use `manual()` and pump
//! `tick()`/`tick_with_dt()` themselves.
//!
//! Tick functions must not call back into their own scheduler; control flow
//! belongs in the returned `TickOutcome` and the finish callback.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use vitro_core::Error;

/// Upper bound on a single frame delta, in seconds
///
/// A stalled process resumes with one bounded step instead of injecting a
/// huge dt that would overshoot every spring.
pub const MAX_FRAME_DT: f32 = 1.0 / 15.0;

new_key_type! {
    /// Handle to a registered animation
    pub struct AnimationId;
}

/// Lifecycle of a registered animation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationState {
    Idle,
    Running,
    Paused,
    Finished,
    Cancelled,
}

/// What a tick function reports back to the scheduler
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Finished,
}

type TickFn = Box<dyn FnMut(f32) -> TickOutcome + Send>;
type FinishFn = Box<dyn FnOnce() + Send>;

/// Everything needed to register one animation
pub struct AnimationSpec {
    tick: TickFn,
    min_interval: Option<Duration>,
    on_finish: Option<FinishFn>,
}

impl AnimationSpec {
    /// The tick function receives the clamped frame delta in seconds
    pub fn new<F>(tick: F) -> Self
    where
        F: FnMut(f32) -> TickOutcome + Send + 'static,
    {
        Self {
            tick: Box::new(tick),
            min_interval: None,
            on_finish: None,
        }
    }

    /// Cap this animation's own update rate below the global frame rate
    ///
    /// A throttled animation is skipped on ticks arriving within
    /// `min_interval` of its previous update; when it does update it
    /// receives the full elapsed delta, so wall-clock progress is unchanged.
    pub fn throttled(mut self, min_interval: Duration) -> Self {
        self.min_interval = Some(min_interval);
        self
    }

    /// Callback fired synchronously when the tick function reports finished
    pub fn on_finish<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_finish = Some(Box::new(callback));
        self
    }
}

struct ScheduledAnimation {
    state: AnimationState,
    started_at: Instant,
    /// When this animation's tick function last actually ran
    last_update: Option<Instant>,
    min_interval: Option<Duration>,
    tick: TickFn,
    on_finish: Option<FinishFn>,
}

struct Inner {
    animations: SlotMap<AnimationId, ScheduledAnimation>,
    /// Registration order; ticks are dispatched in this order
    order: Vec<AnimationId>,
}

impl Inner {
    fn has_running(&self) -> bool {
        self.animations
            .values()
            .any(|a| a.state == AnimationState::Running)
    }

    fn remove(&mut self, id: AnimationId) {
        self.animations.remove(id);
        self.order.retain(|&o| o != id);
    }
}

struct Shared {
    inner: Mutex<Inner>,
    /// True while a driver thread is live; transitions happen under `inner`
    driver_alive: AtomicBool,
    stop_flag: AtomicBool,
    driver_enabled: bool,
    frame_duration: Duration,
    thread_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    /// Tick every running animation once
    ///
    /// `forced_dt` overrides the per-animation elapsed time (deterministic
    /// test/host ticks). Returns true while anything is still running.
    fn tick_at(&self, now: Instant, forced_dt: Option<f32>) -> bool {
        enum Disposition {
            Untouched,
            Removed,
            Finished(Option<FinishFn>),
        }

        let mut inner = self.inner.lock().unwrap();

        let ids: SmallVec<[AnimationId; 16]> = inner.order.iter().copied().collect();
        for id in ids {
            let disposition = {
                let Some(anim) = inner.animations.get_mut(id) else {
                    continue;
                };
                if anim.state != AnimationState::Running {
                    continue;
                }

                // Throttle: skip without touching last_update, so the next
                // accepted tick sees the full elapsed delta.
                if let (Some(min), Some(last)) = (anim.min_interval, anim.last_update) {
                    if now.duration_since(last) < min {
                        continue;
                    }
                }

                let since = anim.last_update.unwrap_or(anim.started_at);
                let dt = forced_dt.unwrap_or_else(|| {
                    now.saturating_duration_since(since).as_secs_f32()
                });
                let dt = dt.clamp(0.0, MAX_FRAME_DT);
                anim.last_update = Some(now);

                match panic::catch_unwind(AssertUnwindSafe(|| (anim.tick)(dt))) {
                    Ok(TickOutcome::Continue) => Disposition::Untouched,
                    Ok(TickOutcome::Finished) => {
                        anim.state = AnimationState::Finished;
                        Disposition::Finished(anim.on_finish.take())
                    }
                    Err(_) => {
                        tracing::error!(?id, "animation tick panicked; removing animation");
                        Disposition::Removed
                    }
                }
            };

            match disposition {
                Disposition::Untouched => {}
                Disposition::Removed => inner.remove(id),
                Disposition::Finished(on_finish) => {
                    // Finish callbacks fire before the next animation in the
                    // same tick is processed.
                    inner.remove(id);
                    if let Some(callback) = on_finish {
                        if panic::catch_unwind(AssertUnwindSafe(callback)).is_err() {
                            tracing::error!(?id, "animation finish callback panicked");
                        }
                    }
                }
            }
        }

        inner.has_running()
    }

    fn register(&self, spec: AnimationSpec) -> AnimationId {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.animations.insert(ScheduledAnimation {
            state: AnimationState::Idle,
            started_at: Instant::now(),
            last_update: None,
            min_interval: spec.min_interval,
            tick: spec.tick,
            on_finish: spec.on_finish,
        });
        inner.order.push(id);
        id
    }

    fn start(self: &Arc<Self>, id: AnimationId) -> Result<(), Error> {
        {
            let mut inner = self.inner.lock().unwrap();
            let anim = inner
                .animations
                .get_mut(id)
                .ok_or(Error::UnknownAnimation)?;
            if anim.state == AnimationState::Idle {
                anim.state = AnimationState::Running;
                anim.started_at = Instant::now();
                anim.last_update = None;
            }
        }
        self.ensure_driver();
        Ok(())
    }

    fn ensure_driver(self: &Arc<Self>) {
        if !self.driver_enabled {
            return;
        }
        let spawn = {
            let _guard = self.inner.lock().unwrap();
            if self.driver_alive.load(Ordering::Acquire) {
                false
            } else {
                self.driver_alive.store(true, Ordering::Release);
                true
            }
        };
        if spawn {
            let weak = Arc::downgrade(self);
            let frame = self.frame_duration;
            let handle = thread::spawn(move || driver_loop(weak, frame));
            let mut slot = self.thread_handle.lock().unwrap();
            // A previous driver has already observed driver_alive == false
            // and exited; reap it.
            if let Some(old) = slot.replace(handle) {
                let _ = old.join();
            }
        }
    }
}

fn driver_loop(shared: Weak<Shared>, frame: Duration) {
    loop {
        thread::sleep(frame);
        let Some(shared) = shared.upgrade() else {
            return;
        };
        if shared.stop_flag.load(Ordering::Acquire) {
            shared.driver_alive.store(false, Ordering::Release);
            return;
        }
        let any_running = shared.tick_at(Instant::now(), None);
        if !any_running {
            // Tear down: an idle scheduler must not burn CPU. The flag flips
            // under the same lock discipline start() uses, so a concurrent
            // start() either sees the live driver or spawns a fresh one.
            let _guard = shared.inner.lock().unwrap();
            if !_guard.has_running() {
                shared.driver_alive.store(false, Ordering::Release);
                return;
            }
        }
    }
}

/// The frame-loop context driving all registered animations
///
/// Created per embedding (application, test); not a global. Dropping the
/// scheduler stops its driver thread and invalidates outstanding handles.
pub struct AnimationScheduler {
    shared: Arc<Shared>,
}

impl AnimationScheduler {
    /// A scheduler with its own driver thread at the default 120fps
    pub fn new() -> Self {
        Self::with_frame_rate(120)
    }

    /// A scheduler with its own driver thread at `fps`
    pub fn with_frame_rate(fps: u32) -> Self {
        Self::build(true, fps)
    }

    /// A scheduler with no driver thread; the host pumps `tick()` itself
    pub fn manual() -> Self {
        Self::build(false, 120)
    }

    fn build(driver_enabled: bool, fps: u32) -> Self {
        let fps = fps.max(1);
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    animations: SlotMap::with_key(),
                    order: Vec::new(),
                }),
                driver_alive: AtomicBool::new(false),
                stop_flag: AtomicBool::new(false),
                driver_enabled,
                frame_duration: Duration::from_micros(1_000_000 / u64::from(fps)),
                thread_handle: Mutex::new(None),
            }),
        }
    }

    /// Get a weak handle for passing to components
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Register an animation; it starts in `Idle`
    pub fn add(&self, spec: AnimationSpec) -> AnimationId {
        self.shared.register(spec)
    }

    /// Register and immediately start an animation
    pub fn run(&self, spec: AnimationSpec) -> AnimationId {
        let id = self.shared.register(spec);
        // Freshly inserted id is always startable.
        let _ = self.shared.start(id);
        id
    }

    /// `Idle -> Running`; arms the driver
    pub fn start(&self, id: AnimationId) -> Result<(), Error> {
        self.shared.start(id)
    }

    /// `Running -> Paused`; a paused animation is skipped, not removed
    pub fn pause(&self, id: AnimationId) -> Result<(), Error> {
        let mut inner = self.shared.inner.lock().unwrap();
        let anim = inner
            .animations
            .get_mut(id)
            .ok_or(Error::UnknownAnimation)?;
        if anim.state == AnimationState::Running {
            anim.state = AnimationState::Paused;
        }
        Ok(())
    }

    /// `Paused -> Running`; re-arms the driver
    pub fn resume(&self, id: AnimationId) -> Result<(), Error> {
        {
            let mut inner = self.shared.inner.lock().unwrap();
            let anim = inner
                .animations
                .get_mut(id)
                .ok_or(Error::UnknownAnimation)?;
            if anim.state == AnimationState::Paused {
                anim.state = AnimationState::Running;
                // Don't bill the paused interval to the next tick.
                anim.last_update = None;
                anim.started_at = Instant::now();
            }
        }
        self.shared.ensure_driver();
        Ok(())
    }

    /// Terminal: the id is removed synchronously and never ticked again
    pub fn cancel(&self, id: AnimationId) -> Result<(), Error> {
        let mut inner = self.shared.inner.lock().unwrap();
        if inner.animations.get(id).is_none() {
            return Err(Error::UnknownAnimation);
        }
        inner.remove(id);
        Ok(())
    }

    pub fn state(&self, id: AnimationId) -> Option<AnimationState> {
        self.shared
            .inner
            .lock()
            .unwrap()
            .animations
            .get(id)
            .map(|a| a.state)
    }

    pub fn len(&self) -> usize {
        self.shared.inner.lock().unwrap().animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_running(&self) -> bool {
        self.shared.inner.lock().unwrap().has_running()
    }

    /// Whether the driver thread is currently armed
    pub fn is_driver_running(&self) -> bool {
        self.shared.driver_alive.load(Ordering::Acquire)
    }

    /// Tick once from the host's own frame loop
    ///
    /// Returns true while any animation is still running. Per-animation
    /// deltas come from the shared clock, clamped to `MAX_FRAME_DT`.
    pub fn tick(&self) -> bool {
        self.shared.tick_at(Instant::now(), None)
    }

    /// Tick once with an explicit delta (deterministic simulation)
    pub fn tick_with_dt(&self, dt: f32) -> bool {
        self.shared.tick_at(Instant::now(), Some(dt))
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AnimationScheduler {
    fn drop(&mut self) {
        self.shared.stop_flag.store(true, Ordering::Release);
        let handle = self.shared.thread_handle.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

/// A weak handle to a scheduler
///
/// Handed to components that register animations; does not keep the
/// scheduler alive. Every operation on a dropped scheduler degrades to
/// `Error::SchedulerGone`.
#[derive(Clone)]
pub struct SchedulerHandle {
    shared: Weak<Shared>,
}

impl SchedulerHandle {
    fn upgrade(&self) -> Result<Arc<Shared>, Error> {
        self.shared.upgrade().ok_or(Error::SchedulerGone)
    }

    /// Register and start an animation on the underlying scheduler
    pub fn run(&self, spec: AnimationSpec) -> Result<AnimationId, Error> {
        let shared = self.upgrade()?;
        let id = shared.register(spec);
        shared.start(id)?;
        Ok(id)
    }

    pub fn cancel(&self, id: AnimationId) -> Result<(), Error> {
        let shared = self.upgrade()?;
        let mut inner = shared.inner.lock().unwrap();
        if inner.animations.get(id).is_none() {
            return Err(Error::UnknownAnimation);
        }
        inner.remove(id);
        Ok(())
    }

    pub fn state(&self, id: AnimationId) -> Option<AnimationState> {
        self.shared
            .upgrade()
            .and_then(|shared| shared.inner.lock().unwrap().animations.get(id).map(|a| a.state))
    }

    pub fn is_alive(&self) -> bool {
        self.shared.strong_count() > 0
    }
}
