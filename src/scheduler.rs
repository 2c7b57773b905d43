use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub type Task = Box<dyn FnOnce()>;

/// Deferred work: timers and animation frames.
pub trait Scheduler {
    fn now_ms(&self) -> f64;
    fn set_timeout(&self, delay_ms: u32, task: Task);
    fn request_frame(&self, task: Task);
}

/// Leading-edge throttle: the first call runs, calls in the next `limit_ms` are dropped.
pub fn throttle<F>(scheduler: Rc<dyn Scheduler>, limit_ms: u32, mut f: F) -> impl FnMut()
where
    F: FnMut() + 'static,
{
    let cooling = Rc::new(Cell::new(false));
    move || {
        if cooling.get() {
            return;
        }
        f();
        cooling.set(true);
        let cooling = cooling.clone();
        scheduler.set_timeout(limit_ms, Box::new(move || cooling.set(false)));
    }
}

/// Stops a [`FrameLoop`]. Dropping the handle does not stop the loop.
#[derive(Debug, Clone)]
pub struct LoopHandle {
    running: Rc<Cell<bool>>,
}

impl LoopHandle {
    pub fn stop(&self) {
        self.running.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }
}

/// A task that re-arms itself on every animation frame until stopped.
pub struct FrameLoop;

impl FrameLoop {
    /// The first tick runs on the next frame.
    pub fn start<F>(scheduler: Rc<dyn Scheduler>, tick: F) -> LoopHandle
    where
        F: FnMut() + 'static,
    {
        let running = Rc::new(Cell::new(true));
        let tick: Rc<RefCell<Box<dyn FnMut()>>> = Rc::new(RefCell::new(Box::new(tick)));
        arm(scheduler, running.clone(), tick);
        LoopHandle { running }
    }
}

fn arm(scheduler: Rc<dyn Scheduler>, running: Rc<Cell<bool>>, tick: Rc<RefCell<Box<dyn FnMut()>>>) {
    let next = scheduler.clone();
    scheduler.request_frame(Box::new(move || {
        if !running.get() {
            return;
        }
        (&mut *tick.borrow_mut())();
        arm(next, running, tick);
    }));
}

struct PendingTimeout {
    due: f64,
    seq: u64,
    task: Task,
}

/// Virtual clock for driving controllers outside a browser.
///
/// Nothing runs until the test calls [`ManualScheduler::advance`] or
/// [`ManualScheduler::run_frame`].
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<f64>,
    seq: Cell<u64>,
    timeouts: RefCell<Vec<PendingTimeout>>,
    frames: RefCell<Vec<Task>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward, running due timeouts in order. Timeouts
    /// scheduled by a running task fire in the same call if they fall due.
    pub fn advance(&self, ms: u32) {
        let target = self.now.get() + f64::from(ms);
        loop {
            let next = {
                let mut timeouts = self.timeouts.borrow_mut();
                let earliest = timeouts
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)))
                    .map(|(i, _)| i);
                earliest.map(|i| timeouts.remove(i))
            };
            match next {
                Some(pending) => {
                    self.now.set(pending.due);
                    (pending.task)();
                }
                None => break,
            }
        }
        self.now.set(target);
    }

    /// Runs the callbacks queued for the next frame. Returns how many ran.
    pub fn run_frame(&self) -> usize {
        let frame = std::mem::take(&mut *self.frames.borrow_mut());
        let count = frame.len();
        for task in frame {
            task();
        }
        count
    }

    pub fn run_frames(&self, n: usize) {
        for _ in 0..n {
            self.run_frame();
        }
    }

    pub fn pending_timeouts(&self) -> usize {
        self.timeouts.borrow().len()
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }
}

impl Scheduler for ManualScheduler {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }

    fn set_timeout(&self, delay_ms: u32, task: Task) {
        let seq = self.seq.get();
        self.seq.set(seq + 1);
        self.timeouts.borrow_mut().push(PendingTimeout {
            due: self.now.get() + f64::from(delay_ms),
            seq,
            task,
        });
    }

    fn request_frame(&self, task: Task) {
        self.frames.borrow_mut().push(task);
    }
}
