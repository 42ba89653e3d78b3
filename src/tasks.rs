//! Background task plumbing shared by the view controllers.
//!
//! Each job runs on its own thread and reports exactly one message back over
//! the controller's channel. Messages carry the generation that was current
//! when the job was spawned so results for superseded requests can be dropped.
//! Dropping the runner drops the receiver; late results are then discarded.
//!
//! Fetch jobs only keep the view busy while their generation is current.
//! Jobs started with `spawn_persistent` keep it busy until they report back.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

/// Wakes the UI after a background result lands
pub type Repaint = Arc<dyn Fn() + Send + Sync>;

#[cfg(test)]
pub fn no_repaint() -> Repaint {
    Arc::new(|| {})
}

/// A job result tagged with the generation it was issued under
pub struct Tagged<T> {
    pub generation: u64,
    pub result: T,
    persistent: bool,
}

pub struct TaskRunner<T> {
    sender: Sender<Tagged<T>>,
    receiver: Receiver<Tagged<T>>,
    generation: u64,
    // Every job not yet received, whatever its generation
    in_flight: usize,
    // Generation-scoped jobs of the current generation
    current: usize,
    persistent: usize,
    repaint: Repaint,
}

impl<T: Send + 'static> TaskRunner<T> {
    pub fn new(repaint: Repaint) -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver,
            generation: 0,
            in_flight: 0,
            current: 0,
            persistent: 0,
            repaint,
        }
    }

    /// Start a new generation; results tagged with older ones become stale
    /// and stop counting as busy
    pub fn advance(&mut self) -> u64 {
        self.generation += 1;
        self.current = 0;
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Current-generation jobs or persistent jobs still running
    pub fn is_busy(&self) -> bool {
        self.current + self.persistent > 0
    }

    #[cfg(test)]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Run a job that belongs to the current generation
    pub fn spawn<F>(&mut self, job: F)
    where
        F: FnOnce() -> T + Send + 'static,
    {
        self.current += 1;
        self.start(job, false);
    }

    /// Run a job that counts as busy until it reports, even across generations
    pub fn spawn_persistent<F>(&mut self, job: F)
    where
        F: FnOnce() -> T + Send + 'static,
    {
        self.persistent += 1;
        self.start(job, true);
    }

    fn start<F>(&mut self, job: F, persistent: bool)
    where
        F: FnOnce() -> T + Send + 'static,
    {
        self.in_flight += 1;
        let generation = self.generation;
        let sender = self.sender.clone();
        let repaint = Arc::clone(&self.repaint);

        thread::spawn(move || {
            let result = job();
            // Receiver gone means the view was disposed
            if sender.send(Tagged { generation, result, persistent }).is_ok() {
                repaint();
            }
        });
    }

    fn finish(&mut self, tagged: &Tagged<T>) {
        self.in_flight -= 1;
        if tagged.persistent {
            self.persistent -= 1;
        } else if self.is_current(tagged.generation) {
            self.current -= 1;
        }
    }

    /// Next finished job, if any (non-blocking)
    pub fn try_next(&mut self) -> Option<Tagged<T>> {
        let tagged = self.receiver.try_recv().ok()?;
        self.finish(&tagged);
        Some(tagged)
    }

    #[cfg(test)]
    pub fn wait_next(&mut self, timeout: std::time::Duration) -> Option<Tagged<T>> {
        if self.in_flight == 0 {
            return None;
        }
        let tagged = self.receiver.recv_timeout(timeout).ok()?;
        self.finish(&tagged);
        Some(tagged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_results_are_tagged_with_spawn_generation() {
        let mut runner: TaskRunner<u32> = TaskRunner::new(no_repaint());
        runner.spawn(|| 1);
        runner.advance();
        runner.spawn(|| 2);
        assert_eq!(runner.in_flight(), 2);

        let mut seen = Vec::new();
        while let Some(tagged) = runner.wait_next(Duration::from_secs(5)) {
            seen.push((tagged.result, runner.is_current(tagged.generation)));
        }
        seen.sort();
        assert_eq!(seen, vec![(1, false), (2, true)]);
        assert_eq!(runner.in_flight(), 0);
    }

    #[test]
    fn test_superseded_jobs_stop_counting_as_busy() {
        let (release, gate) = std::sync::mpsc::channel::<()>();
        let mut runner: TaskRunner<u32> = TaskRunner::new(no_repaint());
        runner.spawn(move || {
            gate.recv_timeout(Duration::from_secs(5)).ok();
            1
        });
        assert!(runner.is_busy());

        runner.advance();
        assert!(!runner.is_busy());
        runner.spawn(|| 2);
        assert!(runner.is_busy());

        let fresh = runner.wait_next(Duration::from_secs(5)).unwrap();
        assert_eq!(fresh.result, 2);
        assert!(!runner.is_busy());
        assert_eq!(runner.in_flight(), 1);

        release.send(()).unwrap();
        let stale = runner.wait_next(Duration::from_secs(5)).unwrap();
        assert!(!runner.is_current(stale.generation));
        assert!(!runner.is_busy());
        assert_eq!(runner.in_flight(), 0);
    }

    #[test]
    fn test_persistent_jobs_survive_advance() {
        let (release, gate) = std::sync::mpsc::channel::<()>();
        let mut runner: TaskRunner<u32> = TaskRunner::new(no_repaint());
        runner.spawn_persistent(move || {
            gate.recv_timeout(Duration::from_secs(5)).ok();
            7
        });
        runner.advance();
        assert!(runner.is_busy());

        release.send(()).unwrap();
        assert_eq!(runner.wait_next(Duration::from_secs(5)).unwrap().result, 7);
        assert!(!runner.is_busy());
    }

    #[test]
    fn test_repaint_called_per_result() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let mut runner: TaskRunner<()> =
            TaskRunner::new(Arc::new(move || { counter.fetch_add(1, Ordering::SeqCst); }));
        runner.spawn(|| ());
        runner.spawn(|| ());
        while runner.wait_next(Duration::from_secs(5)).is_some() {}
        // Workers repaint right after sending
        for _ in 0..200 {
            if count.load(Ordering::SeqCst) == 2 {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_dropped_runner_discards_results() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let mut runner: TaskRunner<u32> =
            TaskRunner::new(Arc::new(move || { counter.fetch_add(1, Ordering::SeqCst); }));
        runner.spawn(|| {
            thread::sleep(Duration::from_millis(20));
            5
        });
        drop(runner);
        thread::sleep(Duration::from_millis(100));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
