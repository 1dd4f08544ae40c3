use std::time::Duration;

/// A blocking pause between console iterations.
///
/// The console throttles command dispatch and idle polling through this
/// trait so tests can run without wall-clock waits.
pub trait Pause {
    fn pause(&mut self, duration: Duration);
}

/// Sleeps the current thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleep;

impl Pause for ThreadSleep {
    fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Records requested pauses without waiting
#[derive(Debug, Default, Clone)]
pub struct RecordingPause {
    pub pauses: Vec<Duration>,
}

impl Pause for RecordingPause {
    fn pause(&mut self, duration: Duration) {
        self.pauses.push(duration);
    }
}
