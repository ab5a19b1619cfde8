use crate::daemon::events::KeystrokeEvent;
use std::mem;
use std::time::{Duration, Instant};

/// Batches keystrokes so the input path never waits on storage.
///
/// Two triggers drain it: filling to `size_limit`, or `timeout` elapsing
/// with anything pending. The owner checks [`CoalescingBuffer::is_full`]
/// after each push and [`CoalescingBuffer::window_expired`] once per loop
/// iteration, then calls [`CoalescingBuffer::take`] to drain.
#[derive(Debug)]
pub struct CoalescingBuffer {
    pending: Vec<KeystrokeEvent>,
    window_start: Instant,
    size_limit: usize,
    timeout: Duration,
}

impl CoalescingBuffer {
    pub fn new(size_limit: usize, timeout: Duration) -> Self {
        Self {
            pending: Vec::with_capacity(size_limit),
            window_start: Instant::now(),
            size_limit,
            timeout,
        }
    }

    pub fn push(&mut self, event: KeystrokeEvent) {
        self.pending.push(event);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// True once the buffer has filled to its size limit.
    pub fn is_full(&self) -> bool {
        self.pending.len() >= self.size_limit
    }

    /// True when the timed window has expired with events pending. An empty
    /// buffer never expires.
    pub fn window_expired(&self, now: Instant) -> bool {
        !self.pending.is_empty() && now.duration_since(self.window_start) >= self.timeout
    }

    /// Drain all pending events and start a fresh window.
    pub fn take(&mut self) -> Vec<KeystrokeEvent> {
        self.window_start = Instant::now();
        mem::replace(&mut self.pending, Vec::with_capacity(self.size_limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(scan_code: u32) -> KeystrokeEvent {
        KeystrokeEvent {
            scan_code,
            key_name: "KEY_A".to_string(),
            date: "2024-01-01".to_string(),
        }
    }

    #[test]
    fn fills_exactly_at_the_size_limit() {
        let mut buffer = CoalescingBuffer::new(3, Duration::from_secs(100));
        buffer.push(press(30));
        buffer.push(press(31));
        assert!(!buffer.is_full());
        buffer.push(press(32));
        assert!(buffer.is_full());
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn empty_buffer_never_expires() {
        let buffer = CoalescingBuffer::new(3, Duration::ZERO);
        assert!(!buffer.window_expired(Instant::now()));
    }

    #[test]
    fn pending_events_expire_after_the_timeout() {
        let mut buffer = CoalescingBuffer::new(3, Duration::ZERO);
        buffer.push(press(30));
        assert!(buffer.window_expired(Instant::now()));
    }

    #[test]
    fn fresh_window_has_not_expired() {
        let mut buffer = CoalescingBuffer::new(3, Duration::from_secs(100));
        buffer.push(press(30));
        assert!(!buffer.window_expired(Instant::now()));
    }

    #[test]
    fn take_drains_in_arrival_order_and_restarts_the_window() {
        let mut buffer = CoalescingBuffer::new(2, Duration::ZERO);
        buffer.push(press(30));
        buffer.push(press(31));
        assert!(buffer.window_expired(Instant::now()));

        let batch = buffer.take();
        assert_eq!(
            batch.iter().map(|e| e.scan_code).collect::<Vec<_>>(),
            vec![30, 31]
        );
        assert!(buffer.is_empty());
        assert!(!buffer.window_expired(Instant::now()));
    }
}
