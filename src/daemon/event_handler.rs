use crate::daemon::buffer::CoalescingBuffer;
use crate::daemon::events::KeystrokeEvent;
use crate::daemon::input_interface::DeviceInterface;
use crate::daemon::permissions;
use crate::error::{BackendError, Result};
use crate::util::config::AppConfig;
use input::Libinput;
use input::event::keyboard::{KeyState, KeyboardEvent, KeyboardEventTrait};
use input::event::{DeviceEvent, Event, EventTrait};
use log::{debug, error, info};
use std::os::unix::io::AsRawFd;
use std::time::{Duration, Instant};

/// Sink for drained batches. The handler only logs whatever error the sink
/// returns; it never retries a batch.
pub type FlushCallback = Box<dyn FnMut(&[KeystrokeEvent]) -> anyhow::Result<()>>;

/// Owns the libinput context and the coalescing buffer; one [`tick`] is one
/// bounded iteration of the capture loop.
///
/// [`tick`]: EventHandler::tick
pub struct EventHandler {
    libinput: Libinput,
    buffer: CoalescingBuffer,
    poll_timeout: Duration,
    flush_callback: Option<FlushCallback>,
}

impl EventHandler {
    /// Bring up udev-backed libinput on the configured seat and verify the
    /// process can actually capture from a keyboard. Nothing escapes if any
    /// step refuses: the context drops with this function's error.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut libinput = Libinput::new_with_udev(DeviceInterface);
        libinput
            .udev_assign_seat(&config.seat)
            .map_err(|()| BackendError::SeatAssignment {
                seat: config.seat.clone(),
            })?;
        info!("libinput context ready on {}", config.seat);

        permissions::require_input_group()?;
        permissions::require_accessible_devices(&mut libinput)?;

        Ok(Self {
            libinput,
            buffer: CoalescingBuffer::new(
                config.buffer_size,
                Duration::from_secs(config.buffer_timeout_secs),
            ),
            poll_timeout: Duration::from_millis(config.poll_timeout_ms),
            flush_callback: None,
        })
    }

    /// Install the sink that receives each drained batch, replacing any
    /// previous one.
    pub fn set_flush_callback(&mut self, callback: FlushCallback) {
        self.flush_callback = Some(callback);
    }

    /// One loop iteration: wait (bounded by the poll timeout) for the
    /// libinput fd, drain the event queue, then evaluate the timed flush
    /// trigger. The time trigger runs on event-free ticks too, so a
    /// long-silent buffer still drains.
    pub fn tick(&mut self) -> Result<()> {
        if self.poll_ready()? {
            self.drain_events()?;
        }
        if self.buffer.window_expired(Instant::now()) {
            self.flush()?;
        }
        Ok(())
    }

    /// Hand all pending keystrokes to the flush callback. The buffer is
    /// cleared and the window restarted whether or not the callback fails;
    /// the error is logged and returned.
    pub fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let started = Instant::now();
        let batch = self.buffer.take();
        let Some(callback) = self.flush_callback.as_mut() else {
            debug!("no flush callback installed; dropping {} events", batch.len());
            return Ok(());
        };
        match callback(&batch) {
            Ok(()) => {
                debug!(
                    "flushed {} keystrokes in {:?}",
                    batch.len(),
                    started.elapsed()
                );
                Ok(())
            }
            Err(err) => {
                error!("dropped a batch of {} keystrokes: {err}", batch.len());
                Err(BackendError::Flush(err))
            }
        }
    }

    fn poll_ready(&self) -> Result<bool> {
        let mut fds = libc::pollfd {
            fd: self.libinput.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        let timeout = self.poll_timeout.as_millis() as libc::c_int;
        let rc = unsafe { libc::poll(&mut fds, 1, timeout) };
        if rc < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(BackendError::InputLayer(format!("poll failed: {err}")));
        }
        Ok(rc > 0 && (fds.revents & libc::POLLIN) != 0)
    }

    fn drain_events(&mut self) -> Result<()> {
        self.libinput
            .dispatch()
            .map_err(|e| BackendError::InputLayer(format!("dispatch failed: {e}")))?;

        while let Some(event) = self.libinput.next() {
            match &event {
                Event::Keyboard(KeyboardEvent::Key(key)) => {
                    if key.key_state() == KeyState::Pressed {
                        self.record_press(key.key())?;
                    }
                }
                Event::Device(DeviceEvent::Added(_)) => {
                    info!("input device added: {}", event.device().name());
                }
                Event::Device(DeviceEvent::Removed(_)) => {
                    info!("input device removed: {}", event.device().name());
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn record_press(&mut self, scan_code: u32) -> Result<()> {
        let keystroke = KeystrokeEvent::from_press(scan_code);
        debug!(
            "buffered {} ({}) at index {}",
            keystroke.key_name,
            keystroke.scan_code,
            self.buffer.len()
        );
        self.buffer.push(keystroke);
        if self.buffer.is_full() {
            self.flush()?;
        }
        Ok(())
    }
}
