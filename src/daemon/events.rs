use chrono::Local;
use serde::{Deserialize, Serialize};

/// Longest key name that gets persisted; longer kernel names are truncated.
pub const KEY_NAME_MAX: usize = 32;

/// Substitute for scan codes the kernel vocabulary has no name for.
pub const UNKNOWN_KEY_NAME: &str = "UNKNOWN";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One observed key press, canonicalized for aggregation.
///
/// The date is fixed at capture time in the local time zone; a press just
/// before midnight belongs to that day even if it is flushed after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystrokeEvent {
    pub scan_code: u32,
    pub key_name: String,
    /// Calendar date in `YYYY-MM-DD` form.
    pub date: String,
}

impl KeystrokeEvent {
    /// Build the event for a press observed right now.
    pub fn from_press(scan_code: u32) -> Self {
        Self {
            scan_code,
            key_name: key_name_for(scan_code),
            date: Local::now().format(DATE_FORMAT).to_string(),
        }
    }
}

/// Symbolic name for a kernel key code (`KEY_A`, `KEY_LEFTCTRL`, ...).
/// Codes outside the kernel vocabulary map to [`UNKNOWN_KEY_NAME`].
pub fn key_name_for(scan_code: u32) -> String {
    let name = u16::try_from(scan_code)
        .map(|code| format!("{:?}", evdev::Key::new(code)))
        .ok();
    match name {
        Some(name) if name.starts_with("KEY_") || name.starts_with("BTN_") => {
            truncate_name(name)
        }
        _ => UNKNOWN_KEY_NAME.to_string(),
    }
}

fn truncate_name(mut name: String) -> String {
    // Kernel key names are ASCII, so a byte truncation is a char truncation.
    if name.len() > KEY_NAME_MAX {
        name.truncate(KEY_NAME_MAX);
    }
    name
}
