use crate::error::{BackendError, Result};
use input::event::{DeviceEvent, Event, EventTrait};
use input::{DeviceCapability, Libinput};
use log::debug;
use nix::unistd::{Group, User, geteuid};

const INPUT_GROUP: &str = "input";

/// Verify the effective user may read input devices: listed as a member of
/// the `input` group, or carrying it as the primary group.
pub fn require_input_group() -> Result<()> {
    let user = current_user()?;
    let group = Group::from_name(INPUT_GROUP)
        .map_err(|e| BackendError::System(format!("group lookup failed: {e}")))?
        .ok_or_else(|| {
            BackendError::System(format!(
                "the '{INPUT_GROUP}' group does not exist on this system"
            ))
        })?;

    if group.mem.iter().any(|member| *member == user.name) || user.gid == group.gid {
        debug!("user {} may access input devices", user.name);
        return Ok(());
    }

    print_remediation(&user.name);
    Err(BackendError::Permission { user: user.name })
}

fn current_user() -> Result<User> {
    User::from_uid(geteuid())
        .map_err(|e| BackendError::System(format!("user lookup failed: {e}")))?
        .ok_or_else(|| {
            BackendError::System("no password entry for the current user".to_string())
        })
}

fn print_remediation(user: &str) {
    eprintln!();
    eprintln!("TypeTrace needs permission to read input devices.");
    eprintln!("Grant it by adding your user to the '{INPUT_GROUP}' group:");
    eprintln!("    sudo usermod -a -G {INPUT_GROUP} {user}");
    eprintln!();
    eprintln!("Then log out and log back in for the new group to take effect.");
}

/// Confirm the context actually sees a keyboard after seat assignment.
/// Drains the initial DEVICE_ADDED burst libinput queues on startup.
pub fn require_accessible_devices(libinput: &mut Libinput) -> Result<()> {
    libinput
        .dispatch()
        .map_err(|e| BackendError::InputLayer(format!("dispatch failed: {e}")))?;

    let mut saw_device = false;
    let mut saw_keyboard = false;
    for event in libinput.by_ref() {
        if let Event::Device(DeviceEvent::Added(_)) = &event {
            saw_device = true;
            let device = event.device();
            if device.has_capability(DeviceCapability::Keyboard) {
                debug!("found keyboard device: {}", device.name());
                saw_keyboard = true;
            } else {
                debug!("found non-keyboard device: {}", device.name());
            }
        }
    }

    if !saw_device || !saw_keyboard {
        return Err(BackendError::NoDevices);
    }
    Ok(())
}
