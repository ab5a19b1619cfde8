use input::LibinputInterface;
use log::{debug, warn};
use std::fs::{File, OpenOptions};
use std::os::fd::OwnedFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

/// Device open/close hooks handed to libinput.
///
/// Libinput never touches device nodes itself; it asks these callbacks for
/// file descriptors and hands them back when a device goes away.
pub struct DeviceInterface;

impl LibinputInterface for DeviceInterface {
    fn open_restricted(&mut self, path: &Path, flags: i32) -> Result<OwnedFd, i32> {
        let accmode = flags & libc::O_ACCMODE;
        OpenOptions::new()
            .custom_flags(flags)
            .read(accmode == libc::O_RDONLY || accmode == libc::O_RDWR)
            .write(accmode == libc::O_WRONLY || accmode == libc::O_RDWR)
            .open(path)
            .map(|file| {
                debug!("opened device {}", path.display());
                file.into()
            })
            .map_err(|err| {
                warn!("failed to open {} (flags {flags:#x}): {err}", path.display());
                -err.raw_os_error().unwrap_or(libc::EINVAL)
            })
    }

    fn close_restricted(&mut self, fd: OwnedFd) {
        // Errors on close are deliberately ignored; the fd is gone either way.
        drop(File::from(fd));
    }
}
