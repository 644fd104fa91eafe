//! ALSA warning suppression for Linux.
//!
//! The ALSA userspace library prints harmless configuration warnings straight
//! to stderr when devices are enumerated or opened. They would corrupt the
//! TUI, so device access runs with stderr pointed at /dev/null.

use anyhow::Result;

/// Runs `f` with stderr silenced on Linux; a plain call elsewhere.
#[cfg(target_os = "linux")]
pub fn with_silenced_stderr<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let _guard = StderrSilencer::new()?;
    f()
}

/// On non-Linux platforms ALSA doesn't exist, so there is nothing to silence.
#[cfg(not(target_os = "linux"))]
pub fn with_silenced_stderr<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}

/// Redirects stderr to /dev/null for its lifetime, restoring it on drop.
#[cfg(target_os = "linux")]
struct StderrSilencer {
    saved_fd: i32,
}

#[cfg(target_os = "linux")]
impl StderrSilencer {
    fn new() -> Result<Self> {
        use anyhow::anyhow;
        use std::os::unix::io::AsRawFd;

        let dev_null = std::fs::OpenOptions::new()
            .write(true)
            .open("/dev/null")
            .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

        let saved_fd = unsafe { libc::dup(libc::STDERR_FILENO) };
        if saved_fd == -1 {
            return Err(anyhow!("Failed to duplicate stderr"));
        }

        if unsafe { libc::dup2(dev_null.as_raw_fd(), libc::STDERR_FILENO) } == -1 {
            unsafe { libc::close(saved_fd) };
            return Err(anyhow!("Failed to redirect stderr"));
        }

        Ok(Self { saved_fd })
    }
}

#[cfg(target_os = "linux")]
impl Drop for StderrSilencer {
    fn drop(&mut self) {
        unsafe {
            libc::dup2(self.saved_fd, libc::STDERR_FILENO);
            libc::close(self.saved_fd);
        }
    }
}
