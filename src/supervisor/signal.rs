//! Termination and liveness primitives.

use super::ProcessId;
use crate::error::{Error, Result};

/// Send a graceful termination request (SIGTERM) to `pid`.
#[cfg(unix)]
pub(crate) fn terminate(pid: ProcessId) -> Result<()> {
    use nix::sys::signal::{Signal, kill};

    kill(to_nix_pid(pid)?, Signal::SIGTERM).map_err(|e| Error::Signal {
        pid: pid.get(),
        reason: e.to_string(),
    })
}

/// Non-destructive existence check (signal 0).
#[cfg(unix)]
pub(crate) fn probe(pid: ProcessId) -> bool {
    match to_nix_pid(pid) {
        Ok(raw) => nix::sys::signal::kill(raw, None).is_ok(),
        Err(_) => false,
    }
}

#[cfg(unix)]
fn to_nix_pid(pid: ProcessId) -> Result<nix::unistd::Pid> {
    i32::try_from(pid.get())
        .map(nix::unistd::Pid::from_raw)
        .map_err(|_| Error::Signal {
            pid: pid.get(),
            reason: "PID out of range".to_string(),
        })
}

#[cfg(windows)]
pub(crate) fn terminate(pid: ProcessId) -> Result<()> {
    let output = std::process::Command::new("taskkill")
        .args(["/PID", &pid.to_string()])
        .output()
        .map_err(|e| Error::Signal {
            pid: pid.get(),
            reason: e.to_string(),
        })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(Error::Signal {
            pid: pid.get(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

// Without a portable signal 0, only a child handle can vouch for liveness.
#[cfg(windows)]
pub(crate) fn probe(_pid: ProcessId) -> bool {
    false
}
