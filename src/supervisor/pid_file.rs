use crate::error::{Error, Result};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// OS identity of a managed process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessId(u32);

impl ProcessId {
    /// Wrap a raw PID. Zero is rejected since signalling it would address
    /// the whole process group.
    pub fn new(raw: u32) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProcessId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| Error::Process(format!("Invalid PID '{}'", s.trim())))
    }
}

/// File whose entire contents are the decimal PID of the managed process.
#[derive(Debug, Clone)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Recorded PID, `None` if there is no record.
    ///
    /// A record that exists but does not hold a valid PID is an error.
    pub fn read(&self) -> Result<Option<ProcessId>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => content.parse().map(Some).map_err(|e| {
                Error::Process(format!("Unreadable PID file {}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn write(&self, pid: ProcessId) -> Result<()> {
        std::fs::write(&self.path, pid.to_string()).map_err(|e| {
            Error::Process(format!("Failed to write PID file {}: {}", self.path.display(), e))
        })
    }

    /// Delete the record. Removing a record that does not exist succeeds.
    pub fn remove(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_process_id() {
        assert_eq!("4242\n".parse::<ProcessId>().unwrap().get(), 4242);
        assert!("0".parse::<ProcessId>().is_err());
        assert!("-1".parse::<ProcessId>().is_err());
        assert!("nas-server".parse::<ProcessId>().is_err());
        assert!("".parse::<ProcessId>().is_err());
    }

    #[test]
    fn test_pid_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let record = PidFile::new(dir.path().join("server.pid"));

        assert!(record.read().unwrap().is_none());
        assert!(record.remove().is_ok());

        let pid = ProcessId::new(1234).unwrap();
        record.write(pid).unwrap();
        assert_eq!(std::fs::read_to_string(record.path()).unwrap(), "1234");
        assert_eq!(record.read().unwrap(), Some(pid));

        record.remove().unwrap();
        assert!(!record.exists());
    }

    #[test]
    fn test_garbled_pid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let record = PidFile::new(dir.path().join("server.pid"));
        std::fs::write(record.path(), "not a pid").unwrap();

        assert!(matches!(record.read(), Err(Error::Process(_))));
    }
}
