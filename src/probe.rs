use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;
use serde::{Serialize, Serializer};

/// Default bound for external command execution.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Outcome of probing one raw data source.
///
/// `Present` carries the value; the other tags serialize as the sentinel
/// strings that end up in domain records, so a report stays structurally
/// valid no matter which sources were reachable. Collectors branch on the
/// tag instead of matching sentinel text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    Present(T),
    Unavailable,
    PermissionDenied,
    TimedOut,
}

impl<T> Probe<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Probe::Present(_))
    }

    pub fn present(self) -> Option<T> {
        match self {
            Probe::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Probe<U> {
        match self {
            Probe::Present(value) => Probe::Present(f(value)),
            Probe::Unavailable => Probe::Unavailable,
            Probe::PermissionDenied => Probe::PermissionDenied,
            Probe::TimedOut => Probe::TimedOut,
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Probe<U>) -> Probe<U> {
        match self {
            Probe::Present(value) => f(value),
            Probe::Unavailable => Probe::Unavailable,
            Probe::PermissionDenied => Probe::PermissionDenied,
            Probe::TimedOut => Probe::TimedOut,
        }
    }
}

impl<T> From<Option<T>> for Probe<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Probe::Present(value),
            None => Probe::Unavailable,
        }
    }
}

impl<T: Serialize> Serialize for Probe<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Probe::Present(value) => value.serialize(serializer),
            Probe::Unavailable => serializer.serialize_str("Unavailable"),
            Probe::PermissionDenied => serializer.serialize_str("Permission denied"),
            Probe::TimedOut => serializer.serialize_str("Timed out"),
        }
    }
}

pub(crate) fn classify_read_error<T>(err: &io::Error) -> Probe<T> {
    if err.kind() == io::ErrorKind::PermissionDenied {
        Probe::PermissionDenied
    } else {
        Probe::Unavailable
    }
}

/// Read a file and strip surrounding whitespace.
pub fn read_file<P: AsRef<Path>>(path: P) -> Probe<String> {
    match fs::read_to_string(&path) {
        Ok(text) => Probe::Present(text.trim().to_string()),
        Err(err) => {
            debug!("read {} failed: {}", path.as_ref().display(), err);
            classify_read_error(&err)
        }
    }
}

/// Run an external command bounded by the default timeout.
pub fn run_command(program: &str, args: &[&str]) -> Probe<String> {
    run_command_with_timeout(program, args, DEFAULT_TIMEOUT)
}

/// Run an external command, killing it once `timeout` elapses.
///
/// Stdout is drained on a helper thread so a chatty child cannot deadlock
/// on a full pipe; the thread is joined before returning. Output of a
/// successful command is returned verbatim, trailing newlines included.
pub fn run_command_with_timeout(program: &str, args: &[&str], timeout: Duration) -> Probe<String> {
    let mut child = match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(err) => {
            debug!("spawn {} failed: {}", program, err);
            return Probe::Unavailable;
        }
    };

    let stdout = child.stdout.take();
    let reader = thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout {
            let _ = out.read_to_end(&mut buf);
        }
        buf
    });

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let buf = reader.join().unwrap_or_default();
                if status.success() {
                    return Probe::Present(String::from_utf8_lossy(&buf).into_owned());
                }
                debug!("{} exited with {}", program, status);
                return Probe::Unavailable;
            }
            Ok(None) => {
                if Instant::now() >= deadline {
                    debug!("{} timed out after {:?}", program, timeout);
                    let _ = child.kill();
                    let _ = child.wait();
                    let _ = reader.join();
                    return Probe::TimedOut;
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(err) => {
                debug!("wait on {} failed: {}", program, err);
                let _ = child.kill();
                let _ = child.wait();
                let _ = reader.join();
                return Probe::Unavailable;
            }
        }
    }
}

/// Check whether `name` resolves to a file in one of the PATH entries.
pub fn has_executable(name: &str) -> bool {
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| dir.join(name).is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_serialization() {
        assert_eq!(serde_json::to_string(&Probe::Present(5)).unwrap(), "5");
        assert_eq!(
            serde_json::to_string(&Probe::<String>::Unavailable).unwrap(),
            "\"Unavailable\""
        );
        assert_eq!(
            serde_json::to_string(&Probe::<String>::PermissionDenied).unwrap(),
            "\"Permission denied\""
        );
        assert_eq!(
            serde_json::to_string(&Probe::<String>::TimedOut).unwrap(),
            "\"Timed out\""
        );
    }

    #[test]
    fn read_errors_keep_permission_denied_distinct() {
        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(classify_read_error::<String>(&denied), Probe::PermissionDenied);
        let missing = io::Error::from(io::ErrorKind::NotFound);
        assert_eq!(classify_read_error::<String>(&missing), Probe::Unavailable);
    }

    #[test]
    fn missing_file_is_unavailable() {
        assert_eq!(read_file("/nonexistent/sysprobe-test-file"), Probe::Unavailable);
    }

    #[cfg(unix)]
    #[test]
    fn command_output_is_verbatim() {
        assert_eq!(
            run_command("echo", &["hello"]),
            Probe::Present("hello\n".to_string())
        );
    }

    #[cfg(unix)]
    #[test]
    fn slow_command_times_out() {
        let result = run_command_with_timeout("sleep", &["5"], Duration::from_millis(100));
        assert_eq!(result, Probe::TimedOut);
    }

    #[test]
    fn unknown_command_is_unavailable() {
        assert_eq!(
            run_command("sysprobe-no-such-tool", &[]),
            Probe::<String>::Unavailable
        );
    }
}
