//! POSIX pseudo-terminal capture.
//!
//! ```text
//!  parent                         child (session leader)
//!  ──────                         ─────────────────────
//!  openpty() ─┬─ master ◀──────── stdout/stderr ─┐
//!             └─ slave ─────────▶ stdin/stdout/stderr
//!  drop slave                     setsid(), TIOCSCTTY
//!  poll(master, 100ms) ... EOF / EIO / child exited
//!  wait (bounded)
//! ```
//!
//! Once the parent has dropped every copy of the slave, a read on the master
//! returns `EIO` (Linux) or EOF (BSD) after the last child-side holder exits.

use std::fs::File;
use std::io::{self, Read};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::ptr;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use warden_application::{CaptureError, CaptureRequest, Capturer};
use warden_domain::{CaptureResult, EXIT_CAPTURE_FAILED, EXIT_TIMED_OUT};

/// Readiness wait per poll call
const POLL_INTERVAL_MS: libc::c_int = 100;

/// Sleep between `try_wait` calls in the final wait
const WAIT_INTERVAL: Duration = Duration::from_millis(10);

const READ_CHUNK: usize = 4096;

/// Runs commands attached to a fresh pseudo-terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct PtyCapturer;

impl PtyCapturer {
    pub fn new() -> Self {
        Self
    }
}

impl Capturer for PtyCapturer {
    fn try_capture(&self, request: &CaptureRequest) -> Result<CaptureResult, CaptureError> {
        let Some((program, args)) = request.command.split_first() else {
            return Err(CaptureError::EmptyCommand);
        };

        let (master, slave) = open_pty().map_err(CaptureError::PtyAllocation)?;
        set_window_size(&slave, request.rows, request.cols);

        let mut child = spawn_on_slave(program, args, slave)?;
        debug!("Spawned {:?} (pid {})", request.command, child.id());

        let deadline = Instant::now() + request.timeout;
        let mut master = File::from(master);
        let output = match read_until_closed(&mut master, &mut child, deadline) {
            Ok(ReadEnd::Closed(output)) => output,
            Ok(ReadEnd::Deadline(partial)) => {
                warn!(
                    "{:?} still running after {:?}, killing",
                    request.command, request.timeout
                );
                kill(&mut child);
                return Ok(CaptureResult::new(partial, EXIT_TIMED_OUT));
            }
            Err(e) => {
                kill(&mut child);
                return Err(CaptureError::Io(e));
            }
        };

        match wait_with_timeout(&mut child, request.timeout) {
            Ok(status) => Ok(CaptureResult::new(output, exit_code(status))),
            Err(e @ CaptureError::TimedOut(_)) => {
                warn!("{:?}: {}", request.command, e);
                kill(&mut child);
                Ok(CaptureResult::new(output, e.exit_code()))
            }
            Err(e) => Err(e),
        }
    }
}

fn open_pty() -> io::Result<(OwnedFd, OwnedFd)> {
    let mut master: libc::c_int = -1;
    let mut slave: libc::c_int = -1;

    // SAFETY: out-pointers are valid; name/termios/winsize may be null.
    let rc = unsafe {
        libc::openpty(
            &mut master,
            &mut slave,
            ptr::null_mut(),
            ptr::null_mut(),
            ptr::null_mut(),
        )
    };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }

    // SAFETY: openpty succeeded, both descriptors are open and owned by us.
    Ok(unsafe { (OwnedFd::from_raw_fd(master), OwnedFd::from_raw_fd(slave)) })
}

/// Failure leaves the default geometry in place.
fn set_window_size(slave: &OwnedFd, rows: u16, cols: u16) {
    let size = libc::winsize {
        ws_row: rows,
        ws_col: cols,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };

    // SAFETY: valid descriptor and a pointer to an initialised winsize.
    let rc = unsafe {
        libc::ioctl(
            slave.as_raw_fd(),
            libc::TIOCSWINSZ as _,
            &size as *const libc::winsize,
        )
    };
    if rc != 0 {
        warn!(
            "Could not set terminal size to {}x{}: {}",
            rows,
            cols,
            io::Error::last_os_error()
        );
    }
}

/// Spawn with the slave as stdin/stdout/stderr and controlling terminal.
/// Consumes the slave so no parent-side copy outlives the spawn.
fn spawn_on_slave(program: &str, args: &[String], slave: OwnedFd) -> Result<Child, CaptureError> {
    let stdio = |fd: &OwnedFd| -> Result<Stdio, CaptureError> {
        fd.try_clone()
            .map(Stdio::from)
            .map_err(CaptureError::PtyAllocation)
    };

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(stdio(&slave)?)
        .stdout(stdio(&slave)?)
        .stderr(Stdio::from(slave));

    // SAFETY: only async-signal-safe calls between fork and exec.
    unsafe {
        cmd.pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(io::Error::last_os_error());
            }
            if libc::ioctl(libc::STDIN_FILENO, libc::TIOCSCTTY as _, 0) == -1 {
                return Err(io::Error::last_os_error());
            }
            #[cfg(target_os = "linux")]
            libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGKILL);
            Ok(())
        });
    }

    let spawned = cmd.spawn().map_err(|source| CaptureError::Spawn {
        program: program.to_string(),
        source,
    });
    // Closes the parent's slave copies held by the Stdio handles.
    drop(cmd);
    spawned
}

enum ReadEnd {
    Closed(Vec<u8>),
    /// Output read before the deadline passed
    Deadline(Vec<u8>),
}

/// Collect output until the terminal closes or the child exits with
/// nothing left to read.
fn read_until_closed(
    master: &mut File,
    child: &mut Child,
    deadline: Instant,
) -> io::Result<ReadEnd> {
    let mut output = Vec::new();
    let mut buf = [0u8; READ_CHUNK];

    loop {
        if Instant::now() >= deadline {
            return Ok(ReadEnd::Deadline(output));
        }

        let mut pfd = libc::pollfd {
            fd: master.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        // SAFETY: one valid pollfd.
        let ready = unsafe { libc::poll(&mut pfd, 1, POLL_INTERVAL_MS) };

        if ready < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }

        if ready == 0 {
            if child.try_wait()?.is_some() {
                return Ok(ReadEnd::Closed(output));
            }
            continue;
        }

        match master.read(&mut buf) {
            Ok(0) => return Ok(ReadEnd::Closed(output)),
            Ok(n) => output.extend_from_slice(&buf[..n]),
            Err(e) if e.raw_os_error() == Some(libc::EIO) => return Ok(ReadEnd::Closed(output)),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
            Err(e) => return Err(e),
        }
    }
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<ExitStatus, CaptureError> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if start.elapsed() > timeout {
            return Err(CaptureError::TimedOut(timeout));
        }
        thread::sleep(WAIT_INTERVAL);
    }
}

/// Real exit code; signal deaths map to `128 + signo` like a shell does.
fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|signo| 128 + signo))
        .unwrap_or(EXIT_CAPTURE_FAILED)
}

fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("kill({}) failed: {}", child.id(), e);
    }
    let _ = child.wait();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FsToolStore;
    use std::sync::Arc;
    use tempfile::tempdir;
    use warden_application::{BaselineError, CaptureParams, GenerateBaselineUseCase};
    use warden_domain::{CommandSequence, Fingerprint};

    fn request(command: &[&str]) -> CaptureRequest {
        CaptureRequest::new(
            command.iter().map(|s| s.to_string()).collect(),
            24,
            80,
            Duration::from_secs(10),
        )
    }

    #[test]
    fn test_echo_output_and_exit_code() {
        let result = PtyCapturer::new()
            .try_capture(&request(&["echo", "-n", "hello"]))
            .unwrap();
        assert_eq!(result.exit_code, 0);
        assert!(String::from_utf8_lossy(&result.stdout).contains("hello"));
    }

    #[test]
    fn test_exit_code_is_propagated() {
        let result = PtyCapturer::new()
            .try_capture(&request(&["sh", "-c", "exit 7"]))
            .unwrap();
        assert_eq!(result.exit_code, 7);
    }

    #[test]
    fn test_signal_death_maps_to_128_plus_signo() {
        let result = PtyCapturer::new()
            .try_capture(&request(&["sh", "-c", "kill -9 $$"]))
            .unwrap();
        assert_eq!(result.exit_code, 128 + 9);
    }

    #[test]
    fn test_stderr_is_captured() {
        let result = PtyCapturer::new()
            .try_capture(&request(&["sh", "-c", "echo oops >&2"]))
            .unwrap();
        assert!(result.text_lossy().contains("oops"));
    }

    #[test]
    fn test_child_sees_terminal_size() {
        let result = PtyCapturer::new()
            .try_capture(&request(&["sh", "-c", "stty size"]))
            .unwrap();
        assert_eq!(result.text_lossy().trim(), "24 80");
    }

    #[test]
    fn test_child_sees_a_terminal() {
        let result = PtyCapturer::new()
            .try_capture(&request(&["sh", "-c", "test -t 1"]))
            .unwrap();
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let capture = || {
            PtyCapturer::new()
                .try_capture(&request(&["printf", "a\\nb\\n"]))
                .unwrap()
                .text_lossy()
        };
        assert_eq!(
            Fingerprint::of_baseline(&capture()),
            Fingerprint::of_baseline(&capture())
        );
        assert_eq!(capture(), "a\nb\n");
    }

    #[test]
    fn test_timeout_kills_child() {
        let mut req = request(&["sleep", "5"]);
        req.timeout = Duration::from_millis(300);
        let started = Instant::now();
        let result = PtyCapturer::new().try_capture(&req).unwrap();
        assert_eq!(result.exit_code, EXIT_TIMED_OUT);
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_empty_command_rejected() {
        let err = PtyCapturer::new().try_capture(&request(&[])).unwrap_err();
        assert!(matches!(err, CaptureError::EmptyCommand));
        assert_eq!(err.exit_code(), EXIT_CAPTURE_FAILED);
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let err = PtyCapturer::new()
            .try_capture(&request(&["definitely-not-a-real-tool-xyz"]))
            .unwrap_err();
        assert!(matches!(err, CaptureError::Spawn { .. }));
    }

    fn baseline_use_case(
        tool_dir: &std::path::Path,
    ) -> (
        GenerateBaselineUseCase<PtyCapturer, FsToolStore>,
        Arc<FsToolStore>,
    ) {
        let store = Arc::new(FsToolStore::new(tool_dir));
        let params = CaptureParams::default().with_timeout(Duration::from_secs(10));
        (
            GenerateBaselineUseCase::new(Arc::new(PtyCapturer::new()), Arc::clone(&store), params),
            store,
        )
    }

    #[test]
    fn test_baseline_of_missing_tool_fails() {
        let dir = tempdir().unwrap();
        let (uc, store) = baseline_use_case(dir.path());
        let sequence = CommandSequence::new(["definitely-not-a-real-tool-xyz"]).unwrap();

        let err = uc.generate_or_verify(&sequence, None).unwrap_err();

        assert!(matches!(err, BaselineError::CaptureFailed { exit_code: 127, .. }));
        assert!(!store.baseline_path(&sequence.tool_id()).exists());
        assert!(!store.definition_path(&sequence.tool_id()).exists());
    }

    #[test]
    fn test_baseline_of_failing_help_fails() {
        let dir = tempdir().unwrap();
        let (uc, store) = baseline_use_case(dir.path());
        let sequence = CommandSequence::new(["false"]).unwrap();

        let err = uc.generate_or_verify(&sequence, None).unwrap_err();

        assert!(matches!(err, BaselineError::CaptureFailed { exit_code: 1, .. }));
        assert!(!store.baseline_path("false").exists());
    }

    #[test]
    fn test_baseline_output_still_flows_through_the_pipe() {
        let dir = tempdir().unwrap();
        let (uc, store) = baseline_use_case(dir.path());
        let sequence = CommandSequence::new(["echo"]).unwrap();

        let report = uc.generate_or_verify(&sequence, None).unwrap();

        let text = std::fs::read_to_string(store.baseline_path("echo")).unwrap();
        assert_eq!(text, "--help\n");
        assert_eq!(report.fingerprint, Fingerprint::of_baseline("--help\n"));
    }
}
