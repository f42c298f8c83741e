use std::io::{self, Read};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::output_lines;

const POLL_INTERVAL: Duration = Duration::from_millis(20);
/// How long readers get to reach end of file after a timed out child is
/// killed.
const KILL_GRACE: Duration = Duration::from_millis(100);

/// Output of a finished (or killed) child process.
#[derive(Debug)]
pub(crate) struct Captured {
    /// `None` when the process was killed after timing out.
    pub status: Option<ExitStatus>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: Option<Duration>,
}

impl Captured {
    pub fn success(&self) -> bool {
        self.status.is_some_and(|s| s.success())
    }

    /// Standard output lines, followed by diagnostics when the run failed.
    pub fn into_lines(self, program: &str) -> Vec<String> {
        let mut lines = output_lines(&self.stdout);
        if let Some(limit) = self.timed_out {
            lines.push(format!(
                "error: `{}` timed out after {}s",
                program,
                limit.as_secs_f32()
            ));
        } else if let Some(status) = self.status.filter(|s| !s.success()) {
            lines.extend(output_lines(&self.stderr));
            lines.push(format!("error: `{}` {}", program, status));
        }
        lines
    }
}

/// Run `cmd` to completion with piped output.
///
/// Pipes are drained on helper threads so a chatty child cannot block on a
/// full pipe. With a timeout the child is polled and killed once the limit
/// passes.
pub(crate) fn run_captured(cmd: &mut Command, timeout: Option<Duration>) -> io::Result<Captured> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn()?;
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let Some(limit) = timeout else {
        let status = child.wait()?;
        return Ok(Captured {
            status: Some(status),
            stdout: finish(stdout),
            stderr: finish(stderr),
            timed_out: None,
        });
    };

    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Captured {
                status: Some(status),
                stdout: finish(stdout),
                stderr: finish(stderr),
                timed_out: None,
            });
        }
        if start.elapsed() > limit {
            tracing::warn!(?limit, "killing timed out process");
            child.kill()?;
            child.wait()?;
            // Grandchildren may still hold the pipes open, so the readers
            // are only given a short grace period.
            let deadline = Instant::now() + KILL_GRACE;
            return Ok(Captured {
                status: None,
                stdout: collected(stdout, deadline),
                stderr: collected(stderr, deadline),
                timed_out: Some(limit),
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// A pipe being read to the end on a helper thread.
struct Drain {
    buf: Arc<Mutex<Vec<u8>>>,
    handle: JoinHandle<()>,
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Drain> {
    pipe.map(|mut pipe| {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buf);
        let handle = thread::spawn(move || {
            let mut chunk = [0u8; 4096];
            loop {
                match pipe.read(&mut chunk) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => sink
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .extend_from_slice(&chunk[..n]),
                }
            }
        });
        Drain { buf, handle }
    })
}

fn contents(buf: &Mutex<Vec<u8>>) -> String {
    let buf = buf.lock().unwrap_or_else(PoisonError::into_inner);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Everything the pipe produced, once its writer has closed it.
fn finish(drain: Option<Drain>) -> String {
    drain
        .map(|Drain { buf, handle }| {
            let _ = handle.join();
            contents(&buf)
        })
        .unwrap_or_default()
}

/// Whatever the pipe produced by `deadline`. A reader still blocked then is
/// left behind.
fn collected(drain: Option<Drain>, deadline: Instant) -> String {
    let Some(drain) = drain else {
        return String::new();
    };
    while !drain.handle.is_finished() && Instant::now() < deadline {
        thread::sleep(POLL_INTERVAL);
    }
    contents(&drain.buf)
}
