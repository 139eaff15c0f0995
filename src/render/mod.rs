//! Running the external renderer.
//!
//! A [`Renderer`] turns a [`RenderRequest`] into a [`RenderTask`]: the old
//! image is removed, the script is written, and the renderer runs on a worker
//! thread with the script path as its only argument. The UI polls the task and
//! gets back a typed [`RenderOutcome`].

mod request;

pub use request::{RenderRequest, Workspace};

use crate::error::{PlotboxError, Result};
use crate::task::{Poll, Task};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Shown when the renderer is not installed.
pub const INSTALL_HINT: &str = "Please install gnuplot:\n\
    sudo apt install gnuplot (Debian/Ubuntu)\n\
    sudo dnf install gnuplot (Fedora)\n\
    sudo pacman -S gnuplot (Arch)";

/// Default wait for the image to settle after the renderer exits.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(100);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How a render ended.
#[derive(Debug)]
pub enum RenderOutcome {
    /// The renderer exited zero and the image is on disk.
    Success {
        /// The rendered PNG.
        artifact: PathBuf,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },
    /// The renderer exited non-zero, almost always a bad expression.
    RenderFailure {
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },
    /// The renderer could not be started.
    LaunchFailure {
        /// Program that failed to start.
        renderer: String,
        /// Underlying error.
        error: io::Error,
    },
    /// The script could not be written to the scratch directory.
    ScriptWrite {
        /// Script that could not be written.
        path: PathBuf,
        /// Underlying error.
        error: io::Error,
    },
    /// The renderer exited zero but never produced the image.
    ArtifactMissing {
        /// Where the image was expected.
        path: PathBuf,
    },
    /// The task was cancelled before it finished.
    Cancelled,
}

impl RenderOutcome {
    /// Convert into the rendered path or an error. Cancellation maps to an
    /// interrupted IO error.
    pub fn into_result(self) -> Result<PathBuf> {
        match self {
            Self::Success { artifact, .. } => Ok(artifact),
            Self::RenderFailure { code, stderr } => Err(PlotboxError::RenderFailed { code, stderr }),
            Self::LaunchFailure { renderer, error } => Err(PlotboxError::launch(renderer, error)),
            Self::ScriptWrite { error, .. } => Err(PlotboxError::Io(error)),
            Self::ArtifactMissing { path } => Err(PlotboxError::artifact_missing(path)),
            Self::Cancelled => Err(PlotboxError::Io(io::Error::new(
                io::ErrorKind::Interrupted,
                "render cancelled",
            ))),
        }
    }
}

/// The external renderer.
#[derive(Debug, Clone)]
pub struct Renderer {
    program: String,
    settle: Duration,
}

impl Renderer {
    /// Renderer invoked as `program <script>`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            settle: DEFAULT_SETTLE,
        }
    }

    /// Set the maximum wait for the image after a successful exit.
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Renderer program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Check that the renderer is installed.
    pub fn probe(&self) -> Result<()> {
        let found = Command::new("which")
            .arg(&self.program)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false);

        if found {
            Ok(())
        } else {
            tracing::warn!("Renderer {} not found on PATH", self.program);
            Err(PlotboxError::RendererMissing {
                renderer: self.program.clone(),
            })
        }
    }

    /// Start rendering `request` in the background.
    pub fn start(&self, request: RenderRequest) -> RenderTask {
        let cancel = Arc::new(AtomicBool::new(false));
        let output = request.output_path.clone();
        if let Err(error) = prepare(&request) {
            tracing::error!("Error writing {}: {}", request.script_path.display(), error);
            return RenderTask {
                id: request.id,
                output,
                task: Task::ready(RenderOutcome::ScriptWrite {
                    path: request.script_path,
                    error,
                }),
                cancel,
            };
        }

        let task = match self.launch(&request) {
            Ok(child) => {
                let settle = self.settle;
                let cancel = Arc::clone(&cancel);
                let output = output.clone();
                Task::spawn(move || supervise(child, &output, settle, &cancel))
            },
            Err(error) => {
                tracing::error!("Error launching {}: {}", self.program, error);
                Task::ready(RenderOutcome::LaunchFailure {
                    renderer: self.program.clone(),
                    error,
                })
            },
        };

        RenderTask {
            id: request.id,
            output,
            task,
            cancel,
        }
    }

    /// Render `request` and block until it finishes.
    pub fn render_blocking(&self, request: RenderRequest) -> RenderOutcome {
        self.start(request)
            .wait()
            .unwrap_or(RenderOutcome::Cancelled)
    }

    fn launch(&self, request: &RenderRequest) -> io::Result<Child> {
        Command::new(&self.program)
            .arg(&request.script_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
    }
}

/// A render in flight.
#[derive(Debug)]
pub struct RenderTask {
    id: u64,
    output: PathBuf,
    task: Task<RenderOutcome>,
    cancel: Arc<AtomicBool>,
}

impl RenderTask {
    /// Request number this task renders.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Where the image will appear.
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Check for completion without blocking.
    pub fn poll(&self) -> Poll<RenderOutcome> {
        self.task.poll()
    }

    /// Block until the render finishes.
    pub fn wait(self) -> Option<RenderOutcome> {
        self.task.wait()
    }

    /// Kill the renderer. The task then finishes with [`RenderOutcome::Cancelled`].
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }
}

/// Remove any stale image and write the script.
fn prepare(request: &RenderRequest) -> io::Result<()> {
    remove_if_present(&request.output_path)?;
    fs::write(&request.script_path, &request.script)?;
    tracing::debug!("Render #{} script:\n{}", request.id, request.script);
    Ok(())
}

/// Best-effort removal of a file; absence is fine.
pub(crate) fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

fn supervise(mut child: Child, output: &Path, settle: Duration, cancel: &AtomicBool) -> RenderOutcome {
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let status = loop {
        if cancel.load(Ordering::SeqCst) {
            let _ = child.kill();
            let _ = child.wait();
            tracing::debug!("Render into {} cancelled", output.display());
            return RenderOutcome::Cancelled;
        }
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                tracing::error!("Error waiting for renderer: {}", e);
                return RenderOutcome::RenderFailure {
                    code: None,
                    stderr: e.to_string(),
                };
            },
        }
    };

    let stdout = stdout.map(join_output).unwrap_or_default();
    let stderr = stderr.map(join_output).unwrap_or_default();

    if !status.success() {
        tracing::warn!("Renderer exited with {}: {}", status, stderr.trim());
        return RenderOutcome::RenderFailure {
            code: status.code(),
            stderr,
        };
    }

    if wait_for_artifact(output, settle, cancel) {
        tracing::info!("Rendered {}", output.display());
        RenderOutcome::Success {
            artifact: output.to_path_buf(),
            stdout,
            stderr,
        }
    } else if cancel.load(Ordering::SeqCst) {
        RenderOutcome::Cancelled
    } else {
        tracing::warn!("Renderer succeeded but {} is missing", output.display());
        RenderOutcome::ArtifactMissing {
            path: output.to_path_buf(),
        }
    }
}

/// Poll until the file exists with a non-zero size that holds still across
/// two polls, or until `settle` runs out.
fn wait_for_artifact(path: &Path, settle: Duration, cancel: &AtomicBool) -> bool {
    let deadline = Instant::now() + settle;
    let mut last_len = None;

    loop {
        let len = fs::metadata(path).ok().map(|m| m.len()).filter(|&len| len > 0);
        if len.is_some() && len == last_len {
            return true;
        }
        if Instant::now() >= deadline || cancel.load(Ordering::SeqCst) {
            return len.is_some();
        }
        last_len = len;
        thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut text = String::new();
        let _ = pipe.read_to_string(&mut text);
        text
    })
}

fn join_output(handle: thread::JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}
