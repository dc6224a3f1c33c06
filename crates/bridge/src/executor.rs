//! Executor process management (spawn, collect, classify).

use std::collections::HashMap;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::envelope::{self, Invocation, ToolOutcome};
use crate::error::{Error, Result};

/// Default wall-clock limit for a single executor run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Maximum captured output size (1MB) per stream.
pub const MAX_OUTPUT_SIZE: usize = 1024 * 1024;

/// How to launch the external tool executor.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Program to run, e.g. `python3`.
    pub program: String,
    /// Arguments placed before the encoded invocation, e.g. the script path.
    pub args: Vec<String>,
    /// Extra environment for the child.
    pub env: HashMap<String, String>,
    /// Serial port override forwarded as `--port`.
    pub port: Option<String>,
    /// Baud rate override forwarded as `--baud`.
    pub baud: Option<String>,
    pub timeout: Duration,
}

impl ExecutorConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: HashMap::new(),
            port: None,
            baud: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Runs one short-lived executor process per tool call.
///
/// Holds configuration only; no process outlives the call that spawned it.
#[derive(Debug, Clone)]
pub struct Executor {
    config: ExecutorConfig,
}

impl Executor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Encode the call for this executor's configuration.
    pub fn encode(&self, name: &str, arguments: &Value) -> Invocation {
        Invocation::encode(name, arguments)
            .with_port(self.config.port.clone())
            .with_baud(self.config.baud.clone())
    }

    /// Run a tool and report its outcome. Never fails.
    pub async fn invoke(&self, name: &str, arguments: &Value) -> ToolOutcome {
        match self.run(name, arguments).await {
            Ok(stdout) => envelope::decode(&stdout),
            Err(e) => {
                warn!(tool = name, error = %e, "executor failed");
                ToolOutcome::Failure(e.to_string())
            }
        }
    }

    /// Spawn the executor and return its stdout if it exited successfully.
    async fn run(&self, name: &str, arguments: &Value) -> Result<String> {
        let invocation = self.encode(name, arguments);

        let mut cmd = Command::new(&self.config.program);
        cmd.args(&self.config.args)
            .args(invocation.to_args())
            .envs(&self.config.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn()?;
        debug!(tool = name, pid = ?child.id(), "executor spawned");

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let collected = async {
            let (stdout, stderr) = tokio::try_join!(read_capped(stdout), read_capped(stderr))?;
            let status = child.wait().await?;
            Ok::<_, Error>((status, stdout, stderr))
        };

        // Dropping the child on timeout kills it.
        let (status, stdout, stderr) = timeout(self.config.timeout, collected)
            .await
            .map_err(|_| Error::Timeout {
                tool: name.to_string(),
                timeout: self.config.timeout,
            })??;

        debug!(tool = name, %status, "executor exited");
        collect(status, stdout, stderr)
    }
}

/// One output stream, cut at [`MAX_OUTPUT_SIZE`].
struct Captured {
    bytes: Vec<u8>,
    /// Bytes read and discarded past the cap.
    dropped: u64,
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Read at most `MAX_OUTPUT_SIZE` bytes of `pipe`, then drain the rest so the
/// child never blocks on a full pipe.
async fn read_capped<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Captured> {
    let Some(mut pipe) = pipe else {
        return Ok(Captured {
            bytes: Vec::new(),
            dropped: 0,
        });
    };

    let mut bytes = Vec::new();
    (&mut pipe)
        .take(MAX_OUTPUT_SIZE as u64)
        .read_to_end(&mut bytes)
        .await?;
    let dropped = tokio::io::copy(&mut pipe, &mut tokio::io::sink()).await?;
    Ok(Captured { bytes, dropped })
}

fn collect(status: ExitStatus, stdout: Captured, stderr: Captured) -> Result<String> {
    if status.success() {
        // Stderr never decides a successful run.
        if stdout.dropped > 0 {
            return Err(Error::OutputTooLarge {
                size: stdout.bytes.len() + stdout.dropped as usize,
                max: MAX_OUTPUT_SIZE,
            });
        }
        return Ok(stdout.text());
    }

    let stderr = stderr.text();
    let stdout = stdout.text();
    let message = [stderr.trim(), stdout.trim()]
        .into_iter()
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("executor exited with {status}"));
    Err(Error::Exited(message))
}
