//! JSON-line client for the Playwright bridge process
//!
//! The bridge is a child process that reads one request per stdin line and
//! writes one reply per stdout line. Replies may arrive out of order; they
//! are matched to callers by request id.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::error::{E2eError, E2eResult, RemoteErrorKind};

/// Bridge script shipped inside the crate
pub const BRIDGE_SCRIPT: &str = include_str!("bridge.js");

type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Reply>>>>;

#[derive(Debug, Serialize)]
struct Request<'a> {
    id: u64,
    op: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<&'a str>,
    params: &'a Value,
}

#[derive(Debug, Deserialize)]
struct RemoteError {
    kind: RemoteErrorKind,
    message: String,
}

#[derive(Debug, Deserialize)]
struct Reply {
    id: u64,
    ok: bool,
    #[serde(default)]
    result: Value,
    error: Option<RemoteError>,
}

impl Reply {
    fn into_result(self) -> E2eResult<Value> {
        if self.ok {
            return Ok(self.result);
        }
        match self.error {
            Some(error) => Err(E2eError::Remote {
                kind: error.kind,
                message: error.message,
            }),
            None => Err(E2eError::Protocol(format!("reply {} failed without an error", self.id))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Greeting {
    ready: bool,
}

/// A running bridge process
pub struct Bridge {
    child: tokio::sync::Mutex<Child>,
    stdin: tokio::sync::Mutex<Option<ChildStdin>>,
    pending: Pending,
    next_id: AtomicU64,
    reader: JoinHandle<()>,
    _workdir: Option<TempDir>,
}

impl Bridge {
    /// Spawn `command` and wait up to `startup` for its ready line
    pub async fn spawn(mut command: Command, startup: Duration) -> E2eResult<Self> {
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                E2eError::NodeNotFound
            } else {
                E2eError::BridgeStartup(e.to_string())
            }
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::BridgeStartup("stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::BridgeStartup("stdout not captured".to_string()))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!("bridge stderr: {}", line);
                }
            });
        }

        let mut lines = BufReader::new(stdout).lines();
        let greeting = match tokio::time::timeout(startup, lines.next_line()).await {
            Ok(Ok(Some(line))) => line,
            Ok(Ok(None)) => {
                let status = child.wait().await?;
                return Err(E2eError::BridgeStartup(format!("exited during startup ({})", status)));
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                return Err(E2eError::BridgeStartup(format!(
                    "no ready line within {}ms",
                    startup.as_millis()
                )))
            }
        };
        trace!("bridge greeting: {}", greeting);
        let greeting: Greeting = serde_json::from_str(&greeting)
            .map_err(|e| E2eError::BridgeStartup(format!("invalid greeting: {}", e)))?;
        if !greeting.ready {
            return Err(E2eError::BridgeStartup("bridge reported not ready".to_string()));
        }

        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        let reader = tokio::spawn(dispatch(lines, pending.clone()));
        debug!("Playwright bridge started (pid {:?})", child.id());

        Ok(Self {
            child: tokio::sync::Mutex::new(child),
            stdin: tokio::sync::Mutex::new(Some(stdin)),
            pending,
            next_id: AtomicU64::new(1),
            reader,
            _workdir: None,
        })
    }

    /// Keep `dir` alive for as long as the bridge runs
    pub fn retain(mut self, dir: TempDir) -> Self {
        self._workdir = Some(dir);
        self
    }

    /// Send one request and wait up to `deadline` for its reply
    pub async fn request(&self, target: Option<&str>, op: &str, params: Value, deadline: Duration) -> E2eResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let line = serde_json::to_string(&Request {
            id,
            op,
            target,
            params: &params,
        })?;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);
        trace!("bridge -> {}", line);

        if let Err(e) = self.write_line(&line).await {
            self.pending.lock().remove(&id);
            return Err(e);
        }

        match tokio::time::timeout(deadline, rx).await {
            Ok(Ok(reply)) => reply.into_result(),
            Ok(Err(_)) => Err(E2eError::BridgeClosed),
            Err(_) => {
                self.pending.lock().remove(&id);
                warn!("Bridge gave no reply to {} #{} within {}ms", op, id, deadline.as_millis());
                Err(E2eError::Timeout {
                    op: op.to_string(),
                    after: deadline,
                })
            }
        }
    }

    async fn write_line(&self, line: &str) -> E2eResult<()> {
        let mut guard = self.stdin.lock().await;
        let stdin = guard.as_mut().ok_or(E2eError::BridgeClosed)?;
        stdin.write_all(line.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        Ok(())
    }

    /// Close stdin and wait for the process to exit, killing it after `grace`
    pub async fn shutdown(&self, grace: Duration) -> E2eResult<()> {
        if let Some(mut stdin) = self.stdin.lock().await.take() {
            stdin.shutdown().await.ok();
        }
        let mut child = self.child.lock().await;
        match tokio::time::timeout(grace, child.wait()).await {
            Ok(status) => {
                debug!("Playwright bridge exited ({})", status?);
            }
            Err(_) => {
                warn!("Playwright bridge did not exit within {}ms; killing it", grace.as_millis());
                child.kill().await?;
            }
        }
        self.reader.abort();
        Ok(())
    }
}

/// Route replies to their waiting callers until the bridge closes stdout
async fn dispatch(mut lines: Lines<BufReader<ChildStdout>>, pending: Pending) {
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                trace!("bridge <- {}", line);
                match serde_json::from_str::<Reply>(&line) {
                    Ok(reply) => {
                        let waiter = pending.lock().remove(&reply.id);
                        match waiter {
                            Some(tx) => {
                                tx.send(reply).ok();
                            }
                            None => debug!("Dropping reply to abandoned request #{}", reply.id),
                        }
                    }
                    Err(e) => warn!("Unparseable bridge output {:?}: {}", line, e),
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Reading from bridge failed: {}", e);
                break;
            }
        }
    }
    // dropping the senders wakes every waiter with BridgeClosed
    pending.lock().clear();
}
