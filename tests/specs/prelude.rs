//! Shared helpers for the simwardd specs.

use std::io::{BufRead, BufReader, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

pub use serde_json::json;

/// Longest the specs wait for an asynchronous condition
pub const SPEC_WAIT_MAX_MS: u64 = 5_000;

/// Poll `cond` until it holds or `max_ms` elapses
pub fn wait_for(max_ms: u64, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    cond()
}

/// A scratch deployment: a temp directory holding the daemon's config file
/// and the socket/log files derived from it.
pub struct Deployment {
    dir: tempfile::TempDir,
}

impl Deployment {
    pub fn with_config(config: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::write(dir.path().join("simward.toml"), config).expect("write config");
        Self { dir }
    }

    /// A deployment with one idle instance and a fast tick
    pub fn single_instance() -> Self {
        Self::with_config("interval = \"1s\"\nbind = \"127.0.0.1:0\"\n\n[instances.alpha]\n")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("simward.toml")
    }

    pub fn socket_path(&self) -> PathBuf {
        self.dir.path().join("simward.sock")
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.path().join("simward.log")
    }

    pub fn log_contents(&self) -> String {
        std::fs::read_to_string(self.log_path()).unwrap_or_default()
    }

    /// Spawn simwardd against this deployment and wait for its READY line
    pub fn spawn_daemon(&self) -> DaemonHandle {
        let mut child = Command::new(assert_cmd::cargo::cargo_bin("simwardd"))
            .arg(self.config_path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn simwardd");

        let stdout = child.stdout.take().expect("child stdout");
        let mut lines = BufReader::new(stdout).lines();
        match lines.next() {
            Some(Ok(line)) if line.trim() == "READY" => {}
            other => {
                let mut stderr = String::new();
                if let Some(mut pipe) = child.stderr.take() {
                    let _ = pipe.read_to_string(&mut stderr);
                }
                let _ = child.kill();
                panic!("daemon did not report READY: {other:?}; stderr: {stderr}");
            }
        }

        DaemonHandle { child }
    }
}

/// A running daemon process, killed on drop if a spec forgot to stop it
pub struct DaemonHandle {
    child: Child,
}

impl DaemonHandle {
    /// Ask the daemon to exit over the admin socket and wait for it
    pub fn shutdown(mut self, socket: &Path) -> ExitStatus {
        let response = request(socket, json!({"type": "shutdown"}));
        assert_eq!(response["type"], "shutting_down");
        self.child.wait().expect("wait for daemon exit")
    }
}

impl Drop for DaemonHandle {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Send one request over the admin socket and decode the response.
///
/// The wire format is a 4-byte big-endian length prefix followed by one
/// JSON document, one request per connection.
pub fn request(socket: &Path, body: serde_json::Value) -> serde_json::Value {
    let mut stream = UnixStream::connect(socket).expect("connect to admin socket");
    stream
        .set_read_timeout(Some(Duration::from_millis(SPEC_WAIT_MAX_MS)))
        .expect("set read timeout");

    let payload = serde_json::to_vec(&body).expect("encode request");
    let len = u32::try_from(payload.len()).expect("request fits in a frame");
    stream.write_all(&len.to_be_bytes()).expect("write length prefix");
    stream.write_all(&payload).expect("write payload");
    stream.flush().expect("flush request");

    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf).expect("read response length");
    let len = u32::from_be_bytes(len_buf) as usize;
    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).expect("read response payload");
    serde_json::from_slice(&payload).expect("decode response")
}
