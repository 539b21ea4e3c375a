use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::browser::driver::{ActOptions, PageDriver};
use crate::error::ProbeError;

/// How to launch the Playwright bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_node")]
    pub node_binary: String,

    #[serde(default = "default_bridge")]
    pub bridge_script: String,

    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default = "default_width")]
    pub viewport_width: u32,

    #[serde(default = "default_height")]
    pub viewport_height: u32,

    /// Bound on page scripts and raw keyboard input, which Playwright leaves
    /// unbounded
    #[serde(default = "default_script_timeout")]
    pub script_timeout_ms: u64,

    /// Extra time the bridge gets to answer past a command's own timeout
    /// before the session is given up on
    #[serde(default = "default_reply_grace")]
    pub reply_grace_ms: u64,

    /// Bound on the browser launch and the ready signal
    #[serde(default = "default_launch_timeout")]
    pub launch_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            node_binary: default_node(),
            bridge_script: default_bridge(),
            headless: true,
            viewport_width: default_width(),
            viewport_height: default_height(),
            script_timeout_ms: default_script_timeout(),
            reply_grace_ms: default_reply_grace(),
            launch_timeout_ms: default_launch_timeout(),
        }
    }
}

fn default_node() -> String { "node".to_string() }
fn default_bridge() -> String { "node/playwright_bridge.js".to_string() }
fn default_true() -> bool { true }
fn default_width() -> u32 { 1280 }
fn default_height() -> u32 { 800 }
fn default_script_timeout() -> u64 { 10_000 }
fn default_reply_grace() -> u64 { 5_000 }
fn default_launch_timeout() -> u64 { 60_000 }

/// Request sent to the bridge over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum BrowserRequest<'a> {
    NewContext,
    CloseContext,
    Goto { url: &'a str, timeout_ms: u64 },
    WaitNetworkIdle { timeout_ms: u64 },
    WaitFunction { expression: &'a str, timeout_ms: u64 },
    Evaluate { script: &'a str, arg: Value, timeout_ms: u64 },
    AddStyle { css: &'a str },
    Pause { ms: u64 },
    Count { locator: &'a str },
    ScrollIntoView { locator: &'a str, timeout_ms: u64 },
    WaitVisible { locator: &'a str, timeout_ms: u64 },
    Fill { locator: &'a str, value: &'a str, force: bool, timeout_ms: u64 },
    Click { locator: &'a str, force: bool, timeout_ms: u64 },
    TypeKeys { text: &'a str, timeout_ms: u64 },
    SelectOption { locator: &'a str, value: &'a str, timeout_ms: u64 },
    SetChecked { locator: &'a str, checked: bool, timeout_ms: u64 },
    Hover { locator: &'a str, timeout_ms: u64 },
    Press { locator: &'a str, key: &'a str, timeout_ms: u64 },
    Clear { locator: &'a str, timeout_ms: u64 },
    Screenshot,
    CurrentUrl,
    Quit,
}

impl BrowserRequest<'_> {
    /// Command name as the bridge sees it, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            BrowserRequest::NewContext => "new_context",
            BrowserRequest::CloseContext => "close_context",
            BrowserRequest::Goto { .. } => "goto",
            BrowserRequest::WaitNetworkIdle { .. } => "wait_network_idle",
            BrowserRequest::WaitFunction { .. } => "wait_function",
            BrowserRequest::Evaluate { .. } => "evaluate",
            BrowserRequest::AddStyle { .. } => "add_style",
            BrowserRequest::Pause { .. } => "pause",
            BrowserRequest::Count { .. } => "count",
            BrowserRequest::ScrollIntoView { .. } => "scroll_into_view",
            BrowserRequest::WaitVisible { .. } => "wait_visible",
            BrowserRequest::Fill { .. } => "fill",
            BrowserRequest::Click { .. } => "click",
            BrowserRequest::TypeKeys { .. } => "type_keys",
            BrowserRequest::SelectOption { .. } => "select_option",
            BrowserRequest::SetChecked { .. } => "set_checked",
            BrowserRequest::Hover { .. } => "hover",
            BrowserRequest::Press { .. } => "press",
            BrowserRequest::Clear { .. } => "clear",
            BrowserRequest::Screenshot => "screenshot",
            BrowserRequest::CurrentUrl => "current_url",
            BrowserRequest::Quit => "quit",
        }
    }

    /// The command's own bound, if it carries one.
    pub fn timeout_ms(&self) -> Option<u64> {
        match self {
            BrowserRequest::Goto { timeout_ms, .. }
            | BrowserRequest::WaitNetworkIdle { timeout_ms }
            | BrowserRequest::WaitFunction { timeout_ms, .. }
            | BrowserRequest::Evaluate { timeout_ms, .. }
            | BrowserRequest::ScrollIntoView { timeout_ms, .. }
            | BrowserRequest::WaitVisible { timeout_ms, .. }
            | BrowserRequest::Fill { timeout_ms, .. }
            | BrowserRequest::Click { timeout_ms, .. }
            | BrowserRequest::TypeKeys { timeout_ms, .. }
            | BrowserRequest::SelectOption { timeout_ms, .. }
            | BrowserRequest::SetChecked { timeout_ms, .. }
            | BrowserRequest::Hover { timeout_ms, .. }
            | BrowserRequest::Press { timeout_ms, .. }
            | BrowserRequest::Clear { timeout_ms, .. } => Some(*timeout_ms),
            BrowserRequest::Pause { ms } => Some(*ms),
            _ => None,
        }
    }

    fn locator(&self) -> &str {
        match self {
            BrowserRequest::Count { locator }
            | BrowserRequest::ScrollIntoView { locator, .. }
            | BrowserRequest::WaitVisible { locator, .. }
            | BrowserRequest::Fill { locator, .. }
            | BrowserRequest::Click { locator, .. }
            | BrowserRequest::SelectOption { locator, .. }
            | BrowserRequest::SetChecked { locator, .. }
            | BrowserRequest::Hover { locator, .. }
            | BrowserRequest::Press { locator, .. }
            | BrowserRequest::Clear { locator, .. } => *locator,
            BrowserRequest::Goto { url, .. } => *url,
            _ => "page",
        }
    }
}

/// Response received from the bridge over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    /// Set when the failing Playwright call raised a TimeoutError
    #[serde(default)]
    pub timeout: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub ready: Option<bool>,
}

/// A persistent browser backed by the Playwright bridge.
///
/// Launches a long-lived Node.js process that keeps one Chromium instance
/// open. Browsing contexts come and go per test; the process lives until
/// `shutdown` (or drop). Commands are NDJSON over stdin, responses over stdout.
///
/// Every reply is awaited for at most the command's own timeout plus
/// `reply_grace_ms`. A bridge that misses that deadline is considered wedged:
/// later commands fail fast and shutdown kills the process.
pub struct BrowserSession {
    child: Child,
    stdin: ChildStdin,
    replies: Receiver<String>,
    script_timeout_ms: u64,
    reply_grace_ms: u64,
    wedged: bool,
    closed: bool,
}

impl BrowserSession {
    pub fn launch(config: &BrowserConfig) -> Result<Self, ProbeError> {
        let launch_opts = serde_json::json!({
            "headless": config.headless,
            "viewport": { "width": config.viewport_width, "height": config.viewport_height },
        });

        let mut child = Command::new(&config.node_binary)
            .arg(&config.bridge_script)
            .arg(launch_opts.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ProbeError::SubprocessSpawn {
                script: config.bridge_script.clone(),
                source: e,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            ProbeError::SessionIo("Failed to capture stdin of the bridge".into())
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            ProbeError::SessionIo("Failed to capture stdout of the bridge".into())
        })?;

        // Drain stderr so a chatty bridge never blocks on a full pipe
        if let Some(stderr) = child.stderr.take() {
            thread::spawn(move || {
                for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                    debug!(target: "bridge", "{}", line.trim_end());
                }
            });
        }

        // Replies are read on their own thread so every wait can be bounded
        let (tx, replies) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines().map_while(Result::ok) {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        let line = match replies.recv_timeout(Duration::from_millis(config.launch_timeout_ms)) {
            Ok(line) => line,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProbeError::SessionIo(format!("Failed to read ready signal: {}", e)));
            }
        };

        let response: BrowserResponse =
            serde_json::from_str(line.trim()).map_err(|e| ProbeError::JsonParse {
                context: "bridge ready signal".into(),
                source: e,
            })?;

        if !response.ok || response.ready != Some(true) {
            return Err(ProbeError::SessionProtocol {
                command: "launch".into(),
                error: response
                    .error
                    .unwrap_or_else(|| "Did not receive ready signal from the bridge".into()),
            });
        }

        info!(bridge = %config.bridge_script, headless = config.headless, "browser launched");

        Ok(BrowserSession {
            child,
            stdin,
            replies,
            script_timeout_ms: config.script_timeout_ms,
            reply_grace_ms: config.reply_grace_ms,
            wedged: false,
            closed: false,
        })
    }

    fn send(&mut self, request: &BrowserRequest<'_>) -> Result<BrowserResponse, ProbeError> {
        if self.wedged {
            return Err(ProbeError::SessionIo(format!(
                "bridge stopped answering; {} not sent",
                request.name()
            )));
        }

        let json = serde_json::to_string(request).map_err(|e| ProbeError::JsonSerialize {
            context: "BrowserRequest".into(),
            source: e,
        })?;

        writeln!(self.stdin, "{}", json).map_err(|e| {
            ProbeError::SessionIo(format!("Failed to write to bridge stdin: {}", e))
        })?;
        self.stdin
            .flush()
            .map_err(|e| ProbeError::SessionIo(format!("Failed to flush bridge stdin: {}", e)))?;

        let bound = request.timeout_ms().unwrap_or(self.script_timeout_ms) + self.reply_grace_ms;
        let line = match self.replies.recv_timeout(Duration::from_millis(bound)) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => {
                self.wedged = true;
                warn!(command = request.name(), bound_ms = bound, "bridge did not answer in time");
                return Err(ProbeError::ActionTimeout {
                    command: request.name().into(),
                    locator: request.locator().into(),
                    detail: format!("no reply from the bridge within {}ms", bound),
                });
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(ProbeError::SessionIo(
                    "Empty response from the bridge (process may have died)".into(),
                ));
            }
        };

        serde_json::from_str(line.trim()).map_err(|e| ProbeError::JsonParse {
            context: format!("bridge response to {}", request.name()),
            source: e,
        })
    }

    /// Send a request and turn ok=false into an error, keeping timeouts distinct.
    fn send_ok(&mut self, request: &BrowserRequest<'_>) -> Result<BrowserResponse, ProbeError> {
        let response = self.send(request)?;
        if response.ok {
            return Ok(response);
        }
        let error = response.error.unwrap_or_else(|| "Unknown error".into());
        if response.timeout {
            Err(ProbeError::ActionTimeout {
                command: request.name().into(),
                locator: request.locator().into(),
                detail: error,
            })
        } else {
            Err(ProbeError::SessionProtocol {
                command: request.name().into(),
                error,
            })
        }
    }

    fn data(&mut self, request: &BrowserRequest<'_>) -> Result<Value, ProbeError> {
        let response = self.send_ok(request)?;
        response.data.ok_or_else(|| ProbeError::SessionProtocol {
            command: request.name().into(),
            error: "No data in response".into(),
        })
    }
}

impl PageDriver for BrowserSession {
    fn new_context(&mut self) -> Result<(), ProbeError> {
        self.send_ok(&BrowserRequest::NewContext).map(drop)
    }

    fn close_context(&mut self) -> Result<(), ProbeError> {
        self.send_ok(&BrowserRequest::CloseContext).map(drop)
    }

    fn goto(&mut self, url: &str, timeout_ms: u64) -> Result<(), ProbeError> {
        self.send_ok(&BrowserRequest::Goto { url, timeout_ms })
            .map(drop)
            .map_err(|e| ProbeError::NavigationFailure {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    fn wait_for_network_idle(&mut self, timeout_ms: u64) -> Result<(), ProbeError> {
        self.send_ok(&BrowserRequest::WaitNetworkIdle { timeout_ms }).map(drop)
    }

    fn wait_for_function(&mut self, expression: &str, timeout_ms: u64) -> Result<(), ProbeError> {
        self.send_ok(&BrowserRequest::WaitFunction {
            expression,
            timeout_ms,
        })
        .map(drop)
    }

    fn evaluate(&mut self, script: &str, arg: Value) -> Result<Value, ProbeError> {
        let response = self.send_ok(&BrowserRequest::Evaluate {
            script,
            arg,
            timeout_ms: self.script_timeout_ms,
        })?;
        Ok(response.data.unwrap_or(Value::Null))
    }

    fn add_style(&mut self, css: &str) -> Result<(), ProbeError> {
        self.send_ok(&BrowserRequest::AddStyle { css }).map(drop)
    }

    fn pause(&mut self, ms: u64) -> Result<(), ProbeError> {
        self.send_ok(&BrowserRequest::Pause { ms }).map(drop)
    }

    fn count(&mut self, locator: &str) -> Result<usize, ProbeError> {
        let data = self.data(&BrowserRequest::Count { locator })?;
        Ok(data.as_u64().unwrap_or(0) as usize)
    }

    fn scroll_into_view(&mut self, locator: &str, timeout_ms: u64) -> Result<(), ProbeError> {
        self.send_ok(&BrowserRequest::ScrollIntoView {
            locator,
            timeout_ms,
        })
        .map(drop)
    }

    fn wait_visible(&mut self, locator: &str, timeout_ms: u64) -> Result<(), ProbeError> {
        self.send_ok(&BrowserRequest::WaitVisible {
            locator,
            timeout_ms,
        })
        .map(drop)
    }

    fn fill(&mut self, locator: &str, value: &str, opts: ActOptions) -> Result<(), ProbeError> {
        self.send_ok(&BrowserRequest::Fill {
            locator,
            value,
            force: opts.force,
            timeout_ms: opts.timeout_ms,
        })
        .map(drop)
    }

    fn click(&mut self, locator: &str, opts: ActOptions) -> Result<(), ProbeError> {
        self.send_ok(&BrowserRequest::Click {
            locator,
            force: opts.force,
            timeout_ms: opts.timeout_ms,
        })
        .map(drop)
    }

    fn type_keys(&mut self, text: &str) -> Result<(), ProbeError> {
        self.send_ok(&BrowserRequest::TypeKeys {
            text,
            timeout_ms: self.script_timeout_ms,
        })
        .map(drop)
    }

    fn select_option(&mut self, locator: &str, value: &str, timeout_ms: u64) -> Result<(), ProbeError> {
        self.send_ok(&BrowserRequest::SelectOption {
            locator,
            value,
            timeout_ms,
        })
        .map(drop)
    }

    fn set_checked(&mut self, locator: &str, checked: bool, timeout_ms: u64) -> Result<(), ProbeError> {
        self.send_ok(&BrowserRequest::SetChecked {
            locator,
            checked,
            timeout_ms,
        })
        .map(drop)
    }

    fn hover(&mut self, locator: &str, timeout_ms: u64) -> Result<(), ProbeError> {
        self.send_ok(&BrowserRequest::Hover {
            locator,
            timeout_ms,
        })
        .map(drop)
    }

    fn press(&mut self, locator: &str, key: &str, timeout_ms: u64) -> Result<(), ProbeError> {
        self.send_ok(&BrowserRequest::Press {
            locator,
            key,
            timeout_ms,
        })
        .map(drop)
    }

    fn clear(&mut self, locator: &str, timeout_ms: u64) -> Result<(), ProbeError> {
        self.send_ok(&BrowserRequest::Clear {
            locator,
            timeout_ms,
        })
        .map(drop)
    }

    fn screenshot(&mut self) -> Result<Vec<u8>, ProbeError> {
        let data = self.data(&BrowserRequest::Screenshot)?;
        let encoded = data.as_str().ok_or_else(|| ProbeError::SessionProtocol {
            command: "screenshot".into(),
            error: "Screenshot data is not a base64 string".into(),
        })?;
        STANDARD
            .decode(encoded)
            .map_err(|e| ProbeError::SessionProtocol {
                command: "screenshot".into(),
                error: format!("Invalid base64 screenshot: {}", e),
            })
    }

    fn current_url(&mut self) -> Result<String, ProbeError> {
        let data = self.data(&BrowserRequest::CurrentUrl)?;
        Ok(data.as_str().unwrap_or_default().to_string())
    }

    fn shutdown(&mut self) -> Result<(), ProbeError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if self.wedged {
            let _ = self.child.kill();
        } else {
            // Best-effort quit; the process may already be gone
            if self.send(&BrowserRequest::Quit).is_err() {
                let _ = self.child.kill();
            }
        }
        let _ = self.child.wait();
        info!("browser shut down");
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
