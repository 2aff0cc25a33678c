//! Command runner backed by an interactive `russh` shell.
//!
//! ArubaOS-Switch only paginates and greets on an interactive terminal, so
//! each command gets its own PTY shell: wait for the prompt (answering the
//! "Press any key" greeting), send `no page`, send the command, and read until
//! the prompt comes back or the device closes the channel. Output is read in
//! `batch_size` chunks and capped at `max_output_bytes` per session.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use russh::Disconnect;
use russh::client::{self, Handle};
use russh::keys::{PrivateKeyWithHashAlg, PublicKey, load_secret_key};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::collector::traits::{CommandRunner, TransportError};
use crate::config::{Config, DeviceConfig};

const PTY_COLUMNS: u32 = 511;
const PTY_ROWS: u32 = 24;

/// Bytes at the end of the buffer inspected for a prompt.
const TAIL_WINDOW: usize = 256;

/// `sw1#`, `HP-2920-24G>`, `core(config)#`.
static PROMPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][\w./-]*(\([\w.-]+\))?[#>]$").expect("valid prompt pattern")
});

static PRESS_ANY_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)press any key to continue").expect("valid greeting pattern"));

/// VT100 control sequences the switch uses to draw its screen.
static ANSI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b(\[[0-9;?]*[A-Za-z]|[()][A-Za-z0-9]|[=>78DEM])").expect("valid escape pattern")
});

/// Runs commands on switches over SSH.
#[derive(Debug, Clone)]
pub struct SshRunner {
    timeout: Duration,
    batch_size: usize,
    max_output_bytes: usize,
}

impl SshRunner {
    pub fn new(config: &Config) -> Self {
        Self {
            timeout: config.timeout(),
            batch_size: config.batch_size.max(1),
            max_output_bytes: config.max_output_bytes,
        }
    }

    async fn run_session(
        &self,
        device: &DeviceConfig,
        command: &str,
    ) -> Result<String, TransportError> {
        let config = Arc::new(client::Config {
            inactivity_timeout: Some(self.timeout),
            ..Default::default()
        });
        let handler = SwitchHandler {
            host: device.host.clone(),
        };
        let mut session = client::connect(config, (device.host.as_str(), device.port), handler)
            .await
            .map_err(|source| TransportError::Connect {
                host: device.target(),
                source,
            })?;

        authenticate(&mut session, device).await?;

        let channel = session.channel_open_session().await?;
        channel
            .request_pty(false, "vt100", PTY_COLUMNS, PTY_ROWS, 0, 0, &[])
            .await?;
        channel.request_shell(false).await?;

        let output = ShellDialog::new(channel.into_stream(), self.batch_size, self.max_output_bytes)
            .run(command)
            .await;

        if let Err(e) = session
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
        {
            trace!(host = %device.host, error = %e, "disconnect failed");
        }
        output
    }
}

#[async_trait]
impl CommandRunner for SshRunner {
    async fn run(&self, device: &DeviceConfig, command: &str) -> Result<String, TransportError> {
        debug!(host = %device.host, port = device.port, command, "running command");
        tokio::time::timeout(self.timeout, self.run_session(device, command))
            .await
            .map_err(|_| TransportError::Timeout(self.timeout.as_secs()))?
    }
}

/// Client callbacks for one switch session.
struct SwitchHandler {
    host: String,
}

impl client::Handler for SwitchHandler {
    type Error = russh::Error;

    async fn check_server_key(&mut self, _key: &PublicKey) -> Result<bool, Self::Error> {
        // Switches regenerate host keys on reset; there is no known_hosts store.
        trace!(host = %self.host, "accepting host key");
        Ok(true)
    }
}

/// Tries the key file first, then the password.
async fn authenticate(
    session: &mut Handle<SwitchHandler>,
    device: &DeviceConfig,
) -> Result<(), TransportError> {
    let user = device.username.as_deref().unwrap_or_default();
    if device.key_file.is_none() && device.password.is_none() {
        return Err(TransportError::NoCredentials {
            host: device.target(),
            user: user.to_string(),
        });
    }

    if let Some(path) = &device.key_file {
        let key = load_secret_key(path, None).map_err(|source| TransportError::Key {
            path: path.clone(),
            source,
        })?;
        let hash = session.best_supported_rsa_hash().await?.flatten();
        let auth = session
            .authenticate_publickey(user, PrivateKeyWithHashAlg::new(Arc::new(key), hash))
            .await?;
        if auth.success() {
            return Ok(());
        }
        debug!(host = %device.host, user, "key rejected");
    }

    if let Some(password) = &device.password
        && session.authenticate_password(user, password).await?.success()
    {
        return Ok(());
    }

    Err(TransportError::AuthRejected {
        host: device.target(),
        user: user.to_string(),
    })
}

/// What the end of the session output currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tail {
    Prompt,
    PressAnyKey,
    Pending,
}

fn tail_state(buffer: &[u8]) -> Tail {
    let start = buffer.len().saturating_sub(TAIL_WINDOW);
    let tail = strip_ansi(&String::from_utf8_lossy(&buffer[start..]));
    if PRESS_ANY_KEY.is_match(&tail) {
        return Tail::PressAnyKey;
    }
    let last = tail.rsplit(['\n', '\r']).next().unwrap_or("").trim();
    if PROMPT.is_match(last) {
        Tail::Prompt
    } else {
        Tail::Pending
    }
}

fn strip_ansi(text: &str) -> String {
    ANSI.replace_all(text, "").into_owned()
}

/// Session text with control sequences and carriage returns removed.
fn clean(buffer: &[u8]) -> String {
    strip_ansi(&String::from_utf8_lossy(buffer)).replace('\r', "")
}

/// Drops the echoed command line, the trailing prompt and blank edges.
fn command_output(cleaned: &str, command: &str) -> String {
    let mut lines: Vec<&str> = cleaned.lines().collect();
    if lines.last().is_some_and(|l| PROMPT.is_match(l.trim())) {
        lines.pop();
    }
    if let Some(echo) = lines
        .iter()
        .take(3)
        .position(|l| l.trim_end().ends_with(command))
    {
        lines.drain(..=echo);
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Prompt-driven conversation over an interactive shell stream.
struct ShellDialog<S> {
    stream: S,
    chunk: Vec<u8>,
    buffer: Vec<u8>,
    received: usize,
    limit: usize,
    greeted: bool,
}

impl<S: AsyncRead + AsyncWrite + Unpin> ShellDialog<S> {
    fn new(stream: S, batch_size: usize, limit: usize) -> Self {
        Self {
            stream,
            chunk: vec![0u8; batch_size.max(1)],
            buffer: Vec::new(),
            received: 0,
            limit,
            greeted: false,
        }
    }

    async fn run(mut self, command: &str) -> Result<String, TransportError> {
        self.read_until_prompt().await?;
        self.send_line("no page").await?;
        self.read_until_prompt().await?;
        self.send_line(command).await?;
        let text = self.read_until_prompt().await?;
        trace!(bytes = self.received, "session output");
        Ok(command_output(&text, command))
    }

    async fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        self.stream.write_all(format!("{line}\n").as_bytes()).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Reads until the output ends in a prompt or the device closes the stream.
    async fn read_until_prompt(&mut self) -> Result<String, TransportError> {
        self.buffer.clear();
        loop {
            let n = self.stream.read(&mut self.chunk).await?;
            if n == 0 {
                trace!("stream closed before prompt");
                break;
            }
            self.received += n;
            if self.received > self.limit {
                return Err(TransportError::OutputTooLarge { limit: self.limit });
            }
            self.buffer.extend_from_slice(&self.chunk[..n]);

            match tail_state(&self.buffer) {
                Tail::Prompt => {
                    self.greeted = true;
                    break;
                }
                Tail::PressAnyKey if !self.greeted => {
                    trace!("answering greeting");
                    self.buffer.clear();
                    self.stream.write_all(b" ").await?;
                    self.stream.flush().await?;
                }
                _ => {}
            }
        }
        Ok(clean(&self.buffer))
    }
}
