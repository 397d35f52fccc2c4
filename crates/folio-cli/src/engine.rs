//! Document engine backed by an external helper process.
//!
//! The helper is invoked as `PROGRAM ARGS... info PATH` and
//! `PROGRAM ARGS... merge JSON_PATHS OUTPUT`. `info` prints one JSON object;
//! `merge` prints JSON lines while it works and exits with status 0 once the
//! output has been written.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use folio_core::{DocumentEngine, EngineError, ProgressSender};
use folio_model::{ByteSize, DocumentInfo, PreviewImage};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::settings::EngineSettings;

/// Reply to an `info` request.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InfoReply {
    Failed { error: String },
    Info { pages: u32, preview: String },
}

/// One line of `merge` output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MergeLine {
    Progress {
        value: f64,
    },
    Success {
        #[serde(default)]
        path: Option<PathBuf>,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone)]
pub struct HelperEngine {
    program: String,
    args: Vec<String>,
}

impl HelperEngine {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            program: settings.program.clone(),
            args: settings.args.clone(),
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).kill_on_drop(true);
        command
    }

    fn spawn_error(&self, err: io::Error) -> EngineError {
        if err.kind() == io::ErrorKind::NotFound {
            EngineError::Unavailable(format!("{} not found", self.program))
        } else {
            EngineError::Unavailable(format!("{}: {err}", self.program))
        }
    }
}

#[async_trait]
impl DocumentEngine for HelperEngine {
    async fn fetch_metadata(&self, source: &Path) -> Result<DocumentInfo, EngineError> {
        let output = self
            .command()
            .arg("info")
            .arg(source)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|err| self.spawn_error(err))?;
        if !output.status.success() {
            return Err(EngineError::Rejected(format!(
                "info exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let (page_count, preview) = parse_info(&String::from_utf8_lossy(&output.stdout))?;
        let byte_size = tokio::fs::metadata(source).await?.len();
        Ok(DocumentInfo {
            page_count,
            byte_size: ByteSize::new(byte_size),
            preview,
        })
    }

    async fn merge_documents(
        &self,
        ordered: &[PathBuf],
        output: &Path,
        progress: ProgressSender,
    ) -> Result<bool, EngineError> {
        let paths = serde_json::to_string(ordered)
            .map_err(|err| EngineError::Protocol(format!("cannot encode paths: {err}")))?;
        let mut child = self
            .command()
            .arg("merge")
            .arg(paths)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| self.spawn_error(err))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Protocol("helper stdout unavailable".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .map(|stderr| tokio::spawn(read_detail(stderr)));

        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            match parse_merge_line(&line) {
                Some(MergeLine::Progress { value }) => {
                    // The session may have stopped listening; the helper keeps going.
                    let _ = progress.send(value);
                }
                Some(MergeLine::Success { path }) => debug!(?path, "helper reported success"),
                Some(MergeLine::Error { message }) => warn!(%message, "helper reported an error"),
                None => debug!(%line, "ignoring helper output"),
            }
        }

        let status = child.wait().await?;
        if !status.success() {
            let detail = match stderr {
                Some(task) => task.await.unwrap_or_default(),
                None => String::new(),
            };
            warn!(%status, detail = detail.trim(), "helper merge failed");
        }
        Ok(status.success())
    }
}

/// Everything the helper wrote to `reader`, decoded lossily.
async fn read_detail<R: AsyncRead + Unpin>(mut reader: R) -> String {
    let mut bytes = Vec::new();
    if let Err(error) = reader.read_to_end(&mut bytes).await {
        debug!(%error, "cannot read helper stderr");
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Page count and preview from an `info` reply.
pub fn parse_info(stdout: &str) -> Result<(u32, PreviewImage), EngineError> {
    let reply: InfoReply = serde_json::from_str(stdout.trim())
        .map_err(|err| EngineError::Protocol(format!("unreadable info reply: {err}")))?;
    match reply {
        InfoReply::Failed { error } => Err(EngineError::Rejected(error)),
        InfoReply::Info { pages, preview } => {
            let preview = PreviewImage::from_base64(&preview)
                .map_err(|err| EngineError::Protocol(err.to_string()))?;
            Ok((pages, preview))
        }
    }
}

/// Parse one `merge` output line. Anything that is not a known message is
/// `None`.
pub fn parse_merge_line(line: &str) -> Option<MergeLine> {
    serde_json::from_str(line.trim()).ok()
}
