use std::sync::Arc;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::{mpsc, Mutex};

use crate::error::RunnerError;
use crate::util::OutputSink;

/// A destination file, shareable between the stdout and stderr pumps when
/// both specs resolve to the same path.
pub type SharedFile = Arc<Mutex<File>>;

/// Handle on one of the parent process's own output streams.
pub enum ParentStream {
    Stdout(tokio::io::Stdout),
    Stderr(tokio::io::Stderr),
}

impl ParentStream {
    pub fn stdout() -> Self {
        Self::Stdout(tokio::io::stdout())
    }

    pub fn stderr() -> Self {
        Self::Stderr(tokio::io::stderr())
    }

    async fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.write_all(buf).await,
            Self::Stderr(w) => w.write_all(buf).await,
        }
    }

    async fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush().await,
            Self::Stderr(w) => w.flush().await,
        }
    }
}

/// Composed writer for one plumbed stream: any combination of an in-memory
/// capture sink, a (possibly shared) destination file, a parent-stream alias
/// destination, and a tee copy to the stream's own parent stream.
#[derive(Default)]
pub struct StreamWriter {
    pub capture: Option<Arc<OutputSink>>,
    pub file: Option<SharedFile>,
    pub parent: Option<ParentStream>,
    pub tee: Option<ParentStream>,
}

impl StreamWriter {
    async fn write_all(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        if let Some(sink) = &self.capture {
            sink.push(chunk);
        }
        if let Some(file) = &self.file {
            file.lock().await.write_all(chunk).await?;
        }
        if let Some(parent) = &mut self.parent {
            parent.write_all(chunk).await?;
        }
        if let Some(tee) = &mut self.tee {
            tee.write_all(chunk).await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> std::io::Result<()> {
        if let Some(file) = &self.file {
            file.lock().await.flush().await?;
        }
        if let Some(parent) = &mut self.parent {
            parent.flush().await?;
        }
        if let Some(tee) = &mut self.tee {
            tee.flush().await?;
        }
        Ok(())
    }
}

/// Copy a child output pipe into its composed writer, reporting the byte
/// count (or the first I/O error) on `done_tx` at EOF.
pub fn pump<R>(
    mut rd: R,
    mut wr: StreamWriter,
    label: &'static str,
    done_tx: mpsc::Sender<Result<u64, RunnerError>>,
) where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let result: Result<u64, RunnerError> = async {
            let mut buf = vec![0u8; 16 * 1024];
            let mut total = 0u64;
            loop {
                let n = rd.read(&mut buf).await.map_err(|e| RunnerError::StreamIo {
                    stream: label,
                    source: e,
                })?;
                if n == 0 {
                    break;
                }
                wr.write_all(&buf[..n])
                    .await
                    .map_err(|e| RunnerError::StreamIo {
                        stream: label,
                        source: e,
                    })?;
                total += n as u64;
            }
            wr.flush().await.map_err(|e| RunnerError::StreamIo {
                stream: label,
                source: e,
            })?;
            Ok(total)
        }
        .await;
        let _ = done_tx.send(result).await;
    });
}
