//! Reply text streamed to stdout

use async_trait::async_trait;
use rfpscout_core::OutputSink;
use tokio::io::{AsyncWriteExt, Stdout};

pub struct StdoutSink {
    out: Stdout,
    wrote: bool,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self {
            out: tokio::io::stdout(),
            wrote: false,
        }
    }
}

#[async_trait]
impl OutputSink for StdoutSink {
    async fn send_text(&mut self, text: &str) -> rfpscout_core::Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await?;
        self.wrote = true;
        Ok(())
    }

    async fn finalize(&mut self) -> rfpscout_core::Result<()> {
        if self.wrote {
            self.out.write_all(b"\n").await?;
        }
        self.out.flush().await?;
        Ok(())
    }
}
