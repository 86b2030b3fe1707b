//! Output channel for replies

use crate::error::Result;
use async_trait::async_trait;

/// Receives the text of one reply, then a finalize signal
#[async_trait]
pub trait OutputSink: Send {
    /// Deliver a chunk of reply text
    async fn send_text(&mut self, text: &str) -> Result<()>;

    /// Mark the reply complete
    async fn finalize(&mut self) -> Result<()>;
}

/// Sink that keeps the reply in memory
#[derive(Debug, Default)]
pub struct BufferSink {
    text: String,
    finalized: bool,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

#[async_trait]
impl OutputSink for BufferSink {
    async fn send_text(&mut self, text: &str) -> Result<()> {
        self.text.push_str(text);
        Ok(())
    }

    async fn finalize(&mut self) -> Result<()> {
        self.finalized = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_buffer_sink_collects_chunks() {
        let mut sink = BufferSink::new();
        sink.send_text("Found ").await.unwrap();
        sink.send_text("3 RFPs").await.unwrap();
        assert!(!sink.is_finalized());
        sink.finalize().await.unwrap();
        assert!(sink.is_finalized());
        assert_eq!(sink.into_text(), "Found 3 RFPs");
    }
}
