//! Test utilities for triton-stream integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use triton_stream::{ClientError, Transport};

/// Counters shared between a [`MockTransport`] and the test body.
#[derive(Debug, Clone, Default)]
pub struct TransportProbe {
    reads: Arc<AtomicUsize>,
    cancels: Arc<AtomicUsize>,
}

impl TransportProbe {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn cancels(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

/// A transport that returns pre-defined chunks.
///
/// Chunks are returned in order, then `Ok(None)` is returned to signal the
/// end of the body.
pub struct MockTransport {
    chunks: VecDeque<Result<String, ClientError>>,
    probe: TransportProbe,
}

impl MockTransport {
    pub fn new<I, S>(chunks: I) -> (Self, TransportProbe)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let probe = TransportProbe::default();
        let transport = Self {
            chunks: chunks.into_iter().map(|c| Ok(c.into())).collect(),
            probe: probe.clone(),
        };
        (transport, probe)
    }

    /// Append a read error after the scripted chunks.
    pub fn then_fail(mut self, error: ClientError) -> Self {
        self.chunks.push_back(Err(error));
        self
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn read_chunk(&mut self) -> Result<Option<String>, ClientError> {
        self.probe.reads.fetch_add(1, Ordering::SeqCst);
        match self.chunks.pop_front() {
            Some(Ok(chunk)) => Ok(Some(chunk)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    fn cancel(&mut self) {
        self.probe.cancels.fetch_add(1, Ordering::SeqCst);
        self.chunks.clear();
    }
}

/// A `data: ` line carrying one generation event, with its blank separator.
pub fn data_line(text_output: &str, sequence_end: bool) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({"text_output": text_output, "sequence_end": sequence_end})
    )
}
