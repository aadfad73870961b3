//! The streaming converter: drives the TP parser and BP serializer over an
//! arbitrary async byte stream, tolerating and counting malformed frames.

use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use respb_core::Result;

use crate::comparator::{self, Measurement};
use crate::serializer;
use crate::stream_parser::StreamParser;

/// Default high-water mark for one read chunk: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Final counters emitted by one conversion run.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    pub frames_in: u64,
    pub frames_out: u64,
    pub malformed: u64,
    pub serialize_errors: u64,
    pub incomplete_at_eof: u64,
    pub tp_bytes: u64,
    pub bp_bytes: u64,
    pub elapsed: Duration,
}

/// Drives the conversion pipeline over `reader`/`writer`.
pub struct Converter {
    mux_id: u16,
    chunk_size: usize,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Converter {
    #[must_use]
    pub fn new(mux_id: u16) -> Self {
        Self {
            mux_id,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Convert TP bytes from `reader` into BP bytes written to `writer`.
    /// If `on_measurement` is provided it is invoked once per successfully
    /// converted frame with that frame's [`Measurement`].
    pub async fn convert<R, W>(
        &self,
        mut reader: R,
        mut writer: W,
        mut on_measurement: Option<&mut dyn FnMut(Measurement)>,
    ) -> Result<Tally>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let start = Instant::now();
        let mut tally = Tally::default();
        let mut parser = StreamParser::new();
        let mut chunk = vec![0u8; self.chunk_size];

        loop {
            let n = reader.read(&mut chunk).await?;
            let malformed_before = parser.malformed_count();
            if n > 0 {
                parser.feed(&chunk[..n]);
            } else {
                // EOF: any frame still sitting in the buffer is incomplete.
                if parser.has_pending_bytes() {
                    tally.incomplete_at_eof += 1;
                    debug!(
                        pending_bytes = parser.pending_byte_count(),
                        "incomplete frame at EOF"
                    );
                }
            }
            tally.malformed += (parser.malformed_count() - malformed_before) as u64;

            while let Some(record) = parser.next_frame() {
                tally.frames_in += 1;
                let tp_bytes = record.to_tp_bytes();
                match serializer::serialize(&record, self.mux_id) {
                    Ok(bp_bytes) => {
                        tally.tp_bytes += tp_bytes.len() as u64;
                        tally.bp_bytes += bp_bytes.len() as u64;
                        tally.frames_out += 1;
                        if let Some(cb) = on_measurement.as_deref_mut() {
                            cb(comparator::compare(record.verb(), &tp_bytes, &bp_bytes));
                        }
                        writer.write_all(&bp_bytes).await?;
                    }
                    Err(err) => {
                        tally.serialize_errors += 1;
                        warn!(verb = record.verb(), error = %err, "dropping frame: serialize failed");
                    }
                }
            }

            if n == 0 {
                break;
            }
        }

        writer.flush().await?;
        tally.elapsed = start.elapsed();
        info!(
            frames_in = tally.frames_in,
            frames_out = tally.frames_out,
            malformed = tally.malformed,
            tp_bytes = tally.tp_bytes,
            bp_bytes = tally.bp_bytes,
            elapsed_ms = tally.elapsed.as_millis(),
            "conversion complete"
        );
        Ok(tally)
    }
}
