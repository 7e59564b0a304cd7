//! Trait for tracker output feeding the crossing engine.

use std::io::BufRead;

use log::warn;
use serde::Deserialize;
use thiserror::Error;

use crate::crossing::{TrackId, TrackedObject};

/// Per-frame tracker output.
///
/// Implement this to connect any multi-object tracker to the crossing engine.
///
/// # Example
///
/// ```ignore
/// use fence_counter::{TrackSource, TrackedObject};
///
/// struct MyTracker {
///     // Your tracker here
/// }
///
/// impl TrackSource for MyTracker {
///     type Error = std::io::Error;
///
///     fn next_frame(&mut self) -> Result<Option<Vec<TrackedObject>>, Self::Error> {
///         // Return `Ok(None)` once the stream is exhausted
///         Ok(None)
///     }
/// }
/// ```
pub trait TrackSource {
    /// Error type for source failures.
    type Error;

    /// Tracks of the next frame, or `None` at the end of the stream.
    ///
    /// An empty vector is a valid frame without detections.
    fn next_frame(&mut self) -> Result<Option<Vec<TrackedObject>>, Self::Error>;
}

/// Helper trait for converting tracker-specific outputs to `TrackedObject`s.
pub trait IntoTracks {
    /// Convert the output into a vector of tracked objects.
    fn into_tracks(self) -> Vec<TrackedObject>;
}

impl IntoTracks for Vec<TrackedObject> {
    fn into_tracks(self) -> Vec<TrackedObject> {
        self
    }
}

impl IntoTracks for Vec<([f32; 4], TrackId)> {
    fn into_tracks(self) -> Vec<TrackedObject> {
        self.into_iter().map(TrackedObject::from).collect()
    }
}

/// Failure reading a JSON-lines track stream.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read track stream: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: invalid frame record: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct FrameRecord {
    /// Decoded per record so one malformed entry does not drop the frame
    #[serde(default)]
    tracks: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TrackRecord {
    id: TrackId,
    /// TLBR corners
    bbox: [f32; 4],
}

/// Reads one frame per line of JSON:
/// `{"frame": 1, "tracks": [{"id": 7, "bbox": [x1, y1, x2, y2]}]}`.
///
/// Blank lines are skipped. Extra fields such as `frame` are ignored; frames
/// are numbered by their order in the stream. A malformed track record is
/// logged and dropped; only a line that is not a frame object is an error.
pub struct JsonLinesSource<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    /// Number of lines consumed so far.
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> TrackSource for JsonLinesSource<R> {
    type Error = SourceError;

    fn next_frame(&mut self) -> Result<Option<Vec<TrackedObject>>, Self::Error> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }

            let record: FrameRecord = serde_json::from_str(text).map_err(|source| {
                SourceError::Json {
                    line: self.line,
                    source,
                }
            })?;

            let mut tracks = Vec::with_capacity(record.tracks.len());
            for (idx, value) in record.tracks.into_iter().enumerate() {
                match serde_json::from_value::<TrackRecord>(value) {
                    Ok(t) => tracks.push(TrackedObject::from((t.bbox, t.id))),
                    Err(err) => warn!(
                        "line {}: track record {} skipped: {}",
                        self.line, idx, err
                    ),
                }
            }
            return Ok(Some(tracks));
        }
    }
}
