//! Splitting raw segments into retrievable fragments.
//!
//! This module provides the [`Fragmenter`] trait and two implementations:
//!
//! - [`WindowFragmenter`] — sliding character window with configurable overlap
//! - [`SegmentFragmenter`] — one fragment per segment, for atomic records

use crate::document::{Fragment, RawSegment, SEGMENT_OFFSET_KEY};
use crate::error::{RagError, Result};

/// A strategy for splitting raw segments into fragments.
///
/// Implementations are pure and deterministic: identical inputs and
/// configuration always produce identical fragments. Returned fragments
/// carry no embeddings; the pipeline attaches those later.
pub trait Fragmenter: Send + Sync {
    /// Split segments into fragments.
    ///
    /// Each segment is processed independently. Segments whose normalized
    /// text is empty produce no fragments.
    fn split(&self, segments: &[RawSegment]) -> Vec<Fragment>;
}

/// Collapse runs of whitespace and control characters to single spaces and
/// trim the ends.
///
/// Fragment boundaries are always computed on normalized text, so stray tab
/// or control artifacts in the source never land inside a fragment.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_gap = false;
    for c in text.chars() {
        if c.is_whitespace() || c.is_control() {
            in_gap = true;
        } else {
            if in_gap && !out.is_empty() {
                out.push(' ');
            }
            in_gap = false;
            out.push(c);
        }
    }
    out
}

/// Splits each segment's normalized text with a sliding character window.
///
/// The window is `chunk_size` characters long and advances by
/// `chunk_size - chunk_overlap` per step; consecutive fragments from one
/// segment therefore share exactly `chunk_overlap` characters at each
/// boundary. The final window is truncated to the remaining text, and the
/// walk stops once a window reaches the end of the segment. A segment
/// shorter than `chunk_size` yields a single fragment equal to the whole
/// normalized segment.
///
/// Fragment ids are generated as `seg{segment_index}_{fragment_index}`. Each
/// fragment inherits the segment's metadata verbatim plus a
/// [`SEGMENT_OFFSET_KEY`] field recording its character offset.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::WindowFragmenter;
///
/// let fragmenter = WindowFragmenter::new(512, 100)?;
/// let fragments = fragmenter.split(&segments);
/// ```
#[derive(Debug, Clone)]
pub struct WindowFragmenter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl WindowFragmenter {
    /// Create a new `WindowFragmenter`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::InvalidConfiguration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::InvalidConfiguration(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }
}

impl Fragmenter for WindowFragmenter {
    fn split(&self, segments: &[RawSegment]) -> Vec<Fragment> {
        let step = self.chunk_size - self.chunk_overlap;
        let mut fragments = Vec::new();

        for (segment_index, segment) in segments.iter().enumerate() {
            let chars: Vec<char> = normalize_text(&segment.text).chars().collect();
            if chars.is_empty() {
                continue;
            }

            let mut start = 0;
            let mut fragment_index = 0;
            loop {
                let end = (start + self.chunk_size).min(chars.len());
                let text: String = chars[start..end].iter().collect();

                let mut metadata = segment.source_metadata.clone();
                metadata.insert(SEGMENT_OFFSET_KEY.to_string(), start.to_string());

                fragments.push(Fragment {
                    id: format!("seg{segment_index}_{fragment_index}"),
                    text,
                    metadata,
                    embedding: Vec::new(),
                });

                if end == chars.len() {
                    break;
                }
                start += step;
                fragment_index += 1;
            }
        }

        fragments
    }
}

/// Treats every segment as atomic: one normalized fragment per segment.
///
/// Intended for tabular records where a row is the natural unit of retrieval
/// and splitting mid-row would separate values from their column context.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentFragmenter;

impl Fragmenter for SegmentFragmenter {
    fn split(&self, segments: &[RawSegment]) -> Vec<Fragment> {
        segments
            .iter()
            .enumerate()
            .filter_map(|(segment_index, segment)| {
                let text = normalize_text(&segment.text);
                if text.is_empty() {
                    return None;
                }
                let mut metadata = segment.source_metadata.clone();
                metadata.insert(SEGMENT_OFFSET_KEY.to_string(), "0".to_string());
                Some(Fragment {
                    id: format!("seg{segment_index}_0"),
                    text,
                    metadata,
                    embedding: Vec::new(),
                })
            })
            .collect()
    }
}
