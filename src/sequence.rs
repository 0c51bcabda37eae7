// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Recorded signal timing storage.
//!
//! A [`SignalSequence`] is an ordered list of microsecond intervals with a
//! fixed capacity of [`SEQUENCE_CAPACITY`](crate::config::SEQUENCE_CAPACITY)
//! entries. Mark/space alternation is positional, not tagged: index 0 and
//! every even index is a mark (carrier active), every odd index a space.
//!
//! Intervals are stored as `u16`; the capture engine never appends a value
//! above the 15 ms silence threshold, so the width is sufficient by
//! construction.

use core::fmt;

use heapless::Vec;

use crate::config::SEQUENCE_CAPACITY;

/// Ordered mark/space interval sequence with fixed capacity.
///
/// The capture engine clears and refills it during recording; playback
/// iterates it read-only. It can also be built directly through
/// [`push`](SignalSequence::push) by external sequence producers.
#[derive(Debug, Default)]
pub struct SignalSequence {
    intervals: Vec<u16, SEQUENCE_CAPACITY>,
}

impl SignalSequence {
    /// Creates an empty sequence.
    pub const fn new() -> Self {
        Self {
            intervals: Vec::new(),
        }
    }

    /// Number of stored intervals.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// True when no interval is stored.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// True when the sequence is at capacity.
    pub fn is_full(&self) -> bool {
        self.intervals.is_full()
    }

    /// Discards all stored intervals.
    pub fn clear(&mut self) {
        self.intervals.clear();
    }

    /// Appends an interval in microseconds.
    ///
    /// Returns `Err` with the rejected value when the sequence is full.
    pub fn push(&mut self, micros: u16) -> Result<(), u16> {
        self.intervals.push(micros)
    }

    /// Interval at `index`, if stored.
    pub fn get(&self, index: usize) -> Option<u16> {
        self.intervals.get(index).copied()
    }

    /// Stored intervals as a slice, marks at even indices.
    pub fn as_slice(&self) -> &[u16] {
        &self.intervals
    }
}

/// Serializes the sequence as comma-separated decimal microseconds.
///
/// No surrounding whitespace, no trailing delimiter; an empty sequence
/// formats as the empty string. `[100, 200, 300]` formats as
/// `"100,200,300"`.
impl fmt::Display for SignalSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut intervals = self.intervals.iter();
        if let Some(first) = intervals.next() {
            write!(f, "{}", first)?;
            for interval in intervals {
                write!(f, ",{}", interval)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sequence_formats_as_empty_string() {
        let seq = SignalSequence::new();
        assert_eq!(seq.to_string(), "");
    }

    #[test]
    fn intervals_format_comma_separated() {
        let mut seq = SignalSequence::new();
        for interval in [100, 200, 300] {
            seq.push(interval).unwrap();
        }
        assert_eq!(seq.to_string(), "100,200,300");
    }

    #[test]
    fn single_interval_has_no_delimiter() {
        let mut seq = SignalSequence::new();
        seq.push(9000).unwrap();
        assert_eq!(seq.to_string(), "9000");
    }

    #[test]
    fn push_fails_at_capacity() {
        let mut seq = SignalSequence::new();
        for i in 0..SEQUENCE_CAPACITY {
            seq.push(i as u16).unwrap();
        }
        assert!(seq.is_full());
        assert_eq!(seq.push(1234), Err(1234));
        assert_eq!(seq.len(), SEQUENCE_CAPACITY);
    }

    #[test]
    fn clear_resets_length() {
        let mut seq = SignalSequence::new();
        seq.push(560).unwrap();
        seq.push(1690).unwrap();
        seq.clear();
        assert!(seq.is_empty());
        assert_eq!(seq.to_string(), "");
    }
}
