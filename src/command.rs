// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Serial command dispatch engine.
//!
//! An incremental, single-pass matcher over a byte stream. The host sends
//! lines of the form `LABELbody\n`; the dispatcher collects bytes until
//! they exactly equal one registered label, then forwards every following
//! byte of the line to that command's handler. All of this happens one
//! byte at a time in fixed memory, with no look-ahead and no line buffer
//! on the caller's side.
//!
//! # Per-Line Outcome
//!
//! [`CommandDispatcher::process_byte`] reports `false` only when a line's
//! label matched nothing (including label-buffer overflow); the rest of
//! such a line is skipped silently. A handler rejecting a body byte also
//! skips the rest of the line, but the line still reports `true` at the
//! terminator - only unmatched labels count as failures.
//!
//! # Example
//!
//! ```ignore
//! let mut play = |ch: u8, first: bool| ch == b'\n';
//! let mut commands = [Command { label: "PLAY", action: &mut play }];
//! let mut dispatcher = CommandDispatcher::new(&mut commands);
//!
//! for ch in uart_bytes {
//!     if !dispatcher.process_byte(ch) {
//!         uart_send(b"ERR\n");
//!     }
//! }
//! ```

use heapless::Vec;

use crate::config::{COMMAND_LABEL_CAPACITY, LINE_TERMINATOR};

/// A registered command: a label and the handler receiving its body.
///
/// The handler is called once per byte following the label, up to and
/// including the line terminator. Its first argument is the byte, its
/// second is true only on the very first call for the current line. It
/// returns false to reject the byte, which skips the rest of the line.
pub struct Command<'a> {
    /// Command name matched against collected input, byte for byte.
    pub label: &'a str,
    /// Per-byte body handler.
    pub action: &'a mut dyn FnMut(u8, bool) -> bool,
}

/// Byte-at-a-time command line dispatcher.
///
/// Holds the registered command table and the per-line matching state;
/// the state fully resets after every terminator, so one dispatcher
/// serves the stream indefinitely.
pub struct CommandDispatcher<'a, 'c> {
    commands: &'c mut [Command<'a>],
    /// Index of the matched command while its handler is receiving bytes.
    active: Option<usize>,
    /// Label bytes collected since the last terminator.
    body: Vec<u8, COMMAND_LABEL_CAPACITY>,
    /// Label matched nothing (or overflowed); skip to terminator, report failure.
    not_recognized: bool,
    /// Handler rejected a body byte; skip to terminator, report success.
    rejected: bool,
    /// Next handler call is the first for this line.
    first_call: bool,
}

impl<'a, 'c> CommandDispatcher<'a, 'c> {
    /// Creates a dispatcher over a command table.
    ///
    /// Labels are matched by exact length and compared in table order with
    /// no backtracking, so labels must not be prefixes of one another: with
    /// `"GO"` and `"GOTO"` registered, `GOTO` would match `"GO"` and feed
    /// `TO` to its handler as body bytes.
    pub fn new(commands: &'c mut [Command<'a>]) -> Self {
        Self {
            commands,
            active: None,
            body: Vec::new(),
            not_recognized: false,
            rejected: false,
            first_call: false,
        }
    }

    /// Feeds one byte through the dispatcher.
    ///
    /// Returns false when a completed line was not recognized; the caller
    /// may stop reading for this invocation and report an error. The
    /// dispatcher itself is already reset and ready for the next line.
    pub fn process_byte(&mut self, ch: u8) -> bool {
        if self.not_recognized || self.rejected {
            return self.skip(ch);
        }

        if let Some(index) = self.active {
            return self.call_handler(index, ch);
        }

        if ch == LINE_TERMINATOR {
            // An empty line is trivially fine; collected bytes that never
            // matched a label are an unrecognized command.
            let result = self.body.is_empty();
            if !result {
                warn!("command not recognized");
            }
            self.reset();
            return result;
        }

        if self.body.push(ch).is_err() {
            // Longer than any possible label: unrecognized, skip the rest
            // of the line and defer the failure to the terminator.
            self.not_recognized = true;
            return true;
        }

        if let Some(index) = self
            .commands
            .iter()
            .position(|command| command.label.as_bytes() == self.body.as_slice())
        {
            self.active = Some(index);
            self.first_call = true;
        }

        true
    }

    /// Feeds bytes until the source is exhausted or a line reports
    /// unrecognized, returning what the last [`process_byte`] returned.
    ///
    /// [`process_byte`]: CommandDispatcher::process_byte
    pub fn process_bytes<I>(&mut self, bytes: I) -> bool
    where
        I: IntoIterator<Item = u8>,
    {
        for ch in bytes {
            if !self.process_byte(ch) {
                return false;
            }
        }
        true
    }

    fn skip(&mut self, ch: u8) -> bool {
        if ch != LINE_TERMINATOR {
            return true;
        }
        // A line rejected by its handler still reports success here; only
        // an unmatched label is a failure.
        let result = !self.not_recognized;
        if !result {
            warn!("command not recognized");
        }
        self.reset();
        result
    }

    fn call_handler(&mut self, index: usize, ch: u8) -> bool {
        let first_call = self.first_call;
        self.first_call = false;

        let accepted = (self.commands[index].action)(ch, first_call);
        if !accepted && ch != LINE_TERMINATOR {
            self.rejected = true;
            return true;
        }
        // A rejection coinciding with the terminator is harmless: there is
        // nothing left to skip.

        if ch == LINE_TERMINATOR {
            self.reset();
        }
        true
    }

    fn reset(&mut self) {
        self.active = None;
        self.not_recognized = false;
        self.rejected = false;
        self.first_call = false;
        self.body.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;

    /// Runs `input` through a dispatcher with a single "REC" command whose
    /// handler accepts everything, returning the overall result and the
    /// (byte, first_call) pairs the handler saw.
    fn run_recorder(input: &str) -> (bool, std::vec::Vec<(u8, bool)>) {
        let calls = RefCell::new(std::vec::Vec::new());
        let mut action = |ch: u8, first: bool| {
            calls.borrow_mut().push((ch, first));
            true
        };
        let mut commands = [Command {
            label: "REC",
            action: &mut action,
        }];
        let mut dispatcher = CommandDispatcher::new(&mut commands);
        let result = dispatcher.process_bytes(input.bytes());
        drop(dispatcher);
        drop(commands);
        (result, calls.into_inner())
    }

    #[test]
    fn bare_label_forwards_only_the_terminator() {
        let (result, calls) = run_recorder("REC\n");
        assert!(result);
        // The label bytes themselves are never forwarded; the handler sees
        // just the terminator, flagged as the first call.
        assert_eq!(calls, vec![(b'\n', true)]);
    }

    #[test]
    fn body_byte_then_terminator_gives_two_calls() {
        let (result, calls) = run_recorder("RECx\n");
        assert!(result);
        assert_eq!(calls, vec![(b'x', true), (b'\n', false)]);
    }

    #[test]
    fn empty_line_is_trivially_accepted() {
        let (result, calls) = run_recorder("\n");
        assert!(result);
        assert!(calls.is_empty());
    }

    #[test]
    fn unmatched_label_reports_failure_at_terminator() {
        let (result, calls) = run_recorder("NOPE\n");
        assert!(!result);
        assert!(calls.is_empty());
    }

    #[test]
    fn overlong_label_resolves_to_unrecognized() {
        // More bytes than the label buffer holds; must not panic and must
        // resolve to a failure only at the terminator.
        let (result, calls) = run_recorder("ABCDEFGHIJKLMNOPQRSTUVWXYZ\n");
        assert!(!result);
        assert!(calls.is_empty());
    }

    #[test]
    fn state_resets_between_lines() {
        let calls = RefCell::new(std::vec::Vec::new());
        let mut action = |ch: u8, first: bool| {
            calls.borrow_mut().push((ch, first));
            true
        };
        let mut commands = [Command {
            label: "REC",
            action: &mut action,
        }];
        let mut dispatcher = CommandDispatcher::new(&mut commands);

        // A failed line must leave no residue in the matcher.
        assert!(!dispatcher.process_bytes("BOGUS\n".bytes()));
        assert!(dispatcher.process_bytes("RECy\n".bytes()));

        drop(dispatcher);
        drop(commands);
        assert_eq!(calls.into_inner(), vec![(b'y', true), (b'\n', false)]);
    }

    #[test]
    fn handler_rejection_skips_rest_of_line_but_line_succeeds() {
        let calls = RefCell::new(std::vec::Vec::new());
        let mut action = |ch: u8, first: bool| {
            calls.borrow_mut().push((ch, first));
            ch != b'!'
        };
        let mut commands = [Command {
            label: "REC",
            action: &mut action,
        }];
        let mut dispatcher = CommandDispatcher::new(&mut commands);

        // '!' is rejected; 'z' must be skipped without a handler call, and
        // the line still reports success at the terminator.
        assert!(dispatcher.process_bytes("REC!z\n".bytes()));

        drop(dispatcher);
        drop(commands);
        assert_eq!(calls.into_inner(), vec![(b'!', true)]);
    }

    #[test]
    fn rejection_on_terminator_is_suppressed() {
        let mut action = |_ch: u8, _first: bool| false;
        let mut commands = [Command {
            label: "REC",
            action: &mut action,
        }];
        let mut dispatcher = CommandDispatcher::new(&mut commands);

        // The handler rejects the terminator itself; nothing is left to
        // skip, the line completes normally and the next one still works.
        assert!(dispatcher.process_bytes("REC\n".bytes()));
        assert!(dispatcher.process_bytes("\n".bytes()));
    }

    #[test]
    fn first_match_in_table_order_wins() {
        let hits = RefCell::new(std::vec::Vec::new());
        let mut first = |_ch: u8, _fc: bool| {
            hits.borrow_mut().push("play");
            true
        };
        let mut second = |_ch: u8, _fc: bool| {
            hits.borrow_mut().push("stop");
            true
        };
        let mut commands = [
            Command {
                label: "PLAY",
                action: &mut first,
            },
            Command {
                label: "STOP",
                action: &mut second,
            },
        ];
        let mut dispatcher = CommandDispatcher::new(&mut commands);

        assert!(dispatcher.process_bytes("STOP\n".bytes()));
        assert!(dispatcher.process_bytes("PLAY\n".bytes()));

        drop(dispatcher);
        drop(commands);
        assert_eq!(hits.into_inner(), vec!["stop", "play"]);
    }

    #[test]
    fn partial_label_without_terminator_keeps_collecting() {
        let mut action = |_ch: u8, _first: bool| true;
        let mut commands = [Command {
            label: "REC",
            action: &mut action,
        }];
        let mut dispatcher = CommandDispatcher::new(&mut commands);

        // Stream pauses mid-label; the next call resumes where it left off.
        assert!(dispatcher.process_bytes("RE".bytes()));
        assert!(dispatcher.process_bytes("C\n".bytes()));
    }
}
