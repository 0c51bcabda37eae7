// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Signal capture and playback engine.
//!
//! Records the raw mark/space timing of an IR transmission from receiver
//! edge events and replays it on a modulated carrier output with matching
//! timing. The engine is protocol-agnostic: it stores inter-edge intervals
//! only and never interprets them.
//!
//! # Recording
//!
//! [`RemoteControl::start_recording`] clears the sequence, arms the
//! watchdog and seizes the process-wide [`RecorderSlot`]; from then on the
//! board's edge interrupt feeds [`RemoteControl::on_edge`]. Two independent
//! detectors end the recording:
//!
//! - an inter-edge gap above the 15 ms silence threshold, checked on each
//!   edge;
//! - the periodic watchdog, which fires even when edges stop entirely and
//!   is gated on the pin having been idle at the last edge so it never
//!   truncates an active pulse.
//!
//! # Playback
//!
//! [`RemoteControl::play`] walks the stored intervals, driving the carrier
//! on for even indices (marks) and off for odd ones (spaces), holding each
//! for its recorded duration with a wraparound-safe busy-wait.

use core::sync::atomic::{AtomicUsize, Ordering};

use crate::config::{HOLD_OVERHEAD_US, MAX_EDGE_INTERVAL_US, SETTLE_DELAY_US};
use crate::sequence::SignalSequence;
use crate::traits::{CarrierControl, Clock, ReceiverPin, RecordTimer};

/// Playback failure.
///
/// Only [`NothingToPlay`](PlayError::NothingToPlay) is produced by the
/// engine itself; the remaining variants are reserved for external
/// sequence producers (for example a text-format loader) so result codes
/// stay stable when one is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlayError {
    /// The stored sequence is empty.
    NothingToPlay,
    /// Reserved: a sequence must hold an odd number of intervals.
    EvenCount,
    /// Reserved: malformed character in a serialized sequence.
    WrongChar,
    /// Reserved: serialized sequence exceeds the storage capacity.
    BufferOverflow,
}

/// Holder id meaning "no engine is recording".
const NO_HOLDER: usize = 0;

/// Process-wide recording ownership slot.
///
/// At most one engine records at a time; the slot holds the id of the
/// current holder so the free-running interrupt path can tell whose state
/// it is feeding. Seizing is unconditional: a new `start_recording` takes
/// the slot from any prior holder without notification.
///
/// The slot is passed to each engine by reference (typically a `static`),
/// replacing the mutable-global singleton such firmware traditionally
/// uses.
#[derive(Debug)]
pub struct RecorderSlot {
    holder: AtomicUsize,
    next_id: AtomicUsize,
}

impl RecorderSlot {
    /// Creates an empty slot.
    pub const fn new() -> Self {
        Self {
            holder: AtomicUsize::new(NO_HOLDER),
            next_id: AtomicUsize::new(NO_HOLDER + 1),
        }
    }

    fn assign_id(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn seize(&self, id: usize) {
        self.holder.store(id, Ordering::Release);
    }

    /// Clears the slot only while `id` still holds it, so a stale release
    /// never evicts a newer holder.
    fn release(&self, id: usize) {
        let _ = self
            .holder
            .compare_exchange(id, NO_HOLDER, Ordering::AcqRel, Ordering::Acquire);
    }

    fn holds(&self, id: usize) -> bool {
        self.holder.load(Ordering::Acquire) == id
    }
}

impl Default for RecorderSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Learning IR remote engine: records a raw timing sequence from receiver
/// edges and replays it on the carrier output.
///
/// Generic over the four hardware seams in [`crate::traits`]; board
/// support constructs one engine per transmit/receive channel and wires
/// the edge and watchdog interrupts to [`on_edge`](RemoteControl::on_edge)
/// and [`on_watchdog_overflow`](RemoteControl::on_watchdog_overflow).
pub struct RemoteControl<'a, C, P, T, W> {
    clock: C,
    receiver: P,
    carrier: T,
    watchdog: W,
    /// Carrier modulation frequency in kHz (38 for common IR receivers).
    freq_khz: u32,
    slot: &'a RecorderSlot,
    id: usize,
    sequence: SignalSequence,
    /// Counter value at the most recent edge.
    last_edge_micros: u32,
    /// False until the first edge of a session has stamped `last_edge_micros`.
    last_edge_valid: bool,
    /// Pin read idle after the last appended edge; gates watchdog stops.
    idle_at_last_edge: bool,
    /// Transmit-ready vs receive-ready hardware state.
    carrier_on: bool,
}

impl<'a, C, P, T, W> RemoteControl<'a, C, P, T, W>
where
    C: Clock,
    P: ReceiverPin,
    T: CarrierControl,
    W: RecordTimer,
{
    /// Creates an engine bound to a recording slot.
    ///
    /// `freq_khz` is the carrier modulation frequency used for playback.
    /// The engine registers itself with the slot but does not start
    /// recording.
    pub fn new(
        clock: C,
        receiver: P,
        carrier: T,
        watchdog: W,
        freq_khz: u32,
        slot: &'a RecorderSlot,
    ) -> Self {
        let id = slot.assign_id();
        Self {
            clock,
            receiver,
            carrier,
            watchdog,
            freq_khz,
            slot,
            id,
            sequence: SignalSequence::new(),
            last_edge_micros: 0,
            last_edge_valid: false,
            idle_at_last_edge: false,
            carrier_on: false,
        }
    }

    /// True while this engine holds the recording slot.
    pub fn is_recording(&self) -> bool {
        self.slot.holds(self.id)
    }

    /// Begins a recording session.
    ///
    /// Forces the carrier off, then - inside one critical section, so a
    /// stale edge or watchdog interrupt can never observe a half-reset
    /// engine - clears the sequence, resets the edge timestamp state, arms
    /// the watchdog and seizes the slot. Any other engine currently
    /// recording loses the slot without notification.
    pub fn start_recording(&mut self) {
        self.set_carrier(false);
        critical_section::with(|_| {
            self.sequence.clear();
            self.idle_at_last_edge = false;
            self.last_edge_micros = 0;
            self.last_edge_valid = false;
            self.watchdog.arm();
            self.slot.seize(self.id);
        });
        info!("recording started");
    }

    /// Ends a recording session.
    ///
    /// With `on_timer_only` set, the stop is honored only when the pin was
    /// idle at the last appended edge - a watchdog firing mid-pulse must
    /// not truncate the burst. An unconditional stop (`on_timer_only =
    /// false`) always takes effect. Either way the watchdog is disarmed
    /// and the slot released only if this engine still holds it.
    pub fn stop_recording(&mut self, on_timer_only: bool) {
        if self.idle_at_last_edge || !on_timer_only {
            if self.slot.holds(self.id) {
                self.watchdog.disarm();
                self.slot.release(self.id);
                info!("recording stopped: {} intervals", self.sequence.len());
            }
        }
    }

    /// Handles one receiver edge; called from the edge interrupt while
    /// recording.
    ///
    /// The first edge of a session only stamps a timestamp - there is no
    /// prior edge to diff against. Every later edge appends the elapsed
    /// interval, unless the sequence is full or the gap exceeds the
    /// silence threshold, in which case the recording stops and the edge
    /// is discarded. Each successful append pushes the watchdog deadline
    /// out a full period.
    ///
    /// Edges arriving while this engine does not hold the slot - after a
    /// stop, or after another engine seized it - are discarded, so a
    /// still-armed edge interrupt can never mutate a finished sequence.
    pub fn on_edge(&mut self) {
        if !self.slot.holds(self.id) {
            return;
        }

        let now = self.clock.now_micros();
        let interval = now.wrapping_sub(self.last_edge_micros);
        self.last_edge_micros = now;

        if !self.last_edge_valid {
            self.last_edge_valid = true;
            return;
        }

        if self.sequence.is_full() || interval > MAX_EDGE_INTERVAL_US {
            self.stop_recording(false);
            return;
        }

        if self.sequence.push(interval as u16).is_ok() {
            trace!("edge interval: {} us", interval);
            self.watchdog.restart();
        }

        self.idle_at_last_edge = self.receiver.is_idle();
    }

    /// Handles a watchdog overflow; called from the timer interrupt while
    /// recording. Stops the session unless a pulse was still active at the
    /// last edge.
    pub fn on_watchdog_overflow(&mut self) {
        self.stop_recording(true);
    }

    /// Recorded sequence, marks at even indices.
    pub fn sequence(&self) -> &SignalSequence {
        &self.sequence
    }

    /// Mutable access for external sequence producers. Must not be used
    /// while a recording session is live; debug builds assert this.
    pub fn sequence_mut(&mut self) -> &mut SignalSequence {
        debug_assert!(
            !self.is_recording(),
            "sequence edited during a live recording session"
        );
        &mut self.sequence
    }

    /// Number of stored intervals.
    pub fn sequence_len(&self) -> usize {
        self.sequence.len()
    }

    /// True while the hardware is configured transmit-ready.
    pub fn carrier_enabled(&self) -> bool {
        self.carrier_on
    }

    /// Switches the hardware between transmit-ready and receive-ready.
    ///
    /// Idempotent. Turning on waits the settle delay before touching the
    /// hardware, then initializes the transmitter and enables the output;
    /// turning off disables the output first and settles afterwards. The
    /// ordering prevents spurious partial pulses during the mode switch.
    pub fn set_carrier(&mut self, on: bool) {
        if on == self.carrier_on {
            return;
        }
        if on {
            self.settle();
            self.carrier.init_transmitter(self.freq_khz);
            self.carrier.enable();
        } else {
            self.carrier.disable();
            self.settle();
        }
        self.carrier_on = on;
    }

    /// Replays the stored sequence on the carrier output.
    ///
    /// Fails with [`PlayError::NothingToPlay`] on an empty sequence and
    /// touches no hardware in that case. Otherwise drives the carrier on
    /// for even-indexed intervals and off for odd ones, holding each for
    /// its recorded duration, and always ends with the output disabled
    /// followed by the settle delay. Runs to completion; there is no
    /// cancellation, the output must not be left mid-pulse.
    pub fn play(&mut self) -> Result<(), PlayError> {
        if self.sequence.is_empty() {
            return Err(PlayError::NothingToPlay);
        }

        info!("playback: {} intervals", self.sequence.len());
        self.set_carrier(false);
        self.carrier.init_transmitter(self.freq_khz);

        let mut index = 0;
        while let Some(interval) = self.sequence.get(index) {
            if index % 2 == 0 {
                self.carrier.enable();
            } else {
                self.carrier.disable();
            }
            self.hold_for(u32::from(interval));
            index += 1;
        }

        self.carrier.disable();
        self.settle();
        Ok(())
    }

    /// Busy-waits for `micros`, minus the fixed call overhead.
    ///
    /// The clock is a wrapping 32-bit counter, so the deadline may be
    /// numerically below the start value; in that case the wait first lets
    /// the counter wrap past zero before the normal deadline comparison
    /// applies.
    fn hold_for(&self, micros: u32) {
        if micros <= HOLD_OVERHEAD_US {
            return;
        }
        let start = self.clock.now_micros();
        let deadline = start.wrapping_add(micros - HOLD_OVERHEAD_US);
        if deadline < start {
            while self.clock.now_micros() > start {}
        }
        while self.clock.now_micros() < deadline {}
    }

    fn settle(&self) {
        self.hold_for(SETTLE_DELAY_US);
    }
}
