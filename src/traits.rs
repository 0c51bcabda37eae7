// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Hardware abstraction traits for the capture and playback engine.
//!
//! Board support implements these four seams and wires the receiver edge
//! interrupt and the watchdog overflow interrupt to the engine callbacks.
//! The engine never touches registers directly, which keeps the core
//! testable on the host with mock implementations.

/// Free-running microsecond counter.
///
/// The counter is expected to wrap at `u32::MAX`; the engine's timed waits
/// handle wraparound explicitly, so a narrow hardware counter widened to
/// 32 bits is fine. Must be safe to read from interrupt context.
pub trait Clock {
    /// Current counter value in microseconds.
    fn now_micros(&self) -> u32;
}

/// Modulated carrier output used for transmission.
///
/// Implementations own the PWM/timer peripheral that generates the carrier
/// and the receive-path interrupt source that must be quiesced while
/// transmitting.
pub trait CarrierControl {
    /// Put the hardware in transmit mode: disable the receive edge
    /// interrupt source and configure the modulator for `freq_khz`.
    /// The output itself stays disabled (line at idle).
    fn init_transmitter(&mut self, freq_khz: u32);

    /// Start driving the modulated carrier (mark).
    fn enable(&mut self);

    /// Stop driving the carrier, leaving the line at idle (space).
    fn disable(&mut self);
}

/// Receiver pin level read.
pub trait ReceiverPin {
    /// True when the pin reads its steady idle level (no pulse present).
    fn is_idle(&self) -> bool;
}

/// Periodic watchdog timer used as a silence detector during recording.
///
/// The period is a board-level choice (a few hundred milliseconds); the
/// engine only requires that overflow interrupts keep firing while armed
/// and that [`restart`](RecordTimer::restart) pushes the next overflow a
/// full period away.
pub trait RecordTimer {
    /// Program the period and enable the overflow interrupt.
    fn arm(&mut self);

    /// Reset the deadline so the next overflow is a full period away.
    fn restart(&mut self);

    /// Disable the overflow interrupt.
    fn disarm(&mut self);
}
