// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Fixed configuration constants for the IR remote core.
//!
//! None of these are runtime-configurable: buffer capacities size the
//! statically allocated state, and the timing constants encode properties
//! of the IR receiver hardware and the busy-wait clock.
//!
//! # Timing Summary
//!
//! - **Silence threshold**: 15 ms between edges ends a recording; no IR
//!   protocol leaves a gap that long inside a single burst.
//! - **Settle delay**: 50 ms around carrier mode switches, long enough for
//!   the receiver/transmitter hardware to stop producing partial pulses.
//! - **Hold overhead**: fixed cost of one timed-wait call, subtracted from
//!   every playback interval so marks and spaces do not drift long.

/// Maximum command label length in bytes; also the dispatcher's label
/// collection buffer capacity.
pub const COMMAND_LABEL_CAPACITY: usize = 16;

/// Maximum number of mark/space intervals in a recorded sequence.
pub const SEQUENCE_CAPACITY: usize = 330;

/// Inter-edge gap in microseconds beyond which a recording is considered
/// finished (end of transmission).
pub const MAX_EDGE_INTERVAL_US: u32 = 15_000;

/// Busy-wait settle delay in microseconds applied when switching the
/// carrier hardware between transmit and receive modes.
pub const SETTLE_DELAY_US: u32 = 50_000;

/// Fixed call overhead in microseconds subtracted from every timed hold.
pub const HOLD_OVERHEAD_US: u32 = 4;

/// Byte that terminates a command line on the serial stream.
pub const LINE_TERMINATOR: u8 = b'\n';
