// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Learning infrared remote control core.
//!
//! This crate implements the board-agnostic logic of a learning IR remote:
//! it records the raw mark/space timing of an arbitrary remote's
//! transmission from receiver edge events and later reproduces that timing
//! on a modulated carrier output, plus a byte-at-a-time serial command
//! dispatcher so a host can drive the device over a byte stream.
//!
//! # Components
//!
//! - [`remote::RemoteControl`] - signal capture and playback engine. Owns a
//!   fixed-capacity sequence of microsecond intervals, fills it from edge
//!   interrupts and replays it with deadline-accurate busy-waits.
//! - [`command::CommandDispatcher`] - incremental multi-pattern matcher
//!   over a byte stream. Selects a registered command handler by exact
//!   label match and forwards the rest of the line to it, one byte at a
//!   time, in fixed memory and without look-ahead.
//!
//! # Hardware Integration
//!
//! The crate contains no register-level code. Board support implements the
//! seams in [`traits`]:
//!
//! - [`traits::Clock`] - free-running, wrapping microsecond counter
//! - [`traits::CarrierControl`] - modulated transmit output
//! - [`traits::ReceiverPin`] - receiver idle-level read
//! - [`traits::RecordTimer`] - periodic watchdog used as silence detector
//!
//! and wires the receiver edge interrupt to [`remote::RemoteControl::on_edge`]
//! and the watchdog overflow interrupt to
//! [`remote::RemoteControl::on_watchdog_overflow`].
//!
//! # Concurrency
//!
//! The engine is designed for the classic single-core firmware model: one
//! foreground task plus non-reentrant interrupt handlers sharing the engine
//! state. `start_recording` runs its reset inside a critical section so a
//! stale interrupt can never observe a half-reset engine; everything else
//! relies on the platform's non-preemption guarantee.
//!
//! # Logging
//!
//! Enable the `defmt` feature for structured logging of recording and
//! playback events; with the feature off the log statements compile away.

#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

#[macro_use]
mod fmt;

pub mod command;
pub mod config;
pub mod remote;
pub mod sequence;
pub mod traits;

pub use command::{Command, CommandDispatcher};
pub use remote::{PlayError, RecorderSlot, RemoteControl};
pub use sequence::SignalSequence;
