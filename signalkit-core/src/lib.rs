//! SignalKit Core — bar-driven signal rules and the consumers that act on them.
//!
//! This crate contains:
//! - Domain types (bars, periodicity, signals, order tags)
//! - Indicator primitives (close-series buffer, look-back SMA)
//! - Signal rules (minute-parity timer, SMA crossover detector)
//! - Result consumers (chart display, condition scan, order manager)
//! - Session wiring with one-time diagnostics
//! - TOML session config and CSV bar feed loading

pub mod config;
pub mod consumers;
pub mod domain;
pub mod error;
pub mod feed;
pub mod indicators;
pub mod rules;
pub mod session;
pub mod sizers;
