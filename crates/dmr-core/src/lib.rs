//! Core utilities for the DMR burst framer stack
//!
//! This crate provides the fundamental symbol and timing types used across
//! the receiver chain

/// Git version string, set at compile time
pub const GIT_VERSION: &str = git_version::git_version!(fallback = "unknown");
/// Stack version followed by git version string, e.g., "0.3.2-aabbccdd"
pub const STACK_VERSION: &str = const_format::formatcp!("{}-{}", env!("CARGO_PKG_VERSION"), GIT_VERSION);

pub mod carrier_lock;
pub mod debug;
pub mod delay_buffer;
pub mod dibit;
pub mod timebase;

// Re-export commonly used items
pub use carrier_lock::CarrierLock;
pub use delay_buffer::DibitDelayBuffer;
pub use dibit::Dibit;
pub use timebase::TimebaseTracker;

/// DMR channel symbol rate in symbols (dibits) per second
pub const SYMBOL_RATE: u32 = 4800;

/// DMR channel bit rate in bits per second
pub const BIT_RATE: u32 = 9600;
