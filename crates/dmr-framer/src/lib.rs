//! DMR burst framer subsystem
//!
//! Consumes the dibit symbol stream recovered by an upstream demodulator and
//! produces framed, timeslot-tagged, time-stamped 288-bit TDMA bursts, while
//! commanding the upstream carrier recovery loop when a rotated sync pattern
//! reveals a phase-lock anomaly.

pub mod framer;
pub mod sync;

// Re-export the outward-facing surface
pub use framer::burst_framer::BurstFramer;
pub use framer::events::{Burst, BurstSink, EventQueue, FramerEvent, PhaseLockedLoop, SyncLoss};
pub use framer::message_framer::MessageFramer;
pub use sync::pattern_table::{SyncPattern, SyncPatternId};
