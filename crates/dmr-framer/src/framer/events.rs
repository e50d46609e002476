use std::collections::VecDeque;

use dmr_core::CarrierLock;

use crate::sync::pattern_table::SyncPatternId;

use super::burst_consts::BURST_BYTES;

/// One framed 288-bit TDMA burst, timeslot-tagged and time-stamped
#[derive(Debug, Clone)]
pub struct Burst {
    /// The full burst, MSB-first in dibit order
    pub bits: [u8; BURST_BYTES],
    pub sync: SyncPatternId,
    pub lock: CarrierLock,
    /// Bit errors observed in the sync field
    pub bit_errors: u8,
    pub timeslot: u8,
    pub timestamp_ms: u64,
    /// Bits repaired while decoding the CACH TACT channel
    pub corrected_bits: u16,
}

/// An interval of the symbol stream that could not be framed
#[derive(Debug, Clone, Copy)]
pub struct SyncLoss {
    pub bits: u32,
    pub timestamp_ms: u64,
}

/// Raw framer output, before timeslot and timestamp assignment
#[derive(Debug)]
pub enum FramerEvent {
    Burst {
        bits: [u8; BURST_BYTES],
        sync: SyncPatternId,
        lock: CarrierLock,
        bit_errors: u8,
    },
    SyncLoss {
        bits: u32,
    },
}

pub type EventQueue = VecDeque<FramerEvent>;

/// Downstream consumer of framed bursts and sync losses
pub trait BurstSink {
    fn burst(&mut self, burst: Burst);
    fn sync_loss(&mut self, loss: SyncLoss);
}

/// Upstream carrier recovery loop, commanded when a rotated sync pattern
/// reveals a phase-lock anomaly
pub trait PhaseLockedLoop {
    /// Apply a frequency offset in Hz
    fn correct(&mut self, offset_hz: f64);
}
