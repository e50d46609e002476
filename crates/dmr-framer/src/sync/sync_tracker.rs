use dmr_core::DibitDelayBuffer;

use crate::framer::burst_consts::{BURST_DIBITS, SYNC_FIELD_OFFSET};

use super::pattern_table::{SyncPatternId, match_canonical};
use super::sync_consts::SYNC_DIBITS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackResult {
    Synchronized,
    LostSync,
}

/// Per-timeslot synchronization state.
///
/// Remembers the pattern of the slot's last burst and predicts the voice
/// superframe frames B-F, which carry no transmitted sync word. A real
/// sync-field match always takes priority over the prediction: a superframe
/// may terminate prematurely when the transmitter drops to a data burst, and
/// that burst must not be mis-classified as a voice continuation.
pub struct SyncTracker {
    last_pattern: SyncPatternId,
    last_bit_errors: u8,
}

impl SyncTracker {
    pub fn new() -> Self {
        Self {
            last_pattern: SyncPatternId::Unknown,
            last_bit_errors: 0,
        }
    }

    pub fn is_synchronized(&self) -> bool {
        self.last_pattern != SyncPatternId::Unknown
    }

    pub fn last_pattern(&self) -> SyncPatternId {
        self.last_pattern
    }

    pub fn last_bit_errors(&self) -> u8 {
        self.last_bit_errors
    }

    pub fn set(&mut self, pattern: SyncPatternId, bit_errors: u8) {
        self.last_pattern = pattern;
        self.last_bit_errors = bit_errors;
    }

    pub fn reset(&mut self) {
        self.set(SyncPatternId::Unknown, 0);
    }

    /// Classify the burst currently held in the message buffer.
    ///
    /// Tries a real sync-field match first, then falls back to advancing the
    /// voice superframe chain one frame.
    pub fn step(&mut self, buffer: &DibitDelayBuffer<BURST_DIBITS>, threshold: u32) -> TrackResult {
        let field = buffer.pack_value(SYNC_FIELD_OFFSET, SYNC_DIBITS);

        if let Some((pattern, errors)) = match_canonical(field, threshold) {
            self.set(pattern.id, errors);
            return TrackResult::Synchronized;
        }

        if let Some(next) = self.last_pattern.next_voice_frame() {
            self.set(next, 0);
            return TrackResult::Synchronized;
        }

        self.reset();
        TrackResult::LostSync
    }
}

impl Default for SyncTracker {
    fn default() -> Self {
        Self::new()
    }
}
