use dmr_core::{CarrierLock, Dibit};

use super::pattern_table::{SyncPattern, all_patterns};
use super::sync_consts::SYNC_MASK;

/// A sync hit reported by the matcher
#[derive(Debug, Clone, Copy)]
pub struct SyncMatch {
    pub pattern: &'static SyncPattern,
    pub lock: CarrierLock,
    pub bit_errors: u8,
}

/// Scans a rolling 48-bit register over the dibit stream against the sync
/// pattern table.
///
/// Canonical words match softly, tolerating up to `threshold` bit errors;
/// rotational variants match on exact equality only, so a carrier anomaly is
/// never inferred from a damaged word. The first hit in table order wins.
pub struct SoftSyncMatcher {
    register: u64,
    threshold: u32,
}

impl SoftSyncMatcher {
    pub fn new(threshold: u8) -> Self {
        assert!(
            (1..=24).contains(&threshold),
            "sync match threshold must be in 1..=24, got {}",
            threshold
        );
        Self {
            register: 0,
            threshold: threshold as u32,
        }
    }

    /// Prime the register, e.g. with the sync field of the last framed burst
    /// when dropping back from synchronized to searching.
    pub fn set_register(&mut self, value: u64) {
        self.register = value & SYNC_MASK;
    }

    /// Shift in one dibit and report a hit if the register now matches
    pub fn receive(&mut self, dibit: Dibit) -> Option<SyncMatch> {
        self.register = ((self.register << 2) | dibit.value() as u64) & SYNC_MASK;
        self.check()
    }

    fn check(&self) -> Option<SyncMatch> {
        for pattern in all_patterns() {
            let errors = (self.register ^ pattern.canonical).count_ones();
            if errors <= self.threshold {
                return Some(SyncMatch {
                    pattern,
                    lock: CarrierLock::Normal,
                    bit_errors: errors as u8,
                });
            }
            for (variant, lock) in [
                (pattern.plus90, CarrierLock::Plus90),
                (pattern.minus90, CarrierLock::Minus90),
                (pattern.inverted, CarrierLock::Inverted),
            ] {
                if self.register == variant {
                    return Some(SyncMatch {
                        pattern,
                        lock,
                        bit_errors: 0,
                    });
                }
            }
        }
        None
    }
}
