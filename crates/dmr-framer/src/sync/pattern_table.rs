use dmr_core::CarrierLock;
use dmr_core::dibit::{ROTATE_INVERTED, ROTATE_MINUS_90, ROTATE_PLUS_90};

use super::sync_consts::*;

/// Identifies a burst synchronization pattern.
///
/// The first ten variants carry a transmitted 48-bit sync word; the voice
/// continuation frames (B-F) are synthesized by the per-timeslot tracker
/// across a superframe and never appear on air. Discriminants index
/// [`SYNC_PATTERNS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPatternId {
    BsData = 0,
    BsVoiceA = 1,
    MsData = 2,
    MsVoiceA = 3,
    MsReverseChannel = 4,
    DirectDataTs0 = 5,
    DirectDataTs1 = 6,
    DirectVoiceTs0 = 7,
    DirectVoiceTs1 = 8,
    Reserved = 9,
    BsVoiceB = 10,
    BsVoiceC = 11,
    BsVoiceD = 12,
    BsVoiceE = 13,
    BsVoiceF = 14,
    MsVoiceB = 15,
    MsVoiceC = 16,
    MsVoiceD = 17,
    MsVoiceE = 18,
    MsVoiceF = 19,
    Unknown = 20,
}

/// One row of the sync pattern table: the canonical word, its three
/// constellation-rotation variants, and classification flags.
#[derive(Debug)]
pub struct SyncPattern {
    pub id: SyncPatternId,
    pub canonical: u64,
    pub plus90: u64,
    pub minus90: u64,
    pub inverted: u64,
    /// Base-station bursts carry a 12-dibit CACH prefix
    pub has_cach: bool,
    pub is_data: bool,
    pub is_voice: bool,
    pub is_direct: bool,
}

const fn on_air(
    id: SyncPatternId,
    canonical: u64,
    has_cach: bool,
    is_data: bool,
    is_voice: bool,
    is_direct: bool,
) -> SyncPattern {
    SyncPattern {
        id,
        canonical,
        plus90: rotate_sync(canonical, ROTATE_PLUS_90),
        minus90: rotate_sync(canonical, ROTATE_MINUS_90),
        inverted: rotate_sync(canonical, ROTATE_INVERTED),
        has_cach,
        is_data,
        is_voice,
        is_direct,
    }
}

const fn synthesized(id: SyncPatternId, ordinal: u64, has_cach: bool, is_voice: bool) -> SyncPattern {
    let sentinel = VOICE_SENTINEL_BASE + ordinal;
    SyncPattern {
        id,
        canonical: sentinel,
        plus90: sentinel,
        minus90: sentinel,
        inverted: sentinel,
        has_cach,
        is_data: false,
        is_voice,
        is_direct: false,
    }
}

/// Patterns with a transmitted sync word, eligible for register matching.
/// Table order is the tie-break order: standard BS/MS patterns first,
/// direct-mode variants after, reserved last.
pub const MATCHABLE_PATTERNS: usize = 10;

pub static SYNC_PATTERNS: [SyncPattern; 21] = [
    on_air(SyncPatternId::BsData, SYNC_BS_DATA, true, true, false, false),
    on_air(SyncPatternId::BsVoiceA, SYNC_BS_VOICE, true, false, true, false),
    on_air(SyncPatternId::MsData, SYNC_MS_DATA, false, true, false, false),
    on_air(SyncPatternId::MsVoiceA, SYNC_MS_VOICE, false, false, true, false),
    on_air(SyncPatternId::MsReverseChannel, SYNC_MS_REVERSE_CHANNEL, false, false, false, false),
    on_air(SyncPatternId::DirectDataTs0, SYNC_DIRECT_DATA_TS0, false, true, false, true),
    on_air(SyncPatternId::DirectDataTs1, SYNC_DIRECT_DATA_TS1, false, true, false, true),
    on_air(SyncPatternId::DirectVoiceTs0, SYNC_DIRECT_VOICE_TS0, false, false, true, true),
    on_air(SyncPatternId::DirectVoiceTs1, SYNC_DIRECT_VOICE_TS1, false, false, true, true),
    on_air(SyncPatternId::Reserved, SYNC_RESERVED, false, false, false, false),
    synthesized(SyncPatternId::BsVoiceB, 0, true, true),
    synthesized(SyncPatternId::BsVoiceC, 1, true, true),
    synthesized(SyncPatternId::BsVoiceD, 2, true, true),
    synthesized(SyncPatternId::BsVoiceE, 3, true, true),
    synthesized(SyncPatternId::BsVoiceF, 4, true, true),
    synthesized(SyncPatternId::MsVoiceB, 5, false, true),
    synthesized(SyncPatternId::MsVoiceC, 6, false, true),
    synthesized(SyncPatternId::MsVoiceD, 7, false, true),
    synthesized(SyncPatternId::MsVoiceE, 8, false, true),
    synthesized(SyncPatternId::MsVoiceF, 9, false, true),
    synthesized(SyncPatternId::Unknown, 10, false, false),
];

impl SyncPatternId {
    pub fn pattern(self) -> &'static SyncPattern {
        &SYNC_PATTERNS[self as usize]
    }

    pub fn has_cach(self) -> bool {
        self.pattern().has_cach
    }

    /// Timeslot embedded in a direct-mode pattern
    pub fn direct_timeslot(self) -> Option<u8> {
        match self {
            SyncPatternId::DirectDataTs0 | SyncPatternId::DirectVoiceTs0 => Some(0),
            SyncPatternId::DirectDataTs1 | SyncPatternId::DirectVoiceTs1 => Some(1),
            _ => None,
        }
    }

    /// Next frame in the voice superframe chain A-F, or None once the
    /// superframe is complete. Direct-mode voice continues on the MS chain.
    pub fn next_voice_frame(self) -> Option<SyncPatternId> {
        use SyncPatternId::*;
        match self {
            BsVoiceA => Some(BsVoiceB),
            BsVoiceB => Some(BsVoiceC),
            BsVoiceC => Some(BsVoiceD),
            BsVoiceD => Some(BsVoiceE),
            BsVoiceE => Some(BsVoiceF),
            MsVoiceA | DirectVoiceTs0 | DirectVoiceTs1 => Some(MsVoiceB),
            MsVoiceB => Some(MsVoiceC),
            MsVoiceC => Some(MsVoiceD),
            MsVoiceD => Some(MsVoiceE),
            MsVoiceE => Some(MsVoiceF),
            _ => None,
        }
    }
}

/// All patterns with a transmitted sync word, in tie-break order
pub fn all_patterns() -> impl Iterator<Item = &'static SyncPattern> {
    SYNC_PATTERNS[..MATCHABLE_PATTERNS].iter()
}

/// On-air patterns that open a voice superframe
pub fn voice_patterns() -> impl Iterator<Item = &'static SyncPattern> {
    all_patterns().filter(|p| p.is_voice)
}

/// Patterns whose bursts carry a CACH prefix
pub fn cach_patterns() -> impl Iterator<Item = &'static SyncPattern> {
    all_patterns().filter(|p| p.has_cach)
}

/// Classify a 48-bit sync field value. A canonical hit reports a normal
/// carrier lock; a rotational hit reports the corresponding anomaly.
pub fn lookup(value: u64) -> Option<(&'static SyncPattern, CarrierLock)> {
    for pattern in all_patterns() {
        if value == pattern.canonical {
            return Some((pattern, CarrierLock::Normal));
        }
        if value == pattern.plus90 {
            return Some((pattern, CarrierLock::Plus90));
        }
        if value == pattern.minus90 {
            return Some((pattern, CarrierLock::Minus90));
        }
        if value == pattern.inverted {
            return Some((pattern, CarrierLock::Inverted));
        }
    }
    None
}

/// Soft match against the canonical words only, first hit in table order
/// within `threshold` bit errors wins.
pub fn match_canonical(value: u64, threshold: u32) -> Option<(&'static SyncPattern, u8)> {
    for pattern in all_patterns() {
        let errors = (value ^ pattern.canonical).count_ones();
        if errors <= threshold {
            return Some((pattern, errors as u8));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_index_matches_id() {
        for (i, pattern) in SYNC_PATTERNS.iter().enumerate() {
            assert_eq!(pattern.id as usize, i);
        }
    }

    #[test]
    fn test_rotation_variants_consistent() {
        for pattern in all_patterns() {
            assert_eq!(pattern.plus90, rotate_sync(pattern.canonical, dmr_core::dibit::ROTATE_PLUS_90));
            assert_eq!(pattern.minus90, rotate_sync(pattern.canonical, dmr_core::dibit::ROTATE_MINUS_90));
            assert_eq!(pattern.inverted, rotate_sync(pattern.canonical, dmr_core::dibit::ROTATE_INVERTED));
            // The four variants of one pattern never collide
            let variants = [pattern.canonical, pattern.plus90, pattern.minus90, pattern.inverted];
            for (i, a) in variants.iter().enumerate() {
                for b in &variants[i + 1..] {
                    assert_ne!(a, b, "{:?}", pattern.id);
                }
            }
        }
    }

    #[test]
    fn test_lookup_classifies_rotation() {
        for pattern in all_patterns() {
            let (p, lock) = lookup(pattern.canonical).unwrap();
            assert_eq!(p.id, pattern.id);
            assert_eq!(lock, CarrierLock::Normal);
            assert_eq!(lookup(pattern.plus90).unwrap().1, CarrierLock::Plus90);
            assert_eq!(lookup(pattern.minus90).unwrap().1, CarrierLock::Minus90);
            assert_eq!(lookup(pattern.inverted).unwrap().1, CarrierLock::Inverted);
        }
        assert!(lookup(0).is_none());
    }

    #[test]
    fn test_sentinels_never_match() {
        for id in [SyncPatternId::BsVoiceB, SyncPatternId::MsVoiceF, SyncPatternId::Unknown] {
            assert!(id.pattern().canonical > SYNC_MASK);
            assert!(lookup(id.pattern().canonical & SYNC_MASK).is_none());
        }
    }

    #[test]
    fn test_classification_subsets() {
        let voice: Vec<_> = voice_patterns().map(|p| p.id).collect();
        assert_eq!(
            voice,
            vec![
                SyncPatternId::BsVoiceA,
                SyncPatternId::MsVoiceA,
                SyncPatternId::DirectVoiceTs0,
                SyncPatternId::DirectVoiceTs1,
            ]
        );
        let cach: Vec<_> = cach_patterns().map(|p| p.id).collect();
        assert_eq!(cach, vec![SyncPatternId::BsData, SyncPatternId::BsVoiceA]);
    }

    #[test]
    fn test_voice_chain_terminates() {
        let mut id = SyncPatternId::BsVoiceA;
        let mut frames = vec![];
        while let Some(next) = id.next_voice_frame() {
            frames.push(next);
            id = next;
        }
        assert_eq!(
            frames,
            vec![
                SyncPatternId::BsVoiceB,
                SyncPatternId::BsVoiceC,
                SyncPatternId::BsVoiceD,
                SyncPatternId::BsVoiceE,
                SyncPatternId::BsVoiceF,
            ]
        );
        assert_eq!(SyncPatternId::DirectVoiceTs1.next_voice_frame(), Some(SyncPatternId::MsVoiceB));
        assert_eq!(SyncPatternId::MsData.next_voice_frame(), None);
        assert_eq!(SyncPatternId::Unknown.next_voice_frame(), None);
    }

    #[test]
    fn test_match_canonical_first_in_table_order() {
        // MS data is 12 bits away from BS data; with a (deliberately huge)
        // threshold both qualify and the earlier table entry must win.
        let distance = (SYNC_BS_DATA ^ SYNC_MS_DATA).count_ones();
        assert_eq!(distance, 12);
        let (p, errors) = match_canonical(SYNC_MS_DATA, distance).unwrap();
        assert_eq!(p.id, SyncPatternId::BsData);
        assert_eq!(errors as u32, distance);
        // With a sane threshold the exact pattern is found
        let (p, errors) = match_canonical(SYNC_MS_DATA, 6).unwrap();
        assert_eq!(p.id, SyncPatternId::MsData);
        assert_eq!(errors, 0);
    }
}
