/* ETSI TS 102 361-1 Clause 4.2.2 burst and frame structure */

/// One TDMA burst: 12-dibit CACH prefix (BS bursts), 54-dibit first payload
/// half, 24-dibit sync field, 54-dibit second payload half.
pub const BURST_DIBITS: usize = 144;
pub const BURST_BITS: usize = 288;
pub const BURST_BYTES: usize = BURST_BITS / 8;

/// Sync field position within the burst, dibits [66, 90)
pub const SYNC_FIELD_OFFSET: usize = 66;

/// Dibits following the sync field. Feeding the matcher through a delay line
/// of this depth means a register hit lands exactly when the full burst sits
/// in the message buffer.
pub const SYNC_DELAY_DIBITS: usize = 54;

/// CACH prefix on base-station bursts
pub const CACH_DIBITS: usize = 12;
pub const CACH_BITS: usize = 24;

/// Unsynchronized dibits tolerated before a sync-loss report:
/// one second of channel symbols plus one burst
pub const SYNC_LOSS_DIBIT_THRESHOLD: usize = 4800 + BURST_DIBITS;

/// Dibits reported and absorbed by each forced sync-loss event
pub const SYNC_LOSS_REPORT_DIBITS: usize = 4800;
