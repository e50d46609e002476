#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use dmr_config::SharedConfig;
use dmr_core::Dibit;
use dmr_framer::{Burst, BurstSink, MessageFramer, PhaseLockedLoop, SyncLoss};

/// Framer output collected for later inspection
#[derive(Default)]
pub struct EventLog {
    pub bursts: Vec<Burst>,
    pub sync_losses: Vec<SyncLoss>,
}

/// Cheap-clone handle shared between the test body and the sink owned by
/// the framer
#[derive(Clone, Default)]
pub struct SharedEventLog(Rc<RefCell<EventLog>>);

impl SharedEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sink(&self) -> Box<dyn BurstSink> {
        Box::new(LogSink(self.clone()))
    }

    pub fn bursts(&self) -> Vec<Burst> {
        self.0.borrow().bursts.clone()
    }

    pub fn sync_losses(&self) -> Vec<SyncLoss> {
        self.0.borrow().sync_losses.clone()
    }

    /// Dibits covered by the collected events
    pub fn accounted_dibits(&self) -> usize {
        let log = self.0.borrow();
        log.bursts.len() * 144 + log.sync_losses.iter().map(|l| l.bits as usize / 2).sum::<usize>()
    }

    fn push_burst(&self, burst: Burst) {
        self.0.borrow_mut().bursts.push(burst);
    }

    fn push_sync_loss(&self, loss: SyncLoss) {
        self.0.borrow_mut().sync_losses.push(loss);
    }
}

struct LogSink(SharedEventLog);

impl BurstSink for LogSink {
    fn burst(&mut self, burst: Burst) {
        self.0.push_burst(burst);
    }

    fn sync_loss(&mut self, loss: SyncLoss) {
        self.0.push_sync_loss(loss);
    }
}

/// Records PLL correction commands
#[derive(Clone, Default)]
pub struct SharedPll(Rc<RefCell<Vec<f64>>>);

impl SharedPll {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pll(&self) -> Box<dyn PhaseLockedLoop> {
        Box::new(PllRecorder(self.clone()))
    }

    pub fn corrections(&self) -> Vec<f64> {
        self.0.borrow().clone()
    }

    fn record(&self, offset_hz: f64) {
        self.0.borrow_mut().push(offset_hz);
    }
}

struct PllRecorder(SharedPll);

impl PhaseLockedLoop for PllRecorder {
    fn correct(&mut self, offset_hz: f64) {
        self.0.record(offset_hz);
    }
}

/// A message framer with default thresholds, wired to a fresh event log
pub fn framer_with_log() -> (MessageFramer, SharedEventLog) {
    let log = SharedEventLog::new();
    let framer = MessageFramer::new(SharedConfig::default(), log.sink());
    (framer, log)
}

pub fn feed(framer: &mut MessageFramer, dibits: &[Dibit]) {
    for &dibit in dibits {
        framer.receive_dibit(dibit);
    }
}

/// Every event plus the unreported tail must cover the stream exactly
pub fn assert_accounting(framer: &MessageFramer, log: &SharedEventLog, total_dibits: usize) {
    assert_eq!(
        log.accounted_dibits() + framer.pending_dibits(),
        total_dibits,
        "dibit accounting mismatch"
    );
}

/// The 24 dibits of a 48-bit sync word, oldest first
pub fn word_dibits(word: u64) -> Vec<Dibit> {
    (0..24)
        .rev()
        .map(|i| Dibit::new(((word >> (2 * i)) & 0x3) as u8))
        .collect()
}

pub fn zeros(n: usize) -> Vec<Dibit> {
    vec![Dibit::new(0); n]
}

/// One aligned 144-dibit burst: zero payload around the given sync word
pub fn burst_with_sync(word: u64) -> Vec<Dibit> {
    let mut dibits = zeros(66);
    dibits.extend(word_dibits(word));
    dibits.extend(zeros(54));
    dibits
}

/// One aligned burst with an explicit 3-byte CACH prefix
pub fn burst_with_cach(cach: [u8; 3], word: u64) -> Vec<Dibit> {
    let mut dibits: Vec<Dibit> = cach.iter().flat_map(|&b| Dibit::unpack_byte(b)).collect();
    dibits.extend(zeros(54));
    dibits.extend(word_dibits(word));
    dibits.extend(zeros(54));
    dibits
}

/// Pack dibits four to a byte, first dibit in bits [7:6]
pub fn pack(dibits: &[Dibit]) -> Vec<u8> {
    assert!(dibits.len() % 4 == 0);
    dibits
        .chunks(4)
        .map(|c| (c[0].value() << 6) | (c[1].value() << 4) | (c[2].value() << 2) | c[3].value())
        .collect()
}

/// CACH bit positions of the 7 TACT bits
const TACT_BIT_POSITIONS: [usize; 7] = [0, 4, 8, 12, 14, 18, 22];

/// Build 3 CACH bytes carrying a Hamming (7,4,3) protected TACT
pub fn encode_cach(access_type: bool, timeslot: u8, lcss: u8) -> [u8; 3] {
    let d = [access_type as u8, timeslot & 1, (lcss >> 1) & 1, lcss & 1];
    let tact = [
        d[0],
        d[1],
        d[2],
        d[3],
        d[0] ^ d[1] ^ d[2],
        d[1] ^ d[2] ^ d[3],
        d[0] ^ d[1] ^ d[3],
    ];
    let mut bytes = [0u8; 3];
    for (i, &pos) in TACT_BIT_POSITIONS.iter().enumerate() {
        bytes[pos / 8] |= tact[i] << (7 - (pos % 8));
    }
    bytes
}

/// Flip one CACH bit, addressed by CACH bit position
pub fn flip_cach_bit(cach: &mut [u8; 3], position: usize) {
    cach[position / 8] ^= 1 << (7 - (position % 8));
}
