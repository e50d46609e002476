use dmr_config::SharedConfig;
use dmr_core::{Dibit, TimebaseTracker};

use crate::sync::pattern_table::SyncPatternId;

use super::burst_consts::BURST_BYTES;
use super::burst_framer::BurstFramer;
use super::cach;
use super::events::{Burst, BurstSink, EventQueue, FramerEvent, PhaseLockedLoop, SyncLoss};

/// Orchestration facade over the burst framer.
///
/// Accepts dibits (or byte-packed dibit buffers with wall-clock hints) from
/// the upstream demodulator, stamps and timeslot-tags the framer's events,
/// and dispatches them to the registered sink.
pub struct MessageFramer {
    framer: BurstFramer,
    queue: EventQueue,
    timebase: TimebaseTracker,
    /// Last timeslot handed out; seeded so the first toggled burst is slot 0
    last_timeslot: u8,
    sink: Box<dyn BurstSink>,
}

impl MessageFramer {
    pub fn new(config: SharedConfig, sink: Box<dyn BurstSink>) -> Self {
        let c = config.config();
        Self {
            framer: BurstFramer::new(c.framer.search_threshold, c.framer.sync_threshold),
            queue: EventQueue::new(),
            timebase: TimebaseTracker::new(),
            last_timeslot: 1,
            sink,
        }
    }

    /// Register the upstream carrier recovery loop
    pub fn set_pll(&mut self, pll: Box<dyn PhaseLockedLoop>) {
        self.framer.set_pll(pll);
    }

    pub fn is_synchronized(&self) -> bool {
        self.framer.is_synchronized()
    }

    /// Dibits received that no emitted event has accounted for yet
    pub fn pending_dibits(&self) -> usize {
        self.framer.pending_dibits()
    }

    /// Process one dibit from the demodulator
    pub fn receive_dibit(&mut self, dibit: Dibit) {
        self.framer.receive(dibit, &mut self.queue);
        if !self.queue.is_empty() {
            self.dispatch_events();
        }
    }

    /// Process a byte-packed dibit buffer carrying a wall-clock hint.
    /// Each byte holds four dibits, bits [7:6] first.
    pub fn receive_buffer(&mut self, bytes: &[u8], timestamp_ms: u64) {
        self.timebase.set(timestamp_ms);
        for &byte in bytes {
            for dibit in Dibit::unpack_byte(byte) {
                self.receive_dibit(dibit);
            }
        }
    }

    /// Clear framing state; the sink and PLL registrations stay
    pub fn reset(&mut self) {
        self.framer.reset();
        self.queue.clear();
        self.last_timeslot = 1;
    }

    fn dispatch_events(&mut self) {
        while let Some(event) = self.queue.pop_front() {
            match event {
                FramerEvent::SyncLoss { bits } => {
                    let loss = SyncLoss {
                        bits,
                        timestamp_ms: self.timebase.millis(),
                    };
                    // Unframed intervals are the only internal clock advance;
                    // burst timestamps stay anchored to the latest hint
                    self.timebase.advance(bits);
                    self.sink.sync_loss(loss);
                }
                FramerEvent::Burst {
                    bits,
                    sync,
                    lock,
                    bit_errors,
                } => {
                    let (timeslot, corrected_bits) = self.assign_timeslot(&bits, sync);
                    self.sink.burst(Burst {
                        bits,
                        sync,
                        lock,
                        bit_errors,
                        timeslot,
                        timestamp_ms: self.timebase.millis(),
                        corrected_bits,
                    });
                }
            }
        }
    }

    /// Timeslot of a framed burst: CACH when present and valid, the slot
    /// embedded in a direct-mode pattern, or the toggling fallback.
    fn assign_timeslot(&mut self, bits: &[u8; BURST_BYTES], sync: SyncPatternId) -> (u8, u16) {
        if sync.has_cach() {
            if let Some(decoded) = cach::decode(&bits[..3]) {
                self.last_timeslot = decoded.timeslot;
                return (decoded.timeslot, decoded.corrected_bits as u16);
            }
            tracing::debug!("CACH parity failure, falling back to timeslot toggle");
        }

        if let Some(timeslot) = sync.direct_timeslot() {
            self.last_timeslot = timeslot;
            return (timeslot, 0);
        }

        self.last_timeslot ^= 1;
        (self.last_timeslot, 0)
    }
}
