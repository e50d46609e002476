use dmr_core::{CarrierLock, Dibit, DibitDelayBuffer};

use crate::sync::pattern_table::SyncPatternId;
use crate::sync::soft_matcher::{SoftSyncMatcher, SyncMatch};
use crate::sync::sync_consts::SYNC_DIBITS;
use crate::sync::sync_tracker::{SyncTracker, TrackResult};

use super::burst_consts::*;
use super::events::{EventQueue, FramerEvent, PhaseLockedLoop};

/// Framer state: searching scans every dibit for a sync word, synchronized
/// rides the 144-dibit TDMA grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Searching,
    Synchronized,
}

/// The burst framer state machine.
///
/// Owns the 144-dibit message buffer, the 54-dibit sync delay line, the soft
/// sync matcher and one `SyncTracker` per timeslot. While searching, the
/// matcher consumes dibits delayed by the length of the second payload half,
/// so a register hit means the complete burst is already in the message
/// buffer with its sync field at dibit offset 66. While synchronized, a
/// burst is framed every 144 dibits and the trackers alternate with the
/// TDMA slots.
///
/// Output events are pushed into the caller's queue; a rotated sync hit also
/// commands the injected PLL and re-rotates the buffered dibits.
pub struct BurstFramer {
    message_buffer: DibitDelayBuffer<BURST_DIBITS>,
    sync_delay_buffer: DibitDelayBuffer<SYNC_DELAY_DIBITS>,
    matcher: SoftSyncMatcher,
    primary: SyncTracker,
    secondary: SyncTracker,
    current_is_primary: bool,
    state: State,
    /// Dibits received since the last framed burst or absorbed sync loss
    dibit_counter: usize,
    /// Soft threshold for tracker steps while synchronized
    sync_threshold: u32,
    pll: Option<Box<dyn PhaseLockedLoop>>,
}

impl BurstFramer {
    pub fn new(search_threshold: u8, sync_threshold: u8) -> Self {
        assert!(
            (1..=24).contains(&sync_threshold),
            "sync threshold must be in 1..=24, got {}",
            sync_threshold
        );
        Self {
            message_buffer: DibitDelayBuffer::new(),
            sync_delay_buffer: DibitDelayBuffer::new(),
            matcher: SoftSyncMatcher::new(search_threshold),
            primary: SyncTracker::new(),
            secondary: SyncTracker::new(),
            current_is_primary: true,
            state: State::Searching,
            dibit_counter: 0,
            sync_threshold: sync_threshold as u32,
            pll: None,
        }
    }

    /// Register the upstream carrier recovery loop
    pub fn set_pll(&mut self, pll: Box<dyn PhaseLockedLoop>) {
        self.pll = Some(pll);
    }

    pub fn is_synchronized(&self) -> bool {
        self.state == State::Synchronized
    }

    /// Dibits received since the last emitted event; unreported stream tail
    pub fn pending_dibits(&self) -> usize {
        self.dibit_counter
    }

    /// Clear buffers, counters and tracker state. Listener and PLL wiring
    /// stays in place.
    pub fn reset(&mut self) {
        self.message_buffer.reset();
        self.sync_delay_buffer.reset();
        self.matcher.set_register(0);
        self.primary.reset();
        self.secondary.reset();
        self.current_is_primary = true;
        self.state = State::Searching;
        self.dibit_counter = 0;
    }

    /// Process one dibit, pushing any resulting events into `queue`
    pub fn receive(&mut self, dibit: Dibit, queue: &mut EventQueue) {
        self.dibit_counter += 1;
        self.message_buffer.put(dibit);
        let delayed = self.sync_delay_buffer.get_and_put(dibit);

        match self.state {
            State::Synchronized => {
                if self.dibit_counter >= BURST_DIBITS {
                    self.process_burst_boundary(queue);
                }
            }
            State::Searching => {
                if let Some(hit) = self.matcher.receive(delayed) {
                    self.on_sync_detected(hit, queue);
                } else if self.dibit_counter > SYNC_LOSS_DIBIT_THRESHOLD {
                    queue.push_back(FramerEvent::SyncLoss {
                        bits: 2 * SYNC_LOSS_REPORT_DIBITS as u32,
                    });
                    self.dibit_counter -= SYNC_LOSS_REPORT_DIBITS;
                }
            }
        }
    }

    /// A full burst period has elapsed on the TDMA grid: classify it through
    /// this slot's tracker and keep the burst cadence alive.
    fn process_burst_boundary(&mut self, queue: &mut EventQueue) {
        let threshold = self.sync_threshold;
        let result = if self.current_is_primary {
            self.primary.step(&self.message_buffer, threshold)
        } else {
            self.secondary.step(&self.message_buffer, threshold)
        };

        match result {
            TrackResult::Synchronized => {
                let tracker = self.current_tracker();
                let (pattern, errors) = (tracker.last_pattern(), tracker.last_bit_errors());
                self.emit_burst(pattern, errors, CarrierLock::Normal, queue);
            }
            TrackResult::LostSync => {
                if self.other_tracker().is_synchronized() {
                    // Placeholder burst keeps the timeslot cadence; downstream
                    // marks it invalid
                    self.emit_burst(SyncPatternId::Unknown, 0, CarrierLock::Normal, queue);
                } else {
                    tracing::info!("sync lost on both timeslots, searching");
                    self.state = State::Searching;
                    self.matcher
                        .set_register(self.message_buffer.pack_value(SYNC_FIELD_OFFSET, SYNC_DIBITS));
                }
            }
        }
        self.toggle_current_tracker();
    }

    /// The matcher found a sync word in the delayed stream
    fn on_sync_detected(&mut self, hit: SyncMatch, queue: &mut EventQueue) {
        let SyncMatch {
            pattern,
            lock,
            bit_errors,
        } = hit;

        self.current_tracker_mut().set(pattern.id, bit_errors);

        if lock != CarrierLock::Normal {
            tracing::info!("carrier lock anomaly {:?} detected via {:?}", lock, pattern.id);
            if let Some(pll) = self.pll.as_mut() {
                pll.correct(lock.pll_correction_hz());
            }
            if let Some(map) = lock.correction_map() {
                self.message_buffer.rotate(map);
            }
        }

        tracing::debug!("sync acquired: {:?}, {} bit errors", pattern.id, bit_errors);
        self.emit_burst(pattern.id, bit_errors, lock, queue);
        self.state = State::Synchronized;
        self.toggle_current_tracker();
    }

    /// Frame the message buffer as one burst event, first accounting for any
    /// dibits that preceded it since the last event.
    fn emit_burst(
        &mut self,
        sync: SyncPatternId,
        bit_errors: u8,
        lock: CarrierLock,
        queue: &mut EventQueue,
    ) {
        if self.dibit_counter > BURST_DIBITS {
            queue.push_back(FramerEvent::SyncLoss {
                bits: 2 * (self.dibit_counter - BURST_DIBITS) as u32,
            });
        }

        let mut bits = [0u8; BURST_BYTES];
        self.message_buffer.pack_bytes(0, &mut bits);
        queue.push_back(FramerEvent::Burst {
            bits,
            sync,
            lock,
            bit_errors,
        });
        self.dibit_counter = 0;
    }

    fn current_tracker(&self) -> &SyncTracker {
        if self.current_is_primary { &self.primary } else { &self.secondary }
    }

    fn current_tracker_mut(&mut self) -> &mut SyncTracker {
        if self.current_is_primary { &mut self.primary } else { &mut self.secondary }
    }

    fn other_tracker(&self) -> &SyncTracker {
        if self.current_is_primary { &self.secondary } else { &self.primary }
    }

    /// The TDMA grid alternates timeslots every burst
    fn toggle_current_tracker(&mut self) {
        self.current_is_primary = !self.current_is_primary;
    }
}
