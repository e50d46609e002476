use clap::Parser;

use std::cell::RefCell;
use std::io::Read;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use chrono::Utc;
use crossbeam_channel::{Receiver, Sender, bounded};

use dmr_config::{SharedConfig, SymbolSource, toml_config};
use dmr_core::debug;
use dmr_framer::{Burst, BurstSink, MessageFramer, SyncLoss};

/// One inbound symbol buffer: byte-packed dibits plus a wall-clock hint
struct SymbolBuffer {
    bytes: Vec<u8>,
    timestamp_ms: u64,
}

#[derive(Default)]
struct Counters {
    bursts: u64,
    sync_losses: u64,
    lost_bits: u64,
}

/// Sink that logs framed bursts and tallies totals for the exit summary
struct LogSink {
    counters: Rc<RefCell<Counters>>,
}

impl BurstSink for LogSink {
    fn burst(&mut self, burst: Burst) {
        self.counters.borrow_mut().bursts += 1;
        tracing::info!(
            "burst slot {} {:?} lock {:?} errors {} at {} ms",
            burst.timeslot,
            burst.sync,
            burst.lock,
            burst.bit_errors,
            burst.timestamp_ms
        );
    }

    fn sync_loss(&mut self, loss: SyncLoss) {
        let mut counters = self.counters.borrow_mut();
        counters.sync_losses += 1;
        counters.lost_bits += loss.bits as u64;
        tracing::debug!("sync loss of {} bits at {} ms", loss.bits, loss.timestamp_ms);
    }
}

/// Load configuration file
fn load_config_from_toml(cfg_path: &str) -> SharedConfig {
    match toml_config::from_file(cfg_path) {
        Ok(c) => c,
        Err(e) => {
            println!("Failed to load configuration from {}: {}", cfg_path, e);
            std::process::exit(1);
        }
    }
}

/// Read byte-packed dibit buffers from the configured source and ship them
/// to the framer thread, each stamped with the wall clock at read time.
fn run_reader(cfg: SharedConfig, tx: Sender<SymbolBuffer>, running: Arc<AtomicBool>) {
    let io = &cfg.config().symbol_io;
    let mut input: Box<dyn Read> = match io.source {
        SymbolSource::Stdin => Box::new(std::io::stdin()),
        SymbolSource::File => {
            let path = io.input_file.as_ref().expect("validated at load time");
            match std::fs::File::open(path) {
                Ok(f) => Box::new(f),
                Err(e) => {
                    tracing::error!("failed to open {}: {}", path, e);
                    return;
                }
            }
        }
    };

    let mut chunk = vec![0u8; io.chunk_bytes];
    while running.load(Ordering::SeqCst) {
        match input.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                let buffer = SymbolBuffer {
                    bytes: chunk[..n].to_vec(),
                    timestamp_ms: Utc::now().timestamp_millis() as u64,
                };
                if tx.send(buffer).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::error!("symbol input read failed: {}", e);
                break;
            }
        }
    }
}

/// Drain symbol buffers into the framer until the source ends or Ctrl-C
fn run_framer(cfg: SharedConfig, rx: Receiver<SymbolBuffer>, running: Arc<AtomicBool>) -> Counters {
    let counters = Rc::new(RefCell::new(Counters::default()));
    let sink = LogSink {
        counters: counters.clone(),
    };
    let mut framer = MessageFramer::new(cfg, Box::new(sink));

    while running.load(Ordering::SeqCst) {
        match rx.recv() {
            Ok(buffer) => framer.receive_buffer(&buffer.bytes, buffer.timestamp_ms),
            Err(_) => break,
        }
    }

    counters.take()
}

#[derive(Parser, Debug)]
#[command(
    author,
    version = dmr_core::STACK_VERSION,
    about = "DMR burst monitor",
    long_about = "Frames a DMR dibit symbol stream into TDMA bursts using the provided TOML configuration"
)]
struct Args {
    /// Config file (required)
    #[arg(help = "TOML config with framer and symbol input parameters")]
    config: String,
}

fn main() {
    let args = Args::parse();
    let cfg = load_config_from_toml(&args.config);
    let _log_guard = debug::setup_logging_default(cfg.config().debug_log.clone());

    tracing::info!("dmr-monitor {}", dmr_core::STACK_VERSION);

    // Set up Ctrl+C handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("failed to set Ctrl+C handler");

    // Reader thread feeds the framer through a bounded channel; the framer
    // itself stays single-threaded
    let (tx, rx) = bounded::<SymbolBuffer>(8);
    let reader_cfg = cfg.clone();
    let reader_running = running.clone();
    let reader = thread::spawn(move || run_reader(reader_cfg, tx, reader_running));

    let totals = run_framer(cfg, rx, running);
    reader.join().expect("reader thread panicked");

    tracing::info!(
        "done: {} bursts, {} sync losses ({} bits lost)",
        totals.bursts,
        totals.sync_losses,
        totals.lost_bits
    );
}
