use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use toml::Value;

use super::stack_config::{CfgFramer, CfgSymbolIo, SharedConfig, StackConfig, SymbolSource};

/// Build `SharedConfig` from a TOML configuration string
pub fn from_toml_str(toml_str: &str) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let root: TomlConfigRoot = toml::from_str(toml_str)?;

    // Various sanity checks
    let expected_config_version = "0.3";
    if !root.config_version.eq(expected_config_version) {
        return Err(format!(
            "Unrecognized config_version: {}, expect {}",
            root.config_version, expected_config_version
        )
        .into());
    }
    if !root.extra.is_empty() {
        return Err(format!("Unrecognized top-level fields: {:?}", sorted_keys(&root.extra)).into());
    }
    if let Some(ref framer) = root.framer {
        if !framer.extra.is_empty() {
            return Err(format!("Unrecognized fields: framer::{:?}", sorted_keys(&framer.extra)).into());
        }
    }
    if let Some(ref io) = root.symbol_io {
        if !io.extra.is_empty() {
            return Err(format!("Unrecognized fields: symbol_io::{:?}", sorted_keys(&io.extra)).into());
        }
    }

    // Build config from required and optional values
    let mut cfg = StackConfig {
        debug_log: root.debug_log,
        framer: CfgFramer::default(),
        symbol_io: CfgSymbolIo::default(),
    };

    if let Some(framer) = root.framer {
        if let Some(v) = framer.search_threshold {
            cfg.framer.search_threshold = v;
        }
        if let Some(v) = framer.sync_threshold {
            cfg.framer.sync_threshold = v;
        }
    }
    if let Some(io) = root.symbol_io {
        if let Some(v) = io.source {
            cfg.symbol_io.source = v;
        }
        cfg.symbol_io.input_file = io.input_file;
        if let Some(v) = io.chunk_bytes {
            cfg.symbol_io.chunk_bytes = v;
        }
    }

    if let Err(e) = cfg.validate() {
        return Err(e.into());
    }
    Ok(SharedConfig::from_config(cfg))
}

/// Build `SharedConfig` from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    let mut reader = BufReader::new(reader);
    reader.read_to_string(&mut contents)?;
    from_toml_str(&contents)
}

/// Build `SharedConfig` from a file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    from_reader(BufReader::new(f))
}

fn sorted_keys(map: &HashMap<String, Value>) -> Vec<&String> {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    keys
}

#[derive(Deserialize)]
struct TomlConfigRoot {
    config_version: String,
    debug_log: Option<String>,
    framer: Option<FramerDto>,
    symbol_io: Option<SymbolIoDto>,
    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct FramerDto {
    search_threshold: Option<u8>,
    sync_threshold: Option<u8>,
    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct SymbolIoDto {
    source: Option<SymbolSource>,
    input_file: Option<String>,
    chunk_bytes: Option<usize>,
    #[serde(flatten)]
    extra: HashMap<String, Value>,
}
