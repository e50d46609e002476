use serde::Deserialize;
use std::sync::Arc;

/// Where the monitor binary reads its packed-dibit symbol stream from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SymbolSource {
    Stdin,
    File,
}

/// Sync matcher thresholds, in tolerated sync-field bit errors
#[derive(Debug, Clone)]
pub struct CfgFramer {
    /// Maximum Hamming distance accepted while searching for sync
    pub search_threshold: u8,
    /// Maximum Hamming distance accepted while tracking an acquired signal
    pub sync_threshold: u8,
}

impl Default for CfgFramer {
    fn default() -> Self {
        Self {
            search_threshold: 3,
            sync_threshold: 6,
        }
    }
}

/// Symbol input configuration for the monitor binary
#[derive(Debug, Clone)]
pub struct CfgSymbolIo {
    pub source: SymbolSource,
    /// Capture file with byte-packed dibits, four per byte
    pub input_file: Option<String>,
    /// Bytes per inbound buffer; each buffer carries one wall-clock hint.
    /// 120 bytes is 100 ms of channel symbols.
    pub chunk_bytes: usize,
}

impl Default for CfgSymbolIo {
    fn default() -> Self {
        Self {
            source: SymbolSource::Stdin,
            input_file: None,
            chunk_bytes: 120,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StackConfig {
    /// Verbose log file path, if file logging is wanted
    pub debug_log: Option<String>,
    pub framer: CfgFramer,
    pub symbol_io: CfgSymbolIo,
}

impl StackConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("search_threshold", self.framer.search_threshold),
            ("sync_threshold", self.framer.sync_threshold),
        ] {
            if !(1..=24).contains(&value) {
                return Err(format!("framer.{} must be in 1..=24, got {}", name, value));
            }
        }
        if self.symbol_io.source == SymbolSource::File && self.symbol_io.input_file.is_none() {
            return Err("symbol_io.source is File but no input_file given".to_string());
        }
        if self.symbol_io.chunk_bytes == 0 {
            return Err("symbol_io.chunk_bytes must be nonzero".to_string());
        }
        Ok(())
    }
}

/// Cheap-clone handle to the immutable stack configuration
#[derive(Clone, Debug)]
pub struct SharedConfig {
    cfg: Arc<StackConfig>,
}

impl SharedConfig {
    pub fn from_config(cfg: StackConfig) -> Self {
        // Check config for validity before handing out the shared handle
        match cfg.validate() {
            Ok(_) => {}
            Err(e) => panic!("Invalid stack configuration: {}", e),
        }
        Self { cfg: Arc::new(cfg) }
    }

    /// Access immutable config.
    pub fn config(&self) -> &StackConfig {
        &self.cfg
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self::from_config(StackConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(StackConfig::default().validate().is_ok());
    }

    #[test]
    fn test_threshold_range_rejected() {
        let mut cfg = StackConfig::default();
        cfg.framer.search_threshold = 0;
        assert!(cfg.validate().is_err());
        cfg.framer.search_threshold = 25;
        assert!(cfg.validate().is_err());
        cfg.framer.search_threshold = 24;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    #[should_panic(expected = "Invalid stack configuration")]
    fn test_shared_config_fails_fast() {
        let mut cfg = StackConfig::default();
        cfg.framer.sync_threshold = 0;
        let _ = SharedConfig::from_config(cfg);
    }

    #[test]
    fn test_file_source_needs_path() {
        let mut cfg = StackConfig::default();
        cfg.symbol_io.source = SymbolSource::File;
        assert!(cfg.validate().is_err());
        cfg.symbol_io.input_file = Some("capture.bin".to_string());
        assert!(cfg.validate().is_ok());
    }
}
