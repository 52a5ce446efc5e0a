// Location buffers
pub const MAX_HITS: usize = 16; // multihit capacity per location per event

// Mapping file format
pub const FIELDS_PER_LINE: usize = 5; // name, keyword, crate, slot|marker, channel|skip
pub const SLOT_KEYWORD: &str = "crate";
pub const MARKER_KEYWORD: &str = "header";
pub const COMMENT_MARKER: &str = "#";
pub const LOCAL_MAP_FILE: &str = "decdata.map";
pub const DEFAULT_DIR_NAME: &str = "DEFAULT";

// Trigger bit pattern
pub const TRIGGER_PATTERN_WIDTH: u32 = u32::BITS;
pub const DEFAULT_TRIGGER_BITS: u32 = 12; // bit1..bit12 in the default map
pub const TRIGGER_BIT_PREFIX: &str = "bit";
pub const DEFAULT_CUT_LOW: u32 = 0;
pub const DEFAULT_CUT_HIGH: u32 = 1500;

// Readout controllers whose buffer lengths are monitored every event
pub const ROC_LENGTH_CRATES: [u32; 2] = [12, 16];

// VDC efficiency
pub const VDC_PLANES: usize = 8;
pub const N_WIRE: usize = 400; // wires per plane
pub const EFFICIENCY_UPDATE_INTERVAL: u64 = 500;
pub const EARLY_FLUSH_LIMIT: u64 = 2000;
pub const LATE_FLUSH_INTERVAL: u64 = 5000;
