// The mapping file tells us where in the raw data each named value lives. Each line is
//
// name crate   <crate> <slot>   <channel>
// name header  <crate> <marker> <skip>
//
// where any keyword other than "crate" means the value sits <skip> words after the
// (hexadecimal) marker word in the crate's raw buffer. Lines starting with # or with too
// few fields are ignored.
//
// On first initialization a missing file means we fall back to the built-in default map,
// which was valid at one point in history. On re-initialization a missing file means
// nothing changes. Re-initialization never removes Locations: a name that disappears from
// the file keeps its previous definition.
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use super::constants::{
    COMMENT_MARKER, DEFAULT_TRIGGER_BITS, FIELDS_PER_LINE, SLOT_KEYWORD, TRIGGER_BIT_PREFIX,
};
use super::error::LocationMapError;
use super::location::{Address, Location};
use super::registry::{LocationId, LocationRegistry};

/// How a LocationMap is merged into a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// First-time setup; the registry is populated from scratch
    Fresh,
    /// Update an existing registry in place
    Reinitialize,
}

/// Where the Locations of a load came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapSource {
    File(PathBuf),
    Default,
    /// No file was found on re-initialization; the registry was left untouched
    Unchanged,
}

/// Outcome of loading a map into a registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub source: MapSource,
    pub inserted: Vec<LocationId>,
    pub updated: Vec<LocationId>,
}

impl LoadReport {
    fn new(source: MapSource) -> Self {
        Self {
            source,
            inserted: Vec::new(),
            updated: Vec::new(),
        }
    }
}

/// Parse one line of a mapping file.
///
/// Returns `Ok(None)` for comments and lines with too few fields.
pub fn parse_line(line: &str) -> Result<Option<Location>, LocationMapError> {
    let entries: Vec<&str> = line.split_whitespace().collect();
    if entries.len() < FIELDS_PER_LINE || entries[0] == COMMENT_MARKER {
        return Ok(None);
    }

    let name = entries[0];
    let crate_id: u32 = entries[2].parse()?;
    let address = if entries[1] == SLOT_KEYWORD {
        Address::Slot {
            crate_id,
            slot: entries[3].parse()?,
            channel: entries[4].parse()?,
        }
    } else {
        Address::Marker {
            crate_id,
            marker: parse_marker(entries[3])?,
            skip: entries[4].parse()?,
        }
    };
    Ok(Some(Location::new(name, address)))
}

/// Markers are hexadecimal, with or without a leading 0x
fn parse_marker(field: &str) -> Result<u32, LocationMapError> {
    let digits = field
        .strip_prefix("0x")
        .or_else(|| field.strip_prefix("0X"))
        .unwrap_or(field);
    Ok(u32::from_str_radix(digits, 16)?)
}

/// LocationMap is the list of Locations read from a mapping file (or the default map).
#[derive(Debug, Clone)]
pub struct LocationMap {
    source: MapSource,
    locations: Vec<Location>,
}

impl LocationMap {
    /// Parse mapping file contents. Lines which fail to parse are skipped with a warning.
    pub fn parse(contents: &str, source: MapSource) -> Self {
        let mut locations = Vec::new();
        for (line_number, line) in contents.lines().enumerate() {
            match parse_line(line) {
                Ok(Some(location)) => locations.push(location),
                Ok(None) => (),
                Err(e) => spdlog::warn!(
                    "Skipping line {} of {:?} ({}): {}",
                    line_number + 1,
                    source,
                    line.trim(),
                    e
                ),
            }
        }
        Self { source, locations }
    }

    /// Open the first candidate that exists.
    ///
    /// Returns None if none of the candidates could be opened.
    pub fn open_first(candidates: &[PathBuf]) -> Result<Option<Self>, LocationMapError> {
        for path in candidates {
            let mut file = match File::open(path) {
                Ok(file) => file,
                Err(e) => {
                    spdlog::debug!("Opening database file {path:?} ... failed: {e}");
                    continue;
                }
            };
            spdlog::debug!("Opening database file {path:?} ... ok");
            // Database files are not guaranteed to be UTF-8 (e.g. Latin-1 comments)
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            return Ok(Some(Self::parse(
                &String::from_utf8_lossy(&bytes),
                MapSource::File(path.to_path_buf()),
            )));
        }
        Ok(None)
    }

    /// The built-in default mapping
    pub fn default_map() -> Self {
        let mut locations = vec![
            // ADCs that show data synch
            Location::slot("synchadc1", 1, 25, 16),
            Location::slot("synchadc2", 2, 24, 48),
            Location::slot("synchadc3", 3, 22, 0),
            Location::slot("synchadc4", 4, 17, 48),
            Location::slot("synchadc14", 14, 1, 5),
            // Coincidence time, etc
            Location::slot("ctimel", 4, 21, 48),
            Location::slot("ctimer", 2, 16, 32),
            Location::slot("pulser1", 3, 3, 7),
            // 100 kHz time stamp in roc14, 2 words beyond the header
            Location::marker("timestamp", 14, 0xfca56000, 2),
            // vxWorks time stamps
            Location::marker("timeroc1", 1, 0xfabc0004, 4),
            Location::marker("timeroc2", 2, 0xfabc0004, 4),
            Location::marker("timeroc3", 3, 0xfabc0004, 4),
            Location::marker("timeroc4", 4, 0xfabc0004, 4),
            Location::marker("timeroc14", 14, 0xfadcb0b4, 1),
            // RF time
            Location::slot("rftime1", 2, 16, 50),
            Location::slot("rftime2", 2, 16, 51),
            // EDTM pulser
            Location::slot("edtpl", 3, 9, 81),
            Location::slot("edtpr", 2, 12, 48),
        ];
        // Bit pattern for trigger definition
        for bit in 1..=DEFAULT_TRIGGER_BITS {
            locations.push(Location::slot(
                &format!("{TRIGGER_BIT_PREFIX}{bit}"),
                3,
                5,
                63 + bit,
            ));
        }
        Self {
            source: MapSource::Default,
            locations,
        }
    }

    pub fn source(&self) -> &MapSource {
        &self.source
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Merge the map into a registry.
    ///
    /// Under `Reinitialize`, a name already in the registry has its address updated in place
    /// (if it changed) so that anything bound to its LocationId stays bound. Unknown names
    /// are inserted in either mode.
    pub fn apply(self, registry: &mut LocationRegistry, mode: LoadMode) -> LoadReport {
        let mut report = LoadReport::new(self.source);
        for location in self.locations {
            if mode == LoadMode::Reinitialize {
                if let Some(id) = registry.find_by_name(location.name()) {
                    if registry.rebind(id, *location.address()) {
                        spdlog::debug!(
                            "Updating variable {} to {}",
                            location.name(),
                            location.address()
                        );
                        report.updated.push(id);
                    } else {
                        spdlog::debug!(
                            "Variable {} already defined and not changed",
                            location.name()
                        );
                    }
                    continue;
                }
            }
            spdlog::debug!(
                "Defining variable {} at {}",
                location.name(),
                location.address()
            );
            report.inserted.push(registry.insert(location));
        }
        report
    }
}

/// Load the Locations for a (re-)initialization into the registry.
///
/// The first candidate file which opens is used. If none can be opened the default map is
/// used under `Fresh`, and the registry is left as is under `Reinitialize`.
pub fn load_locations(
    registry: &mut LocationRegistry,
    candidates: &[PathBuf],
    mode: LoadMode,
) -> Result<LoadReport, LocationMapError> {
    match LocationMap::open_first(candidates)? {
        Some(map) => {
            spdlog::info!("Loading decoder map from {:?}", map.source());
            Ok(map.apply(registry, mode))
        }
        None if mode == LoadMode::Fresh => {
            spdlog::info!(
                "No decoder map found in {:?}. Proceeding with the default mapping.",
                candidates
            );
            Ok(LocationMap::default_map().apply(registry, mode))
        }
        None => {
            spdlog::warn!(
                "No decoder map found in {:?}. Variable definitions unchanged from prior initialization.",
                candidates
            );
            Ok(LoadReport::new(MapSource::Unchanged))
        }
    }
}
