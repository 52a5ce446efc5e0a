use std::fmt::Display;

use super::constants::{MARKER_KEYWORD, MAX_HITS, SLOT_KEYWORD};

/// Address is the hardware identity of a Location.
///
/// Data is either found directly at a (crate, slot, channel) address, or at a fixed
/// number of words following a unique marker word in a crate's raw data stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    Slot {
        crate_id: u32,
        slot: u32,
        channel: u32,
    },
    Marker {
        crate_id: u32,
        marker: u32,
        skip: usize,
    },
}

impl Address {
    pub fn crate_id(&self) -> u32 {
        match self {
            Self::Slot { crate_id, .. } => *crate_id,
            Self::Marker { crate_id, .. } => *crate_id,
        }
    }

    pub fn is_slot(&self) -> bool {
        matches!(self, Self::Slot { .. })
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Slot {
                crate_id,
                slot,
                channel,
            } => write!(f, "crate {crate_id} slot {slot} channel {channel}"),
            Self::Marker {
                crate_id,
                marker,
                skip,
            } => write!(f, "crate {crate_id} marker {marker:#x} skip {skip}"),
        }
    }
}

/// Location is a single named unit of raw data and the (multihit) values it captured this event.
///
/// Two Locations compare equal when their hardware Address is the same, regardless of
/// name or captured data. This is what re-initialization uses to decide if a Location changed.
#[derive(Debug, Clone)]
pub struct Location {
    name: String,
    address: Address,
    samples: [u32; MAX_HITS],
    n_samples: usize,
    touched: bool,
}

impl Location {
    /// Create a new Location with an empty sample buffer
    pub fn new(name: &str, address: Address) -> Self {
        Self {
            name: name.to_string(),
            address,
            samples: [0; MAX_HITS],
            n_samples: 0,
            touched: false,
        }
    }

    /// Location at (crate, slot, channel)
    pub fn slot(name: &str, crate_id: u32, slot: u32, channel: u32) -> Self {
        Self::new(
            name,
            Address::Slot {
                crate_id,
                slot,
                channel,
            },
        )
    }

    /// Location `skip` words past `marker` in the data of crate `crate_id`
    pub fn marker(name: &str, crate_id: u32, marker: u32, skip: usize) -> Self {
        Self::new(
            name,
            Address::Marker {
                crate_id,
                marker,
                skip,
            },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn is_slot(&self) -> bool {
        self.address.is_slot()
    }

    /// Replace the hardware address, keeping the Location itself (and anything bound to it).
    ///
    /// Returns true if the address actually changed.
    pub fn set_address(&mut self, address: Address) -> bool {
        if self.address == address {
            return false;
        }
        self.address = address;
        true
    }

    /// Forget all data from the previous event
    pub fn clear(&mut self) {
        self.n_samples = 0;
        self.touched = false;
    }

    /// Store a value. Values beyond MAX_HITS are dropped.
    pub fn load(&mut self, value: u32) {
        if self.n_samples < MAX_HITS {
            self.samples[self.n_samples] = value;
            self.n_samples += 1;
        }
        self.touched = true;
    }

    pub fn did_load(&self) -> bool {
        self.touched
    }

    pub fn num_hits(&self) -> usize {
        self.n_samples
    }

    /// Get the ith value, or 0 if there is no such value this event
    pub fn get(&self, index: usize) -> u32 {
        self.samples().get(index).copied().unwrap_or(0)
    }

    pub fn samples(&self) -> &[u32] {
        &self.samples[..self.n_samples]
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for Location {}

/// Locations display as a line of the mapping file
impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.address {
            Address::Slot {
                crate_id,
                slot,
                channel,
            } => write!(
                f,
                "{} {SLOT_KEYWORD} {crate_id} {slot} {channel}",
                self.name
            ),
            Address::Marker {
                crate_id,
                marker,
                skip,
            } => write!(
                f,
                "{} {MARKER_KEYWORD} {crate_id} {marker:#x} {skip}",
                self.name
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multihit_overflow() {
        let mut loc = Location::slot("tdc", 1, 2, 3);
        for value in 0..20 {
            loc.load(value);
        }
        assert_eq!(loc.num_hits(), MAX_HITS);
        assert_eq!(loc.samples(), (0..16).collect::<Vec<u32>>().as_slice());
        assert_eq!(loc.get(MAX_HITS), 0);
        assert!(loc.did_load());

        loc.clear();
        assert_eq!(loc.num_hits(), 0);
        assert_eq!(loc.get(0), 0);
        assert!(!loc.did_load());
    }

    #[test]
    fn test_equality_is_hardware_only() {
        let mut a = Location::slot("a", 1, 2, 3);
        let b = Location::slot("b", 1, 2, 3);
        a.load(7);
        assert_eq!(a, b);
        assert_ne!(a, Location::marker("a", 1, 2, 3));
        assert_ne!(a, Location::slot("a", 1, 2, 4));
    }

    #[test]
    fn test_set_address() {
        let mut loc = Location::slot("x", 1, 2, 3);
        assert!(!loc.set_address(Address::Slot {
            crate_id: 1,
            slot: 2,
            channel: 3
        }));
        assert!(loc.set_address(Address::Marker {
            crate_id: 1,
            marker: 0xfabc0004,
            skip: 4
        }));
        assert!(!loc.is_slot());
        assert_eq!(loc.address().crate_id(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Location::marker("timeroc2", 2, 0xfabc0004, 4).to_string(),
            "timeroc2 header 2 0xfabc0004 4"
        );
        assert_eq!(
            Location::slot("synchadc1", 1, 25, 16).to_string(),
            "synchadc1 crate 1 25 16"
        );
    }
}
