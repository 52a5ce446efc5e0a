use super::location::{Address, Location};

/// Stable handle to a Location in a LocationRegistry.
///
/// The handle stays valid (and keeps pointing at the same Location) through
/// re-initialization, even if the Location's address is changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationId(usize);

/// LocationRegistry owns every active Location.
///
/// Locations are stored in insertion order and are never moved, so a LocationId
/// can be handed out to consumers. The slot-addressed and marker-relative subsets are views
/// selected by the current Address mode, which means a Location whose mode changes during
/// re-initialization moves between subsets automatically.
#[derive(Debug, Clone, Default)]
pub struct LocationRegistry {
    locations: Vec<Location>,
}

impl LocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a Location, returning its handle
    pub fn insert(&mut self, location: Location) -> LocationId {
        self.locations.push(location);
        LocationId(self.locations.len() - 1)
    }

    pub fn get(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(id.0)
    }

    pub fn get_mut(&mut self, id: LocationId) -> Option<&mut Location> {
        self.locations.get_mut(id.0)
    }

    /// Find a Location by name. Marker-relative Locations are searched first; the first match wins.
    pub fn find_by_name(&self, name: &str) -> Option<LocationId> {
        self.marker_ids()
            .chain(self.slot_ids())
            .find(|id| self.locations[id.0].name() == name)
    }

    /// Find the first Location with the given hardware address
    pub fn find_by_address(&self, address: &Address) -> Option<LocationId> {
        self.locations
            .iter()
            .position(|loc| loc.address() == address)
            .map(LocationId)
    }

    /// Move an existing Location to a new address. Returns true if the address changed.
    pub fn rebind(&mut self, id: LocationId, address: Address) -> bool {
        match self.locations.get_mut(id.0) {
            Some(loc) => loc.set_address(address),
            None => false,
        }
    }

    pub fn slot_ids(&self) -> impl Iterator<Item = LocationId> + '_ {
        self.ids_where(true)
    }

    pub fn marker_ids(&self) -> impl Iterator<Item = LocationId> + '_ {
        self.ids_where(false)
    }

    fn ids_where(&self, is_slot: bool) -> impl Iterator<Item = LocationId> + '_ {
        self.locations
            .iter()
            .enumerate()
            .filter(move |(_, loc)| loc.is_slot() == is_slot)
            .map(|(idx, _)| LocationId(idx))
    }

    pub fn slot_locations_mut(&mut self) -> impl Iterator<Item = &mut Location> {
        self.locations.iter_mut().filter(|loc| loc.is_slot())
    }

    pub fn marker_locations_mut(&mut self) -> impl Iterator<Item = &mut Location> {
        self.locations.iter_mut().filter(|loc| !loc.is_slot())
    }

    pub fn iter(&self) -> impl Iterator<Item = (LocationId, &Location)> {
        self.locations
            .iter()
            .enumerate()
            .map(|(idx, loc)| (LocationId(idx), loc))
    }

    /// Clear the event data of every Location
    pub fn clear_samples(&mut self) {
        self.locations.iter_mut().for_each(|loc| loc.clear());
    }

    /// Release every Location. All outstanding LocationIds become invalid.
    pub fn clear(&mut self) {
        self.locations.clear();
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
