use std::path::Path;
use std::rc::Rc;

use crate::domain::{ClassLocations, DomainError};

/// Produces the qualified-name to file map by scanning every source root.
pub trait ClassLocationScanner {
    fn scan_locations(&self) -> ClassLocations;

    /// Called whenever the cache adopts a new map, so lookups for types whose
    /// file name differs from the type name can use it.
    fn use_locations(&self, _locations: Option<Rc<ClassLocations>>) {}
}

/// Persistence for the class location map.
pub trait ClassLocationStore {
    /// Where the map is stored.
    fn path(&self) -> &Path;

    /// Reads the stored map. `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<ClassLocations>, DomainError>;

    /// Replaces the stored map. A reader never observes a partial write.
    fn save(&self, locations: &ClassLocations) -> Result<(), DomainError>;

    /// Removes the stored map.
    fn clear(&self) -> Result<(), DomainError>;
}
