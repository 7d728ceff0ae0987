use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::application::{ClassLocationScanner, ClassLocationStore};
use crate::domain::{ClassLocations, DomainError};

enum CacheState {
    /// Nothing in memory; the next access tries the store first.
    Empty,
    Ready(Rc<ClassLocations>),
    /// The next access rebuilds from source without reading the store.
    Invalidated,
}

/// Session cache of where every top-level type is declared.
///
/// The map is produced lazily: first from the store, otherwise by a full
/// scan whose result is written back. Save failures are logged and ignored.
pub struct ClassLocationCache {
    scanner: Rc<dyn ClassLocationScanner>,
    store: Option<Rc<dyn ClassLocationStore>>,
    state: RefCell<CacheState>,
}

impl ClassLocationCache {
    pub fn new(
        scanner: Rc<dyn ClassLocationScanner>,
        store: Option<Rc<dyn ClassLocationStore>>,
    ) -> Self {
        Self {
            scanner,
            store,
            state: RefCell::new(CacheState::Empty),
        }
    }

    /// Returns the current map, loading or building it on first use.
    pub fn locations(&self) -> Rc<ClassLocations> {
        let pending_load = {
            let state = self.state.borrow();
            match &*state {
                CacheState::Ready(locations) => return Rc::clone(locations),
                CacheState::Empty => true,
                CacheState::Invalidated => false,
            }
        };

        if pending_load {
            match self.load() {
                Ok(Some(locations)) => return locations,
                Ok(None) => debug!("No stored class locations, scanning sources"),
                Err(e) => warn!("Discarding unreadable class location cache: {}", e),
            }
        }

        self.rebuild_and_save()
    }

    /// Scans every source root and adopts the result. Does not persist it.
    pub fn build(&self) -> Rc<ClassLocations> {
        let start = Instant::now();
        let locations = Rc::new(self.scanner.scan_locations());
        info!(
            "Indexed {} types in {:.2}s",
            locations.len(),
            start.elapsed().as_secs_f64()
        );
        self.adopt(Rc::clone(&locations));
        locations
    }

    /// Reads the stored map and adopts it. `Ok(None)` when there is no store
    /// or nothing stored; an unreadable store is an error.
    pub fn load(&self) -> Result<Option<Rc<ClassLocations>>, DomainError> {
        let Some(store) = &self.store else {
            return Ok(None);
        };

        match store.load()? {
            Some(locations) => {
                info!(
                    "Loaded {} class locations from {}",
                    locations.len(),
                    store.path().display()
                );
                let locations = Rc::new(locations);
                self.adopt(Rc::clone(&locations));
                Ok(Some(locations))
            }
            None => Ok(None),
        }
    }

    /// Persists the in-memory map. A no-op when nothing is loaded.
    pub fn save(&self) -> Result<(), DomainError> {
        let current = match &*self.state.borrow() {
            CacheState::Ready(locations) => Rc::clone(locations),
            _ => return Ok(()),
        };

        match &self.store {
            Some(store) => {
                store.save(&current)?;
                debug!(
                    "Saved {} class locations to {}",
                    current.len(),
                    store.path().display()
                );
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Drops the in-memory map. The next access rebuilds from source and
    /// overwrites the stored copy.
    pub fn invalidate(&self) {
        *self.state.borrow_mut() = CacheState::Invalidated;
        self.scanner.use_locations(None);
    }

    /// Invalidates and also deletes the stored copy.
    pub fn clear(&self) -> Result<(), DomainError> {
        self.invalidate();
        if let Some(store) = &self.store {
            store.clear()?;
        }
        Ok(())
    }

    /// Unconditional scan followed by a save. Save failures are logged.
    pub fn rebuild_and_save(&self) -> Rc<ClassLocations> {
        let locations = self.build();
        if let Err(e) = self.save() {
            warn!("Failed to save class locations: {}", e);
        }
        locations
    }

    pub fn is_loaded(&self) -> bool {
        matches!(&*self.state.borrow(), CacheState::Ready(_))
    }

    fn adopt(&self, locations: Rc<ClassLocations>) {
        self.scanner.use_locations(Some(Rc::clone(&locations)));
        *self.state.borrow_mut() = CacheState::Ready(locations);
    }
}
