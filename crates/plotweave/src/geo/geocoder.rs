use std::collections::HashMap;

use log::debug;

use super::LonLat;
use crate::error::{PlotweaveError, Result};

/// Resolves place names to coordinates.
///
/// Implementations may block on network access and own their retry and
/// caching policy. Lookup failures are reported as
/// [`PlotweaveError::External`].
pub trait Geocoder {
    fn fetch_center(&self, place: &str) -> Result<LonLat>;
}

/// A geocoder backed by a fixed table, matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    places: HashMap<String, LonLat>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, name: &str, position: LonLat) -> Self {
        self.places.insert(name.to_lowercase(), position);
        self
    }
}

impl Geocoder for StaticGeocoder {
    fn fetch_center(&self, place: &str) -> Result<LonLat> {
        let found = self.places.get(&place.to_lowercase()).copied();
        debug!(place, found = found.is_some(); "Geocoder lookup");
        found.ok_or_else(|| PlotweaveError::External {
            service: "geocoder",
            message: format!("no match for `{place}`"),
        })
    }
}
