pub mod continents;
pub mod geo;
pub mod numeric;
pub mod transforms;

pub use continents::{Continent, continent_for, country_continents};
pub use geo::{EARTH_RADIUS_KM, haversine_km};
pub use numeric::{mean, round2};
