pub mod coordinates;
pub mod form;
pub mod instant;
pub mod sidereal;

pub use coordinates::{CoordinatePolicy, GeoLocation, parse_coordinate};
pub use form::{DefaultLocation, FormField, FormState};
pub use instant::observation_instant;
pub use sidereal::{EquatorialPoint, greenwich_mean_sidereal_time, zenith};
