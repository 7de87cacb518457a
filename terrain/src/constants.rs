/// Mean earth radius in meters (IUGG).
pub const MEAN_EARTH_RADIUS: f64 = 6_371_008.8;

pub const METERS_PER_YARD: f64 = 0.9144;

pub const FEET_PER_METER: f64 = 3.28084;
