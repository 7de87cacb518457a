mod haversine;
mod line;

pub use self::{
    haversine::{bearing, haversine_distance},
    line::point_to_line_distance,
};
