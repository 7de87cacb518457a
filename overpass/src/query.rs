//! Overpass QL fragments.

use geo::geometry::{Point, Rect};

/// Wraps a filter as a complete JSON query returning tagged bodies
/// followed by the skeletons of every referenced node and way.
pub fn wrap(filter: &str) -> String {
    format!("[out:json][timeout:25];\n{filter}\nout body;\n>;\nout skel qt;\n")
}

/// `element[key="value"](around:radius,lat,lon);`
pub fn around(element: &str, (key, value): (&str, &str), radius_m: f64, center: Point) -> String {
    format!(
        "{element}[{key}=\"{value}\"](around:{radius_m},{lat},{lon});",
        lat = center.y(),
        lon = center.x()
    )
}

/// `element[key=value](south,west,north,east);`
pub fn bbox(element: &str, (key, value): (&str, &str), bounds: Rect) -> String {
    let (min, max) = (bounds.min(), bounds.max());
    format!(
        "{element}[{key}={value}]({south},{west},{north},{east});",
        south = min.y,
        west = min.x,
        north = max.y,
        east = max.x
    )
}

/// `nwr(id);`
pub fn by_id(id: i64) -> String {
    format!("nwr({id});")
}

/// `(a b ...);`
pub fn union<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut q = String::from("(\n");
    for part in parts {
        q.push_str("  ");
        q.push_str(part.as_ref());
        q.push('\n');
    }
    q.push_str(");");
    q
}
