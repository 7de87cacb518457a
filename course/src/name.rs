//! Short course codes for map markers.

const STOPLIST: [&str; 7] = ["Golf", "Course", "Club", "Country", "Center", "Links", "The"];

/// Abbreviates a course name to the initials of its significant words.
///
/// Only words starting with an uppercase letter or a digit count.
/// Generic words like "Golf" and "Club" are skipped, and words
/// starting with a digit are kept whole.
pub fn shorten(name: &str) -> String {
    name.split(' ')
        .filter(|word| {
            word.chars()
                .next()
                .is_some_and(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        })
        .filter(|word| !STOPLIST.contains(word))
        .flat_map(|word| {
            if word.starts_with(|c: char| c.is_ascii_digit()) {
                word.chars().collect::<Vec<_>>()
            } else {
                word.chars().take(1).collect()
            }
        })
        .collect()
}

/// Splits a short code over two lines when it's too wide for a marker.
pub fn marker_label(short: &str) -> String {
    match short.char_indices().nth(2) {
        Some((idx, _)) => format!("{}\n{}", &short[..idx], &short[idx..]),
        None => short.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::{marker_label, shorten};

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("Hollow Brook Golf Club"), "HB");
        assert_eq!(shorten("The Links at Spanish Bay"), "SB");
        assert_eq!(shorten("Pebble Beach Golf Links"), "PB");
        assert_eq!(shorten("Mount Kisco Country Club"), "MK");
        assert_eq!(shorten("Ocean 9 Course"), "O9");
        assert_eq!(shorten("Route 66 Golf Center"), "R66");
        assert_eq!(shorten(""), "");
        assert_eq!(shorten("golf course"), "");
    }

    #[test]
    fn test_marker_label() {
        assert_eq!(marker_label("HB"), "HB");
        assert_eq!(marker_label("R66"), "R6\n6");
        assert_eq!(marker_label("SVGC"), "SV\nGC");
        assert_eq!(marker_label(""), "");
    }
}
