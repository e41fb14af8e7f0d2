use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Identifies a track by the artist and title it was scrobbled under.
///
/// Both parts are opaque strings and may contain any character, so the pair
/// is kept as is instead of being joined into one string.
///
/// The derived ordering (artist first, then title) is the tie-break used by
/// every ranking in [`crate::stats`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrackId {
    pub artist: String,
    pub title: String,
}

impl TrackId {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
        }
    }
}

impl Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} – {}", self.artist, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::TrackId;

    #[test]
    fn separator_characters_do_not_collide() {
        let a = TrackId::new("A—B", "C");
        let b = TrackId::new("A", "B—C");

        assert_ne!(a, b);
        assert_eq!(a.to_string(), "A—B – C");
    }

    #[test]
    fn orders_by_artist_then_title() {
        let mut ids = vec![
            TrackId::new("b", "a"),
            TrackId::new("a", "z"),
            TrackId::new("a", "b"),
        ];
        ids.sort();

        assert_eq!(
            ids,
            vec![
                TrackId::new("a", "b"),
                TrackId::new("a", "z"),
                TrackId::new("b", "a"),
            ]
        );
    }
}
