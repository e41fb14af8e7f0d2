use serde::{Deserialize, Serialize};

use super::track_id::TrackId;

/// Static facts about a track, as reported by `track.getinfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub artist: String,
    pub title: String,
    /// Last.fm sometimes reports 0 here.
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<Album>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub title: String,
}

impl TrackMetadata {
    pub fn id(&self) -> TrackId {
        TrackId::new(&self.artist, &self.title)
    }

    pub fn album_title(&self) -> Option<&str> {
        self.album.as_ref().map(|a| a.title.as_str())
    }
}

/// One observation of a track within one weekly window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackEntry {
    pub track_id: TrackId,
    pub playcount: u64,
}

impl TrackEntry {
    pub fn new(track_id: TrackId, playcount: u64) -> Self {
        Self {
            track_id,
            playcount,
        }
    }
}
