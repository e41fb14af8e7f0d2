//! Last.fm JSON shapes.
//!
//! Last.fm encodes numbers as strings and collapses single element lists
//! into bare objects, so both are accepted here. The chart types are also
//! the on-disk format of the chart cache.

use serde::{Deserialize, Deserializer, Serialize};

/// A number that may arrive as a JSON string or a JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberLike {
    Number(i64),
    Text(String),
}

impl NumberLike {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NumberLike::Number(n) => Some(*n),
            NumberLike::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<i64> for NumberLike {
    fn from(n: i64) -> Self {
        NumberLike::Number(n)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}

/// A `[from, to)` chart window in epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartWindow {
    pub from: NumberLike,
    pub to: NumberLike,
}

impl ChartWindow {
    pub fn new(from: i64, to: i64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn bounds(&self) -> Option<(i64, i64)> {
        Some((self.from.as_i64()?, self.to.as_i64()?))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WeeklyChartListResponse {
    pub weeklychartlist: WeeklyChartList,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WeeklyChartList {
    #[serde(default, deserialize_with = "one_or_many")]
    pub chart: Vec<ChartWindow>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WeeklyTrackChartResponse {
    pub weeklytrackchart: WeeklyTrackChart,
}

/// One week of a user's track chart, without the image lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyTrackChart {
    #[serde(default, deserialize_with = "one_or_many")]
    pub track: Vec<ChartTrack>,
    #[serde(rename = "@attr")]
    pub attr: ChartWindow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartTrack {
    pub artist: ChartArtist,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mbid: String,
    pub playcount: NumberLike,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartArtist {
    #[serde(rename = "#text")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mbid: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackInfoResponse {
    pub track: TrackInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackInfo {
    #[serde(default)]
    pub duration: Option<NumberLike>,
    #[serde(default)]
    pub album: Option<TrackInfoAlbum>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackInfoAlbum {
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: i64,
    #[serde(default)]
    pub message: String,
}
