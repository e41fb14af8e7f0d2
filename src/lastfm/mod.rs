//! Blocking client for the parts of the Last.fm API the charts need.

use log::debug;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use crate::{
    config,
    domain::track::{Album, TrackMetadata},
};

pub mod error;
pub mod types;

use error::LastFmError;
use types::{
    ApiErrorBody, ChartWindow, TrackInfoResponse, WeeklyChartListResponse, WeeklyTrackChart,
    WeeklyTrackChartResponse,
};

pub const API_BASE: &str = "https://ws.audioscrobbler.com/2.0/";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Where weekly charts and track facts come from.
pub trait ChartSource {
    /// Every chart window the service has for the user, oldest first.
    fn weekly_chart_list(&self) -> Result<Vec<ChartWindow>, LastFmError>;

    fn weekly_track_chart(&self, window: &ChartWindow) -> Result<WeeklyTrackChart, LastFmError>;

    /// Looks a track up by artist and title. The returned metadata carries the
    /// requested names, so it is keyed the same way as the charts.
    fn track_info(&self, artist: &str, title: &str) -> Result<TrackMetadata, LastFmError>;
}

pub struct LastFmClient {
    http: Client,
    base_url: String,
    api_key: String,
    username: String,
}

impl LastFmClient {
    pub fn new(config: &config::LastFm) -> Result<Self, LastFmError> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            username: config.username.clone(),
        })
    }

    /// Query parameters shared by every call, followed by `extra`.
    fn params<'a>(
        &'a self,
        method: &'a str,
        extra: &[(&'a str, &'a str)],
    ) -> Vec<(&'a str, &'a str)> {
        let mut params = vec![
            ("method", method),
            ("user", self.username.as_str()),
            ("api_key", self.api_key.as_str()),
            ("format", "json"),
        ];
        params.extend_from_slice(extra);
        params
    }

    fn send_get<T: DeserializeOwned>(
        &self,
        method: &str,
        extra: &[(&str, &str)],
    ) -> Result<T, LastFmError> {
        debug!("GET {method} {extra:?}");
        let response = self
            .http
            .get(&self.base_url)
            .query(&self.params(method, extra))
            .send()?;

        let status = response.status();
        let body = response.text()?;
        match decode(&body) {
            Err(LastFmError::Decode(_)) if !status.is_success() => {
                Err(LastFmError::Status(status.as_u16()))
            }
            result => result,
        }
    }
}

impl ChartSource for LastFmClient {
    fn weekly_chart_list(&self) -> Result<Vec<ChartWindow>, LastFmError> {
        let response: WeeklyChartListResponse = self.send_get("user.getweeklychartlist", &[])?;
        Ok(response.weeklychartlist.chart)
    }

    fn weekly_track_chart(&self, window: &ChartWindow) -> Result<WeeklyTrackChart, LastFmError> {
        let (from, to) = (number_param(&window.from), number_param(&window.to));
        let response: WeeklyTrackChartResponse =
            self.send_get(
                "user.getweeklytrackchart",
                &[("from", from.as_str()), ("to", to.as_str())],
            )?;
        Ok(response.weeklytrackchart)
    }

    fn track_info(&self, artist: &str, title: &str) -> Result<TrackMetadata, LastFmError> {
        // lookup by mbid answers "Track not found" for most tracks, so go by name
        let response: TrackInfoResponse = self.send_get(
            "track.getinfo",
            &[
                ("artist", artist),
                ("track", title),
                ("username", self.username.as_str()),
            ],
        )?;
        let info = response.track;

        Ok(TrackMetadata {
            artist: artist.to_string(),
            title: title.to_string(),
            duration_ms: info
                .duration
                .and_then(|d| d.as_i64())
                .and_then(|d| u64::try_from(d).ok())
                .unwrap_or(0),
            album: info
                .album
                .and_then(|a| a.title)
                .filter(|t| !t.is_empty())
                .map(|title| Album { title }),
        })
    }
}

fn number_param(n: &types::NumberLike) -> String {
    match n {
        types::NumberLike::Number(n) => n.to_string(),
        types::NumberLike::Text(s) => s.clone(),
    }
}

/// Decodes a response body, turning Last.fm's `{"error": .., "message": ..}`
/// objects into [`LastFmError::Api`].
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, LastFmError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if value.get("error").is_some() {
        let err: ApiErrorBody = serde_json::from_value(value)?;
        return Err(LastFmError::Api {
            code: err.error,
            message: err.message,
        });
    }
    Ok(serde_json::from_value(value)?)
}
