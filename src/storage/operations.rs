use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
};

use log::{info, warn};

use crate::{
    config,
    domain::{
        chart::{WeeklyChart, seconds_to_local_date},
        track::{TrackEntry, TrackMetadata},
        track_id::TrackId,
    },
    lastfm::types::WeeklyTrackChart,
    storage::{
        error::StorageError,
        fs::{read_json, write_json},
        resolve_path,
    },
};

/// The two JSON documents the reports are computed from: the weekly charts
/// as Last.fm returned them, and the facts looked up per track.
pub struct ChartStore {
    charts_path: PathBuf,
    track_info_path: PathBuf,
}

impl ChartStore {
    /// `base_dir` is where relative cache paths are resolved from.
    pub fn new(config: &config::Cache, base_dir: &Path) -> Self {
        Self::from_paths(
            resolve_path(base_dir, &config.charts),
            resolve_path(base_dir, &config.track_info),
        )
    }

    pub fn from_paths(charts_path: PathBuf, track_info_path: PathBuf) -> Self {
        Self {
            charts_path,
            track_info_path,
        }
    }

    pub fn charts_path(&self) -> &Path {
        &self.charts_path
    }

    /// Cached charts in their wire format, empty if nothing was fetched yet.
    pub fn load_raw_charts(&self) -> Result<Vec<WeeklyTrackChart>, StorageError> {
        Ok(read_json(&self.charts_path)?.unwrap_or_default())
    }

    pub fn save_charts(&self, charts: &[WeeklyTrackChart]) -> Result<(), StorageError> {
        write_json(&self.charts_path, charts)?;
        info!(
            "Saved {} weeks to {}",
            charts.len(),
            self.charts_path.display()
        );
        Ok(())
    }

    /// Loads and validates the cached charts, oldest week first.
    pub fn load_charts(&self) -> Result<Vec<WeeklyChart>, StorageError> {
        let raw: Vec<WeeklyTrackChart> = read_json(&self.charts_path)?
            .ok_or_else(|| StorageError::CacheMissing(self.charts_path.clone()))?;

        let mut charts = raw
            .iter()
            .map(to_weekly_chart)
            .collect::<Result<Vec<_>, _>>()?;
        charts.sort_by_key(|week| week.from);
        Ok(charts)
    }

    /// Loads the per-track facts. A missing file is an empty index.
    ///
    /// When the file holds the same track twice, the first entry wins.
    pub fn load_track_metadata(&self) -> Result<HashMap<TrackId, TrackMetadata>, StorageError> {
        let Some(entries) = read_json::<Vec<TrackMetadata>>(&self.track_info_path)? else {
            info!(
                "No track info at {}, listening times will be empty",
                self.track_info_path.display()
            );
            return Ok(HashMap::new());
        };

        let mut metadata = HashMap::with_capacity(entries.len());
        for entry in entries {
            let id = entry.id();
            if metadata.contains_key(&id) {
                warn!("Duplicate track info for {id}, keeping the first one");
                continue;
            }
            metadata.insert(id, entry);
        }
        Ok(metadata)
    }

    /// Writes the per-track facts, sorted by track so the file diffs well.
    pub fn save_track_metadata(
        &self,
        metadata: &HashMap<TrackId, TrackMetadata>,
    ) -> Result<(), StorageError> {
        let sorted: BTreeMap<&TrackId, &TrackMetadata> = metadata.iter().collect();
        let entries: Vec<&TrackMetadata> = sorted.into_values().collect();
        write_json(&self.track_info_path, &entries)?;
        info!(
            "Saved info for {} tracks to {}",
            entries.len(),
            self.track_info_path.display()
        );
        Ok(())
    }
}

/// Converts one cached week into the form the stats work on, rejecting
/// anything the stats cannot make sense of.
pub fn to_weekly_chart(raw: &WeeklyTrackChart) -> Result<WeeklyChart, StorageError> {
    let (from, to) = raw
        .attr
        .bounds()
        .ok_or_else(|| StorageError::Malformed(format!("invalid chart window {:?}", raw.attr)))?;
    if seconds_to_local_date(from).is_none() {
        return Err(StorageError::Malformed(format!(
            "chart window start {from} out of range"
        )));
    }

    let tracks = raw
        .track
        .iter()
        .map(|track| {
            if track.artist.name.is_empty() || track.name.is_empty() {
                return Err(StorageError::Malformed(format!(
                    "track without artist or title in week {from}"
                )));
            }
            let playcount = track
                .playcount
                .as_i64()
                .and_then(|n| u64::try_from(n).ok())
                .ok_or_else(|| {
                    StorageError::Malformed(format!(
                        "invalid playcount {:?} for {} – {}",
                        track.playcount, track.artist.name, track.name
                    ))
                })?;
            Ok(TrackEntry::new(
                TrackId::new(&track.artist.name, &track.name),
                playcount,
            ))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WeeklyChart::new(from, to, tracks))
}
