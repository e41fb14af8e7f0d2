//! Keeps the local cache in step with Last.fm.

use std::collections::{BTreeSet, HashSet};

use anyhow::Context;
use log::{info, warn};

use crate::{
    domain::{chart::entries, track_id::TrackId},
    lastfm::{ChartSource, types::WeeklyTrackChart},
    storage::operations::ChartStore,
};

/// Progress is written to disk after this many downloads.
const SAVE_EVERY: usize = 10;

#[derive(Debug, PartialEq, Eq)]
pub struct FetchReport {
    /// weeks downloaded by this run
    pub fetched: usize,
    /// weeks now in the cache
    pub cached: usize,
}

/// Downloads the last `weeks` chart windows that are not cached yet.
///
/// With `refresh`, every requested window is downloaded again and replaces
/// the cached week with the same bounds. Cached weeks outside the requested
/// range are kept in both modes, and a failed download leaves the weeks it
/// did not reach as they were.
pub fn fetch_charts(
    source: &impl ChartSource,
    store: &ChartStore,
    weeks: usize,
    refresh: bool,
) -> anyhow::Result<FetchReport> {
    let windows = source
        .weekly_chart_list()
        .context("failed to list chart windows")?;
    let wanted = &windows[windows.len().saturating_sub(weeks)..];

    let mut charts = store.load_raw_charts()?;
    let have: HashSet<(i64, i64)> = if refresh {
        HashSet::new()
    } else {
        charts.iter().filter_map(|c| c.attr.bounds()).collect()
    };
    let missing: Vec<_> = wanted
        .iter()
        .filter(|w| w.bounds().is_none_or(|b| !have.contains(&b)))
        .collect();
    info!(
        "{} of the last {} weeks need downloading",
        missing.len(),
        wanted.len()
    );

    for (i, window) in missing.iter().enumerate() {
        info!("Fetching week {}/{}", i + 1, missing.len());
        let chart = match source.weekly_track_chart(window) {
            Ok(chart) => chart,
            Err(e) => {
                save_sorted(store, &mut charts)?;
                return Err(e).with_context(|| format!("failed to fetch week {window:?}"));
            }
        };
        replace_week(&mut charts, chart);
        if (i + 1) % SAVE_EVERY == 0 {
            save_sorted(store, &mut charts)?;
        }
    }
    save_sorted(store, &mut charts)?;

    Ok(FetchReport {
        fetched: missing.len(),
        cached: charts.len(),
    })
}

fn replace_week(charts: &mut Vec<WeeklyTrackChart>, chart: WeeklyTrackChart) {
    let bounds = chart.attr.bounds();
    if bounds.is_some() {
        charts.retain(|c| c.attr.bounds() != bounds);
    }
    charts.push(chart);
}

fn save_sorted(store: &ChartStore, charts: &mut [WeeklyTrackChart]) -> anyhow::Result<()> {
    charts.sort_by_key(|c| c.attr.bounds());
    store.save_charts(charts)?;
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
pub struct InfoReport {
    pub fetched: usize,
    pub not_found: Vec<TrackId>,
}

/// Looks up every charted track that has no cached metadata yet.
///
/// Tracks Last.fm does not know are logged and skipped; they are asked for
/// again on the next run.
pub fn fetch_track_info(
    source: &impl ChartSource,
    store: &ChartStore,
) -> anyhow::Result<InfoReport> {
    let charts = store.load_charts()?;
    let mut metadata = store.load_track_metadata()?;

    let missing: BTreeSet<&TrackId> = entries(&charts)
        .map(|(_, entry)| &entry.track_id)
        .filter(|id| !metadata.contains_key(*id))
        .collect();
    info!("Looking up {} tracks", missing.len());

    let mut report = InfoReport {
        fetched: 0,
        not_found: Vec::new(),
    };
    for (i, id) in missing.into_iter().enumerate() {
        match source.track_info(&id.artist, &id.title) {
            Ok(info) => {
                metadata.entry(id.clone()).or_insert(info);
                report.fetched += 1;
            }
            Err(e) if e.is_not_found() => {
                warn!("Last.fm has no info for {id}: {e}");
                report.not_found.push(id.clone());
            }
            Err(e) => {
                store.save_track_metadata(&metadata)?;
                return Err(e).with_context(|| format!("failed to look up {id}"));
            }
        }
        if (i + 1) % SAVE_EVERY == 0 {
            store.save_track_metadata(&metadata)?;
        }
    }
    store.save_track_metadata(&metadata)?;

    Ok(report)
}
