//! Plain-text tables for the stats.
//!
//! Every function here prints the rows it is given; picking the top N is up
//! to the caller.

use std::{
    collections::BTreeMap,
    io::{self, Write},
};

use chrono::NaiveDate;

use crate::{
    domain::track_id::TrackId,
    stats::{AlbumKey, CombinedRank, Forgotten, ForgottenVariant, Grouped, Mover},
};

/// `m:ss` for a number of milliseconds; minutes are not wrapped into hours.
pub fn format_duration(ms: u64) -> String {
    let seconds = ms / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// `part` as a percentage of `total`, 0 for an empty total.
pub fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

pub fn print_songs(
    out: &mut impl Write,
    ranked: &[(TrackId, u64)],
    playcount: &BTreeMap<TrackId, u64>,
) -> io::Result<()> {
    for (i, (id, time)) in ranked.iter().enumerate() {
        writeln!(
            out,
            "{:>2}. {:<25} – {:<35} [{:>2} plays, {:>6}]",
            i + 1,
            id.artist,
            id.title,
            playcount.get(id).copied().unwrap_or(0),
            format_duration(*time),
        )?;
    }
    Ok(())
}

pub fn print_artists(
    out: &mut impl Write,
    ranked: &[(String, u64)],
    grouped: &Grouped<String>,
) -> io::Result<()> {
    let total = grouped.total_time();
    for (i, (artist, time)) in ranked.iter().enumerate() {
        writeln!(
            out,
            "{:>2}. {:<25} [{:>4} plays, {:>7}, {:>5.1}%]",
            i + 1,
            artist,
            grouped.playcount.get(artist).copied().unwrap_or(0),
            format_duration(*time),
            percent(*time, total),
        )?;
    }
    Ok(())
}

pub fn print_albums(
    out: &mut impl Write,
    ranked: &[(AlbumKey, u64)],
    grouped: &Grouped<AlbumKey>,
) -> io::Result<()> {
    let total = grouped.total_time();
    for (i, (key, time)) in ranked.iter().enumerate() {
        writeln!(
            out,
            "{:>2}. {:<25} – {:<35} [{:>4} plays, {:>7}, {:>5.1}%]",
            i + 1,
            key.artist,
            key.album,
            grouped.playcount.get(key).copied().unwrap_or(0),
            format_duration(*time),
            percent(*time, total),
        )?;
    }
    Ok(())
}

pub fn print_movers(
    out: &mut impl Write,
    heading: &str,
    movers: &[Mover<TrackId>],
) -> io::Result<()> {
    writeln!(out, "{heading}")?;
    for mover in movers {
        writeln!(
            out,
            "  {:<25} – {:<35} [#{:<4} by plays, #{:<4} by time, x{:.2}]",
            mover.key.artist,
            mover.key.title,
            mover.playcount_rank,
            mover.time_rank,
            mover.divergence,
        )?;
    }
    Ok(())
}

pub fn print_combined(out: &mut impl Write, rows: &[CombinedRank<TrackId>]) -> io::Result<()> {
    for (i, row) in rows.iter().enumerate() {
        writeln!(
            out,
            "{:>2}. {:<25} – {:<35} [#{} by plays + #{} by time = {}]",
            i + 1,
            row.key.artist,
            row.key.title,
            row.playcount_rank,
            row.time_rank,
            row.rank_sum,
        )?;
    }
    Ok(())
}

pub fn print_forgotten(
    out: &mut impl Write,
    variant: ForgottenVariant,
    rows: &[Forgotten],
) -> io::Result<()> {
    for row in rows {
        let id = &row.track_id;
        match variant {
            // v3 scores lie in [-1, 0)
            ForgottenVariant::Decay => write!(out, "{:>6.3}", row.score)?,
            _ => write!(out, "{:>6}", row.score as i64)?,
        }
        writeln!(
            out,
            ": {:<25} – {:<35} ({:>2} plays, {} last play)",
            id.artist,
            id.title,
            row.history.playcount,
            row.history.last_play.format("%Y-%m-%d"),
        )?;
    }
    Ok(())
}

/// Overview of what is in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub weeks: usize,
    pub first_week: Option<NaiveDate>,
    pub last_week: Option<NaiveDate>,
    pub tracks: usize,
    pub tracks_with_info: usize,
    pub plays: u64,
    pub time_listened_ms: u64,
}

pub fn print_summary(out: &mut impl Write, summary: &Summary) -> io::Result<()> {
    match (summary.first_week, summary.last_week) {
        (Some(first), Some(last)) => writeln!(
            out,
            "{} weeks cached, {} to {}",
            summary.weeks,
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        )?,
        _ => writeln!(out, "{} weeks cached", summary.weeks)?,
    }
    writeln!(
        out,
        "{} plays of {} tracks, {} of them with track info ({:.1}%)",
        summary.plays,
        summary.tracks,
        summary.tracks_with_info,
        percent(summary.tracks_with_info as u64, summary.tracks as u64),
    )?;
    writeln!(
        out,
        "{} listened to tracks with known durations",
        format_duration(summary.time_listened_ms)
    )?;
    Ok(())
}
