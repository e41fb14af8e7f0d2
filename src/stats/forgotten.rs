//! "Forgotten favorites": tracks with a lot of past listening but little of
//! it recently.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{chart::WeeklyChart, track_id::TrackId};

use super::rank::ranked_by;

/// Weeks after which a play counts half as much in [`ForgottenVariant::Decay`].
pub const HALF_LIFE_WEEKS: f64 = 52.0;

pub const DEFAULT_ROOT: u32 = 8;

/// Everything the forgotten scores need to know about one track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackHistory {
    pub playcount: u64,
    /// Sum over every week the track was played in of the days since that week started.
    pub days_since_plays: i64,
    pub last_play: NaiveDate,
    /// Play count with each week discounted by its age, see [`HALF_LIFE_WEEKS`].
    pub decayed_playcount: f64,
}

/// Collects a [`TrackHistory`] for every charted track in one pass.
///
/// Weeks are weighted by their position in `charts`, so the slice is
/// expected oldest first, as the store loads it.
pub fn track_histories(
    charts: &[WeeklyChart],
    today: NaiveDate,
) -> BTreeMap<TrackId, TrackHistory> {
    let total_weeks = charts.len();
    let mut histories: BTreeMap<TrackId, TrackHistory> = BTreeMap::new();

    for (week_index, week) in charts.iter().enumerate() {
        // the store rejects windows chrono cannot represent
        let Some(date) = week.start_date() else {
            continue;
        };
        let days_since = (today - date).num_days();
        let weight = (-((total_weeks - week_index) as f64) / HALF_LIFE_WEEKS).exp2();

        for entry in &week.tracks {
            let history = histories
                .entry(entry.track_id.clone())
                .or_insert_with(|| TrackHistory {
                    playcount: 0,
                    days_since_plays: 0,
                    last_play: date,
                    decayed_playcount: 0.0,
                });
            history.playcount += entry.playcount;
            history.days_since_plays += days_since;
            history.last_play = history.last_play.max(date);
            history.decayed_playcount += entry.playcount as f64 * weight;
        }
    }

    histories
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForgottenVariant {
    /// v1: `(Σ days since each week of play)² / sqrt(playcount)`
    SquaredRecency,
    /// v2: `days since last play × playcount^(1/root)`; a root of 0 scores nothing
    LastPlay { root: u32 },
    /// v3: `-(decayed playcount + 1) / (playcount + 1)`
    Decay,
}

impl Default for ForgottenVariant {
    fn default() -> Self {
        Self::LastPlay { root: DEFAULT_ROOT }
    }
}

impl ForgottenVariant {
    /// Scores one track; `None` when the score is undefined for it.
    pub fn score(&self, history: &TrackHistory, today: NaiveDate) -> Option<f64> {
        let playcount = history.playcount as f64;
        match *self {
            Self::SquaredRecency => {
                if history.playcount == 0 {
                    return None;
                }
                let days = history.days_since_plays as f64;
                Some(days.powi(2) / playcount.sqrt())
            }
            Self::LastPlay { root: 0 } => None,
            Self::LastPlay { root } => {
                let days = (today - history.last_play).num_days() as f64;
                Some(days * playcount.powf(1.0 / f64::from(root)))
            }
            Self::Decay => Some(-(history.decayed_playcount + 1.0) / (playcount + 1.0)),
        }
    }
}

fn score_all(
    histories: &BTreeMap<TrackId, TrackHistory>,
    variant: ForgottenVariant,
    today: NaiveDate,
) -> BTreeMap<TrackId, f64> {
    histories
        .iter()
        .filter_map(|(id, history)| Some((id.clone(), variant.score(history, today)?)))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Forgotten {
    pub track_id: TrackId,
    pub score: f64,
    pub history: TrackHistory,
}

/// The `n` highest scoring tracks, highest first.
pub fn most_forgotten(
    charts: &[WeeklyChart],
    today: NaiveDate,
    variant: ForgottenVariant,
    n: usize,
) -> Vec<Forgotten> {
    let mut histories = track_histories(charts, today);
    let scores = score_all(&histories, variant, today);

    ranked_by(&scores)
        .into_iter()
        .take(n)
        .filter_map(|(track_id, score)| {
            let history = histories.remove(&track_id)?;
            Some(Forgotten {
                track_id,
                score,
                history,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};

    use super::*;
    use crate::domain::chart::{WeeklyChart, chart};

    const WEEK: i64 = 7 * 24 * 3600;
    const START: i64 = 1_555_243_200;

    fn weeks(tracks: &[&[(&str, &str, u64)]]) -> Vec<WeeklyChart> {
        tracks
            .iter()
            .enumerate()
            .map(|(i, t)| chart(START + i as i64 * WEEK, t))
            .collect()
    }

    fn start_of(charts: &[WeeklyChart], i: usize) -> NaiveDate {
        charts[i].start_date().unwrap()
    }

    fn id(artist: &str, title: &str) -> TrackId {
        TrackId::new(artist, title)
    }

    fn score_tracks(
        charts: &[WeeklyChart],
        today: NaiveDate,
        variant: ForgottenVariant,
    ) -> BTreeMap<TrackId, f64> {
        score_all(&track_histories(charts, today), variant, today)
    }

    #[test]
    fn histories_accumulate_in_one_pass() {
        let charts = weeks(&[&[("A", "X", 2)], &[("A", "X", 3), ("B", "Y", 1)]]);
        let today = start_of(&charts, 1) + Days::new(10);

        let histories = track_histories(&charts, today);

        let x = &histories[&id("A", "X")];
        assert_eq!(x.playcount, 5);
        assert_eq!(
            x.days_since_plays,
            (today - start_of(&charts, 0)).num_days() + 10
        );
        assert_eq!(x.last_play, start_of(&charts, 1));

        let y = &histories[&id("B", "Y")];
        assert_eq!(y.playcount, 1);
        assert_eq!(y.days_since_plays, 10);
    }

    #[test]
    fn decay_halves_every_fifty_two_weeks() {
        let empty: &[(&str, &str, u64)] = &[];
        let mut tracks = vec![empty; 52];
        tracks[0] = &[("A", "X", 8)];
        let charts = weeks(&tracks);
        let today = start_of(&charts, 51);

        let history = &track_histories(&charts, today)[&id("A", "X")];

        // oldest of 52 weeks is 52 positions from the end
        assert!((history.decayed_playcount - 4.0).abs() < 1e-9);
    }

    #[test]
    fn last_play_root_example() {
        let charts = weeks(&[&[("A", "X", 16)]]);
        let today = start_of(&charts, 0) + Days::new(100);

        let scores = score_tracks(&charts, today, ForgottenVariant::LastPlay { root: 8 });

        let score = scores[&id("A", "X")];
        assert!((score - 100.0 * 2f64.sqrt()).abs() < 1e-9);
        assert_eq!(score as i64, 141);
    }

    #[test]
    fn root_is_tunable() {
        let charts = weeks(&[&[("A", "X", 16)]]);
        let today = start_of(&charts, 0) + Days::new(100);

        let scores = score_tracks(&charts, today, ForgottenVariant::LastPlay { root: 4 });

        assert!((scores[&id("A", "X")] - 200.0).abs() < 1e-9);
    }

    #[test]
    fn zero_root_scores_nothing() {
        let charts = weeks(&[&[("A", "X", 16)]]);
        let today = start_of(&charts, 0) + Days::new(100);

        let variant = ForgottenVariant::LastPlay { root: 0 };

        assert!(score_tracks(&charts, today, variant).is_empty());
        assert!(most_forgotten(&charts, today, variant, 20).is_empty());
    }

    #[test]
    fn squared_recency_prefers_old_and_rare() {
        let charts = weeks(&[&[("Old", "Rare", 1), ("New", "Often", 1)], &[("New", "Often", 9)]]);
        let today = start_of(&charts, 1) + Days::new(7);

        let scores = score_tracks(&charts, today, ForgottenVariant::SquaredRecency);

        // Old: 14 days, once. New: 14 + 7 days, ten plays.
        assert!((scores[&id("Old", "Rare")] - 196.0).abs() < 1e-9);
        assert!((scores[&id("New", "Often")] - 441.0 / 10f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn squared_recency_skips_zero_plays() {
        let charts = weeks(&[&[("A", "X", 0), ("B", "Y", 1)]]);
        let today = start_of(&charts, 0) + Days::new(3);

        let scores = score_tracks(&charts, today, ForgottenVariant::SquaredRecency);

        assert!(!scores.contains_key(&id("A", "X")));
        assert!(scores.contains_key(&id("B", "Y")));
    }

    #[test]
    fn decay_surfaces_tracks_played_long_ago() {
        let empty: &[(&str, &str, u64)] = &[];
        let mut tracks = vec![empty; 104];
        tracks[0] = &[("Then", "Loved", 10)];
        tracks[103] = &[("Now", "Loved", 10)];
        let charts = weeks(&tracks);
        let today = start_of(&charts, 103);

        let top = most_forgotten(&charts, today, ForgottenVariant::Decay, 20);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].track_id, id("Then", "Loved"));
        assert!(top[0].score > top[1].score);
        assert!(top.iter().all(|f| f.score < 0.0));
    }

    #[test]
    fn most_forgotten_truncates_descending() {
        let charts = weeks(&[
            &[("A", "1", 1), ("A", "2", 1), ("A", "3", 1)],
            &[("A", "2", 1)],
            &[("A", "3", 1)],
        ]);
        let today = start_of(&charts, 2) + Days::new(1);

        let top = most_forgotten(&charts, today, ForgottenVariant::default(), 2);

        let ids: Vec<_> = top.iter().map(|f| f.track_id.title.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(top[0].history.playcount, 1);
    }

    #[test]
    fn no_weeks_no_scores() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        assert!(track_histories(&[], today).is_empty());
        assert!(most_forgotten(&[], today, ForgottenVariant::Decay, 20).is_empty());
    }
}
