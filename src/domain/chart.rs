use chrono::{DateTime, Local, NaiveDate};

use super::track::TrackEntry;

pub type SecondsSinceUnix = i64;

/// Play counts per track for one window `[from, to)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyChart {
    pub from: SecondsSinceUnix,
    pub to: SecondsSinceUnix,
    pub tracks: Vec<TrackEntry>,
}

impl WeeklyChart {
    pub fn new(from: SecondsSinceUnix, to: SecondsSinceUnix, tracks: Vec<TrackEntry>) -> Self {
        Self { from, to, tracks }
    }

    /// Local calendar date the window starts on.
    ///
    /// Returns `None` only for timestamps chrono cannot represent.
    pub fn start_date(&self) -> Option<NaiveDate> {
        seconds_to_local_date(self.from)
    }
}

/// converts number of seconds since unix epoch to the local calendar date
pub fn seconds_to_local_date(since_unix: SecondsSinceUnix) -> Option<NaiveDate> {
    let utc = DateTime::from_timestamp(since_unix, 0)?;
    Some(DateTime::<Local>::from(utc).date_naive())
}

/// Iterates over every (week, entry) pair, oldest week first.
pub fn entries(charts: &[WeeklyChart]) -> impl Iterator<Item = (&WeeklyChart, &TrackEntry)> {
    charts
        .iter()
        .flat_map(|week| week.tracks.iter().map(move |entry| (week, entry)))
}

/// Test helper: builds a chart from `(artist, title, playcount)` triples.
#[cfg(test)]
pub fn chart(from: SecondsSinceUnix, tracks: &[(&str, &str, u64)]) -> WeeklyChart {
    use super::track_id::TrackId;

    const WEEK: SecondsSinceUnix = 7 * 24 * 3600;
    WeeklyChart::new(
        from,
        from + WEEK,
        tracks
            .iter()
            .map(|(artist, title, n)| TrackEntry::new(TrackId::new(*artist, *title), *n))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::{chart, entries};

    #[test]
    fn entries_walks_weeks_in_order() {
        let charts = vec![
            chart(0, &[("A", "X", 1), ("B", "Y", 2)]),
            chart(604800, &[("A", "X", 3)]),
        ];

        let seen: Vec<_> = entries(&charts)
            .map(|(week, e)| (week.from, e.track_id.title.clone(), e.playcount))
            .collect();

        assert_eq!(
            seen,
            vec![
                (0, "X".to_string(), 1),
                (0, "Y".to_string(), 2),
                (604800, "X".to_string(), 3),
            ]
        );
    }

    #[test]
    fn entries_of_empty_history_is_empty() {
        assert_eq!(entries(&[]).count(), 0);
    }

    #[test]
    fn start_date_is_defined_for_realistic_windows() {
        let week = chart(1_555_243_200, &[]);
        assert!(week.start_date().is_some());
    }
}
