use std::collections::{BTreeMap, HashMap};

use crate::domain::{
    chart::{WeeklyChart, entries},
    track::TrackMetadata,
    track_id::TrackId,
};

/// Total plays per track over every loaded week.
pub fn track_playcounts(charts: &[WeeklyChart]) -> BTreeMap<TrackId, u64> {
    let mut playcount = BTreeMap::new();
    for (_, entry) in entries(charts) {
        *playcount.entry(entry.track_id.clone()).or_insert(0) += entry.playcount;
    }
    playcount
}

/// Milliseconds spent listening to each track: duration times play count.
///
/// Only tracks with metadata are included. A track that was never looked up
/// is absent from the result rather than counted as zero.
pub fn time_listened(
    charts: &[WeeklyChart],
    metadata: &HashMap<TrackId, TrackMetadata>,
) -> BTreeMap<TrackId, u64> {
    time_listened_from(&track_playcounts(charts), metadata)
}

/// Same as [`time_listened`], for play counts that were already aggregated.
pub fn time_listened_from(
    playcount: &BTreeMap<TrackId, u64>,
    metadata: &HashMap<TrackId, TrackMetadata>,
) -> BTreeMap<TrackId, u64> {
    playcount
        .iter()
        .filter_map(|(id, &plays)| {
            let info = metadata.get(id)?;
            Some((id.clone(), info.duration_ms.saturating_mul(plays)))
        })
        .collect()
}

/// Play counts and listening time summed per group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouped<G> {
    pub playcount: BTreeMap<G, u64>,
    pub time_listened: BTreeMap<G, u64>,
}

impl<G: Ord> Grouped<G> {
    pub fn total_time(&self) -> u64 {
        self.time_listened.values().sum()
    }
}

/// Re-keys the per-track aggregates by `group` and sums them.
///
/// Tracks for which `group` returns `None` are left out of both maps.
pub fn longest_listened_by<G, F>(
    charts: &[WeeklyChart],
    metadata: &HashMap<TrackId, TrackMetadata>,
    group: F,
) -> Grouped<G>
where
    G: Ord,
    F: Fn(&TrackId, Option<&TrackMetadata>) -> Option<G>,
{
    let track_playcount = track_playcounts(charts);
    let track_time = time_listened_from(&track_playcount, metadata);

    let mut grouped = Grouped {
        playcount: BTreeMap::new(),
        time_listened: BTreeMap::new(),
    };

    for (id, time) in &track_time {
        if let Some(key) = group(id, metadata.get(id)) {
            *grouped.time_listened.entry(key).or_insert(0) += time;
        }
    }
    for (id, plays) in &track_playcount {
        if let Some(key) = group(id, metadata.get(id)) {
            *grouped.playcount.entry(key).or_insert(0) += plays;
        }
    }

    grouped
}

pub fn longest_listened_by_artist(
    charts: &[WeeklyChart],
    metadata: &HashMap<TrackId, TrackMetadata>,
) -> Grouped<String> {
    longest_listened_by(charts, metadata, |id, _| Some(id.artist.clone()))
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AlbumKey {
    pub artist: String,
    pub album: String,
}

/// Groups by (artist, album title); tracks without a known album are skipped.
pub fn longest_listened_by_album(
    charts: &[WeeklyChart],
    metadata: &HashMap<TrackId, TrackMetadata>,
) -> Grouped<AlbumKey> {
    longest_listened_by(charts, metadata, |id, info| {
        let album = info?.album_title()?;
        Some(AlbumKey {
            artist: id.artist.clone(),
            album: album.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use super::*;
    use crate::domain::{
        chart::chart,
        track::{Album, TrackMetadata},
        track_id::TrackId,
    };

    fn info(artist: &str, title: &str, duration_ms: u64, album: Option<&str>) -> TrackMetadata {
        TrackMetadata {
            artist: artist.to_string(),
            title: title.to_string(),
            duration_ms,
            album: album.map(|title| Album {
                title: title.to_string(),
            }),
        }
    }

    fn index(infos: Vec<TrackMetadata>) -> HashMap<TrackId, TrackMetadata> {
        infos.into_iter().map(|i| (i.id(), i)).collect()
    }

    fn id(artist: &str, title: &str) -> TrackId {
        TrackId::new(artist, title)
    }

    #[test]
    fn playcounts_sum_across_weeks() {
        let charts = vec![
            chart(0, &[("A", "X", 5), ("B", "Y", 3)]),
            chart(604800, &[("A", "X", 2), ("C", "Z", 1)]),
        ];

        let playcount = track_playcounts(&charts);

        assert_eq!(
            playcount,
            BTreeMap::from([(id("A", "X"), 7), (id("B", "Y"), 3), (id("C", "Z"), 1)])
        );

        let entry_total: u64 = charts
            .iter()
            .flat_map(|w| w.tracks.iter().map(|e| e.playcount))
            .sum();
        assert_eq!(playcount.values().sum::<u64>(), entry_total);
    }

    #[test]
    fn empty_history_gives_empty_aggregates() {
        let metadata = index(vec![info("A", "X", 1000, Some("Album"))]);

        assert!(track_playcounts(&[]).is_empty());
        assert!(time_listened(&[], &metadata).is_empty());

        let by_album = longest_listened_by_album(&[], &metadata);
        assert!(by_album.playcount.is_empty());
        assert!(by_album.time_listened.is_empty());
    }

    #[test]
    fn time_listened_excludes_tracks_without_metadata() {
        let charts = vec![chart(0, &[("A", "X", 5), ("B", "Y", 3)])];
        let metadata = index(vec![info("A", "X", 1000, None)]);

        let playcount = track_playcounts(&charts);
        assert_eq!(playcount, BTreeMap::from([(id("A", "X"), 5), (id("B", "Y"), 3)]));

        let time = time_listened(&charts, &metadata);
        assert_eq!(time, BTreeMap::from([(id("A", "X"), 5000)]));
    }

    #[test]
    fn time_listened_keys_are_exact_intersection() {
        let charts = vec![chart(0, &[("A", "X", 1), ("B", "Y", 1)])];
        let metadata = index(vec![
            info("A", "X", 0, None),
            info("Never", "Played", 1000, None),
        ]);

        let time = time_listened(&charts, &metadata);

        // zero duration is kept, only missing metadata is dropped
        assert_eq!(time.keys().collect::<Vec<_>>(), vec![&id("A", "X")]);
        assert_eq!(time[&id("A", "X")], 0);
    }

    #[test]
    fn artist_rollup_sums_time_and_counts_all_plays() {
        let charts = vec![chart(
            0,
            &[("A", "X", 2), ("A", "W", 1), ("A", "Unknown", 4), ("B", "Y", 3)],
        )];
        let metadata = index(vec![
            info("A", "X", 1000, None),
            info("A", "W", 500, None),
            info("B", "Y", 100, None),
        ]);

        let by_artist = longest_listened_by_artist(&charts, &metadata);

        assert_eq!(
            by_artist.time_listened,
            BTreeMap::from([("A".to_string(), 2500), ("B".to_string(), 300)])
        );
        assert_eq!(
            by_artist.playcount,
            BTreeMap::from([("A".to_string(), 7), ("B".to_string(), 3)])
        );
        assert_eq!(by_artist.total_time(), 2800);
    }

    #[test]
    fn album_rollup_skips_tracks_without_album() {
        let charts = vec![chart(0, &[("A", "X", 2), ("A", "Single", 5), ("B", "Y", 1)])];
        let metadata = index(vec![
            info("A", "X", 1000, Some("First")),
            info("A", "Single", 1000, None),
            info("B", "Y", 3000, Some("First")),
        ]);

        let by_album = longest_listened_by_album(&charts, &metadata);

        let a_first = AlbumKey {
            artist: "A".to_string(),
            album: "First".to_string(),
        };
        let b_first = AlbumKey {
            artist: "B".to_string(),
            album: "First".to_string(),
        };
        assert_eq!(
            by_album.time_listened,
            BTreeMap::from([(a_first.clone(), 2000), (b_first.clone(), 3000)])
        );
        assert_eq!(
            by_album.playcount,
            BTreeMap::from([(a_first, 2), (b_first, 1)])
        );
    }

    #[test]
    fn aggregation_does_not_touch_input() {
        let charts = vec![chart(0, &[("A", "X", 5)])];
        let metadata = index(vec![info("A", "X", 10, None)]);
        let before = charts.clone();

        let first = time_listened(&charts, &metadata);
        let second = time_listened(&charts, &metadata);

        assert_eq!(first, second);
        assert_eq!(charts, before);
    }
}
