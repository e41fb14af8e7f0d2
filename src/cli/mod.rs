use clap::{Parser, Subcommand, ValueEnum};
use std::{
    collections::HashMap,
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::Local;

use crate::{
    config::Config,
    domain::{chart::WeeklyChart, track::TrackMetadata, track_id::TrackId},
    lastfm::LastFmClient,
    report::{self, Summary},
    stats::{
        ForgottenVariant, TieBreak, biggest_movers, combined_rank, longest_listened_by_album,
        longest_listened_by_artist, most_forgotten, ranked_by_with, time_listened_from,
        track_playcounts,
    },
    storage::{error::StorageError, operations::ChartStore},
    sync,
};

#[derive(Parser)]
#[command(name = "chartstats")]
#[command(version)]
#[command(about = "Listening statistics from Last.fm weekly charts")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Number of rows to print, overrides the config
    #[arg(short = 'n', long, global = true)]
    pub top: Option<usize>,

    /// Order of songs, artists and albums with equal time listened
    #[arg(long, value_enum, global = true, default_value_t = Ties::Key)]
    pub ties: Ties,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download weekly charts missing from the cache
    Fetch {
        /// How many of the most recent weeks to keep cached
        #[arg(short, long)]
        weeks: Option<usize>,
        /// Download every week again
        #[arg(long)]
        refresh: bool,
    },
    /// Look up duration and album of charted tracks
    FetchInfo,
    /// Show what is in the cache
    Status,
    /// Songs by time listened
    Songs,
    /// Artists by time listened
    Artists,
    /// Albums by time listened
    Albums,
    /// Songs ranked very differently by plays and by time listened
    Movers,
    /// Songs by play count rank plus time listened rank
    Combined,
    /// Songs you used to play a lot but not anymore
    Forgotten {
        #[arg(long, value_enum, default_value_t = Variant::V2)]
        variant: Variant,
        /// Root applied to the play count by v2
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        root: Option<u32>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// squared days since each play over sqrt(plays)
    V1,
    /// days since last play times a root of the play count
    V2,
    /// recent plays, decayed by a one year half-life, against all plays
    V3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Ties {
    /// ascending by artist, then title
    Key,
    /// descending by artist, then title
    ReverseKey,
}

impl From<Ties> for TieBreak {
    fn from(ties: Ties) -> Self {
        match ties {
            Ties::Key => TieBreak::KeyOrder,
            Ties::ReverseKey => TieBreak::ReverseKeyOrder,
        }
    }
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = Config::load(&cli.config)?;
    let base_dir = cli.config.parent().unwrap_or(Path::new("."));
    let store = ChartStore::new(&cfg.cache, base_dir);
    let top = cli.top.unwrap_or(cfg.report.top);
    let ties = TieBreak::from(cli.ties);
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Fetch { weeks, refresh } => {
            let client = LastFmClient::new(&cfg.lastfm)?;
            let weeks = weeks.unwrap_or(cfg.fetch.weeks);
            let fetched = sync::fetch_charts(&client, &store, weeks, refresh)?;
            writeln!(
                out,
                "Fetched {} weeks, {} weeks cached",
                fetched.fetched, fetched.cached
            )?;
        }

        Commands::FetchInfo => {
            let client = LastFmClient::new(&cfg.lastfm)?;
            let fetched = sync::fetch_track_info(&client, &store)?;
            writeln!(out, "Looked up {} tracks", fetched.fetched)?;
            if !fetched.not_found.is_empty() {
                writeln!(out, "Not found on Last.fm ({}):", fetched.not_found.len())?;
                for id in &fetched.not_found {
                    writeln!(out, "    - {id}")?;
                }
            }
        }

        Commands::Status => {
            let charts = match store.load_charts() {
                Err(StorageError::CacheMissing(_)) => Vec::new(),
                charts => charts?,
            };
            let metadata = store.load_track_metadata()?;
            report::print_summary(&mut out, &summarize(&charts, &metadata))?;
        }

        Commands::Songs => {
            let (charts, metadata) = load(&store)?;
            let playcount = track_playcounts(&charts);
            let ranked = ranked_by_with(&time_listened_from(&playcount, &metadata), ties);
            report::print_songs(&mut out, head(&ranked, top), &playcount)?;
        }

        Commands::Artists => {
            let (charts, metadata) = load(&store)?;
            let grouped = longest_listened_by_artist(&charts, &metadata);
            let ranked = ranked_by_with(&grouped.time_listened, ties);
            report::print_artists(&mut out, head(&ranked, top), &grouped)?;
        }

        Commands::Albums => {
            let (charts, metadata) = load(&store)?;
            let grouped = longest_listened_by_album(&charts, &metadata);
            let ranked = ranked_by_with(&grouped.time_listened, ties);
            report::print_albums(&mut out, head(&ranked, top), &grouped)?;
        }

        Commands::Movers => {
            let (charts, metadata) = load(&store)?;
            let playcount = track_playcounts(&charts);
            let movers = biggest_movers(&playcount, &time_listened_from(&playcount, &metadata));
            report::print_movers(
                &mut out,
                "Played often, listened briefly",
                head(movers.short_and_frequent(), top),
            )?;
            writeln!(out)?;
            report::print_movers(
                &mut out,
                "Played rarely, listened long",
                head(&movers.long_and_rare(), top),
            )?;
        }

        Commands::Combined => {
            let (charts, metadata) = load(&store)?;
            let playcount = track_playcounts(&charts);
            let combined = combined_rank(&playcount, &time_listened_from(&playcount, &metadata));
            report::print_combined(&mut out, head(&combined, top))?;
        }

        Commands::Forgotten { variant, root } => {
            let charts = store.load_charts()?;
            let variant = match variant {
                Variant::V1 => ForgottenVariant::SquaredRecency,
                Variant::V2 => ForgottenVariant::LastPlay {
                    root: root.unwrap_or(cfg.report.forgotten_root),
                },
                Variant::V3 => ForgottenVariant::Decay,
            };
            let today = Local::now().date_naive();
            let n = cli.top.unwrap_or(cfg.report.forgotten_top);
            let rows = most_forgotten(&charts, today, variant, n);
            report::print_forgotten(&mut out, variant, &rows)?;
        }
    }

    Ok(())
}

fn load(
    store: &ChartStore,
) -> Result<(Vec<WeeklyChart>, HashMap<TrackId, TrackMetadata>), StorageError> {
    Ok((store.load_charts()?, store.load_track_metadata()?))
}

fn head<T>(rows: &[T], n: usize) -> &[T] {
    &rows[..rows.len().min(n)]
}

fn summarize(charts: &[WeeklyChart], metadata: &HashMap<TrackId, TrackMetadata>) -> Summary {
    let playcount = track_playcounts(charts);
    let time = time_listened_from(&playcount, metadata);
    Summary {
        weeks: charts.len(),
        first_week: charts.first().and_then(|w| w.start_date()),
        last_week: charts.last().and_then(|w| w.start_date()),
        tracks: playcount.len(),
        tracks_with_info: time.len(),
        plays: playcount.values().sum(),
        time_listened_ms: time.values().sum(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use clap::Parser;

    use super::*;
    use crate::domain::chart::chart;

    #[test]
    fn parses_forgotten_with_variant_and_root() {
        let cli = Cli::try_parse_from([
            "chartstats",
            "-c",
            "/tmp/c.toml",
            "forgotten",
            "--variant",
            "v1",
            "--root",
            "4",
            "-n",
            "5",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("/tmp/c.toml"));
        assert_eq!(cli.top, Some(5));
        assert!(matches!(
            cli.command,
            Commands::Forgotten {
                variant: Variant::V1,
                root: Some(4)
            }
        ));
    }

    #[test]
    fn forgotten_defaults_to_v2() {
        let cli = Cli::try_parse_from(["chartstats", "forgotten"]).unwrap();

        assert_eq!(cli.config, PathBuf::from("config.toml"));
        assert!(matches!(
            cli.command,
            Commands::Forgotten {
                variant: Variant::V2,
                root: None
            }
        ));
    }

    #[test]
    fn zero_root_is_rejected() {
        assert!(Cli::try_parse_from(["chartstats", "forgotten", "--root", "0"]).is_err());
    }

    #[test]
    fn parses_fetch_flags() {
        let cli =
            Cli::try_parse_from(["chartstats", "fetch", "--weeks", "52", "--refresh"]).unwrap();

        assert!(matches!(
            cli.command,
            Commands::Fetch {
                weeks: Some(52),
                refresh: true
            }
        ));
    }

    #[test]
    fn ties_default_to_key_order() {
        let cli = Cli::try_parse_from(["chartstats", "songs"]).unwrap();
        assert_eq!(TieBreak::from(cli.ties), TieBreak::KeyOrder);

        let cli = Cli::try_parse_from(["chartstats", "albums", "--ties", "reverse-key"]).unwrap();
        assert_eq!(cli.ties, Ties::ReverseKey);
        assert_eq!(TieBreak::from(cli.ties), TieBreak::ReverseKeyOrder);
    }

    #[test]
    fn head_never_overruns() {
        assert_eq!(head(&[1, 2, 3], 2), &[1, 2]);
        assert_eq!(head(&[1, 2, 3], 10), &[1, 2, 3]);
        assert!(head::<u8>(&[], 3).is_empty());
    }

    #[test]
    fn summary_counts_plays_and_known_tracks() {
        let charts = vec![
            chart(1_555_243_200, &[("A", "X", 5), ("B", "Y", 3)]),
            chart(1_555_848_000, &[("A", "X", 1)]),
        ];
        let info = TrackMetadata {
            artist: "A".into(),
            title: "X".into(),
            duration_ms: 1000,
            album: None,
        };
        let metadata = HashMap::from([(info.id(), info)]);

        let summary = summarize(&charts, &metadata);

        assert_eq!(summary.weeks, 2);
        assert_eq!(summary.tracks, 2);
        assert_eq!(summary.tracks_with_info, 1);
        assert_eq!(summary.plays, 9);
        assert_eq!(summary.time_listened_ms, 6000);
        assert!(summary.first_week < summary.last_week);
    }
}
