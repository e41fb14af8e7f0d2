//! Aggregation and scoring over cached weekly charts.
//!
//! Everything in here is a pure function of its arguments: no I/O, no
//! logging, no caches. Mappings are `BTreeMap`s, so iteration order is key
//! order, and key order is the default tie-break of every ranking.

pub mod forgotten;
pub mod playcount;
pub mod rank;

pub use forgotten::{Forgotten, ForgottenVariant, most_forgotten};
pub use playcount::{
    AlbumKey, Grouped, longest_listened_by_album, longest_listened_by_artist, time_listened_from,
    track_playcounts,
};
pub use rank::{CombinedRank, Mover, TieBreak, biggest_movers, combined_rank, ranked_by_with};
