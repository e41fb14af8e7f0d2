use std::{cmp::Ordering, collections::BTreeMap};

/// Values a mapping can be ranked by.
///
/// Floats are compared with [`f64::total_cmp`] so sorting never sees an
/// inconsistent order.
pub trait RankValue: Copy {
    fn compare(&self, other: &Self) -> Ordering;
}

impl RankValue for u64 {
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl RankValue for usize {
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl RankValue for f64 {
    fn compare(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

/// Order in which keys with equal values are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Ascending key order.
    #[default]
    KeyOrder,
    /// Descending key order.
    ReverseKeyOrder,
}

/// Sorts the mapping descending by value, ties in key order.
pub fn ranked_by<K: Ord + Clone, V: RankValue>(mapping: &BTreeMap<K, V>) -> Vec<(K, V)> {
    ranked_by_with(mapping, TieBreak::KeyOrder)
}

/// Like [`ranked_by`], with equal values listed in the order `tie_break` picks.
pub fn ranked_by_with<K: Ord + Clone, V: RankValue>(
    mapping: &BTreeMap<K, V>,
    tie_break: TieBreak,
) -> Vec<(K, V)> {
    let pairs = mapping.iter().map(|(k, v)| (k.clone(), *v));
    let mut ranked: Vec<(K, V)> = match tie_break {
        TieBreak::KeyOrder => pairs.collect(),
        TieBreak::ReverseKeyOrder => pairs.rev().collect(),
    };
    // stable: equal values keep the order chosen above
    ranked.sort_by(|(_, a), (_, b)| b.compare(a));
    ranked
}

/// 1-based position of every key in [`ranked_by`]; rank 1 is the largest value.
///
/// Tied values still get distinct ranks, so the result is a bijection onto
/// `1..=mapping.len()`.
pub fn rank<K: Ord + Clone, V: RankValue>(mapping: &BTreeMap<K, V>) -> BTreeMap<K, usize> {
    ranked_by(mapping)
        .into_iter()
        .enumerate()
        .map(|(i, (key, _))| (key, i + 1))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mover<K> {
    pub key: K,
    pub playcount_rank: usize,
    pub time_rank: usize,
    /// `playcount_rank / time_rank`
    pub divergence: f64,
}

/// Keys ranked very differently by play count and by listening time.
#[derive(Debug, Clone, PartialEq)]
pub struct Movers<K> {
    /// Ascending by divergence, ties in key order.
    movers: Vec<Mover<K>>,
}

impl<K: Clone> Movers<K> {
    /// Ranked much higher by play count than by time: short tracks played often.
    pub fn short_and_frequent(&self) -> &[Mover<K>] {
        &self.movers
    }

    /// Ranked much higher by time than by play count: long tracks played rarely.
    pub fn long_and_rare(&self) -> Vec<Mover<K>> {
        let mut movers = self.movers.clone();
        movers.sort_by(|a, b| b.divergence.compare(&a.divergence));
        movers
    }
}

/// Compares the play count rank of every key with its listening time rank.
///
/// Keys missing from either mapping, or with zero time listened, are left out.
pub fn biggest_movers<K: Ord + Clone>(
    playcount: &BTreeMap<K, u64>,
    time_listened: &BTreeMap<K, u64>,
) -> Movers<K> {
    let playcount_ranks = rank(playcount);
    let time_ranks = rank(time_listened);

    let mut movers: Vec<Mover<K>> = time_ranks
        .into_iter()
        .filter(|(key, _)| time_listened.get(key).is_some_and(|&t| t != 0))
        .filter_map(|(key, time_rank)| {
            let playcount_rank = *playcount_ranks.get(&key)?;
            Some(Mover {
                divergence: playcount_rank as f64 / time_rank as f64,
                key,
                playcount_rank,
                time_rank,
            })
        })
        .collect();
    movers.sort_by(|a, b| a.divergence.compare(&b.divergence));

    Movers { movers }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedRank<K> {
    pub key: K,
    pub playcount_rank: usize,
    pub time_rank: usize,
    pub rank_sum: usize,
    /// Rank of `rank_sum` among all sums; the largest sum gets 1.
    pub combined: usize,
}

/// Sums the play count and time ranks of every key present in both mappings,
/// ranks those sums, and lists keys descending by that rank.
///
/// Since the largest (worst) sum is ranked 1, the first entry is the key with
/// the smallest rank sum.
pub fn combined_rank<K: Ord + Clone>(
    playcount: &BTreeMap<K, u64>,
    time_listened: &BTreeMap<K, u64>,
) -> Vec<CombinedRank<K>> {
    let playcount_ranks = rank(playcount);
    let time_ranks = rank(time_listened);

    let sums: BTreeMap<K, usize> = playcount_ranks
        .iter()
        .filter_map(|(key, p)| time_ranks.get(key).map(|t| (key.clone(), p + t)))
        .collect();
    let reranked = rank(&sums);

    ranked_by(&reranked)
        .into_iter()
        .map(|(key, combined)| CombinedRank {
            playcount_rank: playcount_ranks[&key],
            time_rank: time_ranks[&key],
            rank_sum: sums[&key],
            combined,
            key,
        })
        .collect()
}
