//! Genre vote aggregation.
//!
//! Votes collected from the release and its release group are merged, reduced
//! to one entry per name and ranked by vote count.  The selection policy then
//! decides how many of the top entries survive:
//!
//! * with `dynamic_count` off, the top `genre_count` entries are kept;
//! * with `dynamic_count` on, entries tied with the last kept one may overflow
//!   the limit when that entry has at least `dynamic_divider` votes, and
//!   otherwise the cut is moved up to the first clear drop in votes.

use std::collections::BTreeMap;

use crate::musicbrainz::GenreVote;

/// How many genres to keep and how to treat ties at the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPolicy {
    pub genre_count: usize,
    pub dynamic_count: bool,
    pub dynamic_divider: u32,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        SelectionPolicy {
            genre_count: 5,
            dynamic_count: true,
            dynamic_divider: 2,
        }
    }
}

/// Votes gathered for one album, per entity.
#[derive(Debug, Clone, Default)]
pub struct VoteSources {
    pub release: Vec<GenreVote>,
    pub release_group: Vec<GenreVote>,
    pub artist: Vec<GenreVote>,
}

impl VoteSources {
    /// True when neither the release nor the release group produced a vote,
    /// i.e. when the artist fallback would be consulted.
    pub fn release_is_empty(&self) -> bool {
        self.release.is_empty() && self.release_group.is_empty()
    }
}

/// Select the genres for an album.
///
/// Artist votes are only used when the release and release group have none
/// and `artist_fallback` is set; they are never mixed with release votes.
/// Returns the selected names in alphabetical order, or an empty list when
/// there is nothing to select from.
pub fn select_genres(sources: &VoteSources, artist_fallback: bool, policy: &SelectionPolicy) -> Vec<String> {
    let working: Vec<&GenreVote> = if !sources.release_is_empty() {
        sources.release.iter().chain(&sources.release_group).collect()
    } else if artist_fallback {
        sources.artist.iter().collect()
    } else {
        Vec::new()
    };

    if working.is_empty() {
        return Vec::new();
    }

    let ranked = rank_votes(working);
    let kept = apply_policy(ranked, policy);

    let mut names: Vec<String> = kept.into_iter().map(|v| v.name).collect();
    names.sort();
    names
}

/// Collapse votes to one entry per exact name, keeping the highest count, and
/// order them by count descending.  Equal counts stay in name order.
pub fn rank_votes<'a, I>(votes: I) -> Vec<GenreVote>
where
    I: IntoIterator<Item = &'a GenreVote>,
{
    let mut best: BTreeMap<&str, u32> = BTreeMap::new();
    for vote in votes {
        let count = best.entry(vote.name.as_str()).or_insert(vote.count);
        *count = (*count).max(vote.count);
    }

    let mut ranked: Vec<GenreVote> = best
        .into_iter()
        .map(|(name, count)| GenreVote::new(name, count))
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}

/// Apply the count limit to a list ranked by [`rank_votes`].
pub fn apply_policy(mut ranked: Vec<GenreVote>, policy: &SelectionPolicy) -> Vec<GenreVote> {
    let limit = policy.genre_count;
    if limit == 0 {
        return Vec::new();
    }

    if ranked.len() <= limit || !policy.dynamic_count {
        ranked.truncate(limit);
        return ranked;
    }

    // Votes of the last entry that fits within the limit.
    let boundary = ranked[limit - 1].count;
    if boundary >= policy.dynamic_divider {
        ranked.retain(|v| v.count >= boundary);
        return ranked;
    }

    let highest = ranked[0].count;
    let lowest = ranked[ranked.len() - 1].count;
    if highest != lowest {
        let first_excluded = ranked[limit].count;
        ranked.retain(|v| v.count > first_excluded);
    }
    // Uniform counts below the divider: no rule applies, everything is kept.

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn votes(list: &[(&str, u32)]) -> Vec<GenreVote> {
        list.iter().map(|(n, c)| GenreVote::new(n, *c)).collect()
    }

    fn policy(genre_count: usize, dynamic_count: bool, dynamic_divider: u32) -> SelectionPolicy {
        SelectionPolicy {
            genre_count,
            dynamic_count,
            dynamic_divider,
        }
    }

    fn release_only(list: &[(&str, u32)]) -> VoteSources {
        VoteSources {
            release: votes(list),
            ..Default::default()
        }
    }

    #[test]
    fn test_duplicate_names_keep_highest_count() {
        let sources = VoteSources {
            release: votes(&[("rock", 2), ("pop", 1)]),
            release_group: votes(&[("rock", 7), ("pop", 1)]),
            artist: Vec::new(),
        };
        let ranked = rank_votes(sources.release.iter().chain(&sources.release_group));
        assert_eq!(ranked, votes(&[("rock", 7), ("pop", 1)]));
    }

    #[test]
    fn test_rank_ties_are_alphabetical() {
        let ranked = rank_votes(&votes(&[("pop", 3), ("blues", 3), ("rock", 5), ("acid", 1)]));
        assert_eq!(ranked, votes(&[("rock", 5), ("blues", 3), ("pop", 3), ("acid", 1)]));
    }

    #[test]
    fn test_overflow_includes_boundary_ties() {
        let sources = release_only(&[("rock", 5), ("pop", 5), ("jazz", 2), ("blues", 2), ("folk", 1)]);
        let selected = select_genres(&sources, true, &policy(3, true, 2));
        assert_eq!(selected, vec!["blues", "jazz", "pop", "rock"]);
    }

    #[test]
    fn test_hard_cap_without_dynamic_count() {
        let sources = release_only(&[("rock", 5), ("pop", 5), ("jazz", 2), ("blues", 2), ("folk", 1)]);
        let selected = select_genres(&sources, true, &policy(3, false, 2));
        // blues and jazz tie on 2; name order puts blues first.
        assert_eq!(selected, vec!["blues", "pop", "rock"]);
    }

    #[test]
    fn test_short_list_is_not_truncated() {
        let sources = release_only(&[("rock", 1), ("pop", 1)]);
        let selected = select_genres(&sources, true, &policy(5, true, 2));
        assert_eq!(selected, vec!["pop", "rock"]);
    }

    #[test]
    fn test_low_boundary_cuts_at_first_drop() {
        // Boundary entry (rank 3) has 1 vote < divider; the entry after it has 1,
        // so only entries with more than 1 vote survive.
        let ranked = rank_votes(&votes(&[("rock", 4), ("pop", 3), ("jazz", 1), ("folk", 1)]));
        let kept = apply_policy(ranked, &policy(3, true, 2));
        assert_eq!(kept, votes(&[("rock", 4), ("pop", 3)]));
    }

    #[test]
    fn test_low_boundary_with_clear_drop_keeps_limit() {
        let ranked = rank_votes(&votes(&[("rock", 3), ("pop", 1), ("jazz", 0)]));
        let kept = apply_policy(ranked, &policy(2, true, 2));
        assert_eq!(kept, votes(&[("rock", 3), ("pop", 1)]));
    }

    #[test]
    fn test_uniform_counts_below_divider_pass_through() {
        let ranked = rank_votes(&votes(&[("a", 1), ("b", 1), ("c", 1), ("d", 1)]));
        let kept = apply_policy(ranked, &policy(2, true, 2));
        assert_eq!(kept.len(), 4);
    }

    #[test]
    fn test_zero_genre_count_selects_nothing() {
        let sources = release_only(&[("rock", 5)]);
        assert!(select_genres(&sources, true, &policy(0, true, 2)).is_empty());
        assert!(select_genres(&sources, true, &policy(0, false, 2)).is_empty());
    }

    #[test]
    fn test_artist_fallback_only_when_release_empty() {
        let sources = VoteSources {
            release: votes(&[("rock", 1)]),
            release_group: Vec::new(),
            artist: votes(&[("metal", 10)]),
        };
        assert_eq!(select_genres(&sources, true, &SelectionPolicy::default()), vec!["rock"]);

        let sources = VoteSources {
            artist: votes(&[("metal", 10)]),
            ..Default::default()
        };
        assert_eq!(select_genres(&sources, true, &SelectionPolicy::default()), vec!["metal"]);
        assert!(select_genres(&sources, false, &SelectionPolicy::default()).is_empty());
    }

    #[test]
    fn test_no_votes_selects_nothing() {
        let sources = VoteSources::default();
        assert!(select_genres(&sources, true, &SelectionPolicy::default()).is_empty());
    }

    #[test]
    fn test_cap_keeps_highest_votes() {
        let list: Vec<(String, u32)> = (0..20).map(|i| (format!("g{:02}", i), i)).collect();
        let refs: Vec<(&str, u32)> = list.iter().map(|(n, c)| (n.as_str(), *c)).collect();
        let selected = select_genres(&release_only(&refs), true, &policy(5, false, 2));
        assert_eq!(selected, vec!["g15", "g16", "g17", "g18", "g19"]);
    }
}
