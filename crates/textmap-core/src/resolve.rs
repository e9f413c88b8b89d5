//! Resolution policies: which member of an overlapping pair is discarded.
//!
//! Decisions are made independently per pair and accumulated into a single
//! removal set. This is pairwise-greedy, not cluster-optimal: in a chain of
//! overlaps the survivors are whatever the individual pair decisions leave,
//! not a globally best representative per cluster.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::block::PageRect;
use crate::error::TextmapError;
use crate::overlap::OverlapPair;

/// Rule used to pick the discarded member of an overlapping pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ResolutionPolicy {
    /// Drop the smaller-area rectangle; on an exact tie drop the later one.
    #[default]
    KeepLargest,
    /// Always drop the later rectangle, trusting input order.
    KeepFirst,
}

impl ResolutionPolicy {
    /// All supported policies.
    pub const ALL: [ResolutionPolicy; 2] =
        [ResolutionPolicy::KeepLargest, ResolutionPolicy::KeepFirst];

    /// The policy's tag as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionPolicy::KeepLargest => "keep_largest",
            ResolutionPolicy::KeepFirst => "keep_first",
        }
    }

    /// Input index of the pair member this policy discards.
    pub fn loser<T: PageRect>(&self, items: &[T], pair: &OverlapPair) -> usize {
        match self {
            ResolutionPolicy::KeepLargest => {
                let first_area = items[pair.first].rect().area();
                let second_area = items[pair.second].rect().area();
                if second_area > first_area {
                    pair.first
                } else {
                    pair.second
                }
            }
            ResolutionPolicy::KeepFirst => pair.second,
        }
    }

    /// Positions to remove, given the detected overlap pairs.
    ///
    /// Every pair marks exactly one member; a rectangle marked by several
    /// pairs is removed once.
    pub fn resolve<T: PageRect>(&self, items: &[T], pairs: &[OverlapPair]) -> BTreeSet<usize> {
        pairs.iter().map(|pair| self.loser(items, pair)).collect()
    }
}

impl fmt::Display for ResolutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolutionPolicy {
    type Err = TextmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResolutionPolicy::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| TextmapError::UnknownPolicy(s.to_string()))
    }
}
