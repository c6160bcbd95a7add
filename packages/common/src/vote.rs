#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a vote on a review.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum VotePolarity {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "up"))]
    Up,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "down"))]
    Down,
}

impl VotePolarity {
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for VotePolarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid vote polarity '{invalid}'. Valid values: up, down")]
pub struct ParsePolarityError {
    invalid: String,
}

impl FromStr for VotePolarity {
    type Err = ParsePolarityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err(ParsePolarityError {
                invalid: s.to_string(),
            }),
        }
    }
}

/// A viewer's vote on one review. Both flags are never true at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct VoteState {
    pub is_upvoted: bool,
    pub is_downvoted: bool,
}

impl VoteState {
    pub fn from_current(current: Option<VotePolarity>) -> Self {
        Self {
            is_upvoted: current == Some(VotePolarity::Up),
            is_downvoted: current == Some(VotePolarity::Down),
        }
    }

    /// Resolve the viewer's state against a review's `(voter_id, polarity)` set.
    ///
    /// Anonymous viewers never have a vote.
    pub fn resolve<I>(viewer: Option<i32>, votes: I) -> Self
    where
        I: IntoIterator<Item = (i32, VotePolarity)>,
    {
        let Some(viewer) = viewer else {
            return Self::default();
        };
        let current = votes
            .into_iter()
            .find(|(voter, _)| *voter == viewer)
            .map(|(_, polarity)| polarity);
        Self::from_current(current)
    }
}

/// The single write needed to apply a vote cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteChange {
    /// No prior vote: insert one.
    Record(VotePolarity),
    /// Opposite vote exists: flip it in place.
    Switch {
        from: VotePolarity,
        to: VotePolarity,
    },
    /// Same vote exists: casting it again removes it.
    Retract(VotePolarity),
}

impl VoteChange {
    pub fn plan(existing: Option<VotePolarity>, requested: VotePolarity) -> Self {
        match existing {
            None => Self::Record(requested),
            Some(current) if current == requested => Self::Retract(requested),
            Some(current) => Self::Switch {
                from: current,
                to: requested,
            },
        }
    }

    /// The vote the viewer holds after the change.
    pub fn outcome(&self) -> Option<VotePolarity> {
        match *self {
            Self::Record(p) => Some(p),
            Self::Switch { to, .. } => Some(to),
            Self::Retract(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct VoteTally {
    pub upvotes: u64,
    pub downvotes: u64,
}

impl VoteTally {
    pub fn add(&mut self, polarity: VotePolarity) {
        match polarity {
            VotePolarity::Up => self.upvotes += 1,
            VotePolarity::Down => self.downvotes += 1,
        }
    }

    /// Upvotes minus downvotes.
    pub fn score(&self) -> i64 {
        self.upvotes as i64 - self.downvotes as i64
    }
}

impl FromIterator<VotePolarity> for VoteTally {
    fn from_iter<I: IntoIterator<Item = VotePolarity>>(iter: I) -> Self {
        let mut tally = Self::default();
        for polarity in iter {
            tally.add(polarity);
        }
        tally
    }
}
