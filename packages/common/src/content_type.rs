#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of catalog entry that can carry reviews and appear in lists.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "movie"))]
    Movie,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "series"))]
    Series,
    /// A single episode; its parent is a season.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "episode"))]
    Episode,
    /// A season of a series; its parent is a series.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "season"))]
    Season,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "actor"))]
    Actor,
    /// Any non-cast credit (director, writer, composer, ...).
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "crew"))]
    Crew,
}

impl ContentType {
    pub const ALL: &'static [ContentType] = &[
        Self::Movie,
        Self::Series,
        Self::Episode,
        Self::Season,
        Self::Actor,
        Self::Crew,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
            Self::Episode => "episode",
            Self::Season => "season",
            Self::Actor => "actor",
            Self::Crew => "crew",
        }
    }

    /// The content type an entry of this type must be nested under, if any.
    pub fn parent_type(&self) -> Option<ContentType> {
        match self {
            Self::Season => Some(Self::Series),
            Self::Episode => Some(Self::Season),
            _ => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an unknown content type tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Invalid content type '{invalid}'. Valid values: movie, series, episode, season, actor, crew"
)]
pub struct ParseContentTypeError {
    invalid: String,
}

impl FromStr for ContentType {
    type Err = ParseContentTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseContentTypeError {
                invalid: s.to_string(),
            })
    }
}
