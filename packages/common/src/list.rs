use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Access level granted to a user a list is shared with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SharePermission {
    View,
    Edit,
}

impl SharePermission {
    pub fn from_can_edit(can_edit: bool) -> Self {
        if can_edit { Self::Edit } else { Self::View }
    }

    pub fn can_edit(self) -> bool {
        self == Self::Edit
    }
}

/// How the acting user relates to a list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ListRole {
    Owner,
    Editor,
    Viewer,
}

impl ListRole {
    /// `None` when the user neither owns the list nor holds a share on it.
    pub fn resolve(owner_id: i32, user_id: i32, share: Option<SharePermission>) -> Option<Self> {
        if owner_id == user_id {
            return Some(Self::Owner);
        }
        share.map(|p| match p {
            SharePermission::Edit => Self::Editor,
            SharePermission::View => Self::Viewer,
        })
    }

    /// Owners and edit-level share holders may reorder, add, remove and share.
    pub fn can_edit(self) -> bool {
        matches!(self, Self::Owner | Self::Editor)
    }
}

/// Presentation mode of a list's item grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Browsing,
    Editing,
}

impl ViewMode {
    pub fn begin_editing(self) -> Self {
        Self::Editing
    }

    /// Return to browsing. The flag is true when leaving edit mode, meaning the
    /// current order must be committed.
    pub fn finish_editing(self) -> (Self, bool) {
        (Self::Browsing, self == Self::Editing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReorderError {
    #[error("At least one item is required to reorder")]
    Empty,
    #[error("Item {0} appears more than once in the reorder list")]
    Duplicate(i32),
    #[error("Item {0} does not belong to this list")]
    NotInList(i32),
    #[error("Reorder list is missing items {missing:?}")]
    Incomplete { missing: Vec<i32> },
    #[error("Too many items to reorder")]
    TooLarge,
}

/// Map a requested ordering onto zero-based positions.
///
/// `requested` must be a permutation of `current`: the i-th id gets position i,
/// so the result is always contiguous and gap-free.
pub fn plan_reorder(current: &[i32], requested: &[i32]) -> Result<Vec<(i32, i32)>, ReorderError> {
    if requested.is_empty() {
        return Err(ReorderError::Empty);
    }
    let members: HashSet<i32> = current.iter().copied().collect();
    let mut seen = HashSet::with_capacity(requested.len());
    for &id in requested {
        if !members.contains(&id) {
            return Err(ReorderError::NotInList(id));
        }
        if !seen.insert(id) {
            return Err(ReorderError::Duplicate(id));
        }
    }
    if seen.len() != members.len() {
        let mut missing: Vec<i32> = members.difference(&seen).copied().collect();
        missing.sort_unstable();
        return Err(ReorderError::Incomplete { missing });
    }

    requested
        .iter()
        .enumerate()
        .map(|(i, &id)| {
            i32::try_from(i)
                .map(|pos| (id, pos))
                .map_err(|_| ReorderError::TooLarge)
        })
        .collect()
}

/// True when the positions are exactly `0..n` in some order.
pub fn is_contiguous<I>(positions: I) -> bool
where
    I: IntoIterator<Item = i32>,
{
    let mut sorted: Vec<i32> = positions.into_iter().collect();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(i, &p)| i32::try_from(i).is_ok_and(|i| i == p))
}
