use std::collections::HashMap;

use chrono::Utc;
use cinelog_common::{ContentType, ListRole, SharePermission, plan_reorder};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr, TransactionSession, TransactionTrait,
};
use tracing::info;

use super::review::usernames;
use crate::entity::{catalog_entry, list_item, list_share, user, user_list};
use crate::error::AppError;
use crate::models::list::{
    CreateListRequest, ListDetailResponse, ListItemResponse, ListSummary, MyListsResponse,
    ShareResponse, UpdateListRequest,
};

fn list_not_found() -> AppError {
    AppError::NotFound("List not found".into())
}

/// Renumber a list's items to 0..n, keeping their relative order.
pub(crate) async fn compact_positions<C: ConnectionTrait>(
    conn: &C,
    list_id: i32,
) -> Result<(), DbErr> {
    let items: Vec<(i32, i32)> = list_item::Entity::find()
        .filter(list_item::Column::ListId.eq(list_id))
        .select_only()
        .column(list_item::Column::EntryId)
        .column(list_item::Column::Position)
        .order_by_asc(list_item::Column::Position)
        .order_by_asc(list_item::Column::EntryId)
        .into_tuple()
        .all(conn)
        .await?;

    for (expected, (entry_id, position)) in (0i32..).zip(items) {
        if position != expected {
            list_item::Entity::update_many()
                .col_expr(list_item::Column::Position, Expr::value(expected))
                .filter(list_item::Column::ListId.eq(list_id))
                .filter(list_item::Column::EntryId.eq(entry_id))
                .exec(conn)
                .await?;
        }
    }
    Ok(())
}

/// The user's relation to a list, if any.
async fn role_of<C: ConnectionTrait>(
    conn: &C,
    list: &user_list::Model,
    user_id: i32,
) -> Result<Option<ListRole>, DbErr> {
    if list.owner_id == user_id {
        return Ok(Some(ListRole::Owner));
    }
    let share = list_share::Entity::find_by_id((list.id, user_id))
        .one(conn)
        .await?;
    Ok(ListRole::resolve(
        list.owner_id,
        user_id,
        share.map(|s| SharePermission::from_can_edit(s.can_edit)),
    ))
}

/// Reject a user who may see the list but lacks `allowed`; hide it from everyone else.
fn authorize(
    list: &user_list::Model,
    role: Option<ListRole>,
    allowed: impl Fn(ListRole) -> bool,
) -> Result<ListRole, AppError> {
    match role {
        Some(role) if allowed(role) => Ok(role),
        Some(_) => Err(AppError::PermissionDenied),
        None if list.is_public => Err(AppError::PermissionDenied),
        None => Err(list_not_found()),
    }
}

async fn item_counts<C: ConnectionTrait>(
    conn: &C,
    list_ids: &[i32],
) -> Result<HashMap<i32, u64>, DbErr> {
    if list_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i32, i64)> = list_item::Entity::find()
        .filter(list_item::Column::ListId.is_in(list_ids.iter().copied()))
        .select_only()
        .column(list_item::Column::ListId)
        .column_as(list_item::Column::EntryId.count(), "item_count")
        .group_by(list_item::Column::ListId)
        .into_tuple()
        .all(conn)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(id, count)| (id, u64::try_from(count).unwrap_or(0)))
        .collect())
}

async fn summaries<C: ConnectionTrait>(
    conn: &C,
    lists: Vec<user_list::Model>,
) -> Result<Vec<ListSummary>, DbErr> {
    let ids: Vec<i32> = lists.iter().map(|l| l.id).collect();
    let counts = item_counts(conn, &ids).await?;
    Ok(lists
        .into_iter()
        .map(|l| {
            let count = counts.get(&l.id).copied().unwrap_or(0);
            ListSummary::new(l, count)
        })
        .collect())
}

/// A list's items in position order, joined with their catalog entries.
async fn items_of<C: ConnectionTrait>(
    conn: &C,
    list_id: i32,
) -> Result<Vec<ListItemResponse>, DbErr> {
    let items = list_item::Entity::find()
        .filter(list_item::Column::ListId.eq(list_id))
        .order_by_asc(list_item::Column::Position)
        .all(conn)
        .await?;
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let entries: HashMap<i32, catalog_entry::Model> = catalog_entry::Entity::find()
        .filter(catalog_entry::Column::Id.is_in(items.iter().map(|i| i.entry_id)))
        .all(conn)
        .await?
        .into_iter()
        .map(|e| (e.id, e))
        .collect();

    Ok(items
        .into_iter()
        .filter_map(|item| {
            let entry = entries.get(&item.entry_id)?;
            Some(ListItemResponse {
                entry_id: item.entry_id,
                title: entry.title.clone(),
                content_type: entry.content_type,
                year: entry.year,
                position: item.position,
                added_at: item.added_at,
            })
        })
        .collect())
}

async fn touch<C: ConnectionTrait>(conn: &C, list_id: i32) -> Result<(), DbErr> {
    user_list::Entity::update_many()
        .col_expr(user_list::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(user_list::Column::Id.eq(list_id))
        .exec(conn)
        .await?;
    Ok(())
}

pub struct ListService<'a, C> {
    conn: &'a C,
}

impl<'a, C> ListService<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        owner_id: i32,
        req: CreateListRequest,
    ) -> Result<ListSummary, AppError> {
        let now = Utc::now();
        let model = user_list::ActiveModel {
            owner_id: Set(owner_id),
            name: Set(req.name.trim().to_string()),
            description: Set(req.description),
            content_type: Set(req.content_type),
            is_public: Set(req.is_public),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        info!(list_id = model.id, owner_id, "List created");
        Ok(ListSummary::new(model, 0))
    }

    /// A list with its ordered items. Private lists are only visible to their
    /// owner and share holders; everyone else gets `NotFound`.
    pub async fn get(
        &self,
        list_id: i32,
        viewer: Option<i32>,
    ) -> Result<ListDetailResponse, AppError> {
        let list = user_list::Entity::find_by_id(list_id)
            .one(self.conn)
            .await?
            .ok_or_else(list_not_found)?;
        let role = match viewer {
            Some(user_id) => role_of(self.conn, &list, user_id).await?,
            None => None,
        };
        if role.is_none() && !list.is_public {
            return Err(list_not_found());
        }

        let items = items_of(self.conn, list.id).await?;
        let count = items.len() as u64;
        Ok(ListDetailResponse {
            list: ListSummary::new(list, count),
            role,
            items,
        })
    }

    /// Lists the user owns and lists shared with them, most recently updated first.
    pub async fn for_user(&self, user_id: i32) -> Result<MyListsResponse, AppError> {
        let owned = user_list::Entity::find()
            .filter(user_list::Column::OwnerId.eq(user_id))
            .order_by_desc(user_list::Column::UpdatedAt)
            .order_by_desc(user_list::Column::Id)
            .all(self.conn)
            .await?;

        let shared_ids: Vec<i32> = list_share::Entity::find()
            .filter(list_share::Column::UserId.eq(user_id))
            .select_only()
            .column(list_share::Column::ListId)
            .into_tuple()
            .all(self.conn)
            .await?;
        let shared = if shared_ids.is_empty() {
            Vec::new()
        } else {
            user_list::Entity::find()
                .filter(user_list::Column::Id.is_in(shared_ids))
                .order_by_desc(user_list::Column::UpdatedAt)
                .order_by_desc(user_list::Column::Id)
                .all(self.conn)
                .await?
        };

        Ok(MyListsResponse {
            owned: summaries(self.conn, owned).await?,
            shared_with_me: summaries(self.conn, shared).await?,
        })
    }

    pub async fn update(
        &self,
        list_id: i32,
        acting_id: i32,
        req: UpdateListRequest,
    ) -> Result<ListSummary, AppError> {
        let txn = self.conn.begin().await?;
        let list = self.lock_for(&txn, list_id, acting_id, ListRole::can_edit).await?;

        let model = if req == UpdateListRequest::default() {
            list
        } else {
            let mut active: user_list::ActiveModel = list.into();
            if let Some(ref name) = req.name {
                active.name = Set(name.trim().to_string());
            }
            if let Some(description) = req.description {
                active.description = Set(description);
            }
            if let Some(is_public) = req.is_public {
                active.is_public = Set(is_public);
            }
            active.updated_at = Set(Utc::now());
            active.update(&txn).await?
        };

        let count = item_counts(&txn, &[model.id])
            .await?
            .get(&model.id)
            .copied()
            .unwrap_or(0);
        txn.commit().await?;
        Ok(ListSummary::new(model, count))
    }

    /// Only the owner may delete a list.
    pub async fn delete(&self, list_id: i32, acting_id: i32) -> Result<(), AppError> {
        let txn = self.conn.begin().await?;
        let list = self
            .lock_for(&txn, list_id, acting_id, |r| r == ListRole::Owner)
            .await?;

        list_item::Entity::delete_many()
            .filter(list_item::Column::ListId.eq(list.id))
            .exec(&txn)
            .await?;
        list_share::Entity::delete_many()
            .filter(list_share::Column::ListId.eq(list.id))
            .exec(&txn)
            .await?;
        list.delete(&txn).await?;

        txn.commit().await?;
        info!(list_id, "List deleted");
        Ok(())
    }

    /// Append an entry to the end of a list.
    pub async fn add_item(
        &self,
        list_id: i32,
        acting_id: i32,
        entry_id: i32,
    ) -> Result<ListItemResponse, AppError> {
        let txn = self.conn.begin().await?;
        let list = self.lock_for(&txn, list_id, acting_id, ListRole::can_edit).await?;

        let entry = catalog_entry::Entity::find_by_id(entry_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Catalog entry not found".into()))?;
        if entry.content_type != list.content_type {
            return Err(AppError::Validation(format!(
                "This list holds {} entries, not {}",
                list.content_type, entry.content_type
            )));
        }

        let already = list_item::Entity::find_by_id((list.id, entry.id))
            .one(&txn)
            .await?;
        if already.is_some() {
            return Err(AppError::Conflict("Entry is already in this list".into()));
        }

        let max_pos: Option<i32> = list_item::Entity::find()
            .filter(list_item::Column::ListId.eq(list.id))
            .select_only()
            .column_as(list_item::Column::Position.max(), "max_pos")
            .into_tuple::<Option<i32>>()
            .one(&txn)
            .await?
            .flatten();
        let position = max_pos
            .unwrap_or(-1)
            .checked_add(1)
            .ok_or_else(|| AppError::Validation("Position overflow".into()))?;

        let now = Utc::now();
        let inserted = list_item::ActiveModel {
            list_id: Set(list.id),
            entry_id: Set(entry.id),
            position: Set(position),
            added_at: Set(now),
        }
        .insert(&txn)
        .await;
        let item = match inserted {
            Ok(item) => item,
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                return Err(AppError::Conflict("Entry is already in this list".into()));
            }
            Err(e) => return Err(e.into()),
        };
        touch(&txn, list.id).await?;
        txn.commit().await?;

        Ok(ListItemResponse {
            entry_id: item.entry_id,
            title: entry.title,
            content_type: entry.content_type,
            year: entry.year,
            position: item.position,
            added_at: item.added_at,
        })
    }

    pub async fn remove_item(
        &self,
        list_id: i32,
        acting_id: i32,
        entry_id: i32,
    ) -> Result<(), AppError> {
        let txn = self.conn.begin().await?;
        let list = self.lock_for(&txn, list_id, acting_id, ListRole::can_edit).await?;

        let result = list_item::Entity::delete_by_id((list.id, entry_id))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Entry is not in this list".into()));
        }
        compact_positions(&txn, list.id).await?;
        touch(&txn, list.id).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Rewrite the order of a list's items in one transaction.
    ///
    /// `entry_ids` must name every item exactly once; the i-th id gets position i.
    pub async fn reorder(
        &self,
        list_id: i32,
        acting_id: i32,
        content_type: ContentType,
        entry_ids: &[i32],
    ) -> Result<Vec<ListItemResponse>, AppError> {
        let txn = self.conn.begin().await?;
        let list = self.lock_for(&txn, list_id, acting_id, ListRole::can_edit).await?;
        if content_type != list.content_type {
            return Err(AppError::Validation(format!(
                "This list holds {} entries, not {content_type}",
                list.content_type
            )));
        }

        let current: Vec<i32> = list_item::Entity::find()
            .filter(list_item::Column::ListId.eq(list.id))
            .select_only()
            .column(list_item::Column::EntryId)
            .into_tuple()
            .all(&txn)
            .await?;
        let plan = plan_reorder(&current, entry_ids)?;

        for (entry_id, position) in plan {
            list_item::Entity::update_many()
                .col_expr(list_item::Column::Position, Expr::value(position))
                .filter(list_item::Column::ListId.eq(list.id))
                .filter(list_item::Column::EntryId.eq(entry_id))
                .exec(&txn)
                .await?;
        }
        touch(&txn, list.id).await?;

        let items = items_of(&txn, list.id).await?;
        txn.commit().await?;
        info!(list_id, items = items.len(), "List reordered");
        Ok(items)
    }

    pub async fn share(
        &self,
        list_id: i32,
        acting_id: i32,
        target_id: i32,
        can_edit: bool,
    ) -> Result<ShareResponse, AppError> {
        let txn = self.conn.begin().await?;
        let list = self.lock_for(&txn, list_id, acting_id, ListRole::can_edit).await?;
        if target_id == list.owner_id {
            return Err(AppError::Validation(
                "A list cannot be shared with its owner".into(),
            ));
        }

        let target = user::Entity::find_by_id(target_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        let already = list_share::Entity::find_by_id((list.id, target.id))
            .one(&txn)
            .await?;
        if already.is_some() {
            return Err(AppError::Conflict(
                "List is already shared with this user".into(),
            ));
        }

        let inserted = list_share::ActiveModel {
            list_id: Set(list.id),
            user_id: Set(target.id),
            can_edit: Set(can_edit),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await;
        let share = match inserted {
            Ok(share) => share,
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                return Err(AppError::Conflict(
                    "List is already shared with this user".into(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        txn.commit().await?;
        info!(list_id, target_id, can_edit, "List shared");
        Ok(ShareResponse::new(share, target.username))
    }

    /// Revoke a share. Share holders may also remove themselves.
    pub async fn unshare(
        &self,
        list_id: i32,
        acting_id: i32,
        target_id: i32,
    ) -> Result<(), AppError> {
        let txn = self.conn.begin().await?;
        let list = if acting_id == target_id {
            self.lock_for(&txn, list_id, acting_id, |_| true).await?
        } else {
            self.lock_for(&txn, list_id, acting_id, ListRole::can_edit)
                .await?
        };

        let result = list_share::Entity::delete_by_id((list.id, target_id))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Share not found".into()));
        }

        txn.commit().await?;
        info!(list_id, target_id, "List share revoked");
        Ok(())
    }

    pub async fn update_share(
        &self,
        list_id: i32,
        acting_id: i32,
        target_id: i32,
        can_edit: bool,
    ) -> Result<ShareResponse, AppError> {
        let txn = self.conn.begin().await?;
        let list = self.lock_for(&txn, list_id, acting_id, ListRole::can_edit).await?;

        let share = list_share::Entity::find_by_id((list.id, target_id))
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Share not found".into()))?;
        let mut active: list_share::ActiveModel = share.into();
        active.can_edit = Set(can_edit);
        let share = active.update(&txn).await?;

        let username = usernames(&txn, [target_id])
            .await?
            .remove(&target_id)
            .unwrap_or_default();
        txn.commit().await?;
        Ok(ShareResponse::new(share, username))
    }

    /// Everyone the list is shared with. Visible to the owner and share holders.
    pub async fn shares(
        &self,
        list_id: i32,
        viewer_id: i32,
    ) -> Result<Vec<ShareResponse>, AppError> {
        let list = user_list::Entity::find_by_id(list_id)
            .one(self.conn)
            .await?
            .ok_or_else(list_not_found)?;
        let role = role_of(self.conn, &list, viewer_id).await?;
        authorize(&list, role, |_| true)?;

        let shares = list_share::Entity::find()
            .filter(list_share::Column::ListId.eq(list.id))
            .order_by_asc(list_share::Column::CreatedAt)
            .order_by_asc(list_share::Column::UserId)
            .all(self.conn)
            .await?;
        let mut names = usernames(self.conn, shares.iter().map(|s| s.user_id)).await?;
        Ok(shares
            .into_iter()
            .map(|s| {
                let name = names.remove(&s.user_id).unwrap_or_default();
                ShareResponse::new(s, name)
            })
            .collect())
    }

    /// Lock the list row for the rest of the transaction and check the acting user's role.
    async fn lock_for<T: ConnectionTrait>(
        &self,
        txn: &T,
        list_id: i32,
        acting_id: i32,
        allowed: impl Fn(ListRole) -> bool,
    ) -> Result<user_list::Model, AppError> {
        let list = user_list::Entity::find_by_id(list_id)
            .lock(LockType::Update)
            .one(txn)
            .await?
            .ok_or_else(list_not_found)?;
        let role = role_of(txn, &list, acting_id).await?;
        authorize(&list, role, allowed)?;
        Ok(list)
    }
}
