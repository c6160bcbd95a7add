use chrono::Utc;
use cinelog_common::{ContentType, PageWindow, RatingSummary};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{ExprTrait, Func, LikeExpr, NullOrdering};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionSession, TransactionTrait,
};
use tracing::info;

use super::list::compact_positions;
use super::review::ReviewService;
use crate::entity::{catalog_entry, list_item, review, review_vote};
use crate::error::AppError;
use crate::models::catalog::{
    CreateEntryRequest, EntryListQuery, EntryResponse, EntrySort, UpdateEntryRequest,
};
use crate::models::shared::{escape_like, parse_sort_order};

const DEFAULT_PER_PAGE: u64 = 20;
const MAX_PER_PAGE: u64 = 100;

/// Look up an entry by id, treating a content type mismatch as absence.
pub(crate) async fn find_entry<C: ConnectionTrait>(
    conn: &C,
    content_type: ContentType,
    id: i32,
) -> Result<catalog_entry::Model, AppError> {
    catalog_entry::Entity::find_by_id(id)
        .one(conn)
        .await?
        .filter(|entry| entry.content_type == content_type)
        .ok_or_else(|| AppError::NotFound("Catalog entry not found".into()))
}

pub struct CatalogService<'a, C> {
    conn: &'a C,
}

impl<'a, C> CatalogService<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn create(&self, req: CreateEntryRequest) -> Result<EntryResponse, AppError> {
        self.check_parent(req.content_type, req.parent_id).await?;

        let now = Utc::now();
        let model = catalog_entry::ActiveModel {
            content_type: Set(req.content_type),
            title: Set(req.title.trim().to_string()),
            overview: Set(req.overview),
            year: Set(req.year),
            parent_id: Set(req.parent_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        info!(entry_id = model.id, content_type = %model.content_type, "Catalog entry created");
        Ok(EntryResponse::new(model, RatingSummary::EMPTY))
    }

    pub async fn get(&self, content_type: ContentType, id: i32) -> Result<EntryResponse, AppError> {
        let entry = find_entry(self.conn, content_type, id).await?;
        let summary = ReviewService::new(self.conn).summary(entry.id).await?;
        Ok(EntryResponse::new(entry, summary))
    }

    /// PATCH semantics: only provided fields change. An empty patch returns the entry as is.
    pub async fn update(
        &self,
        content_type: ContentType,
        id: i32,
        req: UpdateEntryRequest,
    ) -> Result<EntryResponse, AppError> {
        if req == UpdateEntryRequest::default() {
            return self.get(content_type, id).await;
        }

        let txn = self.conn.begin().await?;
        let existing = find_entry(&txn, content_type, id).await?;
        let mut active: catalog_entry::ActiveModel = existing.into();

        if let Some(ref title) = req.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(overview) = req.overview {
            active.overview = Set(overview);
        }
        if let Some(year) = req.year {
            active.year = Set(year);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&txn).await?;
        let summary = ReviewService::new(&txn).summary(model.id).await?;
        txn.commit().await?;

        Ok(EntryResponse::new(model, summary))
    }

    /// Delete an entry together with its reviews, their votes and its list memberships.
    ///
    /// Entries that still have seasons or episodes under them cannot be deleted.
    pub async fn delete(&self, content_type: ContentType, id: i32) -> Result<(), AppError> {
        let txn = self.conn.begin().await?;
        let entry = find_entry(&txn, content_type, id).await?;

        let children = catalog_entry::Entity::find()
            .filter(catalog_entry::Column::ParentId.eq(entry.id))
            .count(&txn)
            .await?;
        if children > 0 {
            return Err(AppError::Conflict(
                "Cannot delete an entry that still has child entries".into(),
            ));
        }

        let review_ids: Vec<i32> = review::Entity::find()
            .filter(review::Column::EntryId.eq(entry.id))
            .select_only()
            .column(review::Column::Id)
            .into_tuple()
            .all(&txn)
            .await?;
        if !review_ids.is_empty() {
            review_vote::Entity::delete_many()
                .filter(review_vote::Column::ReviewId.is_in(review_ids))
                .exec(&txn)
                .await?;
        }
        review::Entity::delete_many()
            .filter(review::Column::EntryId.eq(entry.id))
            .exec(&txn)
            .await?;

        let affected_lists: Vec<i32> = list_item::Entity::find()
            .filter(list_item::Column::EntryId.eq(entry.id))
            .select_only()
            .column(list_item::Column::ListId)
            .into_tuple()
            .all(&txn)
            .await?;
        list_item::Entity::delete_many()
            .filter(list_item::Column::EntryId.eq(entry.id))
            .exec(&txn)
            .await?;
        for list_id in &affected_lists {
            compact_positions(&txn, *list_id).await?;
        }

        entry.delete(&txn).await?;
        txn.commit().await?;

        info!(
            entry_id = id,
            lists_touched = affected_lists.len(),
            "Catalog entry deleted"
        );
        Ok(())
    }

    /// Paginated listing; every row carries its rating summary from one grouped query.
    pub async fn list(
        &self,
        query: EntryListQuery,
    ) -> Result<(Vec<EntryResponse>, PageWindow), AppError> {
        let per_page = query
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        let sort = EntrySort::parse(query.sort_by.as_deref())?;
        let order = parse_sort_order(query.sort_order.as_deref())?;

        let mut select = catalog_entry::Entity::find();
        if let Some(content_type) = query.content_type {
            select = select.filter(catalog_entry::Column::ContentType.eq(content_type));
        }
        if let Some(ref search) = query.search {
            let term = escape_like(search.trim());
            if !term.is_empty() {
                select = select.filter(
                    Expr::expr(Func::lower(Expr::col(catalog_entry::Column::Title)))
                        .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
                );
            }
        }

        let total = select.clone().count(self.conn).await?;
        let window = PageWindow::new(query.page, per_page, total);
        if window.is_past_end() {
            return Ok((Vec::new(), window));
        }

        select = match sort {
            EntrySort::CreatedAt => select.order_by(catalog_entry::Column::CreatedAt, order.clone()),
            EntrySort::Title => select.order_by(catalog_entry::Column::Title, order.clone()),
            EntrySort::Year => select.order_by_with_nulls(
                catalog_entry::Column::Year,
                order.clone(),
                NullOrdering::Last,
            ),
        };
        let entries = select
            .order_by(catalog_entry::Column::Id, order)
            .offset(Some(window.offset()))
            .limit(Some(window.per_page))
            .all(self.conn)
            .await?;

        let ids: Vec<i32> = entries.iter().map(|e| e.id).collect();
        let summaries = ReviewService::new(self.conn).summaries(&ids).await?;
        let data = entries
            .into_iter()
            .map(|entry| {
                let summary = summaries.get(&entry.id).copied().unwrap_or_default();
                EntryResponse::new(entry, summary)
            })
            .collect();

        Ok((data, window))
    }

    /// Seasons nest under a series and episodes under a season; nothing else has a parent.
    async fn check_parent(
        &self,
        content_type: ContentType,
        parent_id: Option<i32>,
    ) -> Result<(), AppError> {
        match (content_type.parent_type(), parent_id) {
            (None, None) => Ok(()),
            (None, Some(_)) => Err(AppError::Validation(format!(
                "A {content_type} entry cannot have a parent"
            ))),
            (Some(expected), None) => Err(AppError::Validation(format!(
                "A {content_type} entry requires a {expected} parent"
            ))),
            (Some(expected), Some(parent_id)) => {
                let parent = catalog_entry::Entity::find_by_id(parent_id)
                    .one(self.conn)
                    .await?;
                match parent {
                    Some(p) if p.content_type == expected => Ok(()),
                    _ => Err(AppError::Validation(format!(
                        "Parent {parent_id} is not an existing {expected}"
                    ))),
                }
            }
        }
    }
}
