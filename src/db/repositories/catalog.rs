use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, LikeExpr, Query, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
};

use super::crate_links::{self, LinkStats};
use super::records::CatalogRecord;
use crate::constants::limits::INSERT_CHUNK_SIZE;
use crate::domain::{SearchQuery, SearchResult};
use crate::entities::{crate_references, crates};

pub const TEAM_FILTER: &str = "team";
pub const CRATES_FILTER: &str = "crates";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub rows: u64,
    pub links: LinkStats,
}

/// Uniform storage contract for one catalog kind.
#[async_trait]
pub trait CatalogRepository<T: Send + Sync + 'static>: Send + Sync {
    /// Every row of the kind, ordered by id.
    async fn get_all(&self) -> Result<Vec<T>, CatalogError>;

    /// `Ok(None)` when no row has this id.
    async fn get_by_id(&self, id: &str) -> Result<Option<T>, CatalogError>;

    /// Filtered, paginated search. `total` counts matches before paging.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResult<T>, CatalogError>;

    /// Bulk insert. Existing rows are left in place.
    async fn save_all(&self, items: &[T]) -> Result<SaveSummary, CatalogError>;

    /// Removes every row of the kind along with its crate links.
    async fn delete_all(&self) -> Result<u64, CatalogError>;

    async fn count(&self) -> Result<u64, CatalogError>;
}

pub struct SeaOrmCatalogRepository<T> {
    conn: DatabaseConnection,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Clone for SeaOrmCatalogRepository<T> {
    fn clone(&self) -> Self {
        Self::new(self.conn.clone())
    }
}

impl<T> SeaOrmCatalogRepository<T> {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn,
            _kind: PhantomData,
        }
    }
}

#[async_trait]
impl<T: CatalogRecord> CatalogRepository<T> for SeaOrmCatalogRepository<T> {
    async fn get_all(&self) -> Result<Vec<T>, CatalogError> {
        let rows = T::Entity::find()
            .order_by_asc(T::ID)
            .all(&self.conn)
            .await?;
        let mut items: Vec<T> = rows.into_iter().map(T::from_model).collect();

        if T::KIND.links_crates() {
            let mut links = crate_links::load_for_items(&self.conn, T::KIND, None).await?;
            for item in &mut items {
                item.set_crates(links.remove(item.id()).unwrap_or_default());
            }
        }

        Ok(items)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<T>, CatalogError> {
        let Some(row) = T::Entity::find()
            .filter(T::ID.eq(id))
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        let mut items = vec![T::from_model(row)];
        attach_crates(&self.conn, &mut items).await?;
        Ok(items.pop())
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResult<T>, CatalogError> {
        let select = filtered_select::<T>(query);

        let total = select.clone().count(&self.conn).await?;

        let rows = select
            .order_by_asc(T::ID)
            .offset(query.offset())
            .limit(u64::from(query.page_size))
            .all(&self.conn)
            .await?;

        let mut items: Vec<T> = rows.into_iter().map(T::from_model).collect();
        attach_crates(&self.conn, &mut items).await?;

        Ok(SearchResult {
            items,
            total,
            page: query.page,
            page_size: query.page_size,
        })
    }

    async fn save_all(&self, items: &[T]) -> Result<SaveSummary, CatalogError> {
        let txn = self.conn.begin().await?;
        let summary = insert_all_on(&txn, items).await?;
        txn.commit().await?;
        Ok(summary)
    }

    async fn delete_all(&self) -> Result<u64, CatalogError> {
        let txn = self.conn.begin().await?;
        let removed = delete_all_on::<T, _>(&txn).await?;
        txn.commit().await?;
        Ok(removed)
    }

    async fn count(&self) -> Result<u64, CatalogError> {
        Ok(T::Entity::find().count(&self.conn).await?)
    }
}

/// Deletes the kind's link rows, then its own rows. Returns the number of
/// item rows removed.
pub async fn delete_all_on<T, C>(db: &C) -> Result<u64, DbErr>
where
    T: CatalogRecord,
    C: ConnectionTrait,
{
    if T::KIND.links_crates() {
        crate_links::delete_for_kind(db, T::KIND).await?;
    }
    let result = T::Entity::delete_many().exec(db).await?;
    Ok(result.rows_affected)
}

/// Inserts rows in chunks, then resolves and writes crate links against the
/// crates already present on `db`.
pub async fn insert_all_on<T, C>(db: &C, items: &[T]) -> Result<SaveSummary, DbErr>
where
    T: CatalogRecord,
    C: ConnectionTrait,
{
    for chunk in items.chunks(INSERT_CHUNK_SIZE) {
        let models: Vec<T::ActiveModel> = chunk.iter().map(T::to_active_model).collect();
        T::Entity::insert_many(models)
            .exec_without_returning(db)
            .await?;
    }

    let links = if T::KIND.links_crates() {
        crate_links::link_items(
            db,
            T::KIND,
            items.iter().map(|item| (item.id(), item.crate_refs())),
        )
        .await?
    } else {
        LinkStats::default()
    };

    Ok(SaveSummary {
        rows: items.len() as u64,
        links,
    })
}

async fn attach_crates<T, C>(db: &C, items: &mut [T]) -> Result<(), DbErr>
where
    T: CatalogRecord,
    C: ConnectionTrait,
{
    if !T::KIND.links_crates() || items.is_empty() {
        return Ok(());
    }

    let ids: Vec<String> = items.iter().map(|item| item.id().to_string()).collect();
    let mut links = crate_links::load_for_items(db, T::KIND, Some(&ids)).await?;
    for item in items {
        item.set_crates(links.remove(item.id()).unwrap_or_default());
    }
    Ok(())
}

fn filtered_select<T: CatalogRecord>(query: &SearchQuery) -> Select<T::Entity> {
    let mut select = T::Entity::find();

    if let Some(term) = query.term.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = contains_pattern(term);
        select = select.filter(
            Condition::any()
                .add(lower_like::<T>(T::NAME, &pattern))
                .add(lower_like::<T>(T::DESCRIPTION, &pattern)),
        );
    }

    for (key, value) in &query.filter {
        match key.as_str() {
            TEAM_FILTER => {
                if let Some(team) = T::TEAM {
                    select = select.filter(lower_like::<T>(team, &contains_pattern(value)));
                }
            }
            CRATES_FILTER if T::KIND.links_crates() => {
                let linked = Query::select()
                    .column((crate_references::Entity, crate_references::Column::ItemId))
                    .from(crate_references::Entity)
                    .inner_join(
                        crates::Entity,
                        Expr::col((crates::Entity, crates::Column::Id))
                            .equals((crate_references::Entity, crate_references::Column::CrateId)),
                    )
                    .and_where(
                        Expr::col((crate_references::Entity, crate_references::Column::ItemType))
                            .eq(T::KIND.as_str()),
                    )
                    .and_where(
                        Expr::expr(Func::lower(Expr::col((
                            crates::Entity,
                            crates::Column::Name,
                        ))))
                        .eq(value.trim().to_ascii_lowercase()),
                    )
                    .to_owned();
                select = select.filter(T::ID.in_subquery(linked));
            }
            _ => {}
        }
    }

    select
}

fn lower_like<T: CatalogRecord>(column: T::Column, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col((T::Entity::default(), column))))
        .like(LikeExpr::new(pattern).escape('\\'))
}

/// `%term%` with LIKE wildcards in `term` escaped, lowercased to match
/// `lower(column)`.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.trim().to_ascii_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
