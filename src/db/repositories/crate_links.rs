use std::collections::{HashMap, HashSet};

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::debug;

use crate::constants::limits::INSERT_CHUNK_SIZE;
use crate::domain::ItemKind;
use crate::entities::{crate_references, crates};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub linked: u64,
    /// References that matched no crate by id or by name.
    pub skipped: u64,
}

impl LinkStats {
    pub const fn merge(&mut self, other: Self) {
        self.linked += other.linked;
        self.skipped += other.skipped;
    }
}

pub async fn delete_for_kind<C: ConnectionTrait>(db: &C, kind: ItemKind) -> Result<u64, DbErr> {
    let result = crate_references::Entity::delete_many()
        .filter(crate_references::Column::ItemType.eq(kind.as_str()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Crate ids per item, in upstream order. `ids = None` loads every link of
/// the kind.
pub async fn load_for_items<C: ConnectionTrait>(
    db: &C,
    kind: ItemKind,
    ids: Option<&[String]>,
) -> Result<HashMap<String, Vec<String>>, DbErr> {
    let mut select = crate_references::Entity::find()
        .filter(crate_references::Column::ItemType.eq(kind.as_str()));

    if let Some(ids) = ids {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        select = select.filter(crate_references::Column::ItemId.is_in(ids.iter().cloned()));
    }

    let rows = select
        .order_by_asc(crate_references::Column::ItemId)
        .order_by_asc(crate_references::Column::Position)
        .all(db)
        .await?;

    let mut links: HashMap<String, Vec<String>> = HashMap::new();
    for row in rows {
        links.entry(row.item_id).or_default().push(row.crate_id);
    }
    Ok(links)
}

/// Resolves each item's crate references against the crates table and
/// writes the link rows.
///
/// A reference resolves by crate id first, then by case-insensitive crate
/// name. Unresolvable references and repeats within one item are dropped.
pub async fn link_items<'a, C, I>(db: &C, kind: ItemKind, items: I) -> Result<LinkStats, DbErr>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = (&'a str, &'a [String])>,
{
    let known: Vec<(String, String)> = crates::Entity::find()
        .select_only()
        .column(crates::Column::Id)
        .column(crates::Column::Name)
        .into_tuple()
        .all(db)
        .await?;

    let ids: HashSet<&str> = known.iter().map(|(id, _)| id.as_str()).collect();
    let mut by_name: HashMap<String, &str> = HashMap::with_capacity(known.len());
    for (id, name) in &known {
        by_name.entry(name.to_ascii_lowercase()).or_insert(id.as_str());
    }

    let mut stats = LinkStats::default();
    let mut rows = Vec::new();

    for (item_id, refs) in items {
        let mut seen = HashSet::new();
        for reference in refs {
            let resolved = ids
                .get(reference.as_str())
                .copied()
                .or_else(|| by_name.get(&reference.to_ascii_lowercase()).copied());

            let Some(crate_id) = resolved else {
                debug!(
                    item_type = kind.as_str(),
                    item_id, reference, "Skipping unresolved crate reference"
                );
                stats.skipped += 1;
                continue;
            };

            if !seen.insert(crate_id) {
                continue;
            }

            rows.push(crate_references::ActiveModel {
                item_id: Set(item_id.to_string()),
                item_type: Set(kind.as_str().to_string()),
                crate_id: Set(crate_id.to_string()),
                position: Set(i32::try_from(seen.len() - 1).unwrap_or(i32::MAX)),
            });
        }
    }

    for chunk in rows.chunks(INSERT_CHUNK_SIZE) {
        crate_references::Entity::insert_many(chunk.to_vec())
            .exec_without_returning(db)
            .await?;
    }

    stats.linked = rows.len() as u64;
    Ok(stats)
}
