//! SurrealDB implementation of [`CategoryRepository`].

use std::collections::{HashMap, VecDeque};

use harrastus_core::error::HarrastusResult;
use harrastus_core::models::category::{CategoryNode, CreateCategory, TaxonomyKind};
use harrastus_core::models::localized::{Language, LocalizedText};
use harrastus_core::repository::CategoryRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::{id_strs, opt_id_str, parse_id, parse_opt_id};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct CategoryRowWithId {
    record_id: String,
    kind: String,
    name: String,
    name_fi: Option<String>,
    name_en: Option<String>,
    name_sv: Option<String>,
    parent_id: Option<String>,
    cover_image: Option<String>,
    data_source: String,
    origin_id: Option<String>,
}

impl CategoryRowWithId {
    fn try_into_node(self) -> Result<CategoryNode, DbError> {
        let kind = TaxonomyKind::parse(&self.kind).ok_or_else(|| DbError::InvalidRow {
            field: "kind",
            reason: format!("unknown taxonomy {}", self.kind),
        })?;
        let mut name = LocalizedText::new(self.name);
        for (language, text) in [
            (Language::Fi, self.name_fi),
            (Language::En, self.name_en),
            (Language::Sv, self.name_sv),
        ] {
            if let Some(text) = text {
                name = name.with(language, text);
            }
        }
        Ok(CategoryNode {
            id: parse_id("record_id", &self.record_id)?,
            kind,
            name,
            parent_id: parse_opt_id("parent_id", self.parent_id)?,
            cover_image: self.cover_image,
            data_source: self.data_source,
            origin_id: self.origin_id,
        })
    }
}

const SELECT_CATEGORY: &str = "SELECT meta::id(id) AS record_id, * FROM";

/// `root` followed by all of its descendants, breadth first.
fn subtree(root: Uuid, nodes: &[CategoryNode]) -> Vec<Uuid> {
    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for node in nodes {
        if let Some(parent) = node.parent_id {
            children.entry(parent).or_default().push(node.id);
        }
    }
    let mut removed = Vec::new();
    let mut queue = VecDeque::from([root]);
    while let Some(id) = queue.pop_front() {
        removed.push(id);
        if let Some(kids) = children.get(&id) {
            queue.extend(kids.iter().copied());
        }
    }
    removed
}

#[derive(Clone)]
pub struct SurrealCategoryRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCategoryRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CategoryRepository for SurrealCategoryRepository<C> {
    async fn create(&self, input: CreateCategory) -> HarrastusResult<CategoryNode> {
        let id = Uuid::new_v4();
        let translation = |language| input.name.translations.get(&language).cloned();

        self.db
            .query(
                "CREATE type::record('hobby_category', $id) SET \
                 kind = $kind, name = $name, \
                 name_fi = $name_fi, name_en = $name_en, name_sv = $name_sv, \
                 parent_id = $parent_id, cover_image = $cover_image, \
                 data_source = $data_source, origin_id = $origin_id",
            )
            .bind(("id", id.to_string()))
            .bind(("kind", input.kind.as_str().to_string()))
            .bind(("name", input.name.default.clone()))
            .bind(("name_fi", translation(Language::Fi)))
            .bind(("name_en", translation(Language::En)))
            .bind(("name_sv", translation(Language::Sv)))
            .bind(("parent_id", opt_id_str(input.parent_id)))
            .bind(("cover_image", input.cover_image.clone()))
            .bind(("data_source", input.data_source.clone()))
            .bind(("origin_id", input.origin_id.clone()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::query)?;

        Ok(CategoryNode {
            id,
            kind: input.kind,
            name: input.name,
            parent_id: input.parent_id,
            cover_image: input.cover_image,
            data_source: input.data_source,
            origin_id: input.origin_id,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> HarrastusResult<CategoryNode> {
        let mut result = self
            .db
            .query(format!("{SELECT_CATEGORY} type::record('hobby_category', $id)"))
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CategoryRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("hobby_category", id))?;
        Ok(row.try_into_node()?)
    }

    async fn list(&self, kind: TaxonomyKind) -> HarrastusResult<Vec<CategoryNode>> {
        let mut result = self
            .db
            .query(format!("{SELECT_CATEGORY} hobby_category WHERE kind = $kind"))
            .bind(("kind", kind.as_str().to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CategoryRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(CategoryRowWithId::try_into_node)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    /// Removes the subtree and strips the removed ids from every hobby's
    /// categories and audiences, in one transaction.
    async fn delete(&self, id: Uuid) -> HarrastusResult<Vec<Uuid>> {
        let root = self.get_by_id(id).await?;
        let nodes = self.list(root.kind).await?;
        let removed = subtree(id, &nodes);
        let removed_strs = id_strs(&removed);

        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE hobby_category WHERE meta::id(id) IN $ids; \
                 UPDATE hobby SET \
                     categories = array::complement(categories, $ids), \
                     audiences = array::complement(audiences, $ids) \
                 WHERE categories CONTAINSANY $ids OR audiences CONTAINSANY $ids; \
                 COMMIT TRANSACTION;",
            )
            .bind(("ids", removed_strs))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::query)?;

        debug!(root = %id, removed = removed.len(), "Deleted category subtree");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u128, parent: Option<u128>) -> CategoryNode {
        CategoryNode {
            id: Uuid::from_u128(id),
            kind: TaxonomyKind::Category,
            name: LocalizedText::new(format!("node {id}")),
            parent_id: parent.map(Uuid::from_u128),
            cover_image: None,
            data_source: String::new(),
            origin_id: None,
        }
    }

    #[test]
    fn subtree_is_breadth_first_and_stays_inside_the_root() {
        let nodes = [
            node(1, None),
            node(2, Some(1)),
            node(3, Some(2)),
            node(4, Some(1)),
            node(5, None),
        ];
        let ids: Vec<u128> = subtree(Uuid::from_u128(1), &nodes)
            .into_iter()
            .map(|id| id.as_u128())
            .collect();
        assert_eq!(ids, vec![1, 2, 4, 3]);
        assert_eq!(subtree(Uuid::from_u128(3), &nodes), vec![Uuid::from_u128(3)]);
    }
}
