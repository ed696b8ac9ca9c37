use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{total_pages, Page, Repository, RepositoryError, SearchQuery, SortDirection};
use crate::domain::Resource;

#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

/// Keeps records in process memory; ids are handed out like a database sequence.
#[derive(Debug)]
pub struct InMemoryRepository<T> {
    table: RwLock<Table<T>>,
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self {
            table: RwLock::new(Table {
                rows: BTreeMap::new(),
                last_id: 0,
            }),
        }
    }
}

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<T: Resource> Repository<T> for InMemoryRepository<T> {
    async fn list(&self) -> Result<Vec<T>, RepositoryError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<T>, RepositoryError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn search(&self, query: &SearchQuery) -> Result<Page<T>, RepositoryError> {
        if !T::SORT_FIELDS.contains(&query.sort.as_str()) {
            return Err(RepositoryError::UnknownSortField(query.sort.clone()));
        }
        let needle = query.needle();
        let mut matched: Vec<T> = self
            .table
            .read()
            .await
            .rows
            .values()
            .filter(|record| needle.as_deref().map_or(true, |n| record.matches(n)))
            .cloned()
            .collect();
        // stable sort: ties stay in id order
        matched.sort_by(|a, b| {
            let ordering = a.compare_by(b, &query.sort);
            match query.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let total_items = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(query.size as usize)
            .collect();
        Ok(Page {
            items,
            total_items,
            total_pages: total_pages(total_items, query.size),
            page: query.page,
            size: query.size,
        })
    }

    async fn create(&self, draft: T::Draft) -> Result<T, RepositoryError> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let record = T::from_draft(table.last_id, draft);
        table.rows.insert(record.id(), record.clone());
        Ok(record)
    }

    async fn update(&self, id: i64, draft: T::Draft) -> Result<Option<T>, RepositoryError> {
        let mut table = self.table.write().await;
        let Some(row) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        *row = T::from_draft(id, draft);
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}
