//! In-memory store with snapshot transactions, used by unit tests.
//!
//! A transaction stages its rows privately and merges them into the shared
//! tables on commit, so uncommitted rows are never visible through
//! [`TodoReader`] and overlapping transactions do not overwrite each other.
//! Ids come from the shared counter, as with a database sequence: a rolled
//! back transaction leaves a gap.
//! Single steps can be made to fail to drive the rollback paths.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{TodoReader, TodoTransaction, TransactionSource, UnitOfWork};
use crate::error::AppError;
use crate::models::{TodoItem, TodoItemInput, TodoListInput};

/// A step of a transaction that can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Begin,
    InsertItem,
    AttachItem,
    InsertList,
    AttachList,
    Commit,
    Rollback,
    /// `insert_item` never completes.
    StallInsertItem,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    next_id: i32,
    items: BTreeMap<i32, TodoItem>,
    lists: BTreeMap<i32, TodoListInput>,
    lists_items: Vec<(i32, i32)>,
    users_lists: Vec<(i32, i32)>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn merge(&mut self, staged: Tables) {
        self.items.extend(staged.items);
        self.lists.extend(staged.lists);
        self.lists_items.extend(staged.lists_items);
        self.users_lists.extend(staged.users_lists);
    }
}

/// How transactions ended.
#[derive(Debug, Default)]
pub struct TxStats {
    pub begun: AtomicUsize,
    pub committed: AtomicUsize,
    pub rolled_back: AtomicUsize,
    /// Dropped without commit or rollback.
    pub abandoned: AtomicUsize,
}

impl TxStats {
    pub fn begun(&self) -> usize {
        self.begun.load(Ordering::SeqCst)
    }

    pub fn committed(&self) -> usize {
        self.committed.load(Ordering::SeqCst)
    }

    pub fn rolled_back(&self) -> usize {
        self.rolled_back.load(Ordering::SeqCst)
    }

    pub fn abandoned(&self) -> usize {
        self.abandoned.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    stats: Arc<TxStats>,
    fail_at: Vec<FailPoint>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(fail_at: &[FailPoint]) -> Self {
        Self {
            fail_at: fail_at.to_vec(),
            ..Self::default()
        }
    }

    /// Seeds a list owned by `user_id` outside of any transaction.
    pub fn with_list(self, user_id: i32, list_id: i32) -> Self {
        {
            let mut tables = self.tables.lock().expect("store lock poisoned");
            tables.lists.insert(
                list_id,
                TodoListInput {
                    title: format!("list {}", list_id),
                    description: String::new(),
                },
            );
            tables.users_lists.push((user_id, list_id));
            tables.next_id = tables.next_id.max(list_id);
        }
        self
    }

    pub fn stats(&self) -> &TxStats {
        &self.stats
    }

    pub fn item_count(&self) -> usize {
        self.tables.lock().expect("store lock poisoned").items.len()
    }

    pub fn association_count(&self) -> usize {
        self.tables.lock().expect("store lock poisoned").lists_items.len()
    }
}

fn injected(step: FailPoint) -> AppError {
    AppError::Persistence(format!("injected failure at {:?}", step))
}

#[async_trait]
impl TransactionSource for MemoryStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> Result<MemoryTransaction, AppError> {
        if self.fail_at.contains(&FailPoint::Begin) {
            return Err(injected(FailPoint::Begin));
        }
        self.stats.begun.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryTransaction {
            staged: Tables::default(),
            shared: Arc::clone(&self.tables),
            stats: Arc::clone(&self.stats),
            fail_at: self.fail_at.clone(),
            finished: false,
        })
    }
}

#[async_trait]
impl TodoReader for MemoryStore {
    async fn list_owned_by(&self, user_id: i32, list_id: i32) -> Result<bool, AppError> {
        let tables = self.tables.lock().expect("store lock poisoned");
        Ok(tables.users_lists.contains(&(user_id, list_id)))
    }

    async fn find_item(&self, user_id: i32, item_id: i32) -> Result<Option<TodoItem>, AppError> {
        let tables = self.tables.lock().expect("store lock poisoned");
        let owned = tables
            .lists_items
            .iter()
            .filter(|(_, item)| *item == item_id)
            .any(|(list, _)| tables.users_lists.contains(&(user_id, *list)));
        Ok(owned.then(|| tables.items.get(&item_id).cloned()).flatten())
    }
}

pub struct MemoryTransaction {
    staged: Tables,
    shared: Arc<Mutex<Tables>>,
    stats: Arc<TxStats>,
    fail_at: Vec<FailPoint>,
    finished: bool,
}

impl MemoryTransaction {
    fn allocate_id(&self) -> i32 {
        self.shared.lock().expect("store lock poisoned").next_id()
    }

    fn check(&self, step: FailPoint) -> Result<(), AppError> {
        if self.fail_at.contains(&step) {
            Err(injected(step))
        } else {
            Ok(())
        }
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        if !self.finished {
            self.stats.abandoned.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl UnitOfWork for MemoryTransaction {
    async fn commit(mut self) -> Result<(), AppError> {
        self.finished = true;
        self.check(FailPoint::Commit)?;
        let staged = std::mem::take(&mut self.staged);
        self.shared.lock().expect("store lock poisoned").merge(staged);
        self.stats.committed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(mut self) -> Result<(), AppError> {
        self.finished = true;
        self.stats.rolled_back.fetch_add(1, Ordering::SeqCst);
        self.check(FailPoint::Rollback)
    }
}

#[async_trait]
impl TodoTransaction for MemoryTransaction {
    async fn insert_item(&mut self, item: &TodoItemInput) -> Result<i32, AppError> {
        if self.fail_at.contains(&FailPoint::StallInsertItem) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        self.check(FailPoint::InsertItem)?;
        let id = self.allocate_id();
        self.staged.items.insert(id, TodoItem::new(id, item.clone()));
        Ok(id)
    }

    async fn attach_item(&mut self, list_id: i32, item_id: i32) -> Result<(), AppError> {
        self.check(FailPoint::AttachItem)?;
        self.staged.lists_items.push((list_id, item_id));
        Ok(())
    }

    async fn insert_list(&mut self, list: &TodoListInput) -> Result<i32, AppError> {
        self.check(FailPoint::InsertList)?;
        let id = self.allocate_id();
        self.staged.lists.insert(id, list.clone());
        Ok(id)
    }

    async fn attach_list(&mut self, user_id: i32, list_id: i32) -> Result<(), AppError> {
        self.check(FailPoint::AttachList)?;
        self.staged.users_lists.push((user_id, list_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str) -> TodoItemInput {
        TodoItemInput {
            title: title.into(),
            description: String::new(),
        }
    }

    #[actix_rt::test]
    async fn test_overlapping_commits_keep_both_transactions() {
        let store = MemoryStore::new().with_list(1, 1);

        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();
        let first_id = first.insert_item(&item("first")).await.unwrap();
        let second_id = second.insert_item(&item("second")).await.unwrap();
        first.attach_item(1, first_id).await.unwrap();
        second.attach_item(1, second_id).await.unwrap();

        assert_ne!(first_id, second_id);
        assert_eq!(store.find_item(1, first_id).await.unwrap(), None);

        first.commit().await.unwrap();
        second.commit().await.unwrap();

        assert_eq!(store.item_count(), 2);
        assert_eq!(store.association_count(), 2);
        assert_eq!(store.find_item(1, first_id).await.unwrap().unwrap().title, "first");
        assert_eq!(store.find_item(1, second_id).await.unwrap().unwrap().title, "second");
    }

    #[actix_rt::test]
    async fn test_rollback_discards_only_its_own_rows() {
        let store = MemoryStore::new().with_list(1, 1);

        let mut kept = store.begin().await.unwrap();
        let mut dropped = store.begin().await.unwrap();
        let kept_id = kept.insert_item(&item("kept")).await.unwrap();
        kept.attach_item(1, kept_id).await.unwrap();
        let dropped_id = dropped.insert_item(&item("dropped")).await.unwrap();
        dropped.attach_item(1, dropped_id).await.unwrap();

        dropped.rollback().await.unwrap();
        kept.commit().await.unwrap();

        assert_eq!(store.item_count(), 1);
        assert_eq!(store.find_item(1, dropped_id).await.unwrap(), None);
        assert_eq!(store.stats().committed(), 1);
        assert_eq!(store.stats().rolled_back(), 1);
    }
}
