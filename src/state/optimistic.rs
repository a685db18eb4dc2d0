//! Tentative local changes that are committed or rolled back once the
//! server answers.
//!
//! A [`Tentative`] is created by capturing a [`Snapshot`] and then applying
//! the change. On success it is committed (optionally folding in the
//! server's representation); on failure it is rolled back by restoring the
//! snapshot exactly.

use crate::model::{Goal, Task};

/// Records addressable by a server-assigned id
pub trait Keyed {
    fn key(&self) -> i64;
}

impl Keyed for Goal {
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for Task {
    fn key(&self) -> i64 {
        self.id
    }
}

/// State captured before a tentative change
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot<T> {
    /// One record, put back in place by id
    Record(T),
    /// The whole list, put back wholesale
    List(Vec<T>),
}

impl<T: Keyed> Snapshot<T> {
    /// Restore into `list`. A record that is no longer present stays gone.
    fn restore(self, list: &mut Vec<T>) {
        match self {
            Snapshot::Record(record) => {
                replace_by_key(list, record);
            }
            Snapshot::List(items) => *list = items,
        }
    }
}

/// A change applied locally ahead of server confirmation
#[derive(Debug, Clone, PartialEq)]
pub struct Tentative<T> {
    /// Which list the change was applied to (e.g. the owning goal id)
    pub scope: i64,
    /// The record the change targets
    pub key: i64,
    snapshot: Snapshot<T>,
}

impl<T: Keyed + Clone> Tentative<T> {
    /// Snapshot the record `key` in `list`, then apply `change` to it.
    /// Returns `None` (and changes nothing) when the record is missing.
    pub fn on_record(
        scope: i64,
        list: &mut [T],
        key: i64,
        change: impl FnOnce(&mut T),
    ) -> Option<Self> {
        let record = list.iter_mut().find(|r| r.key() == key)?;
        let snapshot = Snapshot::Record(record.clone());
        change(record);
        Some(Tentative {
            scope,
            key,
            snapshot,
        })
    }

    /// Snapshot the whole of `list`, then apply `change` to it.
    pub fn on_list(scope: i64, list: &mut Vec<T>, key: i64, change: impl FnOnce(&mut Vec<T>)) -> Self {
        let snapshot = Snapshot::List(list.clone());
        change(list);
        Tentative {
            scope,
            key,
            snapshot,
        }
    }

    /// The pre-change state
    pub fn snapshot(&self) -> &Snapshot<T> {
        &self.snapshot
    }

    /// The server accepted the change. `confirmed` replaces the local record
    /// so server-side fields win.
    pub fn commit(self, list: &mut [T], confirmed: Option<T>) {
        if let Some(record) = confirmed {
            replace_by_key(list, record);
        }
    }

    /// The server rejected the change; put back exactly what was captured.
    pub fn rollback(self, list: &mut Vec<T>) {
        self.snapshot.restore(list);
    }
}

/// Replace the record with the same key in place. Returns false if absent.
pub fn replace_by_key<T: Keyed>(list: &mut [T], record: T) -> bool {
    match list.iter_mut().find(|r| r.key() == record.key()) {
        Some(slot) => {
            *slot = record;
            true
        }
        None => false,
    }
}
