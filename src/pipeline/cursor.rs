//! Mutation-resilient paginated cursor over reminder events.
//!
//! The cursor never tracks a page index. It remembers the sort key of the
//! last event it yielded and fills its buffer with `key > last_seen`
//! queries, so rows vanishing from the filter ahead of the cursor cannot
//! shift unseen rows past it, and rows already yielded can never come back.
//! Clients that mutate an already-yielded item out of the query's filter
//! must call [`PagedCursor::updated`] before iterating further.

use std::collections::VecDeque;

use rusqlite::Connection;

use super::error::ReminderError;
use super::query::ItemQuery;
use super::traits::EventSource;
use crate::models::ReminderEvent;

pub struct PagedCursor<'a, S: EventSource> {
    source: &'a mut S,
    conn: &'a Connection,
    query: ItemQuery,
    page_size: usize,
    buffer: VecDeque<ReminderEvent>,
    last_key: Option<i64>,
    /// Set when the store returned a short page; cleared by `updated()`.
    exhausted: bool,
}

impl<'a, S: EventSource> PagedCursor<'a, S> {
    pub fn new(
        source: &'a mut S,
        conn: &'a Connection,
        query: ItemQuery,
        page_size: usize,
    ) -> Result<Self, ReminderError> {
        if page_size == 0 {
            return Err(ReminderError::InvalidPageSize);
        }
        Ok(Self {
            source,
            conn,
            query,
            page_size,
            buffer: VecDeque::new(),
            last_key: None,
            exhausted: false,
        })
    }

    /// Whether an unconsumed event remains. May query the store.
    pub fn has_next(&mut self) -> Result<bool, ReminderError> {
        self.fill()?;
        Ok(!self.buffer.is_empty())
    }

    /// The next event. Fails fast with `CursorExhausted` when none remain.
    pub fn next(&mut self) -> Result<ReminderEvent, ReminderError> {
        self.fill()?;
        let event = self
            .buffer
            .pop_front()
            .ok_or(ReminderError::CursorExhausted)?;
        self.last_key = Some(event.sort_key());
        Ok(event)
    }

    /// Drop the buffered page, keeping the logical offset.
    ///
    /// Call after mutating the status of already-yielded events such that
    /// they no longer match the query. Buffered-but-unyielded events are
    /// re-fetched on the next fill if they still match.
    pub fn updated(&mut self) {
        self.buffer.clear();
        self.exhausted = false;
    }

    fn fill(&mut self) -> Result<(), ReminderError> {
        if !self.buffer.is_empty() || self.exhausted {
            return Ok(());
        }
        let page = self
            .source
            .fetch_after(self.conn, &self.query, self.last_key, self.page_size)?;
        if page.len() < self.page_size {
            self.exhausted = true;
        }
        self.buffer.extend(page);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::set_item_status;
    use crate::db::sqlite::open_memory_database;
    use crate::models::{Channel, ItemStatus};
    use crate::pipeline::source::SqliteEventSource;
    use crate::pipeline::testutil::{seed_practice, spawn_reminder};

    fn seed_items(conn: &Connection, n: usize) -> Vec<i64> {
        let practice = seed_practice(conn);
        (0..n)
            .map(|_| spawn_reminder(conn, &practice, Channel::Email))
            .collect()
    }

    #[test]
    fn zero_page_size_rejected() {
        let conn = open_memory_database().unwrap();
        let mut source = SqliteEventSource::new();
        let result = PagedCursor::new(
            &mut source,
            &conn,
            ItemQuery::new(ItemStatus::Pending),
            0,
        );
        assert!(matches!(result, Err(ReminderError::InvalidPageSize)));
    }

    #[test]
    fn next_past_end_fails_fast() {
        let conn = open_memory_database().unwrap();
        seed_items(&conn, 1);

        let mut source = SqliteEventSource::new();
        let mut cursor =
            PagedCursor::new(&mut source, &conn, ItemQuery::new(ItemStatus::Pending), 5).unwrap();

        cursor.next().unwrap();
        assert!(!cursor.has_next().unwrap());
        assert!(matches!(cursor.next(), Err(ReminderError::CursorExhausted)));
    }

    #[test]
    fn yields_each_item_once_for_every_page_size() {
        let n = 5;
        for page_size in 1..=n + 1 {
            let conn = open_memory_database().unwrap();
            let expected = seed_items(&conn, n);

            let mut source = SqliteEventSource::new();
            let mut cursor = PagedCursor::new(
                &mut source,
                &conn,
                ItemQuery::new(ItemStatus::Pending),
                page_size,
            )
            .unwrap();

            let mut seen = Vec::new();
            while cursor.has_next().unwrap() {
                seen.push(cursor.next().unwrap().sort_key());
            }
            assert_eq!(seen, expected, "page_size={page_size}");
        }
    }

    #[test]
    fn completing_each_item_does_not_skip_for_every_page_size() {
        let n = 5;
        for page_size in 1..=n + 1 {
            let conn = open_memory_database().unwrap();
            let expected = seed_items(&conn, n);

            let mut source = SqliteEventSource::new();
            let mut cursor = PagedCursor::new(
                &mut source,
                &conn,
                ItemQuery::new(ItemStatus::Pending),
                page_size,
            )
            .unwrap();

            let mut seen = Vec::new();
            while cursor.has_next().unwrap() {
                let event = cursor.next().unwrap();
                seen.push(event.sort_key());
                // Complete the item so it drops out of the pending filter
                set_item_status(&conn, event.item.id, ItemStatus::Completed).unwrap();
                cursor.updated();
            }
            assert_eq!(seen, expected, "page_size={page_size}");
        }
    }

    #[test]
    fn batched_completion_does_not_skip() {
        let n = 6;
        let k = 2;
        for page_size in 1..=n + 1 {
            let conn = open_memory_database().unwrap();
            let expected = seed_items(&conn, n);

            let mut source = SqliteEventSource::new();
            let mut cursor = PagedCursor::new(
                &mut source,
                &conn,
                ItemQuery::new(ItemStatus::Pending),
                page_size,
            )
            .unwrap();

            let mut seen = Vec::new();
            let mut pending_batch = Vec::new();
            while cursor.has_next().unwrap() {
                let event = cursor.next().unwrap();
                seen.push(event.sort_key());
                pending_batch.push(event.item.id);
                if pending_batch.len() == k {
                    for id in pending_batch.drain(..) {
                        set_item_status(&conn, id, ItemStatus::Completed).unwrap();
                    }
                    cursor.updated();
                }
            }
            assert_eq!(seen, expected, "page_size={page_size}");
        }
    }

    #[test]
    fn updated_refetches_unyielded_buffer_rows() {
        let conn = open_memory_database().unwrap();
        let expected = seed_items(&conn, 4);

        let mut source = SqliteEventSource::new();
        // Page size 4: the whole set is buffered after the first fill
        let mut cursor =
            PagedCursor::new(&mut source, &conn, ItemQuery::new(ItemStatus::Pending), 4).unwrap();

        let first = cursor.next().unwrap();
        set_item_status(&conn, first.item.id, ItemStatus::Completed).unwrap();
        cursor.updated();

        let mut rest = Vec::new();
        while cursor.has_next().unwrap() {
            rest.push(cursor.next().unwrap().sort_key());
        }
        assert_eq!(rest, expected[1..].to_vec());
    }
}
