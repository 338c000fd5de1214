//! Requests keyed by id.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::{Request, RequestId};

/// Holds every submitted request.
///
/// [`RequestStore::modify`] runs under the request's shard lock, which is
/// what makes a status transition a compare-and-set.
#[derive(Debug)]
pub struct RequestStore {
    requests: DashMap<RequestId, Request>,
    next_id: AtomicU64,
}

impl Default for RequestStore {
    fn default() -> Self {
        Self {
            requests: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl RequestStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns an id, builds the request with it and stores it.
    pub fn insert_with(&self, build: impl FnOnce(RequestId) -> Request) -> Request {
        let request_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = build(request_id);
        self.requests.insert(request_id, request.clone());
        request
    }

    /// Returns a copy of the request.
    pub fn get(&self, request_id: RequestId) -> Option<Request> {
        self.requests.get(&request_id).map(|r| r.value().clone())
    }

    /// Runs `f` on the request while holding its lock.
    pub fn modify<T>(&self, request_id: RequestId, f: impl FnOnce(&mut Request) -> T) -> Option<T> {
        self.requests
            .get_mut(&request_id)
            .map(|mut r| f(r.value_mut()))
    }

    /// Requests matching `predicate`, newest first.
    pub fn filter(&self, predicate: impl Fn(&Request) -> bool) -> Vec<Request> {
        let mut requests: Vec<_> = self
            .requests
            .iter()
            .filter(|r| predicate(r.value()))
            .map(|r| r.value().clone())
            .collect();
        requests.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.request_id.cmp(&a.request_id))
        });
        requests
    }

    /// Number of stored requests.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Returns true if no request has been submitted.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
