//! Message store module
//!
//! Append-only, in-memory sequence of message records. Insertion order is
//! acceptance order; readers always receive a copy, so nothing outside the
//! store can reorder or mutate what it holds.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

/// Field name of the server-assigned timestamp
pub const CREATED_AT: &str = "createdAt";

/// One stored message: the client's JSON object plus `createdAt`
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    /// Position in acceptance order, tie-breaker for equal timestamps
    #[serde(skip)]
    seq: u64,
    #[serde(rename = "createdAt", serialize_with = "serialize_timestamp")]
    created_at: DateTime<Utc>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Record {
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[cfg(test)]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[derive(Default)]
struct Inner {
    records: Vec<Record>,
    next_seq: u64,
}

/// Lock-guarded message store shared by all connections
#[derive(Default)]
pub struct MessageStore {
    inner: RwLock<Inner>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp `fields` with the current time and append them.
    ///
    /// Any client-supplied `createdAt` is replaced. Timestamps never go
    /// backwards in insertion order, even if the wall clock does.
    pub async fn append(&self, mut fields: Map<String, Value>) -> Record {
        fields.remove(CREATED_AT);

        let mut inner = self.inner.write().await;
        let mut created_at = Utc::now().trunc_subsecs(3);
        if let Some(last) = inner.records.last() {
            created_at = created_at.max(last.created_at);
        }

        let record = Record {
            seq: inner.next_seq,
            created_at,
            fields,
        };
        inner.next_seq += 1;
        inner.records.push(record.clone());
        record
    }

    /// Copy of every record in insertion order
    pub async fn snapshot(&self) -> Vec<Record> {
        self.inner.read().await.records.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_append_preserves_insertion_order() {
        let store = MessageStore::new();
        assert_eq!(store.len().await, 0);

        for name in ["a", "b", "c"] {
            store.append(object(json!({ "username": name }))).await;
        }

        let names: Vec<_> = store
            .snapshot()
            .await
            .iter()
            .map(|r| r.fields()["username"].clone())
            .collect();
        assert_eq!(names, vec![json!("a"), json!("b"), json!("c")]);
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_timestamps_and_sequence_are_monotonic() {
        let store = MessageStore::new();
        for i in 0..20 {
            store.append(object(json!({ "n": i }))).await;
        }

        let records = store.snapshot().await;
        for pair in records.windows(2) {
            assert!(pair[0].created_at() <= pair[1].created_at());
            assert_eq!(pair[0].seq() + 1, pair[1].seq());
        }
    }

    #[tokio::test]
    async fn test_client_created_at_is_replaced() {
        let store = MessageStore::new();
        let record = store
            .append(object(json!({ "username": "x", "createdAt": "1999-01-01" })))
            .await;

        assert!(!record.fields().contains_key(CREATED_AT));
        let serialized = serde_json::to_value(&record).expect("record serializes");
        assert_ne!(serialized[CREATED_AT], json!("1999-01-01"));
        assert_eq!(serialized["username"], json!("x"));
        assert!(serialized.get("seq").is_none());
    }

    #[tokio::test]
    async fn test_created_at_is_rfc3339_utc() {
        let store = MessageStore::new();
        let record = store.append(Map::new()).await;
        let serialized = serde_json::to_value(&record).expect("record serializes");
        let stamp = serialized[CREATED_AT].as_str().expect("timestamp is a string");

        assert!(stamp.ends_with('Z'), "unexpected timestamp: {stamp}");
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
    }

    #[tokio::test]
    async fn test_snapshot_is_a_copy() {
        let store = MessageStore::new();
        store.append(object(json!({ "n": 1 }))).await;

        let mut copy = store.snapshot().await;
        copy.clear();
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_are_not_lost() {
        let store = Arc::new(MessageStore::new());
        let mut tasks = Vec::new();
        for i in 0..50 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                store.append(object(json!({ "n": i }))).await;
            }));
        }
        for task in tasks {
            task.await.expect("append task panicked");
        }

        let records = store.snapshot().await;
        assert_eq!(records.len(), 50);
        let mut seqs: Vec<_> = records.iter().map(Record::seq).collect();
        seqs.dedup();
        assert_eq!(seqs.len(), 50);
    }
}
