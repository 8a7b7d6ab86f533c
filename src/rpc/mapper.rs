//! Event-driven mapping of RPC responses into records.
//!
//! AUR RPC responses wrap their payload in an envelope:
//!
//! ```text
//! {"version": 5, "type": "search", "resultcount": 2, "results": [{...}, {...}]}
//! ```
//!
//! [`SearchMapper`] files every object of the results array under its `name`;
//! [`InfoMapper`] keeps the first record it finds. Envelope fields are never
//! copied into a record. A top-level `"type": "error"` aborts either mapper
//! with [`AurError::RemoteError`] as soon as it is seen.
//!
//! Inside a record, scalar fields are stored under their renamed key (see
//! [`rename_key`]) and an array of scalars becomes a list. Anything nested
//! deeper is skipped.

use super::events::{Container, EventSink, JsonEvent, Scalar};
use super::filter::SearchQuery;
use super::record::{RpcRecord, RpcResultSet, RpcValue, coerce, rename_key};
use crate::error::{AurError, Result};

/// Map a search response into a result set, then apply the query's anchor
/// filter.
pub fn map_search_response<I>(events: I, query: &SearchQuery) -> Result<RpcResultSet>
where
    I: IntoIterator<Item = JsonEvent>,
{
    let mut mapper = SearchMapper::new();
    for event in events {
        mapper.event(event)?;
    }
    mapper.finish(query)
}

/// Map an info response into its single record.
///
/// # Errors
///
/// - [`AurError::RemoteError`] if the envelope reports an error
/// - [`AurError::RecordNotFound`] if there is no record with a name
/// - [`AurError::EmptyOrMissingInput`] if there were no events at all
pub fn map_info_response<I>(events: I) -> Result<RpcRecord>
where
    I: IntoIterator<Item = JsonEvent>,
{
    let mut mapper = InfoMapper::new();
    for event in events {
        mapper.event(event)?;
    }
    mapper.finish()
}

/// Top-level envelope tracking: only the error sentinel matters.
#[derive(Debug, Default)]
struct Envelope {
    key: Option<String>,
    message: Option<String>,
}

impl Envelope {
    fn key(&mut self, key: String, depth: usize) {
        self.key = (depth == 1).then_some(key);
    }

    fn scalar(&mut self, value: Scalar, depth: usize) -> Result<()> {
        if depth != 1 {
            return Ok(());
        }
        match self.key.take().as_deref() {
            Some("type") if value.is_literal("error") => {
                Err(AurError::RemoteError(self.message.clone()))
            }
            Some("error") => {
                self.message = value.into_text();
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug)]
struct PendingList {
    key: String,
    depth: usize,
    items: Vec<String>,
}

/// Key context for the record object open at `depth`.
///
/// Produces `(key, value)` writes; the owning mapper decides which record
/// they land in.
#[derive(Debug)]
struct RecordBody {
    depth: usize,
    pending_key: Option<String>,
    list: Option<PendingList>,
}

impl RecordBody {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            pending_key: None,
            list: None,
        }
    }

    /// A container opened at `depth`, below the record itself.
    fn enter(&mut self, kind: Container, depth: usize) {
        let key = self.pending_key.take();
        if let (Container::Array, Some(key)) = (kind, key)
            && depth == self.depth + 1
        {
            self.list = Some(PendingList {
                key,
                depth,
                items: Vec::new(),
            });
        }
    }

    /// A container at `depth`, below the record itself, closed.
    fn close(&mut self, depth: usize) -> Option<(String, RpcValue)> {
        match self.list.take() {
            Some(list) if list.depth == depth => Some((list.key, RpcValue::List(list.items))),
            other => {
                self.list = other;
                None
            }
        }
    }

    fn key(&mut self, key: String, depth: usize) {
        self.pending_key = (depth == self.depth).then(|| rename_key(&key));
    }

    fn scalar(&mut self, value: Scalar, depth: usize) -> Option<(String, RpcValue)> {
        if depth == self.depth {
            let key = self.pending_key.take()?;
            let value = coerce(&key, value)?;
            return Some((key, value));
        }
        if let Some(list) = &mut self.list
            && list.depth == depth
            && let Some(text) = value.into_text()
        {
            list.items.push(text);
        }
        None
    }
}

/// Builds an [`RpcResultSet`] from a search response.
///
/// A record is filed under its name the moment the `name` field is read.
/// Fields read before that are buffered in a working record that moves into
/// the result set with it; fields read after go straight to the filed slot.
/// An object that never names itself is discarded when it closes.
#[derive(Debug, Default)]
pub struct SearchMapper {
    depth: usize,
    /// Depth of the results array while inside it.
    collection: Option<usize>,
    body: Option<RecordBody>,
    working: RpcRecord,
    filed_under: Option<String>,
    results: RpcResultSet,
    envelope: Envelope,
    seen_events: bool,
}

impl SearchMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish mapping and apply the query's anchor filter.
    pub fn finish(self, query: &SearchQuery) -> Result<RpcResultSet> {
        if !self.seen_events {
            return Err(AurError::EmptyOrMissingInput("search response".to_string()));
        }
        Ok(query.filter(self.results))
    }

    fn begin_record(&mut self) {
        self.body = Some(RecordBody::new(self.depth));
        self.working = RpcRecord::default();
        self.filed_under = None;
    }

    fn end_record(&mut self) {
        self.body = None;
        self.working = RpcRecord::default();
        self.filed_under = None;
    }

    fn store(&mut self, key: String, value: RpcValue) {
        if key == "name" {
            let RpcValue::Text(name) = &value else {
                return;
            };
            if let Some(filed) = &self.filed_under {
                tracing::trace!("Ignoring second name {:?} for record {:?}", name, filed);
                return;
            }
            let name = name.clone();
            let mut record = std::mem::take(&mut self.working);
            record.insert(key, value);
            self.results.file(name.clone(), record);
            self.filed_under = Some(name);
            return;
        }

        let target = match &self.filed_under {
            Some(name) => self.results.slot(name),
            None => &mut self.working,
        };
        target.insert(key, value);
    }
}

impl EventSink for SearchMapper {
    fn event(&mut self, event: JsonEvent) -> Result<()> {
        self.seen_events = true;

        match event {
            JsonEvent::EnterArray => {
                self.depth += 1;
                if let Some(body) = &mut self.body {
                    body.enter(Container::Array, self.depth);
                } else if self.collection.is_none() {
                    self.collection = Some(self.depth);
                }
            }
            JsonEvent::EnterObject => {
                self.depth += 1;
                if let Some(body) = &mut self.body {
                    body.enter(Container::Object, self.depth);
                } else if self.collection == Some(self.depth - 1) {
                    self.begin_record();
                }
            }
            JsonEvent::Close(kind) => {
                let depth = self.depth;
                self.depth = depth.saturating_sub(1);

                let record_depth = self.body.as_ref().map(|body| body.depth);
                if record_depth == Some(depth) {
                    self.end_record();
                } else if record_depth.is_some() {
                    let write = self.body.as_mut().and_then(|body| body.close(depth));
                    if let Some((key, value)) = write {
                        self.store(key, value);
                    }
                } else if kind == Container::Array && self.collection == Some(depth) {
                    self.collection = None;
                }
            }
            JsonEvent::Key(key) => match &mut self.body {
                Some(body) => body.key(key, self.depth),
                None => self.envelope.key(key, self.depth),
            },
            JsonEvent::Scalar(value) => {
                if self.body.is_none() {
                    return self.envelope.scalar(value, self.depth);
                }
                let depth = self.depth;
                let write = self.body.as_mut().and_then(|body| body.scalar(value, depth));
                if let Some((key, value)) = write {
                    self.store(key, value);
                }
            }
        }

        Ok(())
    }
}

/// Builds the single [`RpcRecord`] of an info response.
///
/// The record is the first named object nested inside the envelope, whether
/// `results` holds it directly or inside an array. An object that closes
/// without a name is dropped and the next one is tried; once a named record
/// has closed, later objects are ignored.
#[derive(Debug, Default)]
pub struct InfoMapper {
    depth: usize,
    body: Option<RecordBody>,
    record: Option<RpcRecord>,
    envelope: Envelope,
    seen_events: bool,
}

impl InfoMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> Result<RpcRecord> {
        if !self.seen_events {
            return Err(AurError::EmptyOrMissingInput("info response".to_string()));
        }
        match self.record {
            Some(record) if record.name().is_some() => Ok(record),
            _ => Err(AurError::RecordNotFound),
        }
    }

    fn enter(&mut self, kind: Container) {
        self.depth += 1;
        if let Some(body) = &mut self.body {
            body.enter(kind, self.depth);
        } else if kind == Container::Object && self.depth >= 2 && self.record.is_none() {
            self.body = Some(RecordBody::new(self.depth));
            self.record = Some(RpcRecord::default());
        }
    }

    fn store(&mut self, key: String, value: RpcValue) {
        if let Some(record) = &mut self.record {
            record.insert(key, value);
        }
    }
}

impl EventSink for InfoMapper {
    fn event(&mut self, event: JsonEvent) -> Result<()> {
        self.seen_events = true;

        match event {
            JsonEvent::EnterArray => self.enter(Container::Array),
            JsonEvent::EnterObject => self.enter(Container::Object),
            JsonEvent::Close(_) => {
                let depth = self.depth;
                self.depth = depth.saturating_sub(1);

                let record_depth = self.body.as_ref().map(|body| body.depth);
                if record_depth == Some(depth) {
                    self.body = None;
                    if self.record.as_ref().is_some_and(|r| r.name().is_none()) {
                        self.record = None;
                    }
                } else if record_depth.is_some() {
                    let write = self.body.as_mut().and_then(|body| body.close(depth));
                    if let Some((key, value)) = write {
                        self.store(key, value);
                    }
                }
            }
            JsonEvent::Key(key) => match &mut self.body {
                Some(body) => body.key(key, self.depth),
                None => self.envelope.key(key, self.depth),
            },
            JsonEvent::Scalar(value) => {
                if self.body.is_none() {
                    return self.envelope.scalar(value, self.depth);
                }
                let depth = self.depth;
                let write = self.body.as_mut().and_then(|body| body.scalar(value, depth));
                if let Some((key, value)) = write {
                    self.store(key, value);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::events::collect_events;

    fn search(json: &str) -> Result<RpcResultSet> {
        let query = SearchQuery::new("x").unwrap();
        map_search_response(collect_events(json.as_bytes())?, &query)
    }

    fn info(json: &str) -> Result<RpcRecord> {
        map_info_response(collect_events(json.as_bytes())?)
    }

    #[test]
    fn test_search_two_records() {
        let results = search(
            r#"{"version":5,"type":"search","resultcount":2,"results":[
                {"Name":"pkg1","Version":"1.0-1","NumVotes":3},
                {"Description":"second","Name":"pkg2","Maintainer":null}
            ]}"#,
        )
        .unwrap();

        assert_eq!(results.names().collect::<Vec<_>>(), ["pkg1", "pkg2"]);

        let pkg1 = results.get("pkg1").unwrap();
        assert_eq!(pkg1.version(), Some("1.0-1"));
        assert_eq!(pkg1.votes(), Some(3));
        assert_eq!(pkg1.desc(), None);

        let pkg2 = results.get("pkg2").unwrap();
        assert_eq!(pkg2.desc(), Some("second"));
        assert_eq!(pkg2.get("maintainer"), None);
        assert_eq!(pkg2.len(), 2);
    }

    #[test]
    fn test_search_fields_before_and_after_name() {
        let results = search(r#"{"results":[{"Version":"2","Name":"a","URL":"u"}]}"#).unwrap();
        let record = results.get("a").unwrap();
        assert_eq!(record.version(), Some("2"));
        assert_eq!(record.text("url"), Some("u"));
        assert_eq!(record.name(), Some("a"));
    }

    #[test]
    fn test_search_envelope_not_copied() {
        let results = search(r#"{"type":"search","version":5,"results":[{"Name":"a"}]}"#).unwrap();
        let record = results.get("a").unwrap();
        assert_eq!(record.get("type"), None);
        assert_eq!(record.get("version"), None);
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_search_nameless_record_discarded() {
        let results = search(r#"{"results":[{"Version":"1"},{"Name":"b"}]}"#).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results.get("b").unwrap().version(), None);
    }

    #[test]
    fn test_search_outdated_coercion() {
        let results = search(
            r#"{"results":[{"Name":"a","OutOfDate":"1"},{"Name":"b","OutOfDate":"0"},{"Name":"c","OutOfDate":null}]}"#,
        )
        .unwrap();
        assert!(results.get("a").unwrap().is_outdated());
        assert!(!results.get("b").unwrap().is_outdated());
        assert!(!results.get("c").unwrap().is_outdated());
    }

    #[test]
    fn test_search_nested_lists_and_objects() {
        let results = search(
            r#"{"results":[{"Name":"a","Depends":["b","c>=1"],"Extra":{"Name":"evil"},"After":"x"}]}"#,
        )
        .unwrap();
        assert_eq!(results.len(), 1);
        let record = results.get("a").unwrap();
        assert_eq!(record.list("depends"), ["b", "c>=1"]);
        assert_eq!(record.get("extra"), None);
        assert_eq!(record.text("after"), Some("x"));
        assert_eq!(record.name(), Some("a"));
    }

    #[test]
    fn test_search_bare_array() {
        let results = search(r#"[{"Name":"a"},{"Name":"b"}]"#).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_search_empty_results() {
        let results = search(r#"{"type":"search","resultcount":0,"results":[]}"#).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_search_error_sentinel() {
        let err = search(r#"{"error":"Too many package results.","type":"error","results":[]}"#)
            .unwrap_err();
        assert!(matches!(err, AurError::RemoteError(Some(ref m)) if m == "Too many package results."));
    }

    #[test]
    fn test_search_no_events() {
        let query = SearchQuery::new("x").unwrap();
        let err = map_search_response(Vec::new(), &query).unwrap_err();
        assert!(matches!(err, AurError::EmptyOrMissingInput(_)));
    }

    #[test]
    fn test_info_record_in_array() {
        let record = info(
            r#"{"version":5,"type":"multiinfo","resultcount":1,"results":[
                {"Name":"yay","Version":"12.3.5-1","Description":"helper","NumVotes":2345,
                 "OutOfDate":null,"Depends":["pacman>6.1","git"],"LastModified":1700000000}
            ]}"#,
        )
        .unwrap();
        assert_eq!(record.name(), Some("yay"));
        assert_eq!(record.desc(), Some("helper"));
        assert_eq!(record.votes(), Some(2345));
        assert!(!record.is_outdated());
        assert_eq!(record.list("depends"), ["pacman>6.1", "git"]);
        assert!(record.timestamp("lastmodified").is_some());
        assert_eq!(record.get("type"), None);
    }

    #[test]
    fn test_info_record_as_object() {
        let record = info(r#"{"type":"info","results":{"Name":"foo","OutOfDate":"1"}}"#).unwrap();
        assert_eq!(record.name(), Some("foo"));
        assert!(record.is_outdated());
    }

    #[test]
    fn test_info_first_record_wins() {
        let record = info(r#"{"results":[{"Name":"a"},{"Name":"b"}]}"#).unwrap();
        assert_eq!(record.name(), Some("a"));
    }

    #[test]
    fn test_info_error_sentinel_after_fields() {
        let err = info(r#"{"results":{"Name":"a","Version":"1"},"type":"error"}"#).unwrap_err();
        assert!(matches!(err, AurError::RemoteError(None)));
    }

    #[test]
    fn test_info_no_record() {
        let err = info(r#"{"type":"multiinfo","resultcount":0,"results":[]}"#).unwrap_err();
        assert!(matches!(err, AurError::RecordNotFound));

        let err = info(r#"{"results":[{"Version":"1"}]}"#).unwrap_err();
        assert!(matches!(err, AurError::RecordNotFound));
    }

    #[test]
    fn test_info_skips_nameless_record() {
        let record = info(r#"{"results":[{"Version":"1"},{"Name":"b","Version":"2"}]}"#).unwrap();
        assert_eq!(record.name(), Some("b"));
        assert_eq!(record.version(), Some("2"));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_type_inside_record_is_a_field() {
        let record = info(r#"{"results":{"Name":"a","Type":"error"}}"#).unwrap();
        assert_eq!(record.text("type"), Some("error"));
    }
}
