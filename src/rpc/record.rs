//! Typed records built from AUR RPC responses.

use super::events::Scalar;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Provider field names that are renamed; every other key is lower-cased.
const RENAMED_KEYS: &[(&str, &str)] = &[
    ("description", "desc"),
    ("numvotes", "votes"),
    ("categoryid", "category"),
    ("locationid", "location"),
    ("outofdate", "outdated"),
];

/// Normalize an RPC field name.
///
/// ```
/// use auric::rpc::rename_key;
///
/// assert_eq!(rename_key("NumVotes"), "votes");
/// assert_eq!(rename_key("URLPath"), "urlpath");
/// ```
pub fn rename_key(key: &str) -> String {
    let lower = key.to_lowercase();
    RENAMED_KEYS
        .iter()
        .find(|(from, _)| *from == lower)
        .map(|(_, to)| to.to_string())
        .unwrap_or(lower)
}

/// Convert a scalar stored under an already renamed key.
///
/// `outdated` becomes a flag that is set only for the literal `"1"`. Nulls are
/// dropped for every other key.
pub(crate) fn coerce(key: &str, value: Scalar) -> Option<RpcValue> {
    if key == "outdated" {
        return Some(RpcValue::Flag(value.is_literal("1")));
    }
    value.into_text().map(RpcValue::Text)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RpcValue {
    Text(String),
    Flag(bool),
    List(Vec<String>),
}

/// One package as reported by the RPC endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RpcRecord {
    fields: BTreeMap<String, RpcValue>,
}

impl RpcRecord {
    pub fn get(&self, key: &str) -> Option<&RpcValue> {
        self.fields.get(key)
    }

    pub fn name(&self) -> Option<&str> {
        self.text("name")
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            RpcValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// A list field, empty if absent or not a list.
    pub fn list(&self, key: &str) -> &[String] {
        match self.get(key) {
            Some(RpcValue::List(items)) => items,
            _ => &[],
        }
    }

    pub fn is_outdated(&self) -> bool {
        matches!(self.get("outdated"), Some(RpcValue::Flag(true)))
    }

    pub fn version(&self) -> Option<&str> {
        self.text("version")
    }

    pub fn desc(&self) -> Option<&str> {
        self.text("desc")
    }

    pub fn votes(&self) -> Option<u64> {
        self.text("votes")?.parse().ok()
    }

    pub fn popularity(&self) -> Option<f64> {
        self.text("popularity")?.parse().ok()
    }

    /// A field holding epoch seconds, such as `lastmodified`.
    pub fn timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        let secs: i64 = self.text(key)?.parse().ok()?;
        DateTime::from_timestamp(secs, 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RpcValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn insert(&mut self, key: String, value: RpcValue) {
        self.fields.insert(key, value);
    }
}

/// Search results keyed by package name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RpcResultSet {
    records: BTreeMap<String, RpcRecord>,
}

impl RpcResultSet {
    pub fn get(&self, name: &str) -> Option<&RpcRecord> {
        self.records.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RpcRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keep only the entries whose name satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.records.retain(|name, _| keep(name));
    }

    /// Records ordered by votes, most popular first. Ties keep name order.
    pub fn by_votes(&self) -> Vec<&RpcRecord> {
        let mut records: Vec<_> = self.records.values().collect();
        records.sort_by_key(|r| std::cmp::Reverse(r.votes().unwrap_or(0)));
        records
    }

    /// File a record under `name`, replacing any previous one.
    pub(crate) fn file(&mut self, name: String, record: RpcRecord) {
        self.records.insert(name, record);
    }

    /// The record filed under `name`.
    pub(crate) fn slot(&mut self, name: &str) -> &mut RpcRecord {
        self.records.entry(name.to_string()).or_default()
    }
}

impl IntoIterator for RpcResultSet {
    type Item = (String, RpcRecord);
    type IntoIter = btree_map::IntoIter<String, RpcRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_key() {
        assert_eq!(rename_key("Description"), "desc");
        assert_eq!(rename_key("NumVotes"), "votes");
        assert_eq!(rename_key("CategoryID"), "category");
        assert_eq!(rename_key("LocationID"), "location");
        assert_eq!(rename_key("OutOfDate"), "outdated");
        assert_eq!(rename_key("Name"), "name");
        assert_eq!(rename_key("LastModified"), "lastmodified");
        assert_eq!(rename_key("ID"), "id");
    }

    #[test]
    fn test_coerce_outdated() {
        assert_eq!(coerce("outdated", Scalar::String("1".into())), Some(RpcValue::Flag(true)));
        assert_eq!(coerce("outdated", Scalar::Number("1".into())), Some(RpcValue::Flag(true)));
        assert_eq!(coerce("outdated", Scalar::String("0".into())), Some(RpcValue::Flag(false)));
        assert_eq!(coerce("outdated", Scalar::Null), Some(RpcValue::Flag(false)));
        assert_eq!(
            coerce("outdated", Scalar::Number("1700000000".into())),
            Some(RpcValue::Flag(false))
        );
    }

    #[test]
    fn test_coerce_other_keys() {
        assert_eq!(
            coerce("votes", Scalar::Number("12".into())),
            Some(RpcValue::Text("12".into()))
        );
        assert_eq!(coerce("maintainer", Scalar::Null), None);
    }

    #[test]
    fn test_record_accessors() {
        let mut record = RpcRecord::default();
        record.insert("name".into(), RpcValue::Text("yay".into()));
        record.insert("votes".into(), RpcValue::Text("2345".into()));
        record.insert("popularity".into(), RpcValue::Text("12.5".into()));
        record.insert("outdated".into(), RpcValue::Flag(true));
        record.insert("lastmodified".into(), RpcValue::Text("1700000000".into()));
        record.insert("depends".into(), RpcValue::List(vec!["pacman".into(), "git".into()]));

        assert_eq!(record.name(), Some("yay"));
        assert_eq!(record.votes(), Some(2345));
        assert_eq!(record.popularity(), Some(12.5));
        assert!(record.is_outdated());
        assert_eq!(record.list("depends"), ["pacman", "git"]);
        assert!(record.list("makedepends").is_empty());
        assert_eq!(record.text("depends"), None);
        assert_eq!(
            record.timestamp("lastmodified").map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn test_result_set_by_votes() {
        let mut set = RpcResultSet::default();
        for (name, votes) in [("a", "3"), ("b", "10"), ("c", "1")] {
            let record = set.slot(name);
            record.insert("name".into(), RpcValue::Text(name.into()));
            record.insert("votes".into(), RpcValue::Text(votes.into()));
        }
        let order: Vec<_> = set.by_votes().iter().filter_map(|r| r.name()).collect();
        assert_eq!(order, ["b", "a", "c"]);

        set.retain(|name| name != "b");
        assert_eq!(set.names().collect::<Vec<_>>(), ["a", "c"]);
    }
}
