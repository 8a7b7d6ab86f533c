// Integration tests for RPC response mapping
// Real AUR v5 responses are streamed through feed_json into the mappers


use auric::AurError;
use auric::rpc::{
    InfoMapper, RpcValue, SearchMapper, SearchQuery, collect_events, feed_json, map_info_response,
    map_search_response,
};
use chrono::{Datelike, TimeZone, Utc};
use test_helpers::{EMPTY_INFO_RESPONSE, ERROR_RESPONSE, INFO_RESPONSE, SEARCH_RESPONSE};

fn search(body: &str, query: &str) -> auric::Result<auric::RpcResultSet> {
    let query = SearchQuery::new(query)?;
    let mut mapper = SearchMapper::new();
    feed_json(body.as_bytes(), &mut mapper)?;
    mapper.finish(&query)
}

fn info(body: &str) -> auric::Result<auric::RpcRecord> {
    let mut mapper = InfoMapper::new();
    feed_json(body.as_bytes(), &mut mapper)?;
    mapper.finish()
}

#[test]
fn test_search_response_files_every_result() {
    let results = search(SEARCH_RESPONSE, "yay").unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results.names().collect::<Vec<_>>(), ["yay", "yay-bin", "yay-git"]);

    let yay = results.get("yay").unwrap();
    assert_eq!(yay.version(), Some("12.4.2-1"));
    assert_eq!(yay.votes(), Some(2283));
    assert_eq!(yay.text("packagebaseid"), Some("115973"));
    assert_eq!(yay.text("urlpath"), Some("/cgit/aur.git/snapshot/yay.tar.gz"));
    assert!(!yay.is_outdated());
    assert!(yay.desc().unwrap().starts_with("Yet another yogurt"));
}

#[test]
fn test_search_envelope_not_copied_into_records() {
    let results = search(SEARCH_RESPONSE, "yay").unwrap();
    for (_, record) in results.iter() {
        assert!(record.get("resultcount").is_none());
        assert!(record.get("type").is_none());
        assert!(record.get("version").is_some());
    }
}

#[test]
fn test_search_ordering_by_votes() {
    let results = search(SEARCH_RESPONSE, "yay").unwrap();
    let names: Vec<_> = results.by_votes().iter().filter_map(|r| r.name()).collect();
    assert_eq!(names, ["yay", "yay-bin", "yay-git"]);
}

#[test]
fn test_anchored_search_filters_locally() {
    let exact = search(SEARCH_RESPONSE, "^yay$").unwrap();
    assert_eq!(exact.names().collect::<Vec<_>>(), ["yay"]);

    let suffix = search(SEARCH_RESPONSE, "-git$").unwrap();
    assert_eq!(suffix.names().collect::<Vec<_>>(), ["yay-git"]);

    let prefix = search(SEARCH_RESPONSE, "^yay-").unwrap();
    assert_eq!(prefix.names().collect::<Vec<_>>(), ["yay-bin", "yay-git"]);
}

#[test]
fn test_search_error_sentinel() {
    match search(ERROR_RESPONSE, "a") {
        Err(AurError::RemoteError(message)) => {
            assert_eq!(message.as_deref(), Some("Too many package results."));
        }
        other => panic!("expected remote error, got {:?}", other),
    }
}

#[test]
fn test_error_sentinel_without_message() {
    let body = r#"{"type":"error","error":"Incorrect request type specified."}"#;
    match info(body) {
        Err(AurError::RemoteError(message)) => assert_eq!(message, None),
        other => panic!("expected remote error, got {:?}", other),
    }
}

#[test]
fn test_info_response_lists_and_timestamps() {
    let record = info(INFO_RESPONSE).unwrap();

    assert_eq!(record.name(), Some("yay"));
    assert_eq!(record.list("depends"), ["pacman>6.1", "git"]);
    assert_eq!(record.list("makedepends"), ["go>=1.21"]);
    assert_eq!(record.list("license"), ["GPL-3.0-or-later"]);
    assert_eq!(record.list("keywords").len(), 7);
    assert!(record.list("checkdepends").is_empty());

    let submitted = record.timestamp("firstsubmitted").unwrap();
    assert_eq!(submitted, Utc.timestamp_opt(1475688004, 0).unwrap());
    assert_eq!(submitted.year(), 2016);
    assert!((record.popularity().unwrap() - 27.81).abs() < f64::EPSILON);
}

#[test]
fn test_info_null_out_of_date_is_not_outdated() {
    let record = info(INFO_RESPONSE).unwrap();
    assert_eq!(record.get("outdated"), Some(&RpcValue::Flag(false)));
    assert!(!record.is_outdated());
}

#[test]
fn test_info_without_results() {
    assert!(matches!(info(EMPTY_INFO_RESPONSE), Err(AurError::RecordNotFound)));
}

#[test]
fn test_invalid_json() {
    assert!(matches!(
        info(r#"{"results": [{"Name": "yay"}"#),
        Err(AurError::JsonError(_))
    ));
    assert!(matches!(info("   "), Err(AurError::EmptyOrMissingInput(_))));
}

#[test]
fn test_collected_events_map_like_streamed_ones() {
    let events = collect_events(SEARCH_RESPONSE.as_bytes()).unwrap();
    let query = SearchQuery::new("yay").unwrap();
    let from_events = map_search_response(events, &query).unwrap();
    assert_eq!(from_events, search(SEARCH_RESPONSE, "yay").unwrap());

    let events = collect_events(INFO_RESPONSE.as_bytes()).unwrap();
    assert_eq!(map_info_response(events).unwrap(), info(INFO_RESPONSE).unwrap());
}

#[test]
fn test_result_set_serializes_keyed_by_name() {
    let results = search(SEARCH_RESPONSE, "^yay$").unwrap();
    let json = serde_json::to_value(&results).unwrap();
    assert_eq!(json["yay"]["votes"], "2283");
    assert_eq!(json["yay"]["outdated"], false);
}
