//! Structural comparison of an edited record against its load-time snapshot.
use super::{
    path::Path,
    record::{Fields, Node, Record},
};
use std::sync::Arc;

/// True when `record` differs structurally from `snapshot`. Key order is irrelevant.
pub fn is_dirty(record: &Record, snapshot: &Record) -> bool {
    if Arc::ptr_eq(record.fields(), snapshot.fields()) {
        return false;
    }
    record != snapshot
}

/// Paths whose values differ, present in either record. Sorted.
///
/// Differences are reported at the leaves. A map that replaces a scalar (or is
/// replaced by one) also reports its own path, as does an empty map that was
/// added or removed.
pub fn changed_paths(record: &Record, snapshot: &Record) -> Vec<Path> {
    let mut changed = Vec::new();
    diff_fields(record.fields(), snapshot.fields(), &mut Vec::new(), &mut changed);
    changed
}

fn diff_fields(a: &Fields, b: &Fields, prefix: &mut Vec<String>, out: &mut Vec<Path>) {
    let mut keys: Vec<&String> = a.keys().chain(b.keys()).collect();
    keys.sort();
    keys.dedup();

    for key in keys {
        prefix.push(key.clone());
        match (a.get(key), b.get(key)) {
            (Some(x), Some(y)) if x.ptr_eq(y) => {}
            (Some(Node::Map(x)), Some(Node::Map(y))) => diff_fields(x, y, prefix, out),
            (Some(Node::Map(map)), other) | (other, Some(Node::Map(map))) => {
                if other.is_some() || map.is_empty() {
                    push_path(prefix, out);
                }
                diff_fields(map, &Fields::new(), prefix, out);
            }
            (x, y) if x != y => push_path(prefix, out),
            _ => {}
        }
        prefix.pop();
    }
}

fn push_path(prefix: &[String], out: &mut Vec<Path>) {
    if let Ok(path) = Path::parse(&prefix.join(".")) {
        out.push(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn same_record_is_clean() {
        let record = Record::from(json!({ "firstName": "Ada", "location": { "city": "Lagos" } }));
        assert!(!is_dirty(&record, &record));
        assert!(!is_dirty(&record, &record.deep_copy()));
    }

    #[test]
    fn key_order_is_irrelevant() {
        let a: Record = serde_json::from_str(r#"{"a":1,"b":{"c":2,"d":3}}"#).unwrap();
        let b: Record = serde_json::from_str(r#"{"b":{"d":3,"c":2},"a":1}"#).unwrap();
        assert!(!is_dirty(&a, &b));
    }

    #[test]
    fn writing_the_same_value_is_clean() {
        let snapshot = Record::from(json!({ "location": { "city": "Lagos" } }));
        let record = snapshot.set(&Path::parse("location.city").unwrap(), "Lagos");
        assert!(!is_dirty(&record, &snapshot));
    }

    #[test]
    fn changed_paths_lists_leaves() {
        let snapshot = Record::from(json!({
            "firstName": "Ada",
            "location": { "city": "Lagos", "country": "NG" }
        }));
        let record = snapshot
            .set(&Path::parse("location.city").unwrap(), "Accra")
            .set(&Path::parse("emergency.name").unwrap(), "Bo");

        let changed: Vec<String> = changed_paths(&record, &snapshot)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(changed, vec!["emergency.name", "location.city"]);
    }

    fn changed(record: &Record, snapshot: &Record) -> Vec<String> {
        changed_paths(record, snapshot)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn added_and_removed_subtrees_report_leaves() {
        let snapshot = Record::from(json!({ "firstName": "Ada" }));
        let record = Record::from(json!({
            "firstName": "Ada",
            "emergency": { "name": "Bo", "phone": { "mobile": "555" } }
        }));

        let expected = vec!["emergency.name", "emergency.phone.mobile"];
        assert_eq!(changed(&record, &snapshot), expected);
        assert_eq!(changed(&snapshot, &record), expected);
    }

    #[test]
    fn map_replacing_scalar_reports_both_levels() {
        let snapshot = Record::from(json!({ "location": "Lagos" }));
        let record = Record::from(json!({ "location": { "city": "Lagos" } }));

        let expected = vec!["location", "location.city"];
        assert_eq!(changed(&record, &snapshot), expected);
        assert_eq!(changed(&snapshot, &record), expected);
    }

    #[test]
    fn empty_map_added_reports_its_path() {
        let snapshot = Record::from(json!({ "firstName": "Ada" }));
        let record = Record::from(json!({ "firstName": "Ada", "prefs": {} }));

        assert!(is_dirty(&record, &snapshot));
        assert_eq!(changed(&record, &snapshot), vec!["prefs"]);
    }
}
