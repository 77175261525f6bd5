//! Mapping targets: ordered and hashed maps.
//!
//! Map decodes commit partially: each entry that decodes is inserted, each
//! failure is recorded under `path[key]`, and the map is returned either
//! way. Record sources turn field names into keys through the same key
//! dispatch map sources use. Weak mode merges a sequence of mappings into
//! one map, element by element.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use record_types::{Kind, Value};

use crate::config::Config;
use crate::decode::Decode;
use crate::error::{index_path, key_path, DecodeError, ErrorBag};

/// Insertion interface shared by the supported map types.
trait MapCollector: Default {
    type Key: Decode;
    type Val: Decode + Default;

    fn insert_entry(&mut self, key: Self::Key, value: Self::Val);
    fn merge_from(&mut self, other: Self);
}

impl<K: Decode + Ord, V: Decode + Default> MapCollector for BTreeMap<K, V> {
    type Key = K;
    type Val = V;

    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn merge_from(&mut self, other: Self) {
        self.extend(other);
    }
}

impl<K: Decode + Eq + Hash, V: Decode + Default> MapCollector for HashMap<K, V> {
    type Key = K;
    type Val = V;

    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn merge_from(&mut self, other: Self) {
        self.extend(other);
    }
}

fn decode_entry<M: MapCollector>(
    config: &Config,
    entry_path: &str,
    key_value: &Value,
    entry_value: &Value,
    out: &mut M,
    errors: &mut ErrorBag,
) {
    let Some(key) = config.decode_at::<M::Key>(entry_path, key_value, errors) else {
        return;
    };
    if entry_value.is_null() {
        // Null entries commit the value type's zero, keeping the key.
        out.insert_entry(key, M::Val::default());
        return;
    }
    if let Some(value) = config.decode_at::<M::Val>(entry_path, entry_value, errors) {
        out.insert_entry(key, value);
    }
}

fn decode_map<M>(config: &Config, path: &str, value: &Value, errors: &mut ErrorBag) -> Option<M>
where
    M: MapCollector + Decode,
{
    match value {
        Value::Map(entries) => {
            let mut out = M::default();
            for (key_value, entry_value) in entries {
                let entry_path = key_path(path, key_value);
                decode_entry(config, &entry_path, key_value, entry_value, &mut out, errors);
            }
            Some(out)
        }
        Value::Record(rec) => {
            let mut out = M::default();
            for (name, entry_value) in rec.iter() {
                let entry_path = key_path(path, &name);
                let name_value = Value::String(name.to_string());
                decode_entry(config, &entry_path, &name_value, entry_value, &mut out, errors);
            }
            Some(out)
        }
        Value::Seq(items) if config.weakly_typed => {
            let mut out = M::default();
            for (i, item) in items.iter().enumerate() {
                if let Some(chunk) = config.decode_at::<M>(&index_path(path, i), item, errors) {
                    out.merge_from(chunk);
                }
            }
            Some(out)
        }
        other => {
            errors.push(DecodeError::mismatch(path, "map", other.kind()));
            None
        }
    }
}

impl<K, V> Decode for BTreeMap<K, V>
where
    K: Decode + Ord,
    V: Decode + Default,
{
    const KIND: Kind = Kind::Map;

    fn decode_value(
        config: &Config,
        path: &str,
        value: &Value,
        errors: &mut ErrorBag,
    ) -> Option<Self> {
        decode_map(config, path, value, errors)
    }
}

impl<K, V> Decode for HashMap<K, V>
where
    K: Decode + Eq + Hash,
    V: Decode + Default,
{
    const KIND: Kind = Kind::Map;

    fn decode_value(
        config: &Config,
        path: &str,
        value: &Value,
        errors: &mut ErrorBag,
    ) -> Option<Self> {
        decode_map(config, path, value, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use record_types::Record;

    fn strict() -> Config {
        Config::default()
    }

    fn weak() -> Config {
        Config::default().weak(true)
    }

    #[test]
    fn map_source_decodes_keys_and_values() {
        let mut bag = ErrorBag::new();
        let source = Value::Map(vec![
            (Value::String("a".into()), Value::Int(1)),
            (Value::String("b".into()), Value::Int(2)),
        ]);
        let out: BTreeMap<String, i64> = strict().decode_at("m", &source, &mut bag).unwrap();
        assert_eq!(out, BTreeMap::from([("a".into(), 1), ("b".into(), 2)]));
        assert!(bag.is_empty());
    }

    #[test]
    fn record_source_projects_field_names_as_keys() {
        let mut rec = Record::new();
        rec.push("A", Value::Int(1));
        rec.push("B", Value::Int(2));

        let mut bag = ErrorBag::new();
        let out: BTreeMap<String, i64> = strict()
            .decode_at("m", &Value::Record(rec), &mut bag)
            .unwrap();
        assert_eq!(out, BTreeMap::from([("A".into(), 1), ("B".into(), 2)]));
        assert!(bag.is_empty());
    }

    #[test]
    fn failing_entry_is_skipped_and_named_but_map_commits() {
        let mut bag = ErrorBag::new();
        let source = Value::Map(vec![
            (Value::String("good".into()), Value::Int(1)),
            (Value::String("bad".into()), Value::Bool(true)),
        ]);
        let out: BTreeMap<String, i64> = strict().decode_at("m", &source, &mut bag).unwrap();
        assert_eq!(out, BTreeMap::from([("good".into(), 1)]));

        let err = bag.into_aggregate("t").unwrap().to_string();
        assert!(err.contains("'m[bad]'"));
    }

    #[test]
    fn null_entry_commits_the_zero_value() {
        let mut bag = ErrorBag::new();
        let source = Value::Map(vec![(Value::String("k".into()), Value::Null)]);
        let out: BTreeMap<String, i64> = strict().decode_at("m", &source, &mut bag).unwrap();
        assert_eq!(out, BTreeMap::from([("k".into(), 0)]));
        assert!(bag.is_empty());
    }

    #[test]
    fn weak_sequence_of_maps_merges() {
        let mut bag = ErrorBag::new();
        let source = Value::Seq(vec![
            Value::Map(vec![(Value::String("a".into()), Value::Int(1))]),
            Value::Map(vec![
                (Value::String("a".into()), Value::Int(10)),
                (Value::String("b".into()), Value::Int(2)),
            ]),
        ]);
        let out: HashMap<String, i64> = weak().decode_at("m", &source, &mut bag).unwrap();
        assert_eq!(out, HashMap::from([("a".into(), 10), ("b".into(), 2)]));
        assert!(bag.is_empty());

        // Empty sequence is an empty map.
        let out: HashMap<String, i64> = weak()
            .decode_at("m", &Value::Seq(vec![]), &mut bag)
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn strict_mode_rejects_sequence_sources() {
        let mut bag = ErrorBag::new();
        let out: Option<BTreeMap<String, i64>> =
            strict().decode_at("m", &Value::Seq(vec![]), &mut bag);
        assert!(out.is_none());
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn nested_record_values_become_nested_maps() {
        let mut inner = Record::new();
        inner.push("x", Value::Int(5));
        let mut outer = Record::new();
        outer.push("child", Value::Record(inner));

        let mut bag = ErrorBag::new();
        let out: BTreeMap<String, BTreeMap<String, i64>> = strict()
            .decode_at("m", &Value::Record(outer), &mut bag)
            .unwrap();
        assert_eq!(out["child"], BTreeMap::from([("x".into(), 5)]));
        assert!(bag.is_empty());
    }
}
