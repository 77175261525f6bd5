//! Named-field targets: descriptor tables and the single resolution path.
//!
//! Every struct target decodes through [`Config::decode_struct`], whether
//! its impl is derived or hand-written, so key binding (tag override, exact
//! match, case-insensitive fallback), used-key tracking, flattening and the
//! remainder field have exactly one implementation.

use record_types::{Record, Value};

use crate::config::Config;
use crate::error::{field_path, DecodeError, ErrorBag};

/// Static descriptor of one target field.
///
/// `tags` holds `(tag key, raw tag)` pairs; the raw tag uses the
/// `name[,option...]` syntax where the name `-` excludes the field and the
/// options are `omitempty` (projection only) and `remain`.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Declared field name, the binding key when no tag overrides it.
    pub name: &'static str,
    pub tags: &'static [(&'static str, &'static str)],
    /// Embedded target whose fields resolve against this level's source.
    pub flatten: bool,
    /// Collects every source entry no other field claimed.
    pub remain: bool,
    /// Descriptor table of the embedded target, for flattened fields.
    pub sub_fields: Option<fn() -> &'static [FieldSpec]>,
}

impl FieldSpec {
    fn raw_tag(&self, tag_name: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(key, _)| *key == tag_name)
            .map(|(_, raw)| *raw)
    }

    /// Source key this field binds to, or `None` when excluded with `-`.
    pub fn resolved_name(&self, tag_name: &str) -> Option<&'static str> {
        match self.raw_tag(tag_name) {
            None => Some(self.name),
            Some(raw) => {
                let name = raw.split(',').next().unwrap_or("");
                if name == "-" {
                    None
                } else if name.is_empty() {
                    Some(self.name)
                } else {
                    Some(name)
                }
            }
        }
    }

    pub fn has_option(&self, tag_name: &str, option: &str) -> bool {
        self.raw_tag(tag_name)
            .map(|raw| raw.split(',').skip(1).any(|opt| opt == option))
            .unwrap_or(false)
    }

    pub fn is_remain(&self, tag_name: &str) -> bool {
        self.remain || self.has_option(tag_name, "remain")
    }
}

/// A type with a static field descriptor table.
pub trait RecordTarget {
    fn fields() -> &'static [FieldSpec];
}

struct Entry<'v> {
    /// Binding key; `None` for non-string map keys, which never match.
    key: Option<&'v str>,
    rendered: String,
    value: &'v Value,
}

fn find_entry(entries: &[Entry<'_>], name: &str) -> Option<usize> {
    if let Some(i) = entries
        .iter()
        .position(|e| e.key.map_or(false, |k| k == name))
    {
        return Some(i);
    }
    entries
        .iter()
        .position(|e| e.key.map_or(false, |k| k.eq_ignore_ascii_case(name)))
}

/// Claims every source entry the embedded descriptor tree binds, marking
/// the entries used at this level and collecting them (under their source
/// keys) into the record the embedded target will decode from.
fn collect_claims(
    entries: &[Entry<'_>],
    used: &mut [bool],
    specs: &[FieldSpec],
    tag_name: &str,
    out: &mut Record,
) {
    for spec in specs {
        if spec.is_remain(tag_name) {
            continue;
        }
        if spec.flatten {
            if let Some(sub) = spec.sub_fields {
                collect_claims(entries, used, sub(), tag_name, out);
            }
            continue;
        }
        let Some(name) = spec.resolved_name(tag_name) else {
            continue;
        };
        if let Some(i) = find_entry(entries, name) {
            used[i] = true;
            out.push(entries[i].rendered.clone(), entries[i].value.clone());
        }
    }
}

impl Config {
    /// Resolves a record or map source against a descriptor table.
    ///
    /// `assign` is called once per bound field with the field's index in
    /// `specs`, the child path, and the source value to decode; unmatched
    /// fields are never called and keep their defaults. Returns `None`
    /// (with a recorded mismatch) when the source is not record-shaped.
    pub fn decode_struct(
        &self,
        path: &str,
        value: &Value,
        errors: &mut ErrorBag,
        specs: &[FieldSpec],
        assign: &mut dyn FnMut(&Config, usize, &str, &Value, &mut ErrorBag),
    ) -> Option<()> {
        let entries: Vec<Entry<'_>> = match value {
            Value::Record(rec) => rec
                .iter()
                .map(|(name, value)| Entry {
                    key: Some(name),
                    rendered: name.to_string(),
                    value,
                })
                .collect(),
            Value::Map(pairs) => pairs
                .iter()
                .map(|(key, value)| Entry {
                    key: key.as_key(),
                    rendered: key.to_string(),
                    value,
                })
                .collect(),
            other => {
                errors.push(DecodeError::mismatch(path, "record", other.kind()));
                return None;
            }
        };

        let mut used = vec![false; entries.len()];
        let mut remain_idx = None;

        for (i, spec) in specs.iter().enumerate() {
            if spec.is_remain(&self.tag_name) {
                remain_idx = Some(i);
                continue;
            }
            if spec.flatten {
                let mut claimed = Record::new();
                if let Some(sub) = spec.sub_fields {
                    collect_claims(&entries, &mut used, sub(), &self.tag_name, &mut claimed);
                }
                assign(self, i, path, &Value::Record(claimed), errors);
                continue;
            }
            let Some(bind_name) = spec.resolved_name(&self.tag_name) else {
                continue;
            };
            let Some(entry_idx) = find_entry(&entries, bind_name) else {
                continue;
            };
            used[entry_idx] = true;
            let child_path = field_path(path, bind_name);
            assign(self, i, &child_path, entries[entry_idx].value, errors);
        }

        let unused: Vec<usize> = (0..entries.len()).filter(|i| !used[*i]).collect();
        if let Some(ri) = remain_idx {
            let mut rest = Record::with_capacity(unused.len());
            for i in unused {
                rest.push(entries[i].rendered.clone(), entries[i].value.clone());
            }
            assign(self, ri, path, &Value::Record(rest), errors);
        } else if !unused.is_empty() {
            let mut keys: Vec<String> = unused
                .into_iter()
                .map(|i| entries[i].rendered.clone())
                .collect();
            keys.sort();
            errors.push(DecodeError::UnknownKeys {
                path: path.to_string(),
                keys,
            });
        }
        Some(())
    }
}
