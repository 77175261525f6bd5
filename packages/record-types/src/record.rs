//! Ordered named-field records as produced from database rows.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// An ordered collection of named fields.
///
/// The field order is the order fields were inserted (for rows, the column
/// order of the result set). Duplicate names are permitted; lookups return
/// the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Appends a field, keeping insertion order.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.push((name.into(), value.into()));
    }

    /// First field with this exact name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// First field matching the name ignoring ASCII case.
    pub fn get_ignore_case(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds a record from one result-set row.
    ///
    /// SQL `NULL` cells become [`Value::Null`]; every other cell arrives as
    /// raw text and is stored as a string. All further numeric, boolean and
    /// temporal interpretation is the decoder's job, not the row scanner's.
    pub fn from_row<'a, C, B>(columns: C, cells: B) -> Self
    where
        C: IntoIterator<Item = &'a str>,
        B: IntoIterator<Item = Option<&'a [u8]>>,
    {
        let mut rec = Record::new();
        for (name, cell) in columns.into_iter().zip(cells) {
            let value = match cell {
                None => Value::Null,
                Some(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
            };
            rec.push(name, value);
        }
        rec
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
