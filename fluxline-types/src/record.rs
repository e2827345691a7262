//! The record model: tags, fields, records, and batches.
//!
//! A [`Record`] is one named, tagged, timestamped data point carrying at
//! least one field. Records accumulate in a [`Batch`], which a writer
//! drains into one transport call.

use chrono::{DateTime, Utc};

use crate::ModelError;

/// A named dimension attached to a record (indexed metadata, not data).
///
/// Both key and value are required and must be non-blank. Tags are
/// immutable once constructed; merge logic treats the key as the tag's
/// identity ("last tag with a given key wins"), while `PartialEq`
/// compares both key and value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tag {
    key: String,
    value: String,
}

impl Tag {
    /// Create a tag, rejecting blank keys or values.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Result<Self, ModelError> {
        let key = key.into();
        let value = value.into();
        if key.trim().is_empty() {
            return Err(ModelError::BlankTagKey);
        }
        if value.trim().is_empty() {
            return Err(ModelError::BlankTagValue(key));
        }
        Ok(Self { key, value })
    }

    /// The tag key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The tag value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// The value of a [`Field`].
///
/// The enum is closed: every supported value type has a `From`
/// conversion, so an unsupported field type is unrepresentable rather
/// than a runtime error.
///
/// Under the `serde` feature the representation is untagged, so an
/// `Unsigned` value within `i64` range deserializes as `Integer`. The
/// number is unchanged, but `PartialEq` across a serde round-trip does
/// not hold for unsigned fields.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FieldValue {
    /// A signed integer of any width up to 64 bits.
    Integer(i64),
    /// An unsigned integer of any width up to 64 bits.
    Unsigned(u64),
    /// A 32- or 64-bit float.
    Float(f64),
    /// A boolean.
    Boolean(bool),
    /// A string or single character. Must be non-blank.
    Text(String),
}

macro_rules! field_value_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for FieldValue {
            fn from(value: $ty) -> Self {
                FieldValue::Integer(value as i64)
            }
        })*
    };
}

macro_rules! field_value_from_uint {
    ($($ty:ty),*) => {
        $(impl From<$ty> for FieldValue {
            fn from(value: $ty) -> Self {
                FieldValue::Unsigned(value as u64)
            }
        })*
    };
}

field_value_from_int!(i8, i16, i32, i64, isize);
field_value_from_uint!(u8, u16, u32, u64, usize);

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        FieldValue::Float(value as f64)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<char> for FieldValue {
    fn from(value: char) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// A named measured value attached to a record (the actual data).
///
/// The key is required and non-blank; string values must be non-blank.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Field {
    key: String,
    value: FieldValue,
}

impl Field {
    /// Create a field, rejecting blank keys and blank string values.
    pub fn new(key: impl Into<String>, value: impl Into<FieldValue>) -> Result<Self, ModelError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ModelError::BlankFieldKey);
        }
        let value = value.into();
        if let FieldValue::Text(text) = &value {
            if text.trim().is_empty() {
                return Err(ModelError::BlankFieldValue(key));
            }
        }
        Ok(Self { key, value })
    }

    /// The field key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The field value.
    pub fn value(&self) -> &FieldValue {
        &self.value
    }
}

/// One data point: a name, tags, fields, and an optional timestamp.
///
/// Construction is permissive so records can be built incrementally: an
/// empty name or an empty field list only fails at serialization time.
/// The name, tag list, and field list can be rewritten in place, which
/// lets a name-formatting pass transform a record without rebuilding it.
///
/// Tags keep insertion order in memory; the serialized form sorts them
/// by key. Fields keep insertion order everywhere.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use fluxline_types::{Field, Record, Tag};
///
/// let record = Record::new("cpu")
///     .with_tag(Tag::new("host", "web-1")?)
///     .with_field(Field::new("busy", 0.85)?)
///     .with_timestamp(Utc::now());
///
/// assert_eq!(record.name(), "cpu");
/// assert_eq!(record.fields().len(), 1);
/// # Ok::<(), fluxline_types::ModelError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    name: String,
    tags: Vec<Tag>,
    fields: Vec<Field>,
    timestamp: Option<DateTime<Utc>>,
}

impl Record {
    /// Create a record with the given measurement name and nothing else.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a tag, keeping insertion order.
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Append several tags, keeping insertion order.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Append a field, keeping insertion order.
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Append several fields, keeping insertion order.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Set the timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// The measurement name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The tags in insertion order.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// The fields in insertion order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The timestamp, if one was set.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Rewrite the measurement name in place.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Replace the tag list in place.
    pub fn set_tags(&mut self, tags: Vec<Tag>) {
        self.tags = tags;
    }

    /// Replace the field list in place.
    pub fn set_fields(&mut self, fields: Vec<Field>) {
        self.fields = fields;
    }
}

/// An ordered group of records flushed together in one transport call.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Batch {
    records: Vec<Record>,
}

impl Batch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Number of buffered records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Empty the batch in place, keeping the underlying storage.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// The buffered records in append order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Iterate over the buffered records in append order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }
}

impl FromIterator<Record> for Batch {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
