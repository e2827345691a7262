//! InfluxDB line-protocol encoding.
//!
//! Pure functions turning the record model into escaped wire text:
//!
//! ```text
//! measurement[,tag_key=tag_value...] field_key=field_value[,...] [timestamp]
//! ```
//!
//! Tags are sorted by key on the wire (the in-memory order is untouched),
//! fields keep insertion order, and the timestamp is rendered as a plain
//! base-10 integer at the chosen [`Precision`].

use chrono::{DateTime, Utc};

use fluxline_types::{Batch, FieldValue, Precision, Record};

use crate::SdkError;

/// Escape a measurement name, tag key, or tag value.
///
/// Spaces, commas, and equals signs are backslash-escaped; nothing else
/// is altered. Double quotes are deliberately left alone here — only
/// string field values get quote escaping. A blank input is an error.
pub fn escape(input: &str) -> Result<String, SdkError> {
    if input.trim().is_empty() {
        return Err(SdkError::BlankEscapeInput);
    }
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            ' ' | ',' | '=' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    Ok(escaped)
}

/// Render a field value in its wire form.
///
/// Integers get a trailing `i`, floats use the shortest round-trip
/// decimal representation, booleans render as `True`/`False` (the
/// capitalization is a compatibility quirk, kept as-is), and strings are
/// double-quoted with internal quotes backslash-escaped.
pub fn format_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Integer(v) => format!("{v}i"),
        FieldValue::Unsigned(v) => format!("{v}i"),
        FieldValue::Float(v) => format!("{v}"),
        FieldValue::Boolean(true) => "True".to_string(),
        FieldValue::Boolean(false) => "False".to_string(),
        FieldValue::Text(v) => format!("\"{}\"", v.replace('"', "\\\"")),
    }
}

/// Render a timestamp as an integer at the given precision.
///
/// Timestamps earlier than the Unix epoch are out of range.
pub fn format_timestamp(
    timestamp: DateTime<Utc>,
    precision: Precision,
) -> Result<String, SdkError> {
    let elapsed = timestamp
        .signed_duration_since(DateTime::UNIX_EPOCH)
        .to_std()
        .map_err(|_| SdkError::TimestampOutOfRange(timestamp))?;
    Ok(precision.ticks(elapsed).to_string())
}

/// Encode one record as a line-protocol line.
///
/// A blank name or an empty field list fails fast; a partial line is
/// never emitted.
pub fn encode_record(record: &Record, precision: Precision) -> Result<String, SdkError> {
    if record.name().trim().is_empty() {
        return Err(SdkError::BlankRecordName);
    }
    if record.fields().is_empty() {
        return Err(SdkError::NoFields(record.name().to_string()));
    }

    let mut line = escape(record.name())?;

    let mut tags: Vec<_> = record.tags().iter().collect();
    tags.sort_by(|a, b| a.key().cmp(b.key()));
    for tag in tags {
        line.push(',');
        line.push_str(&escape(tag.key())?);
        line.push('=');
        line.push_str(&escape(tag.value())?);
    }

    line.push(' ');
    for (i, field) in record.fields().iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(&escape(field.key())?);
        line.push('=');
        line.push_str(&format_value(field.value()));
    }

    if let Some(timestamp) = record.timestamp() {
        line.push(' ');
        line.push_str(&format_timestamp(timestamp, precision)?);
    }

    Ok(line)
}

/// Encode a batch as newline-joined lines, with no trailing newline.
///
/// An empty batch encodes to the empty string.
pub fn encode_batch(batch: &Batch, precision: Precision) -> Result<String, SdkError> {
    let lines: Vec<String> = batch
        .iter()
        .map(|record| encode_record(record, precision))
        .collect::<Result<_, _>>()?;
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxline_types::{Field, Tag};

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    // ========================================================================
    // Escaping Tests
    // ========================================================================

    #[test]
    fn escape_space_comma_equals() {
        assert_eq!(escape("a b").unwrap(), "a\\ b");
        assert_eq!(escape("a,b").unwrap(), "a\\,b");
        assert_eq!(escape("a=b").unwrap(), "a\\=b");
        assert_eq!(escape("a b,c=d").unwrap(), "a\\ b\\,c\\=d");
    }

    #[test]
    fn escape_leaves_other_characters_alone() {
        assert_eq!(escape("plain_name.0-9").unwrap(), "plain_name.0-9");
        assert_eq!(escape("quote\"inside").unwrap(), "quote\"inside");
    }

    #[test]
    fn escape_blank_is_an_error() {
        assert!(matches!(escape("").unwrap_err(), SdkError::BlankEscapeInput));
        assert!(matches!(escape("   ").unwrap_err(), SdkError::BlankEscapeInput));
    }

    // ========================================================================
    // Field Value Formatting Tests
    // ========================================================================

    #[test]
    fn integers_get_trailing_i() {
        assert_eq!(format_value(&FieldValue::Integer(123456)), "123456i");
        assert_eq!(format_value(&FieldValue::Integer(-100)), "-100i");
        assert_eq!(format_value(&FieldValue::Unsigned(0)), "0i");
        assert_eq!(
            format_value(&FieldValue::Unsigned(u64::MAX)),
            format!("{}i", u64::MAX)
        );
    }

    #[test]
    fn integers_have_no_decimal_point() {
        assert!(!format_value(&FieldValue::Integer(42)).contains('.'));
    }

    #[test]
    fn floats_round_trip_without_precision_loss() {
        for value in [0.1, 1.0 / 3.0, f64::MAX, f64::MIN_POSITIVE, -2.5e-10] {
            let rendered = format_value(&FieldValue::Float(value));
            let parsed: f64 = rendered.parse().unwrap();
            assert_eq!(parsed, value, "lossy rendering of {value}: {rendered}");
        }
    }

    #[test]
    fn floats_have_no_integer_suffix() {
        assert_eq!(format_value(&FieldValue::Float(1.5)), "1.5");
    }

    #[test]
    fn booleans_are_capitalized() {
        assert_eq!(format_value(&FieldValue::Boolean(true)), "True");
        assert_eq!(format_value(&FieldValue::Boolean(false)), "False");
    }

    #[test]
    fn strings_are_quoted_and_quote_escaped() {
        assert_eq!(
            format_value(&FieldValue::Text("plain".to_string())),
            "\"plain\""
        );
        assert_eq!(
            format_value(&FieldValue::Text("say \"hi\"".to_string())),
            "\"say \\\"hi\\\"\""
        );
    }

    #[test]
    fn string_values_keep_spaces_unescaped() {
        // Only the surrounding quotes protect string content.
        assert_eq!(
            format_value(&FieldValue::Text("a b,c=d".to_string())),
            "\"a b,c=d\""
        );
    }

    // ========================================================================
    // Timestamp Tests
    // ========================================================================

    #[test]
    fn timestamp_rendered_at_each_precision() {
        let timestamp = ts(1483228800); // 2017-01-01T00:00:00Z

        let expect = [
            (Precision::Nanoseconds, "1483228800000000000"),
            (Precision::Microseconds, "1483228800000000"),
            (Precision::Milliseconds, "1483228800000"),
            (Precision::Seconds, "1483228800"),
            (Precision::Minutes, "24720480"),
            (Precision::Hours, "412008"),
        ];
        for (precision, rendered) in expect {
            assert_eq!(format_timestamp(timestamp, precision).unwrap(), rendered);
        }
    }

    #[test]
    fn pre_epoch_timestamp_is_out_of_range() {
        let before_epoch = ts(-1);
        assert!(matches!(
            format_timestamp(before_epoch, Precision::Seconds).unwrap_err(),
            SdkError::TimestampOutOfRange(_)
        ));
    }

    // ========================================================================
    // Record Encoding Tests
    // ========================================================================

    #[test]
    fn concrete_record_example() {
        let record = Record::new("test_name")
            .with_tag(Tag::new("tag1", "value1").unwrap())
            .with_field(Field::new("field1", 123456i64).unwrap());

        assert_eq!(
            encode_record(&record, Precision::Seconds).unwrap(),
            "test_name,tag1=value1 field1=123456i"
        );
    }

    #[test]
    fn tags_are_sorted_by_key_on_the_wire() {
        let record = Record::new("m")
            .with_tag(Tag::new("zebra", "1").unwrap())
            .with_tag(Tag::new("alpha", "2").unwrap())
            .with_tag(Tag::new("mid", "3").unwrap())
            .with_field(Field::new("v", 1i64).unwrap());

        assert_eq!(
            encode_record(&record, Precision::Seconds).unwrap(),
            "m,alpha=2,mid=3,zebra=1 v=1i"
        );
        // The in-memory order is untouched.
        assert_eq!(record.tags()[0].key(), "zebra");
    }

    #[test]
    fn fields_keep_insertion_order() {
        let record = Record::new("m")
            .with_field(Field::new("second", 2i64).unwrap())
            .with_field(Field::new("first", 1i64).unwrap());

        assert_eq!(
            encode_record(&record, Precision::Seconds).unwrap(),
            "m second=2i,first=1i"
        );
    }

    #[test]
    fn record_with_timestamp_appends_integer() {
        let record = Record::new("m")
            .with_field(Field::new("v", 1i64).unwrap())
            .with_timestamp(ts(1483228800));

        assert_eq!(
            encode_record(&record, Precision::Seconds).unwrap(),
            "m v=1i 1483228800"
        );
        assert_eq!(
            encode_record(&record, Precision::Nanoseconds).unwrap(),
            "m v=1i 1483228800000000000"
        );
    }

    #[test]
    fn record_name_and_tags_are_escaped() {
        let record = Record::new("cpu load")
            .with_tag(Tag::new("data center", "us east,1").unwrap())
            .with_field(Field::new("busy time", 0.5f64).unwrap());

        assert_eq!(
            encode_record(&record, Precision::Seconds).unwrap(),
            "cpu\\ load,data\\ center=us\\ east\\,1 busy\\ time=0.5"
        );
    }

    #[test]
    fn blank_name_fails_fast() {
        let record = Record::new("").with_field(Field::new("v", 1i64).unwrap());
        assert!(matches!(
            encode_record(&record, Precision::Seconds).unwrap_err(),
            SdkError::BlankRecordName
        ));
    }

    #[test]
    fn record_without_fields_fails_fast() {
        let record = Record::new("m").with_tag(Tag::new("t", "v").unwrap());
        match encode_record(&record, Precision::Seconds).unwrap_err() {
            SdkError::NoFields(name) => assert_eq!(name, "m"),
            other => panic!("unexpected error: {other}"),
        }
    }

    // ========================================================================
    // Batch Encoding Tests
    // ========================================================================

    #[test]
    fn empty_batch_encodes_to_empty_string() {
        assert_eq!(encode_batch(&Batch::new(), Precision::Seconds).unwrap(), "");
    }

    #[test]
    fn batch_joins_lines_with_newline_no_trailing() {
        let mut batch = Batch::new();
        batch.push(Record::new("a").with_field(Field::new("v", 1i64).unwrap()));
        batch.push(
            Record::new("b")
                .with_field(Field::new("v", 2i64).unwrap())
                .with_timestamp(ts(1483228800)),
        );

        let encoded = encode_batch(&batch, Precision::Seconds).unwrap();
        assert_eq!(encoded, "a v=1i\nb v=2i 1483228800");
        assert!(!encoded.ends_with('\n'));
    }

    #[test]
    fn batch_encoding_fails_if_any_record_is_invalid() {
        let mut batch = Batch::new();
        batch.push(Record::new("ok").with_field(Field::new("v", 1i64).unwrap()));
        batch.push(Record::new("broken"));

        assert!(encode_batch(&batch, Precision::Seconds).is_err());
    }
}
