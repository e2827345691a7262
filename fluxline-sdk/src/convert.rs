//! Converting metric snapshots into records.
//!
//! The converter maps each metric kind onto one or more [`Record`]s with
//! a fixed, documented field set, attaching the current reporting
//! timestamp and a set of global tags to every record it produces.
//!
//! Labeled item breakdowns inside a metric emit one extra record per
//! item; the item label is parsed for embedded `key=value` tag pairs.
//! Tag merge order is global, then metric-local, then item-derived —
//! the last tag with a given key wins.

use chrono::{DateTime, Utc};

use fluxline_types::{
    CounterSnapshot, DistributionValues, Field, GaugeSnapshot, HealthCheckResult,
    HistogramSnapshot, MeterItem, MeterSnapshot, MetricsSnapshot, ModelError, RateValues, Record,
    Tag, TimerSnapshot,
};

use crate::format::default_name_transform;

/// Measurement name shared by all health check records.
pub const HEALTH_MEASUREMENT: &str = "Health Checks";

/// Maps metric snapshots to records.
///
/// Holds the current reporting timestamp (set by the caller before each
/// reporting phase) and the global tags merged into every record.
#[derive(Debug, Clone, Default)]
pub struct SnapshotConverter {
    timestamp: Option<DateTime<Utc>>,
    global_tags: Vec<Tag>,
}

impl SnapshotConverter {
    /// Create a converter with no timestamp and no global tags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter with a set of global tags.
    pub fn with_global_tags(global_tags: Vec<Tag>) -> Self {
        Self {
            timestamp: None,
            global_tags,
        }
    }

    /// Add a global tag merged into every produced record.
    pub fn add_global_tag(&mut self, tag: Tag) {
        upsert(&mut self.global_tags, tag);
    }

    /// Set the timestamp attached to every record produced afterwards.
    pub fn set_timestamp(&mut self, timestamp: DateTime<Utc>) {
        self.timestamp = Some(timestamp);
    }

    /// Convert a whole snapshot, setting the converter timestamp from it.
    pub fn convert_snapshot(
        &mut self,
        snapshot: &MetricsSnapshot,
    ) -> Result<Vec<Record>, ModelError> {
        self.set_timestamp(snapshot.timestamp);

        let mut records = Vec::new();
        for gauge in &snapshot.gauges {
            records.extend(self.convert_gauge(gauge)?);
        }
        for counter in &snapshot.counters {
            records.extend(self.convert_counter(counter)?);
        }
        for meter in &snapshot.meters {
            records.extend(self.convert_meter(meter)?);
        }
        for histogram in &snapshot.histograms {
            records.extend(self.convert_histogram(histogram)?);
        }
        for timer in &snapshot.timers {
            records.extend(self.convert_timer(timer)?);
        }
        records.extend(self.convert_health(&snapshot.health)?);
        Ok(records)
    }

    /// Convert a gauge: one record with a single `Value` field.
    pub fn convert_gauge(&self, gauge: &GaugeSnapshot) -> Result<Vec<Record>, ModelError> {
        let fields = vec![Field::new("Value", gauge.value)?];
        Ok(vec![self.record(&gauge.name, &gauge.tags, Vec::new(), fields)])
    }

    /// Convert a counter: a total record plus one record per item with
    /// `Count` and `Percent`.
    pub fn convert_counter(&self, counter: &CounterSnapshot) -> Result<Vec<Record>, ModelError> {
        let mut records = vec![self.record(
            &counter.name,
            &counter.tags,
            Vec::new(),
            vec![Field::new("Count", counter.count)?],
        )];

        for item in &counter.items {
            let fields = vec![
                Field::new("Count", item.count)?,
                Field::new("Percent", item.percent)?,
            ];
            records.push(self.record(
                &counter.name,
                &counter.tags,
                parse_item_tags(&item.label),
                fields,
            ));
        }
        Ok(records)
    }

    /// Convert a meter: a total record with the rate fields plus one
    /// record per item with the item's recomputed rates and `Percent`.
    pub fn convert_meter(&self, meter: &MeterSnapshot) -> Result<Vec<Record>, ModelError> {
        let mut records = vec![self.record(
            &meter.name,
            &meter.tags,
            Vec::new(),
            rate_fields(&meter.rate)?,
        )];

        for item in &meter.items {
            records.push(self.record(
                &meter.name,
                &meter.tags,
                parse_item_tags(&item.label),
                meter_item_fields(item)?,
            ));
        }
        Ok(records)
    }

    /// Convert a histogram: one record with count and distribution
    /// fields. The raw last/min/max user-value fields are deliberately
    /// not emitted.
    pub fn convert_histogram(
        &self,
        histogram: &HistogramSnapshot,
    ) -> Result<Vec<Record>, ModelError> {
        let mut fields = vec![Field::new("Count", histogram.count)?];
        fields.extend(distribution_fields(&histogram.values)?);
        Ok(vec![self.record(
            &histogram.name,
            &histogram.tags,
            Vec::new(),
            fields,
        )])
    }

    /// Convert a timer: one record carrying the rate half, the duration
    /// half, `Active Sessions`, and `Total Time`, plus one record per
    /// rate item.
    ///
    /// Only the rate half has an item breakdown; the duration half's
    /// items are not emitted separately. This asymmetry is observed
    /// behavior of the consumers this format is compatible with.
    pub fn convert_timer(&self, timer: &TimerSnapshot) -> Result<Vec<Record>, ModelError> {
        let mut fields = rate_fields(&timer.rate)?;
        fields.push(Field::new("Active Sessions", timer.active_sessions)?);
        fields.push(Field::new("Total Time", timer.total_time)?);
        fields.extend(distribution_fields(&timer.duration)?);

        let mut records = vec![self.record(&timer.name, &timer.tags, Vec::new(), fields)];

        for item in &timer.rate_items {
            records.push(self.record(
                &timer.name,
                &timer.tags,
                parse_item_tags(&item.label),
                meter_item_fields(item)?,
            ));
        }
        Ok(records)
    }

    /// Convert health check results: one record per check under
    /// [`HEALTH_MEASUREMENT`], with a `Name` tag derived from the check
    /// identifier and `IsHealthy`/`Message` fields.
    pub fn convert_health(
        &self,
        results: &[HealthCheckResult],
    ) -> Result<Vec<Record>, ModelError> {
        let mut records = Vec::with_capacity(results.len());
        for result in results {
            let fields = vec![
                Field::new("IsHealthy", result.healthy)?,
                Field::new("Message", result.message.as_str())?,
            ];
            records.push(self.record(
                HEALTH_MEASUREMENT,
                &[],
                parse_health_tags(&result.name),
                fields,
            ));
        }
        Ok(records)
    }

    fn record(&self, name: &str, local: &[Tag], item_tags: Vec<Tag>, fields: Vec<Field>) -> Record {
        let mut tags: Vec<Tag> = Vec::new();
        for tag in self.global_tags.iter().chain(local.iter()) {
            upsert(&mut tags, tag.clone());
        }
        for tag in item_tags {
            upsert(&mut tags, tag);
        }

        let mut record = Record::new(name).with_tags(tags).with_fields(fields);
        if let Some(timestamp) = self.timestamp {
            record = record.with_timestamp(timestamp);
        }
        record
    }
}

fn rate_fields(rate: &RateValues) -> Result<Vec<Field>, ModelError> {
    Ok(vec![
        Field::new("Count", rate.count)?,
        Field::new("Mean Rate", rate.mean_rate)?,
        Field::new("1 Min Rate", rate.one_min_rate)?,
        Field::new("5 Min Rate", rate.five_min_rate)?,
        Field::new("15 Min Rate", rate.fifteen_min_rate)?,
    ])
}

fn distribution_fields(values: &DistributionValues) -> Result<Vec<Field>, ModelError> {
    Ok(vec![
        Field::new("Last", values.last)?,
        Field::new("Min", values.min)?,
        Field::new("Mean", values.mean)?,
        Field::new("Max", values.max)?,
        Field::new("StdDev", values.std_dev)?,
        Field::new("Median", values.median)?,
        Field::new("Sample Size", values.sample_size)?,
        Field::new("Percentile 75%", values.percentile_75)?,
        Field::new("Percentile 95%", values.percentile_95)?,
        Field::new("Percentile 98%", values.percentile_98)?,
        Field::new("Percentile 99%", values.percentile_99)?,
        Field::new("Percentile 99.9%", values.percentile_999)?,
    ])
}

fn meter_item_fields(item: &MeterItem) -> Result<Vec<Field>, ModelError> {
    let mut fields = rate_fields(&item.rate)?;
    fields.push(Field::new("Percent", item.percent)?);
    Ok(fields)
}

/// Replace an existing tag with the same key, or append. Keeps the
/// position of the first occurrence, so merge order stays stable while
/// the last value wins.
fn upsert(tags: &mut Vec<Tag>, tag: Tag) {
    if let Some(existing) = tags.iter_mut().find(|t| t.key() == tag.key()) {
        *existing = tag;
    } else {
        tags.push(tag);
    }
}

/// Parse tags out of a free-form item label.
///
/// The label is split on unescaped commas. Components containing an
/// unescaped `=` become tags when both halves trim to something
/// non-empty; malformed components are silently dropped. A label that is
/// a single component without `=` is promoted to a `Name` tag carrying
/// the raw label.
pub(crate) fn parse_item_tags(label: &str) -> Vec<Tag> {
    let components = split_unescaped(label, ',');

    if components.len() == 1 && !contains_unescaped(&components[0], '=') {
        let name = unescape(components[0].trim());
        return Tag::new("Name", name).into_iter().collect();
    }

    let mut tags = Vec::new();
    for component in &components {
        if let Some(tag) = parse_tag_component(component) {
            upsert(&mut tags, tag);
        }
    }
    tags
}

/// Parse tags out of a health check identifier.
///
/// Like [`parse_item_tags`], except components without `=` are treated
/// as the check name, which is lower-cased and space-replaced before
/// becoming the `Name` tag value.
fn parse_health_tags(name: &str) -> Vec<Tag> {
    let mut tags = Vec::new();
    for component in split_unescaped(name, ',') {
        if contains_unescaped(&component, '=') {
            if let Some(tag) = parse_tag_component(&component) {
                upsert(&mut tags, tag);
            }
        } else if let Ok(tag) =
            Tag::new("Name", default_name_transform(&unescape(component.trim())))
        {
            upsert(&mut tags, tag);
        }
    }
    tags
}

fn parse_tag_component(component: &str) -> Option<Tag> {
    if !contains_unescaped(component, '=') {
        return None;
    }
    let halves = split_unescaped(component, '=');
    if halves.len() != 2 {
        return None;
    }
    let key = unescape(halves[0].trim());
    let value = unescape(halves[1].trim());
    Tag::new(key, value).ok()
}

fn split_unescaped(input: &str, delimiter: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for ch in input.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
        } else if ch == '\\' {
            current.push(ch);
            escaped = true;
        } else if ch == delimiter {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    parts.push(current);
    parts
}

fn contains_unescaped(input: &str, needle: char) -> bool {
    let mut escaped = false;
    for ch in input.chars() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == needle {
            return true;
        }
    }
    false
}

/// Strip the backslashes protecting commas and equals signs in a parsed
/// label part. The codec re-escapes on serialization.
fn unescape(input: &str) -> String {
    input.replace("\\,", ",").replace("\\=", "=")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn tag(key: &str, value: &str) -> Tag {
        Tag::new(key, value).unwrap()
    }

    fn field_keys(record: &Record) -> Vec<&str> {
        record.fields().iter().map(|f| f.key()).collect()
    }

    fn tag_pairs(record: &Record) -> Vec<(&str, &str)> {
        record.tags().iter().map(|t| (t.key(), t.value())).collect()
    }

    // ========================================================================
    // Item Label Parsing Tests
    // ========================================================================

    #[test]
    fn single_component_without_equals_becomes_name_tag() {
        let tags = parse_item_tags("cache-hit");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].key(), "Name");
        assert_eq!(tags[0].value(), "cache-hit");
    }

    #[test]
    fn key_value_components_become_tags() {
        let tags = parse_item_tags("result=pass,region=us-east");
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].key(), "result");
        assert_eq!(tags[0].value(), "pass");
        assert_eq!(tags[1].key(), "region");
        assert_eq!(tags[1].value(), "us-east");
    }

    #[test]
    fn components_are_trimmed() {
        let tags = parse_item_tags(" result = pass , region = us-east ");
        assert_eq!(tags[0].value(), "pass");
        assert_eq!(tags[1].key(), "region");
    }

    #[test]
    fn malformed_components_are_silently_dropped() {
        // Empty halves and multiple separators never become tags.
        assert!(parse_item_tags("=pass,result=").is_empty());
        assert!(parse_item_tags("a=b=c,=").is_empty());

        // The good component survives next to a bad one.
        let tags = parse_item_tags("result=pass,=broken");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].key(), "result");
    }

    #[test]
    fn bare_components_in_multi_part_labels_are_dropped() {
        let tags = parse_item_tags("loose,result=pass");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].key(), "result");
    }

    #[test]
    fn escaped_commas_do_not_split() {
        let tags = parse_item_tags("a\\,b");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].key(), "Name");
        assert_eq!(tags[0].value(), "a,b");
    }

    #[test]
    fn escaped_equals_does_not_make_a_tag() {
        let tags = parse_item_tags("a\\=b");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].key(), "Name");
        assert_eq!(tags[0].value(), "a=b");
    }

    #[test]
    fn duplicate_keys_last_wins() {
        let tags = parse_item_tags("k=first,k=second");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].value(), "second");
    }

    // ========================================================================
    // Tag Merge Tests
    // ========================================================================

    #[test]
    fn local_tags_override_global_tags() {
        let converter =
            SnapshotConverter::with_global_tags(vec![tag("env", "prod"), tag("host", "a")]);
        let gauge = GaugeSnapshot {
            name: "g".to_string(),
            tags: vec![tag("host", "b")],
            value: 1.0,
        };

        let records = converter.convert_gauge(&gauge).unwrap();
        assert_eq!(tag_pairs(&records[0]), vec![("env", "prod"), ("host", "b")]);
    }

    #[test]
    fn item_tags_override_local_and_global() {
        let converter = SnapshotConverter::with_global_tags(vec![tag("kind", "global")]);
        let counter = CounterSnapshot {
            name: "c".to_string(),
            tags: vec![tag("kind", "local")],
            count: 10,
            items: vec![fluxline_types::CounterItem {
                label: "kind=item".to_string(),
                count: 4,
                percent: 40.0,
            }],
        };

        let records = converter.convert_counter(&counter).unwrap();
        // Base record: local wins over global.
        assert_eq!(tag_pairs(&records[0]), vec![("kind", "local")]);
        // Item record: item wins over both.
        assert_eq!(tag_pairs(&records[1]), vec![("kind", "item")]);
    }

    // ========================================================================
    // Per-Kind Conversion Tests
    // ========================================================================

    #[test]
    fn gauge_emits_one_record_with_value_field() {
        let mut converter = SnapshotConverter::new();
        let ts = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        converter.set_timestamp(ts);

        let gauge = GaugeSnapshot {
            name: "Queue Depth".to_string(),
            tags: vec![],
            value: 17.5,
        };
        let records = converter.convert_gauge(&gauge).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), "Queue Depth");
        assert_eq!(field_keys(&records[0]), vec!["Value"]);
        assert_eq!(records[0].timestamp(), Some(ts));
    }

    #[test]
    fn counter_emits_total_and_item_records() {
        let converter = SnapshotConverter::new();
        let counter = CounterSnapshot {
            name: "requests".to_string(),
            tags: vec![],
            count: 100,
            items: vec![
                fluxline_types::CounterItem {
                    label: "status=ok".to_string(),
                    count: 90,
                    percent: 90.0,
                },
                fluxline_types::CounterItem {
                    label: "status=error".to_string(),
                    count: 10,
                    percent: 10.0,
                },
            ],
        };

        let records = converter.convert_counter(&counter).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(field_keys(&records[0]), vec!["Count"]);
        assert_eq!(field_keys(&records[1]), vec!["Count", "Percent"]);
        assert_eq!(tag_pairs(&records[2]), vec![("status", "error")]);
    }

    #[test]
    fn meter_emits_rate_fields_and_items_with_percent() {
        let converter = SnapshotConverter::new();
        let meter = MeterSnapshot {
            name: "m".to_string(),
            tags: vec![],
            rate: RateValues {
                count: 5,
                mean_rate: 1.0,
                one_min_rate: 2.0,
                five_min_rate: 3.0,
                fifteen_min_rate: 4.0,
            },
            items: vec![MeterItem {
                label: "kind=a".to_string(),
                percent: 50.0,
                rate: RateValues::default(),
            }],
        };

        let records = converter.convert_meter(&meter).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            field_keys(&records[0]),
            vec!["Count", "Mean Rate", "1 Min Rate", "5 Min Rate", "15 Min Rate"]
        );
        assert_eq!(
            field_keys(&records[1]),
            vec!["Count", "Mean Rate", "1 Min Rate", "5 Min Rate", "15 Min Rate", "Percent"]
        );
    }

    #[test]
    fn histogram_emits_distribution_fields_only() {
        let converter = SnapshotConverter::new();
        let histogram = HistogramSnapshot {
            name: "h".to_string(),
            tags: vec![],
            count: 10,
            values: DistributionValues::default(),
        };

        let records = converter.convert_histogram(&histogram).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            field_keys(&records[0]),
            vec![
                "Count",
                "Last",
                "Min",
                "Mean",
                "Max",
                "StdDev",
                "Median",
                "Sample Size",
                "Percentile 75%",
                "Percentile 95%",
                "Percentile 98%",
                "Percentile 99%",
                "Percentile 99.9%",
            ]
        );
        // The raw last/min/max user-value fields are not part of the set.
        assert!(!field_keys(&records[0]).contains(&"Last User Value"));
    }

    #[test]
    fn timer_unions_rate_and_duration_halves() {
        let converter = SnapshotConverter::new();
        let timer = TimerSnapshot {
            name: "t".to_string(),
            ..Default::default()
        };

        let records = converter.convert_timer(&timer).unwrap();
        let keys = field_keys(&records[0]);

        for key in [
            "Count",
            "Mean Rate",
            "15 Min Rate",
            "Active Sessions",
            "Total Time",
            "Median",
            "Percentile 99.9%",
        ] {
            assert!(keys.contains(&key), "timer record missing `{key}`");
        }
    }

    #[test]
    fn timer_items_come_from_the_rate_half_only() {
        // The duration half has no separate item breakdown; only rate
        // items produce extra records. Documented quirk, not a bug.
        let converter = SnapshotConverter::new();
        let timer = TimerSnapshot {
            name: "t".to_string(),
            rate_items: vec![
                MeterItem {
                    label: "op=read".to_string(),
                    percent: 60.0,
                    rate: RateValues::default(),
                },
                MeterItem {
                    label: "op=write".to_string(),
                    percent: 40.0,
                    rate: RateValues::default(),
                },
            ],
            ..Default::default()
        };

        let records = converter.convert_timer(&timer).unwrap();
        assert_eq!(records.len(), 1 + timer.rate_items.len());
        assert!(field_keys(&records[1]).contains(&"Percent"));
    }

    // ========================================================================
    // Health Check Tests
    // ========================================================================

    #[test]
    fn health_check_emits_fixed_measurement_with_name_tag() {
        let converter = SnapshotConverter::new();
        let results = [HealthCheckResult::new("Database Connection", true, "ok")];

        let records = converter.convert_health(&results).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), HEALTH_MEASUREMENT);
        assert_eq!(
            tag_pairs(&records[0]),
            vec![("Name", "database_connection")]
        );
        assert_eq!(field_keys(&records[0]), vec!["IsHealthy", "Message"]);
    }

    #[test]
    fn health_check_name_with_embedded_tags() {
        let converter = SnapshotConverter::new();
        let results = [HealthCheckResult::new(
            "Health Check 4,tag 4=key 4",
            true,
            "all good",
        )];

        let records = converter.convert_health(&results).unwrap();
        assert_eq!(
            tag_pairs(&records[0]),
            vec![("Name", "health_check_4"), ("tag 4", "key 4")]
        );
    }

    #[test]
    fn health_check_name_pair_is_not_doubled() {
        let converter = SnapshotConverter::new();
        let results = [HealthCheckResult::new("Name=custom", true, "ok")];

        let records = converter.convert_health(&results).unwrap();
        assert_eq!(tag_pairs(&records[0]), vec![("Name", "custom")]);
    }

    // ========================================================================
    // Snapshot Conversion Tests
    // ========================================================================

    #[test]
    fn convert_snapshot_covers_every_kind_and_sets_timestamp() {
        let ts = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let snapshot = MetricsSnapshot::builder()
            .timestamp(ts)
            .gauge(GaugeSnapshot {
                name: "g".to_string(),
                value: 1.0,
                ..Default::default()
            })
            .counter(CounterSnapshot {
                name: "c".to_string(),
                count: 1,
                ..Default::default()
            })
            .meter(MeterSnapshot {
                name: "m".to_string(),
                ..Default::default()
            })
            .histogram(HistogramSnapshot {
                name: "h".to_string(),
                ..Default::default()
            })
            .timer(TimerSnapshot {
                name: "t".to_string(),
                ..Default::default()
            })
            .health_check(HealthCheckResult::new("hc", true, "ok"))
            .build();

        let mut converter = SnapshotConverter::new();
        let records = converter.convert_snapshot(&snapshot).unwrap();

        assert_eq!(records.len(), 6);
        assert!(records.iter().all(|r| r.timestamp() == Some(ts)));
    }
}
