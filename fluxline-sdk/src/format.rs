//! Pluggable name-formatting hooks.
//!
//! A [`NameFormatter`] rewrites a record between the converter and the
//! writer: measurement name, tag keys, and field keys each go through an
//! optional hook. A hook returns `None` to mean "no opinion", in which
//! case the caller's default applies. The unset-hook and
//! hook-with-no-opinion states are kept distinct from a hook that
//! explicitly returns its input.

use fluxline_types::{Field, ModelError, Record, Tag};

/// A formatting hook: returns `Some` to rewrite the input, `None` to
/// defer to the default transform.
pub type NameHook = fn(&str) -> Option<String>;

/// The default name transform: lowercase, spaces replaced by `_`.
pub fn default_name_transform(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Swappable formatting hooks for measurement names, tag keys, and field
/// keys.
///
/// Defaults: measurement names and tag keys get
/// [`default_name_transform`]; field keys are kept exactly as the
/// converter emitted them, because their spelling is part of the wire
/// compatibility surface.
///
/// # Example
///
/// ```rust
/// use fluxline_sdk::NameFormatter;
///
/// let formatter = NameFormatter::new().with_metric_hook(|name| {
///     name.strip_prefix("app.").map(str::to_string)
/// });
///
/// assert_eq!(formatter.format_metric("app.Queue Depth"), "Queue Depth");
/// assert_eq!(formatter.format_metric("Queue Depth"), "queue_depth");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NameFormatter {
    metric: Option<NameHook>,
    tag_key: Option<NameHook>,
    field_key: Option<NameHook>,
}

impl NameFormatter {
    /// Create a formatter with no hooks set (defaults apply everywhere).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the measurement-name hook.
    pub fn with_metric_hook(mut self, hook: NameHook) -> Self {
        self.metric = Some(hook);
        self
    }

    /// Set the tag-key hook.
    pub fn with_tag_key_hook(mut self, hook: NameHook) -> Self {
        self.tag_key = Some(hook);
        self
    }

    /// Set the field-key hook.
    pub fn with_field_key_hook(mut self, hook: NameHook) -> Self {
        self.field_key = Some(hook);
        self
    }

    /// Format a measurement name.
    pub fn format_metric(&self, name: &str) -> String {
        if let Some(hook) = self.metric {
            if let Some(formatted) = hook(name) {
                return formatted;
            }
        }
        default_name_transform(name)
    }

    /// Format a tag key.
    pub fn format_tag_key(&self, key: &str) -> String {
        if let Some(hook) = self.tag_key {
            if let Some(formatted) = hook(key) {
                return formatted;
            }
        }
        default_name_transform(key)
    }

    /// Format a field key.
    pub fn format_field_key(&self, key: &str) -> String {
        if let Some(hook) = self.field_key {
            if let Some(formatted) = hook(key) {
                return formatted;
            }
        }
        key.to_string()
    }

    /// Rewrite a record in place: name, tag keys, and field keys.
    ///
    /// Tag and field values are untouched. Fails if a hook produces a
    /// blank key.
    pub fn apply(&self, record: &mut Record) -> Result<(), ModelError> {
        let name = self.format_metric(record.name());
        record.set_name(name);

        let tags = record
            .tags()
            .iter()
            .map(|tag| Tag::new(self.format_tag_key(tag.key()), tag.value()))
            .collect::<Result<Vec<_>, _>>()?;
        record.set_tags(tags);

        let fields = record
            .fields()
            .iter()
            .map(|field| Field::new(self.format_field_key(field.key()), field.value().clone()))
            .collect::<Result<Vec<_>, _>>()?;
        record.set_fields(fields);

        Ok(())
    }
}
