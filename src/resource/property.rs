//! Descriptor-backed reserved properties

use crate::error::{CustomDataError, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Identity property carried by every persisted resource
pub const HREF_PROP_NAME: &str = "href";

/// Timestamp-valued reserved property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateProperty {
    name: &'static str,
}

impl DateProperty {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Interpret a raw value as a timestamp.
    ///
    /// `None` and JSON `null` both read as "no value". Anything other than a
    /// parseable string is rejected.
    pub fn parse(&self, value: Option<&Value>) -> Result<Option<DateTime<Utc>>> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(raw)) => DateTime::parse_from_rfc3339(raw)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|e| {
                    CustomDataError::InvalidArgument(format!(
                        "{} is not a valid timestamp ({:?}): {}",
                        self.name, raw, e
                    ))
                }),
            Some(other) => Err(CustomDataError::InvalidArgument(format!(
                "{} must be a timestamp string, got {}",
                self.name, other
            ))),
        }
    }
}

pub const CREATED_AT: DateProperty = DateProperty::new("createdAt");
pub const MODIFIED_AT: DateProperty = DateProperty::new("modifiedAt");

/// Descriptors known to custom data resources
pub const PROPERTY_DESCRIPTORS: &[DateProperty] = &[CREATED_AT, MODIFIED_AT];
