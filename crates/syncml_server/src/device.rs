//! Device records held by the registry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How the device is owned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Ownership {
    /// Bring your own device.
    Byod,
    /// Corporate owned, personally enabled.
    Cope,
}

/// Enrollment state of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnrolmentStatus {
    /// Managed.
    Active,
    /// Known but not currently managed.
    Inactive,
    /// Disenrolled.
    Removed,
}

/// Enrollment information of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrolmentInfo {
    /// User that enrolled the device.
    pub owner: String,
    /// Ownership model.
    pub ownership: Ownership,
    /// Enrollment state.
    pub status: EnrolmentStatus,
}

impl EnrolmentInfo {
    /// Active BYOD enrollment for `owner`.
    pub fn byod(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            ownership: Ownership::Byod,
            status: EnrolmentStatus::Active,
        }
    }
}

/// A managed device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Device identity URI (unique key).
    pub identifier: String,
    /// Platform tag.
    pub device_type: String,
    /// Named properties; names are unique within a device.
    pub properties: BTreeMap<String, String>,
    /// Enrollment information.
    pub enrolment: EnrolmentInfo,
}

impl DeviceRecord {
    /// Creates a record without properties.
    pub fn new(
        identifier: impl Into<String>,
        device_type: impl Into<String>,
        enrolment: EnrolmentInfo,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            device_type: device_type.into(),
            properties: BTreeMap::new(),
            enrolment,
        }
    }

    /// Sets a property, replacing any previous value.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Returns the value of a property.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Replaces the whole property set.
    pub fn replace_properties<I, K, V>(&mut self, properties: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.properties = properties
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_names_are_unique() {
        let record = DeviceRecord::new("dev", "windows", EnrolmentInfo::byod("alice"))
            .with_property("IMEI", "1")
            .with_property("IMEI", "2");

        assert_eq!(record.properties.len(), 1);
        assert_eq!(record.property("IMEI"), Some("2"));
    }

    #[test]
    fn replace_drops_old_properties() {
        let mut record = DeviceRecord::new("dev", "windows", EnrolmentInfo::byod("alice"))
            .with_property("LANGUAGE", "en-US");
        record.replace_properties([("IMEI", "1"), ("IMSI", "2")]);

        assert_eq!(record.property("LANGUAGE"), None);
        assert_eq!(record.property("IMSI"), Some("2"));
    }

    #[test]
    fn byod_defaults() {
        let info = EnrolmentInfo::byod("alice");
        assert_eq!(info.ownership, Ownership::Byod);
        assert_eq!(info.status, EnrolmentStatus::Active);
    }
}
