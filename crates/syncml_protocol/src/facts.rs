//! Device fact extraction.
//!
//! The client reports device facts as ordered item lists whose positions are
//! fixed by the protocol. Each list is checked against its expected length
//! once, then read field by field through [`ItemList`].

use crate::constants::{completion_positions, enrollment_positions};
use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{Item, SyncmlMessage};

/// A length-checked view over a fixed-position item list.
#[derive(Debug, Clone, Copy)]
pub struct ItemList<'a> {
    section: &'static str,
    items: &'a [Item],
}

impl<'a> ItemList<'a> {
    /// Validates that `items` carries at least `expected` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MissingSection`] if the list is absent and
    /// [`ProtocolError::MissingItems`] if it is too short.
    pub fn new(
        section: &'static str,
        items: Option<&'a [Item]>,
        expected: usize,
    ) -> ProtocolResult<Self> {
        let items = items.ok_or(ProtocolError::MissingSection { section })?;
        if items.len() < expected {
            return Err(ProtocolError::MissingItems {
                section,
                expected,
                actual: items.len(),
            });
        }
        Ok(Self { section, items })
    }

    /// Returns the data of the item at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MissingItems`] if `position` is past the end
    /// of the list.
    pub fn field(&self, position: usize) -> ProtocolResult<String> {
        self.items
            .get(position)
            .map(|item| item.data.clone())
            .ok_or(ProtocolError::MissingItems {
                section: self.section,
                expected: position + 1,
                actual: self.items.len(),
            })
    }
}

/// Facts reported by the first enrollment message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentFacts {
    /// Hardware device id.
    pub device_id: String,
    /// Manufacturer.
    pub manufacturer: String,
    /// Model.
    pub model: String,
    /// OS / firmware version.
    pub mod_version: String,
    /// Device language.
    pub language: String,
}

impl EnrollmentFacts {
    /// Reads the five facts from the `Replace` items.
    pub fn extract(message: &SyncmlMessage) -> ProtocolResult<Self> {
        let items = ItemList::new(
            "Replace",
            message.body.replace.as_deref(),
            enrollment_positions::COUNT,
        )?;

        let device_id = items.field(enrollment_positions::DEVICE_ID)?;
        if device_id.is_empty() {
            return Err(ProtocolError::malformed("Replace carries an empty device id"));
        }

        Ok(Self {
            device_id,
            manufacturer: items.field(enrollment_positions::MANUFACTURER)?,
            model: items.field(enrollment_positions::MODEL)?,
            mod_version: items.field(enrollment_positions::MOD_VERSION)?,
            language: items.field(enrollment_positions::LANGUAGE)?,
        })
    }
}

/// Facts reported by the second enrollment message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionFacts {
    /// OS version.
    pub os_version: String,
    /// IMSI.
    pub imsi: String,
    /// IMEI.
    pub imei: String,
    /// Vendor.
    pub vendor: String,
    /// WLAN MAC address.
    pub mac_address: String,
    /// Screen resolution.
    pub resolution: String,
    /// Device name.
    pub device_name: String,
}

impl CompletionFacts {
    /// Reads the seven facts from the `Results` items.
    pub fn extract(message: &SyncmlMessage) -> ProtocolResult<Self> {
        let items = ItemList::new(
            "Results",
            message.body.results.as_deref(),
            completion_positions::COUNT,
        )?;

        Ok(Self {
            os_version: items.field(completion_positions::OS_VERSION)?,
            imsi: items.field(completion_positions::IMSI)?,
            imei: items.field(completion_positions::IMEI)?,
            vendor: items.field(completion_positions::VENDOR)?,
            mac_address: items.field(completion_positions::MAC_ADDRESS)?,
            resolution: items.field(completion_positions::RESOLUTION)?,
            device_name: items.field(completion_positions::DEVICE_NAME)?,
        })
    }
}
