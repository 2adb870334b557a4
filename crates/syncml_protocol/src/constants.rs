//! Protocol constants shared with client firmware.
//!
//! These values are a contract with the device's management client. Changing
//! any of them breaks enrollment for devices in the field.

/// Message id of the first message of the enrollment session.
pub const FIRST_MESSAGE_ID: u32 = 1;
/// Message id of the second message of the enrollment session.
pub const SECOND_MESSAGE_ID: u32 = 2;
/// Session id of the enrollment session.
pub const FIRST_SESSION_ID: u32 = 1;
/// First session id of steady-state management sessions.
pub const SECOND_SESSION_ID: u32 = 2;

/// Alert data the client sends to request removal from management.
pub const DISENROLL_ALERT_DATA: &str = "com.microsoft:mdm.unenrollment.userrequest";

/// Device type tag written on every record created by this core.
pub const MOBILE_DEVICE_TYPE_WINDOWS: &str = "windows";

/// SyncML version written in reply headers.
pub const SYNCML_VERSION: &str = "1.2";
/// Verification protocol written in reply headers.
pub const SYNCML_PROTOCOL: &str = "DM/1.2";

/// Positions in the phase-1 `Replace` item list.
pub mod enrollment_positions {
    /// Device id.
    pub const DEVICE_ID: usize = 0;
    /// Manufacturer.
    pub const MANUFACTURER: usize = 1;
    /// Model.
    pub const MODEL: usize = 2;
    /// OS / firmware version.
    pub const MOD_VERSION: usize = 3;
    /// Device language.
    pub const LANGUAGE: usize = 4;
    /// Number of items the list must carry.
    pub const COUNT: usize = 5;
}

/// Positions in the phase-2 `Results` item list.
///
/// The order matches the device-info operation set sent in reply to phase 1.
pub mod completion_positions {
    /// OS version.
    pub const OS_VERSION: usize = 0;
    /// IMSI.
    pub const IMSI: usize = 1;
    /// IMEI.
    pub const IMEI: usize = 2;
    /// Vendor.
    pub const VENDOR: usize = 3;
    /// WLAN MAC address.
    pub const MAC_ADDRESS: usize = 4;
    /// Screen resolution.
    pub const RESOLUTION: usize = 5;
    /// Device name.
    pub const DEVICE_NAME: usize = 6;
    /// Number of items the list must carry.
    pub const COUNT: usize = 7;
}

/// Device property names stored in the registry.
pub mod property_names {
    /// OS version.
    pub const OS_VERSION: &str = "OS_VERSION";
    /// IMSI.
    pub const IMSI: &str = "IMSI";
    /// IMEI.
    pub const IMEI: &str = "IMEI";
    /// Vendor / manufacturer.
    pub const VENDOR: &str = "VENDOR";
    /// Model.
    pub const MODEL: &str = "DEVICE_MODEL";
    /// Language.
    pub const LANGUAGE: &str = "LANGUAGE";
    /// WLAN MAC address.
    pub const MAC_ADDRESS: &str = "MAC_ADDRESS";
    /// Screen resolution.
    pub const RESOLUTION: &str = "RESOLUTION";
    /// Device name.
    pub const DEVICE_NAME: &str = "DEVICE_NAME";
}

/// OMA-DM node URIs queried by the device-info operation set.
pub mod device_info_uris {
    /// Software (OS) version.
    pub const OS_VERSION: &str = "./DevDetail/SwV";
    /// IMSI.
    pub const IMSI: &str = "./Vendor/MSFT/DeviceInstanceService/Identity/Identity1/IMSI";
    /// IMEI.
    pub const IMEI: &str = "./Vendor/MSFT/DeviceInstanceService/Identity/Identity1/IMEI";
    /// Manufacturer.
    pub const VENDOR: &str = "./DevInfo/Man";
    /// WLAN MAC address.
    pub const MAC_ADDRESS: &str = "./DevDetail/Ext/WLANMACAddress";
    /// Screen resolution.
    pub const RESOLUTION: &str = "./DevDetail/Ext/Microsoft/Resolution";
    /// Device name.
    pub const DEVICE_NAME: &str = "./DevDetail/Ext/Microsoft/DeviceName";
}

/// SyncML status codes used in replies.
pub mod status_codes {
    /// Command accepted.
    pub const OK: u16 = 200;
    /// Authentication accepted for the session.
    pub const AUTHENTICATION_ACCEPTED: u16 = 212;
}
