//! Device identity discovery and validation.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::registry::ModelRegistry;
use crate::error::{Result, ValidationError};
use crate::protocol::{ObjectPath, ObjectStore};

// Both patterns anchor at the start only; trailing text is accepted.
static FIRMWARE_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{2}\.[0-9]{2}\.[0-9]{4}").unwrap());
static SERIAL_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9]{10}").unwrap());

/// Check a firmware version such as `01.23.4567`.
pub fn is_firmware_version_ok(version: &str) -> bool {
    FIRMWARE_VERSION.is_match(version)
}

/// Check a serial number: ten upper-case letters or digits.
pub fn is_serial_number_ok(serial: &str) -> bool {
    SERIAL_NUMBER.is_match(serial)
}

/// Check a part number against the supported models.
pub fn is_part_number_ok(part_number: &str, models: &ModelRegistry) -> bool {
    models.contains(part_number)
}

/// Validated identity of a PDU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub serial_number: String,
    pub part_number: String,
    pub firmware_version: String,
    pub outlet_count: u32,
}

impl DeviceIdentity {
    /// Validate raw replies into an identity.
    ///
    /// Checks run in a fixed order (firmware version, serial number, part
    /// number, outlet count) and stop at the first failure.
    pub fn validate(
        serial_number: String,
        part_number: String,
        firmware_version: String,
        outlet_count: &str,
        models: &ModelRegistry,
    ) -> std::result::Result<Self, ValidationError> {
        if !is_firmware_version_ok(&firmware_version) {
            return Err(ValidationError::InvalidFirmwareVersion(firmware_version));
        }
        if !is_serial_number_ok(&serial_number) {
            return Err(ValidationError::InvalidSerialNumber(serial_number));
        }
        if !is_part_number_ok(&part_number, models) {
            return Err(ValidationError::InvalidPartNumber(part_number));
        }

        let outlet_count = match outlet_count.trim().parse::<u32>() {
            Ok(count) if count > 0 => count,
            _ => return Err(ValidationError::InvalidOutletCount(outlet_count.to_string())),
        };

        Ok(Self {
            serial_number,
            part_number,
            firmware_version,
            outlet_count,
        })
    }

    /// The identity objects and their values, in query order.
    pub fn entries(&self) -> [(ObjectPath, String); 4] {
        [
            (ObjectPath::SERIAL_NUMBER, self.serial_number.clone()),
            (ObjectPath::PART_NUMBER, self.part_number.clone()),
            (ObjectPath::FIRMWARE_VERSION, self.firmware_version.clone()),
            (ObjectPath::OUTLET_COUNT, self.outlet_count.to_string()),
        ]
    }
}

impl std::fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (path, value)) in self.entries().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", path, value)?;
        }
        Ok(())
    }
}

/// Query and validate the device identity.
///
/// Issues four `get`s, always in the same order: serial number, part
/// number, firmware version, outlet count.
pub async fn discover_identity<S: ObjectStore>(
    store: &mut S,
    models: &ModelRegistry,
) -> Result<DeviceIdentity> {
    let serial_number = store.get(&ObjectPath::SERIAL_NUMBER).await?;
    let part_number = store.get(&ObjectPath::PART_NUMBER).await?;
    let firmware_version = store.get(&ObjectPath::FIRMWARE_VERSION).await?;
    let outlet_count = store.get(&ObjectPath::OUTLET_COUNT).await?;

    debug!(
        "identity: serial={:?} part={:?} version={:?} outlets={:?}",
        serial_number, part_number, firmware_version, outlet_count
    );

    Ok(DeviceIdentity::validate(
        serial_number,
        part_number,
        firmware_version,
        &outlet_count,
        models,
    )?)
}
