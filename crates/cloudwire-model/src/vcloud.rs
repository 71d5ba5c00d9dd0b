//! vCloud appliance records.

use std::fmt;

use http::Uri;

use crate::cim::{ResourceAllocationSettingData, VirtualSystemSettingData};
use crate::multimap::ListMultimap;

/// Power and deployment status of a vCloud entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// -1: creation failed.
    FailedCreation,
    /// 0: not yet resolved.
    Unresolved,
    /// 1: resolved but not deployed.
    Resolved,
    /// 2: deployed.
    Deployed,
    /// 3: suspended.
    Suspended,
    /// 4: powered on.
    On,
    /// 5: waiting for user input.
    WaitingForInput,
    /// 6: unknown state.
    Unknown,
    /// 7: state not recognized by the provider, or a code unknown to this client.
    Unrecognized,
    /// 8: powered off.
    Off,
    /// 9: inconsistent state.
    Inconsistent,
    /// 10: children in different states.
    Mixed,
}

impl Status {
    /// Map a numeric status code. Codes this client does not know map to [`Status::Unrecognized`].
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        match code {
            -1 => Self::FailedCreation,
            0 => Self::Unresolved,
            1 => Self::Resolved,
            2 => Self::Deployed,
            3 => Self::Suspended,
            4 => Self::On,
            5 => Self::WaitingForInput,
            6 => Self::Unknown,
            8 => Self::Off,
            9 => Self::Inconsistent,
            10 => Self::Mixed,
            _ => Self::Unrecognized,
        }
    }

    /// The numeric status code.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::FailedCreation => -1,
            Self::Unresolved => 0,
            Self::Resolved => 1,
            Self::Deployed => 2,
            Self::Suspended => 3,
            Self::On => 4,
            Self::WaitingForInput => 5,
            Self::Unknown => 6,
            Self::Unrecognized => 7,
            Self::Off => 8,
            Self::Inconsistent => 9,
            Self::Mixed => 10,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A typed link to another provider resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceType {
    /// Resource name, when given.
    pub name: Option<String>,
    /// Location of the resource.
    pub href: Uri,
    /// Media type describing the resource's role.
    pub media_type: Option<String>,
}

/// A vCloud Express virtual appliance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VApp {
    /// Appliance name.
    pub name: Option<String>,
    /// Appliance location.
    pub location: Option<Uri>,
    /// Current status.
    pub status: Option<Status>,
    /// Storage size reported on the root element.
    pub size: Option<i64>,
    /// The virtual datacenter this appliance lives in.
    pub vdc: Option<ReferenceType>,
    /// Network name to IP addresses, in document order.
    pub network_to_addresses: ListMultimap<String, String>,
    /// Operating-system type id from the OS section.
    pub os_type: Option<i32>,
    /// Operating-system description from the OS section.
    pub operating_system_description: Option<String>,
    /// Virtual system settings.
    pub system: Option<VirtualSystemSettingData>,
    /// Resource allocations in document order, without duplicates.
    pub allocations: Vec<ResourceAllocationSettingData>,
    /// Links that are not the VDC link, in document order, without duplicates.
    pub extended_info: Vec<ReferenceType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_round_trip_known_status_codes() {
        for code in -1..=10 {
            assert_eq!(Status::from_code(code).code(), code);
        }
    }

    #[test]
    fn test_should_map_unknown_status_to_unrecognized() {
        assert_eq!(Status::from_code(42), Status::Unrecognized);
    }
}
