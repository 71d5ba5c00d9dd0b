//! DMTF CIM records embedded in OVF envelopes and vCloud appliances.

/// `CIM_VirtualSystemSettingData`: the `System` element of a virtual hardware section.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VirtualSystemSettingData {
    /// Display name.
    pub element_name: Option<String>,
    /// Instance identifier.
    pub instance_id: Option<String>,
    /// Short caption.
    pub caption: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Identifier of the virtual system.
    pub virtual_system_identifier: Option<String>,
    /// Virtualization platform type (e.g. `vmx-07`).
    pub virtual_system_type: Option<String>,
}

/// `ResourceType` values of `CIM_ResourceAllocationSettingData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// 1
    Other,
    /// 2
    ComputerSystem,
    /// 3
    Processor,
    /// 4
    Memory,
    /// 5
    IdeController,
    /// 6
    ParallelScsiHba,
    /// 7
    FcHba,
    /// 8
    IscsiHba,
    /// 9
    IbHca,
    /// 10
    EthernetAdapter,
    /// 11
    OtherNetworkAdapter,
    /// 14
    FloppyDrive,
    /// 15
    CdDrive,
    /// 16
    DvdDrive,
    /// 17
    DiskDrive,
    /// 21
    SerialPort,
    /// 22
    ParallelPort,
    /// 23
    UsbController,
    /// 24
    GraphicsController,
    /// 31
    LogicalDisk,
    /// 32
    StorageVolume,
    /// 33
    EthernetConnection,
    /// Any code not listed above.
    Unrecognized(u16),
}

impl ResourceType {
    /// Map a numeric CIM code.
    #[must_use]
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::Other,
            2 => Self::ComputerSystem,
            3 => Self::Processor,
            4 => Self::Memory,
            5 => Self::IdeController,
            6 => Self::ParallelScsiHba,
            7 => Self::FcHba,
            8 => Self::IscsiHba,
            9 => Self::IbHca,
            10 => Self::EthernetAdapter,
            11 => Self::OtherNetworkAdapter,
            14 => Self::FloppyDrive,
            15 => Self::CdDrive,
            16 => Self::DvdDrive,
            17 => Self::DiskDrive,
            21 => Self::SerialPort,
            22 => Self::ParallelPort,
            23 => Self::UsbController,
            24 => Self::GraphicsController,
            31 => Self::LogicalDisk,
            32 => Self::StorageVolume,
            33 => Self::EthernetConnection,
            other => Self::Unrecognized(other),
        }
    }

    /// The numeric CIM code.
    #[must_use]
    pub fn code(&self) -> u16 {
        match self {
            Self::Other => 1,
            Self::ComputerSystem => 2,
            Self::Processor => 3,
            Self::Memory => 4,
            Self::IdeController => 5,
            Self::ParallelScsiHba => 6,
            Self::FcHba => 7,
            Self::IscsiHba => 8,
            Self::IbHca => 9,
            Self::EthernetAdapter => 10,
            Self::OtherNetworkAdapter => 11,
            Self::FloppyDrive => 14,
            Self::CdDrive => 15,
            Self::DvdDrive => 16,
            Self::DiskDrive => 17,
            Self::SerialPort => 21,
            Self::ParallelPort => 22,
            Self::UsbController => 23,
            Self::GraphicsController => 24,
            Self::LogicalDisk => 31,
            Self::StorageVolume => 32,
            Self::EthernetConnection => 33,
            Self::Unrecognized(code) => *code,
        }
    }
}

/// `CIM_ResourceAllocationSettingData`: one `Item` of a virtual hardware section.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceAllocationSettingData {
    /// Instance identifier, unique within the section.
    pub instance_id: Option<String>,
    /// Display name (e.g. `1 virtual CPU(s)`).
    pub element_name: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Short caption.
    pub caption: Option<String>,
    /// Kind of resource.
    pub resource_type: Option<ResourceType>,
    /// Vendor-specific subtype (e.g. `lsilogic`).
    pub resource_sub_type: Option<String>,
    /// Address of the resource (e.g. a MAC address).
    pub address: Option<String>,
    /// Position on the parent controller.
    pub address_on_parent: Option<String>,
    /// Unit of allocation (e.g. `byte * 2^20`).
    pub allocation_units: Option<String>,
    /// Whether the resource is connected at power-on.
    pub automatic_allocation: Option<bool>,
    /// Whether the resource is released at power-off.
    pub automatic_deallocation: Option<bool>,
    /// Connections (e.g. network names), in document order.
    pub connections: Vec<String>,
    /// Host resources (e.g. backing disks), in document order.
    pub host_resources: Vec<String>,
    /// Instance id of the parent controller.
    pub parent: Option<String>,
    /// Resource pool identifier.
    pub pool_id: Option<String>,
    /// Reserved amount.
    pub reservation: Option<i64>,
    /// Upper limit.
    pub limit: Option<i64>,
    /// Relative weight.
    pub weight: Option<i32>,
    /// Allocated quantity, in `virtual_quantity_units` or `allocation_units`.
    pub virtual_quantity: Option<i64>,
    /// Unit of `virtual_quantity`.
    pub virtual_quantity_units: Option<String>,
}
