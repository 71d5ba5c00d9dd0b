//! Provider content-type constants used to tell reference links apart by role.

/// A virtual datacenter.
pub const VDC_XML: &str = "application/vnd.vmware.vcloud.vdc+xml";

/// A virtual appliance.
pub const VAPP_XML: &str = "application/vnd.vmware.vcloud.vApp+xml";

/// A catalog.
pub const CATALOG_XML: &str = "application/vnd.vmware.vcloud.catalog+xml";

/// A network.
pub const NETWORK_XML: &str = "application/vnd.vmware.vcloud.network+xml";

/// An asynchronous task.
pub const TASK_XML: &str = "application/vnd.vmware.vcloud.task+xml";

/// A list of tasks.
pub const TASKS_LIST_XML: &str = "application/vnd.vmware.vcloud.tasksList+xml";

/// Plain XML, as returned by S3-style object stores.
pub const APPLICATION_XML: &str = "application/xml";
