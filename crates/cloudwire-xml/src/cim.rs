//! Decoders for the DMTF CIM records of a virtual hardware section.
//!
//! Both decoders are scoped: they only record while inside their own element
//! (`System` or `Item`), so a parent can forward every event of an enclosing
//! document to them without sibling sections leaking in.

use cloudwire_model::cim::{ResourceAllocationSettingData, ResourceType, VirtualSystemSettingData};

use crate::engine::{Attributes, Decoder, EventSink, TextBuffer, non_empty, parse_bool, parse_value};
use crate::error::DecodeError;

/// Element that delimits a [`VirtualSystemSettingData`].
pub const SYSTEM: &str = "System";

/// Element that delimits a [`ResourceAllocationSettingData`].
pub const ITEM: &str = "Item";

/// Decodes a `System` element.
#[derive(Debug, Default)]
pub struct VirtualSystemDecoder {
    text: TextBuffer,
    in_system: bool,
    data: VirtualSystemSettingData,
}

impl VirtualSystemDecoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for VirtualSystemDecoder {
    fn on_start(&mut self, name: &str, _attributes: &Attributes) -> Result<(), DecodeError> {
        self.text.clear();
        if name == SYSTEM {
            self.in_system = true;
            self.data = VirtualSystemSettingData::default();
        }
        Ok(())
    }

    fn on_end(&mut self, name: &str) -> Result<(), DecodeError> {
        let text = self.text.take();
        if !self.in_system {
            return Ok(());
        }
        match name {
            "ElementName" => self.data.element_name = non_empty(text),
            "InstanceID" => self.data.instance_id = non_empty(text),
            "Caption" => self.data.caption = non_empty(text),
            "Description" => self.data.description = non_empty(text),
            "VirtualSystemIdentifier" => self.data.virtual_system_identifier = non_empty(text),
            "VirtualSystemType" => self.data.virtual_system_type = non_empty(text),
            SYSTEM => self.in_system = false,
            _ => {}
        }
        Ok(())
    }

    fn on_text(&mut self, fragment: &str) {
        if self.in_system {
            self.text.push(fragment);
        }
    }
}

impl Decoder for VirtualSystemDecoder {
    type Output = VirtualSystemSettingData;

    fn extract(&mut self) -> Result<Self::Output, DecodeError> {
        let data = std::mem::take(&mut self.data);
        *self = Self::default();
        Ok(data)
    }
}

/// Decodes one `Item` element of a virtual hardware section.
///
/// Numeric and boolean fields fail fast on malformed text; empty elements
/// leave the field unset.
#[derive(Debug, Default)]
pub struct ResourceAllocationDecoder {
    text: TextBuffer,
    in_item: bool,
    data: ResourceAllocationSettingData,
}

impl ResourceAllocationDecoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, name: &str, text: String) -> Result<(), DecodeError> {
        let data = &mut self.data;
        match name {
            "InstanceID" => data.instance_id = non_empty(text),
            "ElementName" => data.element_name = non_empty(text),
            "Description" => data.description = non_empty(text),
            "Caption" => data.caption = non_empty(text),
            "ResourceSubType" => data.resource_sub_type = non_empty(text),
            "Address" => data.address = non_empty(text),
            "AddressOnParent" => data.address_on_parent = non_empty(text),
            "AllocationUnits" => data.allocation_units = non_empty(text),
            "Parent" => data.parent = non_empty(text),
            "PoolID" => data.pool_id = non_empty(text),
            "VirtualQuantityUnits" => data.virtual_quantity_units = non_empty(text),
            "Connection" => data.connections.extend(non_empty(text)),
            "HostResource" => data.host_resources.extend(non_empty(text)),
            _ if text.is_empty() => {}
            "ResourceType" => {
                data.resource_type = Some(ResourceType::from_code(parse_value(name, &text)?));
            }
            "AutomaticAllocation" => data.automatic_allocation = Some(parse_bool(name, &text)?),
            "AutomaticDeallocation" => {
                data.automatic_deallocation = Some(parse_bool(name, &text)?);
            }
            "Reservation" => data.reservation = Some(parse_value(name, &text)?),
            "Limit" => data.limit = Some(parse_value(name, &text)?),
            "Weight" => data.weight = Some(parse_value(name, &text)?),
            "VirtualQuantity" => data.virtual_quantity = Some(parse_value(name, &text)?),
            _ => {}
        }
        Ok(())
    }
}

impl EventSink for ResourceAllocationDecoder {
    fn on_start(&mut self, name: &str, _attributes: &Attributes) -> Result<(), DecodeError> {
        self.text.clear();
        if name == ITEM {
            self.in_item = true;
            self.data = ResourceAllocationSettingData::default();
        }
        Ok(())
    }

    fn on_end(&mut self, name: &str) -> Result<(), DecodeError> {
        let text = self.text.take();
        if !self.in_item {
            return Ok(());
        }
        if name == ITEM {
            self.in_item = false;
            return Ok(());
        }
        self.record(name, text)
    }

    fn on_text(&mut self, fragment: &str) {
        if self.in_item {
            self.text.push(fragment);
        }
    }
}

impl Decoder for ResourceAllocationDecoder {
    type Output = ResourceAllocationSettingData;

    fn extract(&mut self) -> Result<Self::Output, DecodeError> {
        let data = std::mem::take(&mut self.data);
        *self = Self::default();
        Ok(data)
    }
}
