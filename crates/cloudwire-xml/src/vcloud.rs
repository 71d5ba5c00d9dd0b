//! Decoders for vCloud Express appliance documents and error bodies.
//!
//! [`VAppDecoder`] is the nested case: it owns the appliance-level elements
//! (root attributes, links, network connections, the operating-system
//! section) and forwards everything else to a [`VirtualSystemDecoder`] and a
//! [`ResourceAllocationDecoder`], in that order.

use cloudwire_core::ApiVersion;
use cloudwire_core::media_type::VDC_XML;
use cloudwire_model::ErrorInfo;
use cloudwire_model::ListMultimap;
use cloudwire_model::cim::{ResourceAllocationSettingData, VirtualSystemSettingData};
use cloudwire_model::vcloud::{ReferenceType, Status, VApp};
use http::Uri;

use crate::cim::{ITEM, ResourceAllocationDecoder, SYSTEM, VirtualSystemDecoder};
use crate::engine::{
    Attributes, Decoder, EventSink, TextBuffer, forward_end, forward_start, forward_text,
    non_empty, parse_value,
};
use crate::error::DecodeError;

const OS_SECTION: &str = "OperatingSystemSection";

/// How a numeric `status` attribute maps onto [`Status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusRule {
    /// Codes map one to one.
    #[default]
    Current,
    /// The 0.8 API reports powered-off appliances as `2`.
    Legacy08,
}

impl StatusRule {
    /// Pick the rule for a configured API version.
    #[must_use]
    pub fn for_version(version: &ApiVersion) -> Self {
        if version.mentions("0.8") {
            Self::Legacy08
        } else {
            Self::Current
        }
    }

    /// Interpret a raw status code.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidValue`] if the code is not an integer.
    pub fn resolve(self, element: &str, raw: &str) -> Result<Status, DecodeError> {
        let code: i32 = parse_value(element, raw)?;
        Ok(match (self, code) {
            (Self::Legacy08, 2) => Status::Off,
            (_, code) => Status::from_code(code),
        })
    }
}

fn reference(element: &str, attributes: &Attributes) -> Result<ReferenceType, DecodeError> {
    let href = attributes.require(element, "href")?;
    Ok(ReferenceType {
        name: attributes.get("name").map(str::to_owned),
        href: parse_value(&format!("{element}@href"), href)?,
        media_type: attributes.get("type").map(str::to_owned),
    })
}

/// Decodes a `VApp` document.
#[derive(Debug)]
pub struct VAppDecoder {
    rule: StatusRule,
    text: TextBuffer,
    in_os_section: bool,
    network_name: Option<String>,
    name: Option<String>,
    location: Option<Uri>,
    status: Option<Status>,
    size: Option<i64>,
    vdc: Option<ReferenceType>,
    network_to_addresses: ListMultimap<String, String>,
    os_type: Option<i32>,
    operating_system_description: Option<String>,
    system: Option<VirtualSystemSettingData>,
    allocations: Vec<ResourceAllocationSettingData>,
    extended_info: Vec<ReferenceType>,
    system_decoder: VirtualSystemDecoder,
    allocation_decoder: ResourceAllocationDecoder,
}

impl VAppDecoder {
    /// Create a decoder for documents served under `version`.
    #[must_use]
    pub fn new(version: &ApiVersion) -> Self {
        Self::with_rule(StatusRule::for_version(version))
    }

    /// Create a decoder with an explicit status rule.
    #[must_use]
    pub fn with_rule(rule: StatusRule) -> Self {
        Self {
            rule,
            text: TextBuffer::new(),
            in_os_section: false,
            network_name: None,
            name: None,
            location: None,
            status: None,
            size: None,
            vdc: None,
            network_to_addresses: ListMultimap::new(),
            os_type: None,
            operating_system_description: None,
            system: None,
            allocations: Vec::new(),
            extended_info: Vec::new(),
            system_decoder: VirtualSystemDecoder::new(),
            allocation_decoder: ResourceAllocationDecoder::new(),
        }
    }

    /// The status rule chosen at construction.
    #[must_use]
    pub fn rule(&self) -> StatusRule {
        self.rule
    }

    fn children(&mut self) -> [&mut dyn EventSink; 2] {
        [&mut self.system_decoder, &mut self.allocation_decoder]
    }

    fn read_root(&mut self, attributes: &Attributes) -> Result<(), DecodeError> {
        self.name = attributes.get("name").map(str::to_owned);
        self.location = attributes.parse("VApp", "href")?;
        self.size = attributes.parse("VApp", "size")?;
        self.status = attributes
            .get("status")
            .map(|raw| self.rule.resolve("VApp@status", raw))
            .transpose()?;
        Ok(())
    }

    fn read_link(&mut self, attributes: &Attributes) -> Result<(), DecodeError> {
        let link = reference("Link", attributes)?;
        if link.media_type.is_none() {
            return Ok(());
        }
        if link.media_type.as_deref() == Some(VDC_XML) {
            self.vdc = Some(link);
        } else if !self.extended_info.contains(&link) {
            self.extended_info.push(link);
        }
        Ok(())
    }
}

impl Default for VAppDecoder {
    fn default() -> Self {
        Self::with_rule(StatusRule::default())
    }
}

impl EventSink for VAppDecoder {
    fn on_start(&mut self, name: &str, attributes: &Attributes) -> Result<(), DecodeError> {
        self.text.clear();
        if self.in_os_section {
            return Ok(());
        }
        match name {
            "VApp" => self.read_root(attributes),
            "Link" => self.read_link(attributes),
            OS_SECTION => {
                self.in_os_section = true;
                self.os_type = attributes.parse(OS_SECTION, "id")?;
                Ok(())
            }
            _ if name.ends_with("NetworkConnection") => {
                self.network_name = attributes
                    .get("Network")
                    .or_else(|| attributes.get("name"))
                    .map(str::to_owned);
                Ok(())
            }
            _ => forward_start(&mut self.children(), name, attributes),
        }
    }

    fn on_end(&mut self, name: &str) -> Result<(), DecodeError> {
        let text = self.text.take();
        if self.in_os_section {
            match name {
                "Description" => self.operating_system_description = non_empty(text),
                OS_SECTION => self.in_os_section = false,
                _ => {}
            }
            return Ok(());
        }
        match name {
            "VApp" | "Link" => {}
            _ if self.network_name.is_some()
                && (name.ends_with("IpAddress") || name == "IPAddress") =>
            {
                if let (Some(network), Some(address)) = (&self.network_name, non_empty(text)) {
                    self.network_to_addresses.put(network.clone(), address);
                }
            }
            _ if name.ends_with("NetworkConnection") => self.network_name = None,
            SYSTEM => {
                self.system_decoder.on_end(name)?;
                self.system = Some(self.system_decoder.extract()?);
            }
            ITEM => {
                self.allocation_decoder.on_end(name)?;
                let item = self.allocation_decoder.extract()?;
                if !self.allocations.contains(&item) {
                    self.allocations.push(item);
                }
            }
            _ => forward_end(&mut self.children(), name)?,
        }
        Ok(())
    }

    fn on_text(&mut self, fragment: &str) {
        self.text.push(fragment);
        if !self.in_os_section {
            forward_text(&mut self.children(), fragment);
        }
    }
}

impl Decoder for VAppDecoder {
    type Output = VApp;

    fn extract(&mut self) -> Result<Self::Output, DecodeError> {
        let fresh = Self::with_rule(self.rule);
        let done = std::mem::replace(self, fresh);
        Ok(VApp {
            name: done.name,
            location: done.location,
            status: done.status,
            size: done.size,
            vdc: done.vdc,
            network_to_addresses: done.network_to_addresses,
            os_type: done.os_type,
            operating_system_description: done.operating_system_description,
            system: done.system,
            allocations: done.allocations,
            extended_info: done.extended_info,
        })
    }
}

/// Decodes a vCloud `Error` element, whose details travel as attributes.
#[derive(Debug, Default)]
pub struct VCloudErrorDecoder {
    info: ErrorInfo,
}

impl VCloudErrorDecoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for VCloudErrorDecoder {
    fn on_start(&mut self, name: &str, attributes: &Attributes) -> Result<(), DecodeError> {
        if name != "Error" {
            return Ok(());
        }
        for (key, value) in attributes.iter() {
            match key {
                "message" => self.info.message = Some(value.to_owned()),
                "minorErrorCode" => self.info.code = Some(value.to_owned()),
                _ => {
                    self.info.details.insert(key.to_owned(), value.to_owned());
                }
            }
        }
        Ok(())
    }

    fn on_end(&mut self, _name: &str) -> Result<(), DecodeError> {
        Ok(())
    }

    fn on_text(&mut self, _fragment: &str) {}
}

impl Decoder for VCloudErrorDecoder {
    type Output = ErrorInfo;

    fn extract(&mut self) -> Result<Self::Output, DecodeError> {
        Ok(std::mem::take(&mut self.info))
    }
}
