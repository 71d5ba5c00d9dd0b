//! vCloud appliance commands.

use cloudwire_auth::Request;
use cloudwire_core::ApiVersion;
use cloudwire_core::media_type::VAPP_XML;
use cloudwire_xml::{VAppDecoder, VCloudErrorDecoder};
use http::header::ACCEPT;
use http::{HeaderValue, Uri};

use crate::command::Command;

/// Fetch the appliance at `href`, decoding it for `version`.
#[must_use]
pub fn get_vapp(href: Uri, version: &ApiVersion) -> Command<VAppDecoder, VCloudErrorDecoder> {
    let request = Request::get(href).with_header(ACCEPT, HeaderValue::from_static(VAPP_XML));
    Command::new(request, VAppDecoder::new(version)).with_error_decoder(VCloudErrorDecoder::new())
}
