//! SOAP envelope for the `GetDataSet` operation.

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{Error, ErrorKind, Result};

pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
pub const ZKHB_NS: &str = "http://zkhb.com.cn/";

/// Default path of the `GetDataSet` endpoint, relative to the base URL.
pub const GET_DATA_SET_PATH: &str =
    "/estate/webService/ForcelandEstateService.asmx?op=GetDataSet";

/// Content-Type sent with SOAP 1.1 requests unless the caller overrides it.
pub const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Build the SOAP 1.1 envelope that runs `sql` through `GetDataSet`.
///
/// The SQL is written as element text with only `&`, `<` and `>` escaped.
pub fn get_data_set_envelope(sql: &str) -> Result<String> {
    let mut writer = Writer::new(Vec::new());

    write(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
    )?;
    write(&mut writer, Event::Text(BytesText::from_escaped("\n")))?;

    let mut envelope = BytesStart::new("soap:Envelope");
    envelope.push_attribute(("xmlns:soap", SOAP_ENVELOPE_NS));
    envelope.push_attribute(("xmlns:xsi", XSI_NS));
    envelope.push_attribute(("xmlns:xsd", XSD_NS));
    write(&mut writer, Event::Start(envelope))?;
    write(&mut writer, Event::Start(BytesStart::new("soap:Body")))?;

    let mut operation = BytesStart::new("GetDataSet");
    operation.push_attribute(("xmlns", ZKHB_NS));
    write(&mut writer, Event::Start(operation))?;

    write(&mut writer, Event::Start(BytesStart::new("sql")))?;
    write(
        &mut writer,
        Event::Text(BytesText::from_escaped(partial_escape(sql))),
    )?;
    write(&mut writer, Event::End(BytesEnd::new("sql")))?;

    write(&mut writer, Event::Start(BytesStart::new("url")))?;
    write(&mut writer, Event::End(BytesEnd::new("url")))?;

    write(&mut writer, Event::End(BytesEnd::new("GetDataSet")))?;
    write(&mut writer, Event::End(BytesEnd::new("soap:Body")))?;
    write(&mut writer, Event::End(BytesEnd::new("soap:Envelope")))?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::with_source(ErrorKind::Xml(e.to_string()), e))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::with_source(ErrorKind::Xml(e.to_string()), e))
}
