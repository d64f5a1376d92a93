//! XML output format: `<data>` holding one `<row>` per record

use std::fmt::Display;
use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::model::Table;

use super::{OutputFormatter, RenderError};

const ROOT_ELEMENT: &str = "data";
const ROW_ELEMENT: &str = "row";

/// XML writer.
///
/// Column names become element names, so a name that is not a valid XML name
/// (spaces, `%`, a leading digit) is a render error.
pub struct XmlOutput;

impl OutputFormatter for XmlOutput {
    fn render(&self, table: &Table, writer: &mut dyn Write) -> Result<(), RenderError> {
        if let Some(bad) = table.columns().find(|name| !is_valid_element_name(name)) {
            return Err(RenderError::Invalid(format!(
                "column name {:?} is not a valid XML element name",
                bad
            )));
        }

        let mut xml = Writer::new_with_indent(writer, b' ', 2);
        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(xml_error)?;
        xml.write_event(Event::Start(BytesStart::new(ROOT_ELEMENT)))
            .map_err(xml_error)?;

        let columns: Vec<&str> = table.columns().collect();
        for row in &table.rows {
            xml.write_event(Event::Start(BytesStart::new(ROW_ELEMENT)))
                .map_err(xml_error)?;
            for (name, cell) in columns.iter().zip(&row.cells) {
                if cell.is_empty() {
                    xml.write_event(Event::Empty(BytesStart::new(*name)))
                        .map_err(xml_error)?;
                } else {
                    xml.write_event(Event::Start(BytesStart::new(*name)))
                        .map_err(xml_error)?;
                    xml.write_event(Event::Text(BytesText::new(cell)))
                        .map_err(xml_error)?;
                    xml.write_event(Event::End(BytesEnd::new(*name)))
                        .map_err(xml_error)?;
                }
            }
            xml.write_event(Event::End(BytesEnd::new(ROW_ELEMENT)))
                .map_err(xml_error)?;
        }

        xml.write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))
            .map_err(xml_error)?;
        xml.get_mut().write_all(b"\n")?;
        Ok(())
    }
}

fn xml_error(e: impl Display) -> RenderError {
    RenderError::Invalid(e.to_string())
}

/// True when `name` can be used as an XML element name
pub fn is_valid_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
