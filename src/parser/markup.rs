//! Text helpers shared by the HTML and XML readers

use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesRef, BytesStart, BytesText};
use quick_xml::Reader;

/// Lenient reader for hand-written markup
pub(crate) fn lenient_reader(text: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(text);
    let config = reader.config_mut();
    config.check_comments = false;
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.allow_dangling_amp = true;
    config.trim_text(false);
    reader
}

/// Lower-cased local name of an element
pub(crate) fn tag_name(element: &BytesStart) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).to_ascii_lowercase()
}

pub(crate) trait TextSink {
    /// Append the content of a text event
    fn push_text(&mut self, text: &BytesText) -> Result<(), String>;

    /// Append a character or entity reference
    fn push_reference(&mut self, reference: &BytesRef) -> Result<(), String>;
}

impl TextSink for String {
    fn push_text(&mut self, text: &BytesText) -> Result<(), String> {
        let content = text.xml_content().map_err(|e| e.to_string())?;
        self.push_str(&content);
        Ok(())
    }

    fn push_reference(&mut self, reference: &BytesRef) -> Result<(), String> {
        let raw = reference.xml_content().map_err(|e| e.to_string())?;
        if let Some(number) = raw.strip_prefix('#') {
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16),
                None => number.parse(),
            };
            match code.ok().and_then(char::from_u32) {
                Some(ch) => self.push(ch),
                None => {
                    self.push('&');
                    self.push_str(&raw);
                    self.push(';');
                }
            }
        } else if let Some(entity) = resolve_xml_entity(&raw).or_else(|| html_entity(&raw)) {
            self.push_str(entity);
        } else {
            // unknown entities are kept as written
            self.push('&');
            self.push_str(&raw);
            self.push(';');
        }
        Ok(())
    }
}

/// Common HTML entities outside the XML predefined set
fn html_entity(name: &str) -> Option<&'static str> {
    let resolved = match name {
        "nbsp" => " ",
        "copy" => "©",
        "reg" => "®",
        "trade" => "™",
        "euro" => "€",
        "pound" => "£",
        "yen" => "¥",
        "cent" => "¢",
        "sect" => "§",
        "deg" => "°",
        "middot" => "·",
        "ndash" => "–",
        "mdash" => "—",
        "hellip" => "…",
        "laquo" => "«",
        "raquo" => "»",
        "lsquo" => "‘",
        "rsquo" => "’",
        "ldquo" => "“",
        "rdquo" => "”",
        "times" => "×",
        _ => return None,
    };
    Some(resolved)
}

/// Collapse runs of whitespace into single spaces and trim the ends
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
