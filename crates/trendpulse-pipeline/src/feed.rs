//! RSS/Atom title extraction.
//!
//! Handles both `<item>`-wrapped (RSS 2.0) and `<entry>`-wrapped (Atom)
//! envelopes in one pass, independent of the emitting source. Dedup is the
//! aggregator's job; callers that assume uniqueness dedupe themselves.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::PipelineError;

/// Parse a feed XML body into the list of entry titles, document order.
///
/// Titles are entity-unescaped, CDATA-unwrapped, stripped of inline markup,
/// and whitespace-normalized. Results shorter than 2 characters after
/// cleanup are dropped.
///
/// # Errors
///
/// Returns [`PipelineError::Xml`] if the XML is malformed.
pub fn parse_feed_titles(xml: &str) -> Result<Vec<String>, PipelineError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut titles = Vec::new();
    let mut in_entry = false;
    let mut in_title = false;
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name_buf = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_buf).unwrap_or("");
                match name {
                    "item" | "entry" => {
                        in_entry = true;
                        current.clear();
                    }
                    "title" if in_entry => {
                        in_title = true;
                        current.clear();
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                let name_buf = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_buf).unwrap_or("");
                match name {
                    "title" if in_title => {
                        in_title = false;
                        let cleaned = clean_title(&current);
                        if cleaned.chars().count() >= 2 {
                            titles.push(cleaned);
                        }
                    }
                    "item" | "entry" => in_entry = false,
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if in_title {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    if !current.is_empty() {
                        current.push(' ');
                    }
                    current.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if in_title {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    if !current.is_empty() {
                        current.push(' ');
                    }
                    current.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(PipelineError::Xml(e)),
            _ => {}
        }
    }

    Ok(titles)
}

/// Strip inline markup tags and collapse whitespace in a title.
fn clean_title(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for ch in raw.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
