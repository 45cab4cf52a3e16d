//! Streaming RSS reader.
//!
//! Pulls events off `quick_xml::Reader` and drives a two-state machine:
//! `OutsideItem` until an `<item>` opens, then `InsideItem` with a per-item
//! accumulator until the matching `</item>`. Only structural errors abort; an
//! aborted document yields no items at all, even ones that already closed.

use std::collections::HashMap;
use std::mem;
use std::time::Instant;

use metrics::{counter, histogram};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::FeedParseError;
use crate::ingest::types::{Enclosure, RawFeedItem};

/// Parse a whole RSS document into items, in document order.
pub fn parse_feed(xml: &[u8]) -> Result<Vec<RawFeedItem>, FeedParseError> {
    let t0 = Instant::now();
    let items = FeedParser::default().run(xml)?;

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("feed_parse_ms").record(ms);
    counter!("feed_items_parsed_total").increment(items.len() as u64);
    Ok(items)
}

/// Text collected for the item currently open, keyed by element name.
#[derive(Debug, Default)]
struct ItemAccumulator {
    fields: HashMap<String, String>,
    enclosure: Option<Enclosure>,
}

impl ItemAccumulator {
    fn append_text(&mut self, element: &str, chunk: &str) {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            return;
        }
        self.fields
            .entry(element.to_string())
            .or_default()
            .push_str(chunk);
    }

    fn finish(mut self) -> RawFeedItem {
        RawFeedItem {
            title: self.fields.remove("title").unwrap_or_default(),
            description: self.fields.remove("description"),
            link: self.fields.remove("link"),
            pub_date: self.fields.remove("pubDate"),
            guid: self.fields.remove("guid"),
            enclosure: self.enclosure.filter(|e| e.url.is_some()),
        }
    }
}

#[derive(Debug, Default)]
enum ParserState {
    #[default]
    OutsideItem,
    InsideItem(ItemAccumulator),
}

#[derive(Debug, Default)]
struct FeedParser {
    state: ParserState,
    current_element: Option<String>,
    open: Vec<String>,
    saw_root: bool,
    items: Vec<RawFeedItem>,
}

impl FeedParser {
    fn run(mut self, xml: &[u8]) -> Result<Vec<RawFeedItem>, FeedParseError> {
        let mut reader = Reader::from_reader(xml);
        // Trimming is done per chunk by the accumulator.
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        loop {
            let event = match reader.read_event_into(&mut buf) {
                Ok(ev) => ev,
                Err(e) => {
                    return Err(FeedParseError::Xml {
                        position: reader.buffer_position() as u64,
                        message: e.to_string(),
                    })
                }
            };

            match event {
                Event::Start(e) => {
                    let name = element_name(&e);
                    self.saw_root = true;
                    self.open.push(name.clone());
                    self.enter(name, &e);
                }
                Event::Empty(e) => {
                    let name = element_name(&e);
                    self.saw_root = true;
                    self.enter(name.clone(), &e);
                    self.leave(&name);
                }
                Event::End(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    self.open.pop();
                    self.leave(&name);
                }
                Event::Text(e) => {
                    let text = match e.unescape() {
                        Ok(t) => t.into_owned(),
                        // HTML entities (&nbsp; &rsquo; ...) are not XML entities.
                        Err(_) => html_escape::decode_html_entities(&String::from_utf8_lossy(&e))
                            .into_owned(),
                    };
                    self.on_text(&text);
                }
                Event::CData(e) => {
                    let raw = e.into_inner();
                    self.on_text(&String::from_utf8_lossy(&raw));
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if let Some(unclosed) = self.open.pop() {
            return Err(FeedParseError::UnexpectedEof(unclosed));
        }
        if !self.saw_root {
            return Err(FeedParseError::NoRootElement);
        }
        Ok(self.items)
    }

    fn enter(&mut self, name: String, e: &BytesStart<'_>) {
        match name.as_str() {
            // A stray nested <item> restarts the accumulator.
            "item" => self.state = ParserState::InsideItem(ItemAccumulator::default()),
            "enclosure" => {
                if let ParserState::InsideItem(acc) = &mut self.state {
                    acc.enclosure = Some(Enclosure {
                        url: attr_value(e, "url"),
                        media_type: attr_value(e, "type"),
                    });
                }
            }
            _ => {}
        }
        self.current_element = Some(name);
    }

    fn leave(&mut self, name: &str) {
        if name == "item" {
            if let ParserState::InsideItem(acc) = mem::take(&mut self.state) {
                self.items.push(acc.finish());
            }
        }
        self.current_element = None;
    }

    fn on_text(&mut self, chunk: &str) {
        if let (ParserState::InsideItem(acc), Some(element)) =
            (&mut self.state, self.current_element.as_deref())
        {
            acc.append_text(element, chunk);
        }
    }
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn attr_value(e: &BytesStart<'_>, key: &str) -> Option<String> {
    let attr = e.try_get_attribute(key).ok().flatten()?;
    let value = match attr.unescape_value() {
        Ok(v) => v.into_owned(),
        Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
    };
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
