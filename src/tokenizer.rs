//! Flat markup events over a MediaWiki XML export.
//!
//! The assembler only needs element boundaries and text, so the
//! `quick-xml` pull parser is narrowed down to [`Event`]. Self-closing
//! elements come out as a start immediately followed by an end.
//!
//! Events borrow the reader's buffer and are handed to a callback, so a
//! body without entities reaches the assembler without being copied.

use std::borrow::Cow;
use std::io::BufRead;

use quick_xml::events::Event as XmlEvent;
use quick_xml::Reader;

use crate::error::{ExtractError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
    Start(Cow<'a, str>),
    End(Cow<'a, str>),
    Text(Cow<'a, str>),
    Eof,
}

/// A sequential cursor over markup events.
pub trait EventSource {
    /// Feed every event in document order to `f`, finishing with
    /// [`Event::Eof`]. Stops early once `f` returns `false`.
    fn for_each_event<F>(&mut self, f: F) -> Result<()>
    where
        F: FnMut(&Event<'_>) -> bool;
}

pub struct XmlEvents<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
}

impl<R: BufRead> XmlEvents<R> {
    pub fn new(input: R) -> Self {
        Self {
            reader: Reader::from_reader(input),
            buf: Vec::with_capacity(64 * 1024),
        }
    }
}

impl<R: BufRead> EventSource for XmlEvents<R> {
    fn for_each_event<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&Event<'_>) -> bool,
    {
        loop {
            self.buf.clear();
            let keep_going = match self.reader.read_event_into(&mut self.buf)? {
                XmlEvent::Start(e) => {
                    let local = e.local_name();
                    f(&Event::Start(String::from_utf8_lossy(local.as_ref())))
                }
                XmlEvent::Empty(e) => {
                    let local = e.local_name();
                    let name = String::from_utf8_lossy(local.as_ref());
                    f(&Event::Start(name.clone())) && f(&Event::End(name))
                }
                XmlEvent::End(e) => {
                    let local = e.local_name();
                    f(&Event::End(String::from_utf8_lossy(local.as_ref())))
                }
                XmlEvent::Text(e) => {
                    let text = e.unescape().map_err(text_error)?;
                    f(&Event::Text(text))
                }
                XmlEvent::CData(e) => {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    f(&Event::Text(Cow::Owned(text)))
                }
                XmlEvent::Eof => {
                    f(&Event::Eof);
                    return Ok(());
                }
                // Declarations, comments, processing instructions
                _ => true,
            };
            if !keep_going {
                return Ok(());
            }
        }
    }
}

/// Unknown entities are escape errors; anything else (bad UTF-8) is the
/// tokenizer failing on the byte stream.
fn text_error(err: quick_xml::Error) -> ExtractError {
    match err {
        quick_xml::Error::EscapeError(e) => ExtractError::Escape(e.to_string()),
        other => ExtractError::Xml(other),
    }
}
