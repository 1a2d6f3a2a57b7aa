//! Turns the tokenizer's event stream into per-page work items.
//!
//! Only `page`, `title` and `text` elements matter. Body text is dropped
//! until a chunk mentions the annotation marker, so pages without
//! pronunciations never get buffered.

use log::trace;

use crate::config::Config;
use crate::ipa::{Pronunciation, TEMPLATE_CLOSE};
use crate::tokenizer::Event;

const PAGE: &str = "page";
const TITLE: &str = "title";
const TEXT: &str = "text";

/// Raw candidate text of one page, ready for a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub raw: String,
    /// Word only; workers fill in the templates.
    pub entry: Pronunciation,
}

/// What the current page's title chunks have said so far. A title is
/// meta once any chunk carries the namespace marker; later chunks do not
/// change that.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Title {
    Unset,
    Word(String),
    Meta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Outside,
    InRecord,
    InTitle,
    InBody,
}

pub struct RecordAssembler {
    state: State,
    candidate_open: bool,
    buffer: String,
    title: Title,
    namespace_marker: String,
    annotation_marker: String,
    pages: usize,
    meta_records: usize,
}

impl RecordAssembler {
    pub fn new(config: &Config) -> Self {
        Self {
            state: State::Outside,
            candidate_open: false,
            buffer: String::new(),
            title: Title::Unset,
            namespace_marker: config.namespace_marker.clone(),
            annotation_marker: config.annotation_marker.clone(),
            pages: 0,
            meta_records: 0,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Pages seen so far.
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Titles suppressed because they carry the namespace marker.
    pub fn meta_records(&self) -> usize {
        self.meta_records
    }

    /// Feed one event; yields a work item when a body with a candidate ends.
    pub fn handle(&mut self, event: &Event<'_>) -> Option<WorkItem> {
        match event {
            Event::Start(name) => {
                self.on_start(name);
                None
            }
            Event::End(name) => self.on_end(name),
            Event::Text(text) => {
                self.on_text(text);
                None
            }
            Event::Eof => None,
        }
    }

    fn on_start(&mut self, name: &str) {
        match (name, self.state) {
            (PAGE, _) => {
                self.state = State::InRecord;
                self.buffer.clear();
                self.candidate_open = false;
                self.title = Title::Unset;
                self.pages += 1;
            }
            (TITLE, State::InRecord) => self.state = State::InTitle,
            (TEXT, State::InRecord) => self.state = State::InBody,
            _ => {}
        }
    }

    fn on_end(&mut self, name: &str) -> Option<WorkItem> {
        match (name, self.state) {
            (TITLE, State::InTitle) => {
                self.state = State::InRecord;
                None
            }
            (TEXT, State::InBody) => {
                self.state = State::InRecord;
                self.take_work_item()
            }
            (PAGE, _) => {
                self.state = State::Outside;
                self.candidate_open = false;
                None
            }
            _ => None,
        }
    }

    fn on_text(&mut self, text: &str) {
        match self.state {
            State::InTitle => match self.title {
                Title::Meta => {}
                _ if text.contains(self.namespace_marker.as_str()) => {
                    trace!("skipping meta page {text:?}");
                    self.meta_records += 1;
                    self.title = Title::Meta;
                }
                // Last non-empty chunk wins
                _ if !text.is_empty() => self.title = Title::Word(text.to_string()),
                _ => {}
            },
            State::InBody => {
                if !self.candidate_open {
                    if text.contains(self.annotation_marker.as_str()) {
                        self.candidate_open = true;
                        self.buffer.push_str(text);
                    }
                } else if text.starts_with(TEMPLATE_CLOSE) {
                    self.buffer.push_str(TEMPLATE_CLOSE);
                    self.candidate_open = false;
                } else {
                    self.buffer.push_str(text);
                }
            }
            State::Outside | State::InRecord => {}
        }
    }

    fn take_work_item(&mut self) -> Option<WorkItem> {
        if self.buffer.is_empty() {
            return None;
        }
        let raw = std::mem::take(&mut self.buffer);
        let Title::Word(word) = &self.title else {
            return None;
        };
        trace!("queueing {word:?} ({} bytes)", raw.len());
        Some(WorkItem {
            raw,
            entry: Pronunciation::new(word.as_str()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(name: &'static str) -> Event<'static> {
        Event::Start(name.into())
    }

    fn end(name: &'static str) -> Event<'static> {
        Event::End(name.into())
    }

    fn text(s: &'static str) -> Event<'static> {
        Event::Text(s.into())
    }

    fn titled_page(title: &[&'static str], body: &[&'static str]) -> Vec<Event<'static>> {
        let mut events = vec![start("page"), start("title")];
        events.extend(title.iter().copied().map(text));
        events.extend([end("title"), start("revision"), start("text")]);
        events.extend(body.iter().copied().map(text));
        events.extend([end("text"), end("revision"), end("page")]);
        events
    }

    fn page_events(title: &'static str, body: &[&'static str]) -> Vec<Event<'static>> {
        titled_page(&[title], body)
    }

    fn run(assembler: &mut RecordAssembler, events: &[Event<'_>]) -> Vec<WorkItem> {
        events.iter().filter_map(|event| assembler.handle(event)).collect()
    }

    #[test]
    fn states_follow_nesting() {
        let mut assembler = RecordAssembler::new(&Config::default());
        assert_eq!(assembler.state(), State::Outside);
        assembler.handle(&start("page"));
        assert_eq!(assembler.state(), State::InRecord);
        assembler.handle(&start("title"));
        assert_eq!(assembler.state(), State::InTitle);
        assembler.handle(&end("title"));
        assert_eq!(assembler.state(), State::InRecord);
        assembler.handle(&start("ns"));
        assert_eq!(assembler.state(), State::InRecord);
        assembler.handle(&start("text"));
        assert_eq!(assembler.state(), State::InBody);
        assembler.handle(&end("text"));
        assert_eq!(assembler.state(), State::InRecord);
        assembler.handle(&end("page"));
        assert_eq!(assembler.state(), State::Outside);
    }

    #[test]
    fn page_with_template_emits_one_item() {
        let mut assembler = RecordAssembler::new(&Config::default());
        let items = run(&mut assembler, &page_events("kestrel", &["* {{IPA|en|/ˈkɛstɹəl/}}"]));
        assert_eq!(
            items,
            vec![WorkItem {
                raw: "* {{IPA|en|/ˈkɛstɹəl/}}".to_string(),
                entry: Pronunciation::new("kestrel"),
            }]
        );
        assert_eq!(assembler.pages(), 1);
    }

    #[test]
    fn body_without_marker_emits_nothing() {
        let mut assembler = RecordAssembler::new(&Config::default());
        let items = run(&mut assembler, &page_events("kestrel", &["===Noun===", "{{en-noun}}"]));
        assert!(items.is_empty());
    }

    #[test]
    fn chunks_before_marker_dropped() {
        let mut assembler = RecordAssembler::new(&Config::default());
        let items = run(
            &mut assembler,
            &page_events(
                "sparrow",
                &["==English==", "* {{IPA|en|/ˈspæɹoʊ/", "|a=US", "}}", "ignored"],
            ),
        );
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].raw, "* {{IPA|en|/ˈspæɹoʊ/|a=US}}");
    }

    #[test]
    fn close_marker_chunk_truncated_to_marker() {
        let mut assembler = RecordAssembler::new(&Config::default());
        let items = run(
            &mut assembler,
            &page_events("x", &["{{IPA|en|/a/", "}}\n* {{audio|en|x.ogg}}", "tail"]),
        );
        assert_eq!(items[0].raw, "{{IPA|en|/a/}}");
    }

    #[test]
    fn meta_title_never_emits() {
        let mut assembler = RecordAssembler::new(&Config::default());
        let items = run(
            &mut assembler,
            &page_events("Wiktionary:Pronunciation", &["{{IPA|en|/a/}}"]),
        );
        assert!(items.is_empty());
        assert_eq!(assembler.meta_records(), 1);
    }

    #[test]
    fn meta_title_does_not_inherit_previous_word() {
        let mut assembler = RecordAssembler::new(&Config::default());
        let mut events = page_events("kestrel", &["{{IPA|en|/a/}}"]);
        events.extend(page_events("Wiktionary:About", &["{{IPA|en|/b/}}"]));
        let items = run(&mut assembler, &events);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].entry.word, "kestrel");
    }

    #[test]
    fn split_title_last_chunk_wins() {
        let mut assembler = RecordAssembler::new(&Config::default());
        let items = run(&mut assembler, &titled_page(&["a", "b"], &["{{IPA|en|/b/}}"]));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].entry.word, "b");
        assert_eq!(assembler.meta_records(), 0);
    }

    #[test]
    fn split_title_meta_in_later_chunk() {
        let mut assembler = RecordAssembler::new(&Config::default());
        let items = run(
            &mut assembler,
            &titled_page(&["a", "Wiktionary:x"], &["{{IPA|en|/a/}}"]),
        );
        assert!(items.is_empty());
        assert_eq!(assembler.meta_records(), 1);
    }

    #[test]
    fn split_title_meta_in_first_chunk() {
        let mut assembler = RecordAssembler::new(&Config::default());
        let items = run(
            &mut assembler,
            &titled_page(&["Wiktionary:", "Wiktionary:x", "x"], &["{{IPA|en|/a/}}"]),
        );
        assert!(items.is_empty());
        assert_eq!(assembler.meta_records(), 1);
    }

    #[test]
    fn buffer_resets_between_pages() {
        let mut assembler = RecordAssembler::new(&Config::default());
        let mut events = page_events("one", &["{{IPA|en|/a/"]);
        events.extend(page_events("two", &["plain", "{{IPA|en|/b/}}"]));
        let items = run(&mut assembler, &events);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].raw, "{{IPA|en|/a/");
        assert_eq!(items[1].raw, "{{IPA|en|/b/}}");
        assert_eq!(items[1].entry.word, "two");
    }

    #[test]
    fn text_outside_body_ignored() {
        let mut assembler = RecordAssembler::new(&Config::default());
        let events = vec![
            start("siteinfo"),
            start("sitename"),
            text("Wiktionary IPA"),
            end("sitename"),
            end("siteinfo"),
            start("page"),
            start("title"),
            text("word"),
            end("title"),
            start("comment"),
            text("IPA fix"),
            end("comment"),
            end("page"),
        ];
        assert!(run(&mut assembler, &events).is_empty());
        assert_eq!(assembler.meta_records(), 0);
    }

    #[test]
    fn custom_annotation_marker() {
        let config = Config {
            annotation_marker: "{{IPA|".to_string(),
            ..Config::default()
        };
        let mut assembler = RecordAssembler::new(&config);
        let items = run(&mut assembler, &page_events("x", &["see IPA chart", "{{IPA|en|/a/}}"]));
        assert_eq!(items[0].raw, "{{IPA|en|/a/}}");
    }
}
