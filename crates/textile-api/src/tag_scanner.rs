use crate::char_classifier::classify;
use crate::event_sink::EventSink;
use crate::line_rewriter;
use crate::parse_context::{FieldType, ParseContext};
use crate::tag_name;
use crate::tag_record::TagRecord;

/// How a completed word or field ended.
#[derive(Debug, Default, Clone, Copy)]
struct ScanEnd {
    ends_field: bool,
    ends_tag: bool,

    /// The byte that ended the scan: `<`, `>`, `=`, a quote, or a space
    /// when the input ran out. Zero when the byte was handed back for
    /// reclassification.
    terminator: u8,
}

/// Walks a document one character at a time, producing a `TagRecord` for
/// each tag occurrence and for the text between them.
///
/// The scanner owns its input and its context. Scanning a second document
/// requires building a second scanner; there is no way to rewind or reuse
/// one, which is what keeps stale context unrepresentable.
pub struct TagScanner {
    ctx: ParseContext,
    text_bytes: Box<[u8]>,
    bytes_already_parsed: usize,
    line_bytes: Vec<u8>,
    line_already_parsed: usize,
    emitted_final_closings: bool,
}

impl TagScanner {
    pub fn new(text: &[u8], markup_mode: bool) -> Self {
        Self {
            ctx: ParseContext::new(markup_mode),
            text_bytes: text.into(),
            bytes_already_parsed: 0,
            line_bytes: Vec::new(),
            line_already_parsed: 0,
            emitted_final_closings: false,
        }
    }

    /// Disables `&...;` translation while scanning text.
    pub fn without_entity_translation(mut self) -> Self {
        self.ctx.translate_entities = false;
        self
    }

    /// Reads the next tag occurrence, or the trailing text of the document.
    ///
    /// Returns `None` only at the true end of input. Malformed markup never
    /// fails the scan: a tag left open at the end of the document degrades
    /// to its preceding text, or to nothing at all.
    pub fn read_tag(&mut self) -> Option<TagRecord> {
        let mut tag = TagRecord::new();

        // Preceding text runs to the next `<` or to the end of input.
        self.ctx.field_type = FieldType::Text;
        let end = self.get_next_field();
        tag.preceding_text = String::from_utf8_lossy(&self.ctx.field).into_owned();

        if b'<' != end.terminator {
            // Input exhausted without opening another tag.
            if tag.preceding_text.is_empty() {
                return None;
            }
            return Some(tag);
        }

        // `</` marks a closing tag.
        if self.line_already_parsed < self.line_bytes.len()
            && b'/' == self.line_bytes[self.line_already_parsed]
        {
            tag.is_ending = true;
            self.line_already_parsed += 1;
        }

        self.ctx.field_type = FieldType::TagName;
        let mut end = self.get_next_field();
        tag.name = String::from_utf8_lossy(&self.ctx.field).into_owned();
        tag.name.make_ascii_lowercase();

        // `<br/>` puts the self-closing solidus inside the name itself.
        if tag.name.len() > 1 && tag.name.ends_with('/') {
            tag.name.pop();
            tag.is_self_contained = true;
        }

        /*
         * Comments carry no attributes. Everything through the closing
         * `-->` is collected as one field and stored under the synthetic
         * `!==` attribute name.
         */
        if "!--" == tag.name {
            self.ctx.field_type = FieldType::Comment;
            self.get_next_field();
            let mut text = self.ctx.field.clone();
            if text.ends_with(b"--") {
                text.truncate(text.len() - 2);
            }
            tag.attributes.push((
                "!==".to_string(),
                String::from_utf8_lossy(&text).into_owned(),
            ));
            return Some(tag);
        }

        // Doctype guts are scanned off and discarded.
        if "!doctype" == tag.name {
            loop {
                let end = self.get_next_field();
                if end.ends_tag || self.ctx.at_end {
                    break;
                }
            }
            return Some(tag);
        }

        while !end.ends_tag && !self.ctx.at_end {
            self.ctx.field_type = FieldType::AttributeName;
            end = self.get_next_field();
            let mut name = String::from_utf8_lossy(&self.ctx.field).into_owned();
            name.make_ascii_lowercase();

            // A bare solidus marks the tag self-contained.
            if "/" == name {
                tag.is_self_contained = true;
                continue;
            }

            if b'=' == end.terminator {
                self.ctx.field_type = FieldType::AttributeValue;
                end = self.get_next_field();
                let value = String::from_utf8_lossy(&self.ctx.field).into_owned();
                if !name.is_empty() {
                    tag.attributes.push((name, value));
                }
                // A value scanned for a nameless pair keeps the cursor in
                // sync and is dropped.
                continue;
            }

            if !name.is_empty() {
                tag.attributes.push((name, String::new()));
            }
        }

        if end.ends_tag && b'>' == end.terminator {
            return Some(tag);
        }

        // The tag never closed before the end of the document.
        if tag.preceding_text.is_empty() {
            return None;
        }
        tag.name.clear();
        tag.is_ending = false;
        tag.is_self_contained = false;
        tag.attributes.clear();
        Some(tag)
    }

    /// Drives the whole document through an event sink.
    ///
    /// Text arrives as `characters`, tags as `start_element`/`end_element`
    /// in source order. Self-contained tags produce a matched pair with
    /// nothing in between. Comments and doctype declarations produce no
    /// events at all, though their preceding text still does.
    pub fn run(mut self, sink: &mut impl EventSink) {
        while let Some(tag) = self.read_tag() {
            if !tag.preceding_text().is_empty() {
                sink.characters(tag.preceding_text());
            }

            if tag.name().is_empty() || tag.name().starts_with('!') {
                continue;
            }

            if tag.is_ending {
                sink.end_element(tag.name());
                continue;
            }

            sink.start_element(tag.name(), tag.attributes());

            if tag.is_self_contained || tag_name::is_self_contained(tag.name().as_bytes()) {
                sink.end_element(tag.name());
            }
        }
    }

    /// Accumulates words until one of them ends the field.
    fn get_next_field(&mut self) -> ScanEnd {
        self.ctx.field.clear();
        loop {
            let end = self.get_next_word();
            if !self.ctx.word.is_empty() {
                self.ctx.field.extend_from_slice(&self.ctx.word);
            }
            if end.ends_field || end.ends_tag || self.ctx.at_end {
                // Collapse a run of trailing spaces down to one.
                while self.ctx.field.ends_with(b"  ") {
                    self.ctx.field.pop();
                }
                // A separator whose word never arrived is dropped.
                if self.ctx.at_end && self.ctx.word.is_empty() && self.ctx.field.ends_with(b" ") {
                    self.ctx.field.pop();
                }
                return end;
            }
        }
    }

    /// Accumulates one word, skipping leading whitespace and any bytes
    /// absorbed into an in-progress entity reference.
    fn get_next_word(&mut self) -> ScanEnd {
        self.ctx.word.clear();

        /*
         * Words inside one text field are separated by exactly one space,
         * however much whitespace separated them in the source.
         */
        if FieldType::Text == self.ctx.field_type && !self.ctx.field.is_empty() {
            self.ctx.field.push(b' ');
        }

        let mut end = ScanEnd::default();
        let mut leading = true;

        loop {
            let raw = match self.next_byte() {
                Some(b) => b,
                // Classification under `at_end` ends everything at once.
                None => b' ',
            };
            let v = classify(&mut self.ctx, raw);

            if v.lonely_ampersand {
                self.ctx.word.push(b'&');
                leading = false;
            }

            if self.ctx.entity.is_active() {
                // Absorbed into the reference accumulator.
                continue;
            }

            if v.reprocess {
                self.line_already_parsed -= 1;
            }

            if v.is_whitespace && leading && !self.ctx.at_end {
                /*
                 * One leading space is significant inside text, e.g. right
                 * after an inline tag; the rest of the run is not.
                 */
                if FieldType::Text == self.ctx.field_type && self.ctx.field.is_empty() {
                    self.ctx.field.push(b' ');
                }
                continue;
            }

            if v.ends_word || v.ends_field || v.ends_tag {
                end.ends_field = v.ends_field;
                end.ends_tag = v.ends_tag;
                end.terminator = if v.reprocess { 0 } else { v.byte };
                break;
            }

            // An opening quote starts a literal; the classifier handles
            // the one that closes it.
            if b'"' == v.byte
                && !self.ctx.quoted
                && matches!(
                    self.ctx.field_type,
                    FieldType::AttributeValue | FieldType::Doctype
                )
            {
                self.ctx.quoted = true;
                leading = false;
                continue;
            }

            if v.is_whitespace {
                // Unquoted whitespace with no terminating power is dropped.
                continue;
            }

            self.ctx.word.push(v.byte);
            leading = false;
        }

        end
    }

    fn next_byte(&mut self) -> Option<u8> {
        loop {
            if self.line_already_parsed < self.line_bytes.len() {
                let b = self.line_bytes[self.line_already_parsed];
                self.line_already_parsed += 1;
                return Some(b);
            }
            if !self.refill_line() {
                return None;
            }
        }
    }

    /// Pulls the next input line into the line buffer, normalizing smart
    /// punctuation and applying the markup rewriter when it is enabled.
    ///
    /// Once the input runs dry in markup mode, one final synthetic line
    /// carries the closing tags still owed; after that the context is
    /// marked exhausted.
    fn refill_line(&mut self) -> bool {
        if self.bytes_already_parsed >= self.text_bytes.len() {
            if self.ctx.markup_mode && !self.emitted_final_closings {
                self.emitted_final_closings = true;
                let closings = line_rewriter::finish(&mut self.ctx);
                if !closings.is_empty() {
                    self.line_bytes = closings;
                    self.line_already_parsed = 0;
                    return true;
                }
            }
            self.ctx.at_end = true;
            return false;
        }

        let start = self.bytes_already_parsed;
        let (content_end, next_start) =
            match memchr::memchr2(b'\r', b'\n', &self.text_bytes[start..]) {
                Some(pos) => {
                    let terminator_at = start + pos;
                    let mut next = terminator_at + 1;
                    // A CR/LF or LF/CR pair counts as one terminator.
                    if next < self.text_bytes.len()
                        && matches!(self.text_bytes[next], b'\r' | b'\n')
                        && self.text_bytes[next] != self.text_bytes[terminator_at]
                    {
                        next += 1;
                    }
                    (terminator_at, next)
                }
                None => (self.text_bytes.len(), self.text_bytes.len()),
            };

        let mut line = normalize_punctuation(&self.text_bytes[start..content_end]);
        self.bytes_already_parsed = next_start;

        if self.ctx.markup_mode {
            line_rewriter::rewrite_line(&mut self.ctx, &mut line);
        }

        /*
         * The terminator re-enters the stream as a line feed so that words
         * still break across line boundaries; the classifier reads it as a
         * space everywhere outside comments.
         */
        line.push(b'\n');

        self.line_bytes = line;
        self.line_already_parsed = 0;
        true
    }
}

/// Replaces "smart" punctuation with its plain ASCII equivalent.
fn normalize_punctuation(raw: &[u8]) -> Vec<u8> {
    let mut line = Vec::with_capacity(raw.len());
    let mut at = 0;

    while at < raw.len() {
        let b = raw[at];

        if 0xE2 == b && at + 2 < raw.len() && 0x80 == raw[at + 1] {
            match raw[at + 2] {
                // Curly single quotes.
                0x98 | 0x99 => {
                    line.push(b'\'');
                    at += 3;
                    continue;
                }
                // Curly double quotes.
                0x9C | 0x9D => {
                    line.push(b'"');
                    at += 3;
                    continue;
                }
                // En and em dashes.
                0x93 | 0x94 => {
                    line.push(b'-');
                    at += 3;
                    continue;
                }
                // Horizontal ellipsis.
                0xA6 => {
                    line.extend_from_slice(b"...");
                    at += 3;
                    continue;
                }
                _ => {}
            }
        }

        // No-break space.
        if 0xC2 == b && at + 1 < raw.len() && 0xA0 == raw[at + 1] {
            line.push(b' ');
            at += 2;
            continue;
        }

        // An ASCII "--" once became an em dash here; the substitution
        // clashes with comment terminators and stays disabled.
        //if b'-' == b && at + 1 < raw.len() && b'-' == raw[at + 1] {
        //    line.extend_from_slice("\u{2014}".as_bytes());
        //    at += 2;
        //    continue;
        //}

        line.push(b);
        at += 1;
    }

    line
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[derive(Debug, PartialEq, Eq, Clone)]
    enum Event {
        Start(String, Vec<(String, String)>),
        End(String),
        Characters(String),
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Vec<Event>,
    }

    impl EventSink for RecordingSink {
        fn start_element(&mut self, tag_name: &str, attributes: &[(String, String)]) {
            self.events
                .push(Event::Start(tag_name.to_string(), attributes.to_vec()));
        }

        fn end_element(&mut self, tag_name: &str) {
            self.events.push(Event::End(tag_name.to_string()));
        }

        fn characters(&mut self, text: &str) {
            self.events.push(Event::Characters(text.to_string()));
        }
    }

    fn events_of(input: &str, markup_mode: bool) -> Vec<Event> {
        let mut sink = RecordingSink::default();
        TagScanner::new(input.as_bytes(), markup_mode).run(&mut sink);
        sink.events
    }

    /// Event names with text trimmed, for asserting on nesting structure.
    fn shape_of(input: &str, markup_mode: bool) -> Vec<String> {
        events_of(input, markup_mode)
            .into_iter()
            .filter_map(|event| match event {
                Event::Start(name, _) => Some(name),
                Event::End(name) => Some(format!("/{name}")),
                Event::Characters(text) => {
                    let trimmed = text.trim().to_string();
                    if trimmed.is_empty() {
                        None
                    } else {
                        Some(format!("#{trimmed}"))
                    }
                }
            })
            .collect()
    }

    #[test]
    fn test_plain_text_is_one_characters_event() {
        assert_eq!(
            events_of("just some words", false),
            vec![Event::Characters("just some words".to_string())]
        );
    }

    #[test]
    fn test_interior_whitespace_normalizes() {
        assert_eq!(
            events_of("a\tb\r\nc   d", false),
            vec![Event::Characters("a b c d".to_string())]
        );
    }

    #[quickcheck]
    fn plain_text_passes_through(words: Vec<String>) -> bool {
        let cleaned: Vec<String> = words
            .iter()
            .map(|w| w.chars().filter(|c| c.is_ascii_alphanumeric()).collect())
            .filter(|w: &String| !w.is_empty())
            .collect();
        let input = cleaned.join(" ");

        let events = events_of(&input, false);
        if input.is_empty() {
            events.is_empty()
        } else {
            events == vec![Event::Characters(input)]
        }
    }

    #[test]
    fn test_entity_round_trip() {
        assert_eq!(
            events_of("A &amp; B", false),
            vec![Event::Characters("A & B".to_string())]
        );
    }

    #[test]
    fn test_entity_translation_disabled() {
        let mut sink = RecordingSink::default();
        TagScanner::new(b"A &amp; B", false)
            .without_entity_translation()
            .run(&mut sink);
        assert_eq!(
            sink.events,
            vec![Event::Characters("A &amp; B".to_string())]
        );
    }

    #[test]
    fn test_raw_html_reemits_equivalently() {
        assert_eq!(
            events_of("<div class=\"x\">Hello <b>world</b><br /></div>", false),
            vec![
                Event::Start(
                    "div".to_string(),
                    vec![("class".to_string(), "x".to_string())]
                ),
                Event::Characters("Hello ".to_string()),
                Event::Start("b".to_string(), vec![]),
                Event::Characters("world".to_string()),
                Event::End("b".to_string()),
                Event::Start("br".to_string(), vec![]),
                Event::End("br".to_string()),
                Event::End("div".to_string()),
            ]
        );
    }

    #[test]
    fn test_tag_names_and_attributes_lowercase() {
        assert_eq!(
            events_of("<DIV CLASS=Panel>x</DIV>", false),
            vec![
                Event::Start(
                    "div".to_string(),
                    vec![("class".to_string(), "Panel".to_string())]
                ),
                Event::Characters("x".to_string()),
                Event::End("div".to_string()),
            ]
        );
    }

    #[test]
    fn test_self_closing_without_space() {
        assert_eq!(
            events_of("a<br/>b", false),
            vec![
                Event::Characters("a".to_string()),
                Event::Start("br".to_string(), vec![]),
                Event::End("br".to_string()),
                Event::Characters("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_comment_produces_no_events() {
        assert_eq!(
            events_of("a<!-- hidden -->b", false),
            vec![
                Event::Characters("a".to_string()),
                Event::Characters("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_comment_record_carries_its_text() {
        let mut scanner = TagScanner::new(b"<!-- note -->", false);
        let tag = scanner.read_tag().unwrap();
        assert_eq!(tag.name(), "!--");
        assert_eq!(tag.attribute("!=="), Some(" note "));
        assert!(scanner.read_tag().is_none());
    }

    #[test]
    fn test_doctype_is_scanned_off() {
        assert_eq!(
            shape_of("<!DOCTYPE html><p>x</p>", false),
            vec!["p", "#x", "/p"]
        );
    }

    #[test]
    fn test_unterminated_tag_degrades_to_text() {
        assert_eq!(
            events_of("before <a href=", false),
            vec![Event::Characters("before ".to_string())]
        );
    }

    #[test]
    fn test_unterminated_tag_without_text_is_silent() {
        assert_eq!(events_of("<a href=", false), vec![]);
    }

    #[test]
    fn test_duplicate_attributes_preserved_in_order() {
        let mut scanner = TagScanner::new(b"<p class=a class=b>", false);
        let tag = scanner.read_tag().unwrap();
        assert_eq!(
            tag.attributes(),
            &[
                ("class".to_string(), "a".to_string()),
                ("class".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn test_markup_paragraph() {
        assert_eq!(shape_of("hello", true), vec!["p", "#hello", "/p"]);
    }

    #[test]
    fn test_markup_list_nesting() {
        assert_eq!(
            shape_of("* a\n* b\n** c\n* d", true),
            vec![
                "ul", "li", "#a", "/li", "li", "#b", "ul", "li", "#c", "/li", "/ul", "/li", "li",
                "#d", "/li", "/ul",
            ]
        );
    }

    #[test]
    fn test_markup_emphasis_and_strong() {
        assert_eq!(
            shape_of("*word*", true),
            vec!["p", "em", "#word", "/em", "/p"]
        );
        assert_eq!(
            shape_of("**word**", true),
            vec!["p", "strong", "#word", "/strong", "/p"]
        );
        assert_eq!(shape_of("*word", true), vec!["p", "#*word", "/p"]);
    }

    #[test]
    fn test_markup_horizontal_rule_closes_block() {
        assert_eq!(
            shape_of("intro\n----", true),
            vec!["p", "#intro", "/p", "hr", "/hr"]
        );
    }

    #[test]
    fn test_markup_quoted_link() {
        let events = events_of("\"Text\":http://example.com/page. Next.", true);
        assert_eq!(
            events,
            vec![
                Event::Start("p".to_string(), vec![]),
                Event::Start(
                    "a".to_string(),
                    vec![("href".to_string(), "http://example.com/page".to_string())]
                ),
                Event::Characters("Text".to_string()),
                Event::End("a".to_string()),
                Event::Characters(". Next. ".to_string()),
                Event::End("p".to_string()),
            ]
        );
    }

    #[test]
    fn test_smart_punctuation_normalizes() {
        assert_eq!(
            events_of("\u{201C}quoted\u{201D} and\u{A0}spaced\u{2026}", false),
            vec![Event::Characters("\"quoted\" and spaced...".to_string())]
        );
    }
}
