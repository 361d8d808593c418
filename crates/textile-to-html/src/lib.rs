use textile_api::event_sink::EventSink;
use textile_api::tag_name;
use textile_api::tag_scanner::TagScanner;

/// Serializes the scanner's event stream back into an HTML string.
///
/// Text and attribute values are escaped on the way out, so a decoded
/// `&` re-emerges as `&amp;`. Trailing flow spaces are dropped where a
/// non-inline tag begins or ends, since rendered output collapses them
/// anyway and the rewriter leaves one behind at every line break.
pub struct HtmlRenderer {
    html: String,

    /// A self-contained opener whose matching end event is still owed.
    pending_void: Option<String>,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self {
            html: String::new(),
            pending_void: None,
        }
    }

    pub fn into_html(self) -> String {
        self.html
    }

    fn trim_flow_space(&mut self) {
        while self.html.ends_with(' ') {
            self.html.pop();
        }
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Tags whose opening edge never follows flowing text.
///
/// An image or anchor opener sits mid-sentence and keeps the space before
/// it; these do not.
fn opens_a_block(name: &str) -> bool {
    tag_name::is_block(name.as_bytes())
        || tag_name::is_list(name.as_bytes())
        || matches!(name, "li" | "dt" | "dd" | "blockquote" | "hr")
}

impl EventSink for HtmlRenderer {
    fn start_element(&mut self, tag_name_text: &str, attributes: &[(String, String)]) {
        if opens_a_block(tag_name_text) {
            self.trim_flow_space();
        }

        self.html.push('<');
        self.html.push_str(tag_name_text);

        for (name, value) in attributes {
            self.html.push(' ');
            self.html.push_str(name);
            if !value.is_empty() {
                self.html.push_str("=\"");
                let encoded = entities::encode_attribute(value.as_bytes());
                self.html.push_str(&String::from_utf8_lossy(&encoded));
                self.html.push('"');
            }
        }

        if tag_name::is_self_contained(tag_name_text.as_bytes()) {
            self.html.push_str(" />");
            self.pending_void = Some(tag_name_text.to_string());
        } else {
            self.html.push('>');
        }
    }

    fn end_element(&mut self, tag_name_text: &str) {
        // The opener already closed itself.
        if self.pending_void.as_deref() == Some(tag_name_text) {
            self.pending_void = None;
            return;
        }

        if !tag_name::is_inline(tag_name_text.as_bytes()) {
            self.trim_flow_space();
        }

        self.html.push_str("</");
        self.html.push_str(tag_name_text);
        self.html.push('>');
    }

    fn characters(&mut self, text: &str) {
        let encoded = entities::encode_text(text.as_bytes());
        self.html.push_str(&String::from_utf8_lossy(&encoded));
    }
}

/// Converts lightweight markup into an HTML string.
pub fn convert(markup: &str) -> String {
    let mut renderer = HtmlRenderer::new();
    TagScanner::new(markup.as_bytes(), true).run(&mut renderer);
    renderer.into_html()
}

/// Re-serializes a document that is already HTML, with no rewriting.
pub fn reemit_html(html: &str) -> String {
    let mut renderer = HtmlRenderer::new();
    TagScanner::new(html.as_bytes(), false).run(&mut renderer);
    renderer.into_html()
}
