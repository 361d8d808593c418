use crate::macros::strcspn;
use crate::parse_context::{DefinitionPart, ParseContext};

/// Open inline-span markers, one slot per marker kind.
///
/// Each slot holds the byte offset of the span's opening delimiter. Every
/// in-place replacement moves or invalidates the open slots through
/// `shift`; a slot that survives to the end of the line was never closed
/// and its delimiter stays in the text as a literal character.
#[derive(Debug, Default)]
struct SpanMarkers {
    /// `[` of a bracketed link.
    bracket: Option<usize>,

    /// The `]` of a `](` boundary inside a bracketed link.
    paren: Option<usize>,

    /// Opening `??` of a citation.
    citation: Option<usize>,

    /// Opening `**` or `__`.
    strong: Option<usize>,

    /// Opening `*` or `_`.
    emphasis: Option<usize>,

    /// Opening `!` of an image.
    image: Option<usize>,

    /// Opening `"` of a quoted link.
    quote: Option<usize>,
}

impl SpanMarkers {
    /// Adjusts every open slot for a replacement of `start..end` whose
    /// length changed by `delta`. Slots inside the replaced span are gone.
    fn shift(&mut self, start: usize, end: usize, delta: isize) {
        for slot in [
            &mut self.bracket,
            &mut self.paren,
            &mut self.citation,
            &mut self.strong,
            &mut self.emphasis,
            &mut self.image,
            &mut self.quote,
        ] {
            if let Some(at) = *slot {
                if at >= end {
                    *slot = Some((at as isize + delta) as usize);
                } else if at >= start {
                    *slot = None;
                }
            }
        }
    }
}

fn splice(
    line: &mut Vec<u8>,
    marks: &mut SpanMarkers,
    start: usize,
    end: usize,
    replacement: &[u8],
) {
    let delta = replacement.len() as isize - (end - start) as isize;
    line.splice(start..end, replacement.iter().copied());
    marks.shift(start, end, delta);
}

/// One left-to-right pass over the line's content, replacing each closed
/// span with its HTML form as the closing delimiter is found.
///
/// `from` is where the content begins; bytes before it are tags the block
/// rules already emitted and are never rescanned.
pub(crate) fn scan(ctx: &mut ParseContext, line: &mut Vec<u8>, from: usize) {
    let mut marks = SpanMarkers::default();
    let in_definition = ctx.list.previous.contains(&b';');
    let mut at = from;

    while at < line.len() {
        match line[at] {
            b'[' => {
                if marks.bracket.is_none() {
                    marks.bracket = Some(at);
                }
                at += 1;
            }

            b']' if marks.bracket.is_some() && at + 1 < line.len() && b'(' == line[at + 1] => {
                marks.paren = Some(at);
                at += 2;
            }

            b')' => {
                if let (Some(text_at), Some(split_at)) = (marks.bracket, marks.paren) {
                    let text = line[text_at + 1..split_at].to_vec();
                    let url = line[split_at + 2..at].to_vec();

                    let mut anchor = Vec::with_capacity(url.len() + text.len() + 15);
                    anchor.extend_from_slice(b"<a href=\"");
                    anchor.extend_from_slice(&url);
                    anchor.extend_from_slice(b"\">");
                    anchor.extend_from_slice(&text);
                    anchor.extend_from_slice(b"</a>");

                    let next = text_at + anchor.len();
                    splice(line, &mut marks, text_at, at + 1, &anchor);
                    at = next;
                } else {
                    at += 1;
                }
            }

            b'?' if at + 1 < line.len() && b'?' == line[at + 1] => {
                if let Some(open_at) = marks.citation {
                    splice(line, &mut marks, at, at + 2, b"</cite>");
                    splice(line, &mut marks, open_at, open_at + 2, b"<cite>");
                    // Past "</cite>", plus the growth from "<cite>".
                    at = at + 7 + 4;
                } else {
                    marks.citation = Some(at);
                    at += 2;
                }
            }

            delim @ (b'*' | b'_') => {
                let doubled = at + 1 < line.len() && delim == line[at + 1];
                if doubled {
                    // A doubled delimiter is strong, never two emphases.
                    if let Some(open_at) = marks.strong {
                        splice(line, &mut marks, at, at + 2, b"</strong>");
                        splice(line, &mut marks, open_at, open_at + 2, b"<strong>");
                        at = at + 9 + 6;
                    } else {
                        marks.strong = Some(at);
                        at += 2;
                    }
                } else if marks.quote.is_some() {
                    // Inside an open quoted link the delimiter is literal.
                    at += 1;
                } else if let Some(open_at) = marks.emphasis {
                    splice(line, &mut marks, at, at + 1, b"</em>");
                    splice(line, &mut marks, open_at, open_at + 1, b"<em>");
                    at = at + 5 + 3;
                } else {
                    marks.emphasis = Some(at);
                    at += 1;
                }
            }

            b'!' => {
                let mut closed = false;
                if let Some(open_at) = marks.image {
                    let span = line[open_at + 1..at].to_vec();
                    if !span.is_empty() && !span.iter().any(|&b| matches!(b, b' ' | b'\t')) {
                        // `!url(title)!` carries a parenthesized title.
                        let (src, title) = if b')' == span[span.len() - 1] {
                            match span.iter().position(|&b| b'(' == b) {
                                Some(paren_at) => (
                                    span[..paren_at].to_vec(),
                                    Some(span[paren_at + 1..span.len() - 1].to_vec()),
                                ),
                                None => (span.clone(), None),
                            }
                        } else {
                            (span.clone(), None)
                        };

                        let mut image = Vec::new();
                        image.extend_from_slice(b"<img src=\"");
                        image.extend_from_slice(&src);
                        image.push(b'"');
                        if let Some(title) = title {
                            image.extend_from_slice(b" title=\"");
                            image.extend_from_slice(&title);
                            image.push(b'"');
                        }
                        image.extend_from_slice(b" />");

                        // A `:url` suffix turns the image into a link.
                        let mut span_end = at + 1;
                        if span_end < line.len() && b':' == line[span_end] {
                            let url_start = span_end + 1;
                            let url_len = strcspn!(line, b' ' | b'\t', url_start);
                            if url_len > 0 {
                                let url = line[url_start..url_start + url_len].to_vec();
                                let mut anchor = Vec::new();
                                anchor.extend_from_slice(b"<a href=\"");
                                anchor.extend_from_slice(&url);
                                anchor.extend_from_slice(b"\">");
                                anchor.extend_from_slice(&image);
                                anchor.extend_from_slice(b"</a>");
                                image = anchor;
                                span_end = url_start + url_len;
                            }
                        }

                        let next = open_at + image.len();
                        splice(line, &mut marks, open_at, span_end, &image);
                        at = next;
                        closed = true;
                    }
                }
                if !closed {
                    // Open, or move a marker whose span could not be an
                    // image, e.g. one containing whitespace.
                    marks.image = Some(at);
                    at += 1;
                }
            }

            b'"' => {
                let mut closed = false;
                if let Some(open_at) = marks.quote {
                    if at + 1 < line.len() && b':' == line[at + 1] {
                        let url_start = at + 2;
                        let mut url_end = url_start + strcspn!(line, b' ' | b'\t', url_start);

                        /*
                         * Trailing prose punctuation belongs to the
                         * sentence, not the URL. A closing parenthesis
                         * stays when the URL contains its opener.
                         */
                        while url_end > url_start {
                            let trailing = line[url_end - 1];
                            let trim = match trailing {
                                b'.' | b',' | b';' | b':' | b'!' | b'?' | b'\'' | b'"' => true,
                                b')' => !line[url_start..url_end].contains(&b'('),
                                _ => false,
                            };
                            if !trim {
                                break;
                            }
                            url_end -= 1;
                        }

                        // Whitespace straight after the colon is no link.
                        if url_end > url_start {
                            let url = line[url_start..url_end].to_vec();
                            let text = line[open_at + 1..at].to_vec();

                            let mut anchor = Vec::new();
                            anchor.extend_from_slice(b"<a href=\"");
                            anchor.extend_from_slice(&url);
                            anchor.extend_from_slice(b"\">");
                            anchor.extend_from_slice(&text);
                            anchor.extend_from_slice(b"</a>");

                            let next = open_at + anchor.len();
                            splice(line, &mut marks, open_at, url_end, &anchor);
                            at = next;
                            closed = true;
                        }
                    }
                }
                if !closed {
                    marks.quote = Some(at);
                    at += 1;
                }
            }

            marker @ (b';' | b':')
                if in_definition
                    && at > from
                    && matches!(line[at - 1], b' ' | b'\t')
                    && at + 1 < line.len()
                    && matches!(line[at + 1], b' ' | b'\t') =>
            {
                if b':' == marker {
                    if DefinitionPart::Term == ctx.block.definition {
                        splice(line, &mut marks, at - 1, at + 2, b"</dt><dd>");
                        ctx.block.definition = DefinitionPart::Description;
                        at = at - 1 + 9;
                    } else {
                        at += 1;
                    }
                } else {
                    let replacement: &[u8] = match ctx.block.definition {
                        DefinitionPart::Term => b"</dt><dt>",
                        DefinitionPart::Description => b"</dd><dt>",
                        DefinitionPart::None => b"<dt>",
                    };
                    let next = at - 1 + replacement.len();
                    splice(line, &mut marks, at - 1, at + 2, replacement);
                    ctx.block.definition = DefinitionPart::Term;
                    at = next;
                }
            }

            _ => at += 1,
        }
    }
}
