use crate::macros::strspn;
use crate::parse_context::{DefinitionPart, ParseContext};
use crate::str_fns::{strpos, substr};

mod inline_spans;

/// Rewrites one raw input line into a line of literal HTML, in place.
///
/// Runs before the character-level scan whenever markup mode is on. The
/// rules try the line in a fixed order: blank line, horizontal rule, block
/// modifier, list markers, link alias, paragraph continuation. Whichever
/// rule claims the line decides which closing and opening tags are spliced
/// in around its content; the inline-span scan then runs over the content
/// that remains.
pub(crate) fn rewrite_line(ctx: &mut ParseContext, line: &mut Vec<u8>) {
    // Locate the trimmed extent before touching the buffer.
    let first = strspn!(line, b' ' | b'\t', 0);

    // A blank line closes the open block, once.
    if first == line.len() {
        let mut out = Vec::new();
        if !ctx.block.last_line_blank {
            if ctx.block.next_block == b"bq" {
                // A sticky blockquote keeps quoting; only the inner
                // paragraph closes here.
                close_paragraph(ctx, &mut out);
            } else {
                close_block(ctx, &mut out);
            }
        }
        ctx.block.last_line_blank = true;
        *line = out;
        return;
    }

    let mut trimmed_end = line.len();
    while trimmed_end > first && matches!(line[trimmed_end - 1], b' ' | b'\t') {
        trimmed_end -= 1;
    }
    line.truncate(trimmed_end);

    if is_horizontal_rule(&line[first..]) {
        let mut out = Vec::new();
        close_lists(ctx, &mut out);
        close_block(ctx, &mut out);
        out.extend_from_slice(b"<hr />");
        ctx.block.last_line_blank = true;
        ctx.block.last_line_raw_html = false;
        *line = out;
        return;
    }

    if let Some(modifier) = parse_block_modifier(&line[first..]) {
        let mut out = Vec::new();
        close_lists(ctx, &mut out);
        close_block(ctx, &mut out);

        if b"bq" == modifier.tag {
            out.extend_from_slice(b"<blockquote><p>");
            ctx.block.blockquote_open = true;
            ctx.block.open_block = Some(b"p".to_vec());
        } else {
            out.push(b'<');
            out.extend_from_slice(modifier.tag);
            out.push(b'>');
            ctx.block.open_block = Some(modifier.tag.to_vec());
        }
        ctx.block.next_block = if modifier.sticky {
            modifier.tag.to_vec()
        } else {
            b"p".to_vec()
        };
        ctx.block.last_line_blank = false;
        ctx.block.last_line_raw_html = false;

        let scan_from = out.len();
        out.extend_from_slice(&line[first + modifier.consumed..]);
        inline_spans::scan(ctx, &mut out, scan_from);
        *line = out;
        return;
    }

    /*
     * A leading run of `*`, `#`, or `;` is a list marker only when the run
     * is followed by whitespace or `(`. Anything else, e.g. `*foo(bar)`,
     * reads as inline emphasis instead.
     */
    let marker_len = strspn!(line, b'*' | b'#' | b';', first);
    let marker_end = first + marker_len;
    if marker_len > 0 && marker_end < line.len() && matches!(line[marker_end], b' ' | b'\t' | b'(')
    {
        let mut out = Vec::new();
        if ctx.list.previous.is_empty() {
            // A list interrupting an open paragraph closes it first.
            close_block(ctx, &mut out);
        }

        ctx.list.current = line[first..marker_end].to_vec();
        reconcile_lists(ctx, &mut out);
        ctx.list.previous = std::mem::take(&mut ctx.list.current);

        ctx.block.last_line_blank = false;
        ctx.block.last_line_raw_html = false;

        let content_start = marker_end + strspn!(line, b' ' | b'\t', marker_end);
        let scan_from = out.len();
        out.extend_from_slice(&line[content_start..]);
        inline_spans::scan(ctx, &mut out, scan_from);
        *line = out;
        return;
    }

    let mut out = Vec::new();
    close_lists(ctx, &mut out);

    // A line of `[name]url` declares a link alias.
    if b'[' == line[first] {
        if let Some(close_at) = strpos(line, b"]", first) {
            if line.len() - (close_at + 1) >= 4 {
                out.extend_from_slice(b"<a alias=\"");
                out.extend_from_slice(substr(line, first + 1, close_at - (first + 1)));
                out.extend_from_slice(b"\" href=\"");
                out.extend_from_slice(substr(line, close_at + 1, line.len() - (close_at + 1)));
                out.extend_from_slice(b"\">\xC2\xB7</a>");
                ctx.block.last_line_blank = false;
                ctx.block.last_line_raw_html = true;
                *line = out;
                return;
            }
        }
    }

    // A line that is already HTML flows through untouched.
    if b'<' == line[first] {
        out.extend_from_slice(&line[first..]);
        ctx.block.last_line_blank = false;
        ctx.block.last_line_raw_html = true;
        *line = out;
        return;
    }

    if ctx.block.last_line_blank {
        open_pending_block(ctx, &mut out);
    } else if ctx.block.last_line_raw_html {
        // Raw HTML supplies its own breaks; continue the flow as-is.
    } else {
        out.extend_from_slice(b"<br />");
    }
    ctx.block.last_line_blank = false;
    ctx.block.last_line_raw_html = false;

    let scan_from = out.len();
    out.extend_from_slice(&line[first..]);
    inline_spans::scan(ctx, &mut out, scan_from);
    *line = out;
}

/// Emits every closing tag still owed once the input is exhausted.
pub(crate) fn finish(ctx: &mut ParseContext) -> Vec<u8> {
    let mut out = Vec::new();
    close_lists(ctx, &mut out);
    close_block(ctx, &mut out);
    out
}

/// Whether a trimmed line is nothing but three or more repetitions of one
/// rule character, whitespace permitted between them.
fn is_horizontal_rule(region: &[u8]) -> bool {
    let rule_char = region[0];
    if !matches!(rule_char, b'-' | b'_' | b'*') {
        return false;
    }

    let mut count = 0usize;
    for &b in region {
        if b == rule_char {
            count += 1;
        } else if !matches!(b, b' ' | b'\t') {
            return false;
        }
    }

    count >= 3
}

struct BlockModifier {
    tag: &'static [u8],
    sticky: bool,
    consumed: usize,
}

/// Parses a `p. `, `bq. `, or `h1. `–`h6. ` prefix; two periods make the
/// modifier sticky for the lines that follow.
fn parse_block_modifier(region: &[u8]) -> Option<BlockModifier> {
    let tag: &'static [u8] = if region.starts_with(b"bq") {
        b"bq"
    } else if region.len() > 1 && b'h' == region[0] && matches!(region[1], b'1'..=b'6') {
        match region[1] {
            b'1' => b"h1",
            b'2' => b"h2",
            b'3' => b"h3",
            b'4' => b"h4",
            b'5' => b"h5",
            _ => b"h6",
        }
    } else if region.starts_with(b"p") {
        b"p"
    } else {
        return None;
    };

    let dots = strspn!(region, b'.', tag.len());
    if !matches!(dots, 1 | 2) {
        return None;
    }

    let after = tag.len() + dots;
    if after >= region.len() || b' ' != region[after] {
        return None;
    }

    Some(BlockModifier {
        tag,
        sticky: 2 == dots,
        consumed: after + 1,
    })
}

/// Emits the closing tag for the open block element, if any.
fn close_paragraph(ctx: &mut ParseContext, out: &mut Vec<u8>) {
    if let Some(tag) = ctx.block.open_block.take() {
        out.extend_from_slice(b"</");
        out.extend_from_slice(&tag);
        out.push(b'>');
    }
}

/// Closes the open block element and any blockquote wrapper around it.
fn close_block(ctx: &mut ParseContext, out: &mut Vec<u8>) {
    close_paragraph(ctx, out);
    if ctx.block.blockquote_open {
        out.extend_from_slice(b"</blockquote>");
        ctx.block.blockquote_open = false;
    }
}

/// Opens the block the next paragraph belongs in: `p` by default, or
/// whatever a sticky modifier left pending.
fn open_pending_block(ctx: &mut ParseContext, out: &mut Vec<u8>) {
    if ctx.block.next_block == b"bq" {
        if !ctx.block.blockquote_open {
            out.extend_from_slice(b"<blockquote>");
            ctx.block.blockquote_open = true;
        }
        out.extend_from_slice(b"<p>");
        ctx.block.open_block = Some(b"p".to_vec());
    } else {
        out.push(b'<');
        out.extend_from_slice(&ctx.block.next_block);
        out.push(b'>');
        ctx.block.open_block = Some(ctx.block.next_block.clone());
    }
}

fn close_lists(ctx: &mut ParseContext, out: &mut Vec<u8>) {
    if ctx.list.previous.is_empty() {
        return;
    }
    ctx.list.current.clear();
    reconcile_lists(ctx, out);
    ctx.list.previous.clear();
}

/// Diffs the previous and current marker strings position by position,
/// closing and opening list levels until the two agree.
fn reconcile_lists(ctx: &mut ParseContext, out: &mut Vec<u8>) {
    let prev = ctx.list.previous.clone();
    let cur = ctx.list.current.clone();

    let mut common = 0;
    while common < prev.len() && common < cur.len() && prev[common] == cur[common] {
        common += 1;
    }

    // Deeper levels close first.
    for level in (common..prev.len()).rev() {
        close_list_level(ctx, prev[level], out);
    }

    if cur.len() > common {
        for level in common..cur.len() {
            open_list_level(ctx, cur[level], out);
        }
    } else if !cur.is_empty() {
        continue_list_level(ctx, cur[cur.len() - 1], out);
    }
}

fn open_list_level(ctx: &mut ParseContext, marker: u8, out: &mut Vec<u8>) {
    match marker {
        b'*' => out.extend_from_slice(b"<ul><li>"),
        b'#' => out.extend_from_slice(b"<ol><li>"),
        b';' => {
            out.extend_from_slice(b"<dl><dt>");
            ctx.block.definition = DefinitionPart::Term;
        }
        _ => unreachable!("list markers are limited to `*`, `#`, and `;`"),
    }
}

fn close_list_level(ctx: &mut ParseContext, marker: u8, out: &mut Vec<u8>) {
    match marker {
        b'*' => out.extend_from_slice(b"</li></ul>"),
        b'#' => out.extend_from_slice(b"</li></ol>"),
        b';' => {
            match ctx.block.definition {
                DefinitionPart::Term => out.extend_from_slice(b"</dt>"),
                DefinitionPart::Description => out.extend_from_slice(b"</dd>"),
                DefinitionPart::None => {}
            }
            ctx.block.definition = DefinitionPart::None;
            out.extend_from_slice(b"</dl>");
        }
        _ => unreachable!("list markers are limited to `*`, `#`, and `;`"),
    }
}

fn continue_list_level(ctx: &mut ParseContext, marker: u8, out: &mut Vec<u8>) {
    match marker {
        b'*' | b'#' => out.extend_from_slice(b"</li><li>"),
        b';' => {
            match ctx.block.definition {
                DefinitionPart::Term => out.extend_from_slice(b"</dt><dt>"),
                DefinitionPart::Description => out.extend_from_slice(b"</dd><dt>"),
                DefinitionPart::None => out.extend_from_slice(b"<dt>"),
            }
            ctx.block.definition = DefinitionPart::Term;
        }
        _ => unreachable!("list markers are limited to `*`, `#`, and `;`"),
    }
}
