/// Tag classification tables for the small vocabulary the rewriter emits.
///
/// Names arrive here already lowercased by the scanner.

/// Whether a tag contains no content and closes itself, e.g. `<br />`.
pub fn is_self_contained(name: &[u8]) -> bool {
    matches!(name, b"br" | b"img" | b"hr")
}

/// Whether a tag opens a block of body text.
pub fn is_block(name: &[u8]) -> bool {
    matches!(name, b"p" | b"h1" | b"h2" | b"h3" | b"h4" | b"h5" | b"h6")
}

/// Whether a tag flows with the text around it.
///
/// Serializers use this to avoid introducing line breaks where they would
/// add whitespace to rendered output. The empty name is a text fragment
/// and flows by definition.
pub fn is_inline(name: &[u8]) -> bool {
    name.is_empty() || matches!(name, b"a" | b"i" | b"b" | b"cite" | b"em" | b"br")
}

/// Whether a tag opens or closes one of the three list forms.
pub fn is_list(name: &[u8]) -> bool {
    matches!(name, b"ol" | b"ul" | b"dl")
}

/// The heading level for `h1` through `h6`, if the name is a heading.
pub fn heading_level(name: &[u8]) -> Option<u8> {
    if 2 == name.len() && b'h' == name[0] && matches!(name[1], b'1'..=b'6') {
        Some(name[1] - b'0')
    } else {
        None
    }
}
