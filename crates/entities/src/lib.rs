use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

/// A single character produced by decoding an entity reference.
///
/// The scanner cares not only about which byte a reference produced but also
/// whether that byte counts as whitespace: `&nbsp;` decodes to a space that
/// still separates words, and so does every unrecognized reference.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct DecodedEntity {
    pub byte: u8,
    pub is_whitespace: bool,
}

impl DecodedEntity {
    const fn literal(byte: u8) -> Self {
        Self {
            byte,
            is_whitespace: false,
        }
    }

    const fn space() -> Self {
        Self {
            byte: b' ',
            is_whitespace: true,
        }
    }
}

lazy_static! {
    /*
     * The named references this table recognizes.
     *
     * This is intentionally not the full HTML5 reference table. The markup
     * engine only ever emits and decodes the five mnemonics below; anything
     * else found in a document decodes to a plain space.
     */
    static ref NAMED_REFERENCES: FxHashMap<&'static [u8], DecodedEntity> = {
        let mut table: FxHashMap<&'static [u8], DecodedEntity> = FxHashMap::default();
        table.insert(b"amp".as_slice(), DecodedEntity::literal(b'&'));
        table.insert(b"gt".as_slice(), DecodedEntity::literal(b'>'));
        table.insert(b"lt".as_slice(), DecodedEntity::literal(b'<'));
        table.insert(b"quot".as_slice(), DecodedEntity::literal(b'"'));
        table.insert(b"nbsp".as_slice(), DecodedEntity::space());
        table
    };
}

/// Decodes a named reference, e.g. the `amp` in `&amp;`.
///
/// Unrecognized names decode to a single space; a caller never has to deal
/// with a reference that failed to decode.
pub fn decode_named(name: &[u8]) -> DecodedEntity {
    NAMED_REFERENCES
        .get(name)
        .copied()
        .unwrap_or(DecodedEntity::space())
}

/// Decodes a decimal numeric reference, e.g. the `38` in `&#38;`.
///
/// Only the code points with a named counterpart are mapped; every other
/// value decodes to a single space, including values a larger table would
/// consider printable.
pub fn decode_numeric(codepoint: u32) -> DecodedEntity {
    match codepoint {
        38 => DecodedEntity::literal(b'&'),
        62 => DecodedEntity::literal(b'>'),
        60 => DecodedEntity::literal(b'<'),
        34 => DecodedEntity::literal(b'"'),
        160 => DecodedEntity::space(),
        _ => DecodedEntity::space(),
    }
}

/// Escapes text content for embedding between tags.
///
/// The inverse of the decode table, restricted to the characters that are
/// syntax inside a text node: `&`, `<`, and `>`.
pub fn encode_text(input: &[u8]) -> Box<[u8]> {
    encode_into(input, false)
}

/// Escapes an attribute value for embedding inside a double-quoted attribute.
///
/// Escapes everything `encode_text` does plus the double quote.
pub fn encode_attribute(input: &[u8]) -> Box<[u8]> {
    encode_into(input, true)
}

fn encode_into(input: &[u8], escape_quotes: bool) -> Box<[u8]> {
    let mut encoded: Vec<u8> = Vec::with_capacity(input.len());
    let end = input.len();
    let mut was_at = 0;
    let mut at = 0;

    while at < end {
        let next_escapable_at = match memchr::memchr3(b'&', b'<', b'>', &input[at..]) {
            Some(pos) => at + pos,
            None => break,
        };

        at = next_escapable_at;
        encoded.extend_from_slice(&input[was_at..at]);
        match input[at] {
            b'&' => encoded.extend_from_slice(b"&amp;"),
            b'<' => encoded.extend_from_slice(b"&lt;"),
            b'>' => encoded.extend_from_slice(b"&gt;"),
            _ => unreachable!("memchr3 only stops on the three escapable bytes"),
        }
        at += 1;
        was_at = at;
    }

    if was_at < end {
        encoded.extend_from_slice(&input[was_at..]);
    }

    if escape_quotes {
        let mut quoted: Vec<u8> = Vec::with_capacity(encoded.len());
        for &b in &encoded {
            if b'"' == b {
                quoted.extend_from_slice(b"&quot;");
            } else {
                quoted.push(b);
            }
        }
        return quoted.into_boxed_slice();
    }

    encoded.into_boxed_slice()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_named_references() {
        assert_eq!(decode_named(b"amp"), DecodedEntity::literal(b'&'));
        assert_eq!(decode_named(b"gt"), DecodedEntity::literal(b'>'));
        assert_eq!(decode_named(b"lt"), DecodedEntity::literal(b'<'));
        assert_eq!(decode_named(b"quot"), DecodedEntity::literal(b'"'));
        assert_eq!(decode_named(b"nbsp"), DecodedEntity::space());
    }

    #[test]
    fn test_unrecognized_named_reference_becomes_space() {
        let decoded = decode_named(b"notanentity");
        assert_eq!(decoded.byte, b' ');
        assert!(decoded.is_whitespace);
    }

    #[test]
    fn test_numeric_references_mirror_the_named_table() {
        assert_eq!(decode_numeric(38), decode_named(b"amp"));
        assert_eq!(decode_numeric(62), decode_named(b"gt"));
        assert_eq!(decode_numeric(60), decode_named(b"lt"));
        assert_eq!(decode_numeric(34), decode_named(b"quot"));
        assert_eq!(decode_numeric(160), decode_named(b"nbsp"));
    }

    #[test]
    fn test_unmapped_numeric_reference_becomes_space() {
        assert_eq!(decode_numeric(0), DecodedEntity::space());
        assert_eq!(decode_numeric(65), DecodedEntity::space());
        assert_eq!(decode_numeric(12345678), DecodedEntity::space());
    }

    #[test]
    fn test_encode_text() {
        assert_eq!(encode_text(b"A & B").as_ref(), b"A &amp; B");
        assert_eq!(encode_text(b"1 < 2 > 0").as_ref(), b"1 &lt; 2 &gt; 0");
        assert_eq!(encode_text(b"plain text").as_ref(), b"plain text");
        assert_eq!(encode_text(b"").as_ref(), b"");
        assert_eq!(encode_text(b"&&").as_ref(), b"&amp;&amp;");
    }

    #[test]
    fn test_encode_text_leaves_quotes_alone() {
        assert_eq!(encode_text(b"say \"hi\"").as_ref(), b"say \"hi\"");
    }

    #[test]
    fn test_encode_attribute() {
        assert_eq!(
            encode_attribute(b"say \"hi\" & <wave>").as_ref(),
            b"say &quot;hi&quot; &amp; &lt;wave&gt;".as_slice()
        );
    }
}
