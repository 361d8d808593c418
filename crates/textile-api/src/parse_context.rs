/// The lexical mode the classifier and scanner are currently in.
///
/// Exactly one mode is active at any time; it decides which bytes end the
/// current word, field, or tag.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum FieldType {
    /// Plain text between tags.
    #[default]
    Text,

    /// The interior of a `<!-- -->` comment.
    Comment,

    /// The declaration guts following `<!DOCTYPE`.
    Doctype,

    /// The name portion of a tag, between `<` and the first whitespace.
    TagName,

    /// An attribute name, up to `=`, whitespace, or the closing `>`.
    AttributeName,

    /// An attribute value, quoted or bare.
    AttributeValue,
}

impl FieldType {
    /// Whether this mode sits between a tag opener and its closing `>`.
    ///
    /// Whitespace ends both the word and the field in these modes, unless
    /// a quote is open.
    pub(crate) fn is_tag_interior(self) -> bool {
        matches!(
            self,
            FieldType::TagName | FieldType::AttributeName | FieldType::AttributeValue
        )
    }
}

/// In-progress character reference decoding.
///
/// `&` begins accumulation; a `#` immediately after switches to the decimal
/// code point form. A `;` completes the reference, whitespace aborts it as
/// a lonely ampersand, and a `<` discards it outright.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub(crate) enum EntityState {
    #[default]
    Idle,

    /// An `&` was seen; the next byte decides named vs. numeric mode.
    Begun,

    /// Accumulating a mnemonic, e.g. the `am` of `&amp;`.
    Named { name: Vec<u8> },

    /// Accumulating a decimal code point, e.g. the `38` of `&#38;`.
    ///
    /// A non-digit or an over-long run poisons the value so that the
    /// reference decodes as unrecognized.
    Numeric { value: u32, digits: u8 },
}

impl EntityState {
    pub(crate) fn is_active(&self) -> bool {
        EntityState::Idle != *self
    }
}

/// The current and previous line's leading list-marker runs.
///
/// Nesting changes are detected by diffing the two strings position by
/// position; `*` is an unordered level, `#` an ordered level, and `;` a
/// definition level.
#[derive(Debug, Default)]
pub(crate) struct ListNesting {
    pub(crate) current: Vec<u8>,
    pub(crate) previous: Vec<u8>,
}

/// Which half of a definition-list entry is currently open.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub(crate) enum DefinitionPart {
    #[default]
    None,
    Term,
    Description,
}

/// Block-level bookkeeping for the line rewriter.
#[derive(Debug)]
pub(crate) struct BlockState {
    /// Tag name of the block element currently open, e.g. `p` or `h2`.
    pub(crate) open_block: Option<Vec<u8>>,

    /// The block tag the next paragraph opens with.
    ///
    /// `p` unless a sticky modifier such as `h2..` changed it.
    pub(crate) next_block: Vec<u8>,

    /// Which half of a `<dt>`/`<dd>` pair is open in the innermost
    /// definition list.
    pub(crate) definition: DefinitionPart,

    /// Whether a `<blockquote>` wrapper is open.
    pub(crate) blockquote_open: bool,

    pub(crate) last_line_blank: bool,
    pub(crate) last_line_raw_html: bool,
}

impl Default for BlockState {
    fn default() -> Self {
        Self {
            open_block: None,
            next_block: b"p".to_vec(),
            definition: DefinitionPart::None,
            blockquote_open: false,
            // The first line of a document behaves as if it followed a
            // blank line, so that it opens its own paragraph.
            last_line_blank: true,
            last_line_raw_html: false,
        }
    }
}

/// Mutable state shared by the character classifier and the tag scanner.
///
/// One context belongs to exactly one scanner for exactly one document.
/// There is no global instance; callers thread it by reference.
pub struct ParseContext {
    pub field_type: FieldType,

    /// True only while inside a quoted attribute value or doctype literal.
    pub quoted: bool,

    /// The two most recently classified bytes, most recent first.
    ///
    /// Comment terminators are recognized by finding `--` here when a `>`
    /// arrives.
    pub(crate) last_char_1: u8,
    pub(crate) last_char_2: u8,

    /// The token currently being accumulated.
    pub(crate) word: Vec<u8>,

    /// The field currently being accumulated; words are folded in as each
    /// completes.
    pub(crate) field: Vec<u8>,

    pub(crate) entity: EntityState,
    pub(crate) list: ListNesting,
    pub(crate) block: BlockState,

    /// Whether lines pass through the lightweight-markup rewriter before
    /// scanning.
    pub markup_mode: bool,

    /// Whether `&...;` references decode while scanning text.
    pub translate_entities: bool,

    /// True once the input is exhausted; every classification afterwards
    /// ends the word, the field, and the tag.
    pub at_end: bool,
}

impl ParseContext {
    pub fn new(markup_mode: bool) -> Self {
        let mut ctx = Self {
            field_type: FieldType::Text,
            quoted: false,
            last_char_1: 0,
            last_char_2: 0,
            word: Vec::new(),
            field: Vec::new(),
            entity: EntityState::Idle,
            list: ListNesting::default(),
            block: BlockState::default(),
            markup_mode,
            translate_entities: true,
            at_end: false,
        };
        ctx.startup();
        ctx
    }

    /// Resets every piece of scan state to its line-one value.
    ///
    /// Runs once when the context is built. The scanner owns its context
    /// and its input, so there is no way to aim a used context at a second
    /// document without constructing a new one.
    pub fn startup(&mut self) {
        self.field_type = FieldType::Text;
        self.quoted = false;
        self.last_char_1 = 0;
        self.last_char_2 = 0;
        self.word.clear();
        self.field.clear();
        self.entity = EntityState::Idle;
        self.list = ListNesting::default();
        self.block = BlockState::default();
        self.at_end = false;
    }
}
