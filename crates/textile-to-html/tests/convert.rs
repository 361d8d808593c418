use pretty_assertions::assert_eq;
use textile_to_html::{convert, reemit_html};

#[test]
fn converts_a_paragraph() {
    assert_eq!(convert("Hello world"), "<p>Hello world</p>");
}

#[test]
fn joins_continuation_lines_with_a_break() {
    assert_eq!(
        convert("one\ntwo\n\nthree"),
        "<p>one <br />two</p><p>three</p>"
    );
}

#[test]
fn nests_lists_by_marker_depth() {
    assert_eq!(
        convert("* a\n* b\n** c\n* d"),
        "<ul><li>a</li><li>b<ul><li>c</li></ul></li><li>d</li></ul>"
    );
}

#[test]
fn renders_ordered_lists() {
    assert_eq!(
        convert("# one\n# two"),
        "<ol><li>one</li><li>two</li></ol>"
    );
}

#[test]
fn renders_definition_lists() {
    assert_eq!(
        convert("; cow : a bovine"),
        "<dl><dt>cow</dt><dd>a bovine</dd></dl>"
    );
}

#[test]
fn emphasis_and_strong_are_distinct() {
    assert_eq!(convert("*word*"), "<p><em>word</em></p>");
    assert_eq!(convert("**word**"), "<p><strong>word</strong></p>");
}

#[test]
fn unterminated_emphasis_stays_literal() {
    assert_eq!(convert("*word"), "<p>*word</p>");
}

#[test]
fn quoted_link_excludes_trailing_punctuation() {
    assert_eq!(
        convert("\"Text\":http://example.com/page. Next."),
        "<p><a href=\"http://example.com/page\">Text</a>. Next.</p>"
    );
}

#[test]
fn horizontal_rule_closes_the_open_block() {
    assert_eq!(
        convert("intro\n----\noutro"),
        "<p>intro</p><hr /><p>outro</p>"
    );
}

#[test]
fn headings_via_block_modifiers() {
    assert_eq!(
        convert("h2. Title\n\nBody"),
        "<h2>Title</h2><p>Body</p>"
    );
}

#[test]
fn blockquote_wraps_a_paragraph() {
    assert_eq!(
        convert("bq. stay awhile"),
        "<blockquote><p>stay awhile</p></blockquote>"
    );
}

#[test]
fn citations_become_cite_elements() {
    assert_eq!(
        convert("??The Elements of Style??"),
        "<p><cite>The Elements of Style</cite></p>"
    );
}

#[test]
fn images_keep_their_place_in_the_sentence() {
    assert_eq!(
        convert("before !logo.png! after"),
        "<p>before <img src=\"logo.png\" /> after</p>"
    );
}

#[test]
fn image_titles_carry_over() {
    assert_eq!(
        convert("!logo.png(Our logo)!"),
        "<p><img src=\"logo.png\" title=\"Our logo\" /></p>"
    );
}

#[test]
fn link_alias_lines_become_anchors() {
    assert_eq!(
        convert("[home]http://example.com/x"),
        "<a alias=\"home\" href=\"http://example.com/x\">\u{B7}</a>"
    );
}

#[test]
fn entities_decode_and_re_encode() {
    assert_eq!(convert("Tom &amp; Jerry"), "<p>Tom &amp; Jerry</p>");
}

#[test]
fn comments_disappear_from_output() {
    assert_eq!(convert("a <!-- gone -->b"), "<p>a b</p>");
}

#[test]
fn raw_html_lines_pass_through() {
    assert_eq!(
        convert("<table>\ncell\n</table>"),
        "<table>cell</table>"
    );
}

#[test]
fn reemits_well_formed_html_unchanged() {
    let html = "<div id=\"a\">x <b>y</b></div>";
    assert_eq!(reemit_html(html), html);
}

#[test]
fn reemits_void_tags_in_self_closing_form() {
    assert_eq!(reemit_html("a<br>b"), "a<br />b");
}

#[test]
fn converts_a_mixed_document() {
    let markup = "h1. Notes\n\n\
                  Some *emphasis* and a \"link\":http://x/y.\n\n\
                  * one\n\
                  * two\n\n\
                  bq. So it goes.";
    assert_eq!(
        convert(markup),
        "<h1>Notes</h1>\
         <p>Some <em>emphasis</em> and a <a href=\"http://x/y\">link</a>.</p>\
         <ul><li>one</li><li>two</li></ul>\
         <blockquote><p>So it goes.</p></blockquote>"
    );
}
