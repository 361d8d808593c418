/// Receiver for the scanner's output stream.
///
/// The scanner calls these in source order. A self-contained tag arrives as
/// a matched `start_element`/`end_element` pair with nothing in between;
/// comments and doctype declarations are not forwarded at all.
pub trait EventSink {
    fn start_element(&mut self, tag_name: &str, attributes: &[(String, String)]);
    fn end_element(&mut self, tag_name: &str);
    fn characters(&mut self, text: &str);
}
