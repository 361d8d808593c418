use std::io::{self, Write};

use textile_api::line_source::{slurp, ReaderLineSource};

fn main() -> io::Result<()> {
    // Read markup lines from stdin
    let stdin = io::stdin();
    let mut source = ReaderLineSource::new(stdin.lock());
    let markup = slurp(&mut source);

    let html = textile_to_html::convert(&markup);

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    writer.write_all(html.as_bytes())?;
    writer.write_all(b"\n")
}
