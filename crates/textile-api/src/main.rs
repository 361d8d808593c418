use std::fs;

use textile_api::tag_scanner::TagScanner;

pub fn main() {
    let markup = fs::read_to_string("./data/sample.textile").expect("Missing input!");

    let mut scanner = TagScanner::new(markup.as_bytes(), true);
    let mut count_markup = 0u32;
    while scanner.read_tag().is_some() {
        count_markup += 1;
    }

    let mut scanner = TagScanner::new(markup.as_bytes(), false);
    let mut count_raw = 0u32;
    while scanner.read_tag().is_some() {
        count_raw += 1;
    }

    println!("Markup mode produced {count_markup} records!");
    println!("Raw mode produced {count_raw} records!");
}
