//! Decodes a realistic search-form query string and echoes it back in each
//! list format.
//!
//! Run with
//!
//! ```bash
//! cargo run -p qsmodem --example search_form
//! ```

use qsmodem::{DecodeOptions, EncodeOptions, ListFormat, Value, decode, encode};

fn main() {
    let raw = "q=rust%20codecs&filters[lang][]=en&filters[lang][]=de&page[size]=25&page[number]=2";

    let decoded = decode(raw, &DecodeOptions::default()).expect("well-formed query string");
    println!("decoded structure:\n{decoded:#?}\n");

    for list_format in [
        ListFormat::Indices,
        ListFormat::Brackets,
        ListFormat::Repeat,
        ListFormat::Comma,
    ] {
        let options = EncodeOptions {
            encode: false,
            list_format: Some(list_format),
            ..Default::default()
        };
        let encoded = encode(&Value::Map(decoded.clone()), &options).expect("acyclic input");
        println!("{list_format:?}: {encoded}");
    }
}
