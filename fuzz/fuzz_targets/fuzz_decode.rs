#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use qsmodem::{Charset, DecodeOptions, Duplicates, EncodeOptions, Value, decode, encode};

#[derive(Arbitrary, Debug)]
struct FuzzCase {
    input: String,
    depth: u8,
    list_limit: i8,
    parameter_limit: u16,
    parse_lists: bool,
    allow_dots: bool,
    comma: bool,
    latin1: bool,
    charset_sentinel: bool,
    interpret_numeric_entities: bool,
    strict_null_handling: bool,
    duplicates_last: bool,
}

fuzz_target!(|case: FuzzCase| {
    let options = DecodeOptions {
        depth: usize::from(case.depth % 8),
        list_limit: isize::from(case.list_limit),
        parameter_limit: usize::from(case.parameter_limit),
        parse_lists: case.parse_lists,
        allow_dots: Some(case.allow_dots),
        comma: case.comma,
        charset: if case.latin1 {
            Charset::Latin1
        } else {
            Charset::Utf8
        },
        charset_sentinel: case.charset_sentinel,
        interpret_numeric_entities: case.interpret_numeric_entities,
        strict_null_handling: case.strict_null_handling,
        duplicates: if case.duplicates_last {
            Duplicates::Last
        } else {
            Duplicates::Combine
        },
        ..Default::default()
    };

    // Decoding must never panic, and whatever it produces must re-encode.
    let Ok(decoded) = decode(case.input.as_str(), &options) else {
        return;
    };
    let _ = encode(&Value::Map(decoded), &EncodeOptions::default());
});
