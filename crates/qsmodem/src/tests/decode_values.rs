use pretty_assertions::assert_eq;
use rstest::rstest;
use std::sync::Arc;

use crate::{
    ComponentKind, DecodeInput, DecodeOptions, Delimiter, Duplicates, Map, Value, decode, loads,
    tests::utils::{qmap, s, vlist, vmap},
};

fn defaults() -> DecodeOptions {
    DecodeOptions::default()
}

#[test]
fn simple_pair() {
    assert_eq!(decode("a=b", &defaults()).unwrap(), qmap! {"a" => s("b")});
}

#[test]
fn empty_input_decodes_to_an_empty_map() {
    assert_eq!(decode("", &defaults()).unwrap(), Map::new());
}

#[test]
fn nested_mapping() {
    assert_eq!(
        decode("foo[bar][baz]=foobarbaz", &defaults()).unwrap(),
        qmap! {"foo" => vmap! {"bar" => vmap! {"baz" => s("foobarbaz")}}}
    );
}

#[test]
fn missing_equals_decodes_to_empty_string() {
    assert_eq!(
        decode("a&b=c", &defaults()).unwrap(),
        qmap! {"a" => s(""), "b" => s("c")}
    );
}

#[test]
fn strict_null_handling_distinguishes_bare_keys() {
    let options = DecodeOptions {
        strict_null_handling: true,
        ..defaults()
    };
    assert_eq!(
        decode("a&b=", &options).unwrap(),
        qmap! {"a" => Value::Null, "b" => s("")}
    );
}

#[test]
fn explicit_lists() {
    assert_eq!(
        decode("a[]=b&a[]=c", &defaults()).unwrap(),
        qmap! {"a" => vlist![s("b"), s("c")]}
    );
    assert_eq!(
        decode("a[0]=b&a[1]=c", &defaults()).unwrap(),
        qmap! {"a" => vlist![s("b"), s("c")]}
    );
}

#[test]
fn sparse_indices_compact_in_order() {
    assert_eq!(
        decode("a[1]=b&a[15]=c", &defaults()).unwrap(),
        qmap! {"a" => vlist![s("b"), s("c")]}
    );
}

#[test]
fn indices_above_the_limit_demote_to_a_mapping() {
    assert_eq!(
        decode("a[100]=b", &defaults()).unwrap(),
        qmap! {"a" => vmap! {"100" => s("b")}}
    );
}

#[test]
fn noncanonical_indices_are_mapping_keys() {
    assert_eq!(
        decode("a[01]=b&a[-1]=c", &defaults()).unwrap(),
        qmap! {"a" => vmap! {"01" => s("b"), "-1" => s("c")}}
    );
}

#[test]
fn mixed_notations_coerce_to_a_mapping() {
    assert_eq!(
        decode("a[0]=b&a[x]=c", &defaults()).unwrap(),
        qmap! {"a" => vmap! {"0" => s("b"), "x" => s("c")}}
    );
}

#[test]
fn simple_and_list_values_combine() {
    assert_eq!(
        decode("a=b&a[0]=c", &defaults()).unwrap(),
        qmap! {"a" => vlist![s("b"), s("c")]}
    );
}

#[rstest]
#[case(Duplicates::Combine, vlist![s("b"), s("c")])]
#[case(Duplicates::First, s("b"))]
#[case(Duplicates::Last, s("c"))]
fn duplicate_policies(#[case] duplicates: Duplicates, #[case] expected: Value) {
    let options = DecodeOptions {
        duplicates,
        ..defaults()
    };
    assert_eq!(
        decode("a=b&a=c", &options).unwrap(),
        qmap! {"a" => expected}
    );
}

#[test]
fn comma_splits_values_into_lists() {
    let options = DecodeOptions {
        comma: true,
        ..defaults()
    };
    assert_eq!(
        decode("a=b,c", &options).unwrap(),
        qmap! {"a" => vlist![s("b"), s("c")]}
    );
    // Without the option the comma is just a character.
    assert_eq!(decode("a=b,c", &defaults()).unwrap(), qmap! {"a" => s("b,c")});
}

#[test]
fn comma_values_under_brackets_nest() {
    let options = DecodeOptions {
        comma: true,
        ..defaults()
    };
    assert_eq!(
        decode("a[]=b,c", &options).unwrap(),
        qmap! {"a" => vlist![vlist![s("b"), s("c")]]}
    );
}

#[test]
fn ignore_query_prefix_strips_one_question_mark() {
    let options = DecodeOptions {
        ignore_query_prefix: true,
        ..defaults()
    };
    assert_eq!(decode("?a=b", &options).unwrap(), qmap! {"a" => s("b")});
    assert_eq!(decode("a=b", &options).unwrap(), qmap! {"a" => s("b")});
}

#[test]
fn custom_literal_delimiter() {
    let options = DecodeOptions {
        delimiter: Delimiter::from(";"),
        ..defaults()
    };
    assert_eq!(
        decode("a=b;c=d", &options).unwrap(),
        qmap! {"a" => s("b"), "c" => s("d")}
    );
}

#[test]
fn regex_delimiter() {
    let options = DecodeOptions {
        delimiter: Delimiter::from(regex::Regex::new("[;,]").unwrap()),
        ..defaults()
    };
    assert_eq!(
        decode("a=b;c=d,e=f", &options).unwrap(),
        qmap! {"a" => s("b"), "c" => s("d"), "e" => s("f")}
    );
}

#[test]
fn equals_inside_brackets_stays_in_the_key() {
    assert_eq!(
        decode("a[=]=b", &defaults()).unwrap(),
        qmap! {"a" => vmap! {"=" => s("b")}}
    );
}

#[test]
fn values_keep_extra_equals_signs() {
    assert_eq!(
        decode("a=b=c", &defaults()).unwrap(),
        qmap! {"a" => s("b=c")}
    );
}

#[test]
fn escaped_brackets_decode_like_literal_ones() {
    assert_eq!(
        decode("a%5Bb%5D=c", &defaults()).unwrap(),
        qmap! {"a" => vmap! {"b" => s("c")}}
    );
    assert_eq!(
        decode("a%5bb%5d=c", &defaults()).unwrap(),
        qmap! {"a" => vmap! {"b" => s("c")}}
    );
}

#[test]
fn parse_lists_disabled_keeps_indices_as_keys() {
    let options = DecodeOptions {
        parse_lists: false,
        ..defaults()
    };
    assert_eq!(
        decode("a[0]=b", &options).unwrap(),
        qmap! {"a" => vmap! {"0" => s("b")}}
    );
    assert_eq!(
        decode("a[]=b", &options).unwrap(),
        qmap! {"a" => vmap! {"0" => s("b")}}
    );
}

#[test]
fn allow_empty_lists() {
    let options = DecodeOptions {
        allow_empty_lists: true,
        ..defaults()
    };
    assert_eq!(decode("a[]=", &options).unwrap(), qmap! {"a" => vlist![]});
    // Without the option an empty value is a one-element list.
    assert_eq!(
        decode("a[]=", &defaults()).unwrap(),
        qmap! {"a" => vlist![s("")]}
    );
}

#[test]
fn empty_keys_are_dropped() {
    assert_eq!(decode("=a&b=c", &defaults()).unwrap(), qmap! {"b" => s("c")});
    assert_eq!(
        decode("a=b&&c=d", &defaults()).unwrap(),
        qmap! {"a" => s("b"), "c" => s("d")}
    );
}

#[test]
fn mapping_input_skips_tokenization() {
    let flat = qmap! {"a[b]" => s("c")};
    assert_eq!(
        decode(flat, &defaults()).unwrap(),
        qmap! {"a" => vmap! {"b" => s("c")}}
    );
}

#[test]
fn mapping_input_still_splits_commas() {
    let options = DecodeOptions {
        comma: true,
        ..defaults()
    };
    let flat = qmap! {"a" => s("b,c")};
    assert_eq!(
        decode(flat, &options).unwrap(),
        qmap! {"a" => vlist![s("b"), s("c")]}
    );
}

#[test]
fn custom_decoder_sees_the_component_kind() {
    let options = DecodeOptions {
        decoder: Some(Arc::new(|raw, _, kind| {
            let text = raw.replace("%20", " ");
            match kind {
                ComponentKind::Key => Value::Str(text.to_uppercase()),
                ComponentKind::Value => Value::Str(text),
            }
        })),
        ..defaults()
    };
    assert_eq!(
        decode("a%20b=c%20d", &options).unwrap(),
        qmap! {"A B" => s("c d")}
    );
}

#[test]
fn legacy_decoder_is_a_fallback() {
    let options = DecodeOptions {
        legacy_decoder: Some(Arc::new(|raw, _| Value::Str(format!("legacy:{raw}")))),
        ..defaults()
    };
    assert_eq!(
        decode("a=b", &options).unwrap(),
        qmap! {"legacy:a" => s("legacy:b")}
    );

    let options = DecodeOptions {
        decoder: Some(Arc::new(|raw, _, _| Value::Str(format!("new:{raw}")))),
        legacy_decoder: Some(Arc::new(|raw, _| Value::Str(format!("legacy:{raw}")))),
        ..defaults()
    };
    assert_eq!(
        decode("a=b", &options).unwrap(),
        qmap! {"new:a" => s("new:b")}
    );
}

#[test]
fn non_string_decoder_results_keep_their_type_in_leaves() {
    let options = DecodeOptions {
        decoder: Some(Arc::new(|raw, _, kind| match (raw, kind) {
            ("1", ComponentKind::Value) => Value::Int(1),
            _ => Value::Str(raw.to_owned()),
        })),
        ..defaults()
    };
    assert_eq!(decode("a=1", &options).unwrap(), qmap! {"a" => Value::Int(1)});
}

#[test]
fn loads_is_an_alias() {
    assert_eq!(
        loads(DecodeInput::from("a=b"), &defaults()).unwrap(),
        decode("a=b", &defaults()).unwrap()
    );
}
