use pretty_assertions::assert_eq;

use crate::{
    DecodeOptions, EncodeError, EncodeOptions, decode, encode,
    tests::utils::{s, vmap},
};

#[test]
fn allow_dots_joins_nested_keys_with_dots() {
    let options = EncodeOptions {
        allow_dots: Some(true),
        encode: false,
        ..Default::default()
    };
    assert_eq!(
        encode(&vmap! {"a" => vmap! {"b" => vmap! {"c" => s("d")}}}, &options).unwrap(),
        "a.b.c=d"
    );
}

#[test]
fn encoded_dot_keys_double_encode() {
    let options = EncodeOptions {
        allow_dots: Some(true),
        encode_dot_in_keys: true,
        ..Default::default()
    };
    assert_eq!(
        encode(
            &vmap! {"name.obj" => vmap! {"first" => s("John")}},
            &options
        )
        .unwrap(),
        "name%252Eobj.first=John"
    );
}

#[test]
fn encode_dot_in_keys_implies_allow_dots() {
    let options = EncodeOptions {
        encode_dot_in_keys: true,
        ..Default::default()
    };
    assert!(options.allow_dots());
    assert_eq!(
        encode(&vmap! {"name.obj" => vmap! {"first" => s("John")}}, &options).unwrap(),
        "name%252Eobj.first=John"
    );
}

#[test]
fn encode_dot_in_keys_conflicts_with_disabled_dots() {
    let options = EncodeOptions {
        encode_dot_in_keys: true,
        allow_dots: Some(false),
        ..Default::default()
    };
    assert_eq!(
        encode(&vmap! {}, &options),
        Err(EncodeError::DotInKeysRequiresAllowDots)
    );
}

#[test]
fn dot_keys_round_trip() {
    let encode_options = EncodeOptions {
        allow_dots: Some(true),
        encode_dot_in_keys: true,
        ..Default::default()
    };
    let decode_options = DecodeOptions {
        decode_dot_in_keys: true,
        ..Default::default()
    };
    let root = vmap! {"name.obj" => vmap! {"first" => s("John")}};
    let encoded = encode(&root, &encode_options).unwrap();
    let crate::Value::Map(expected) = root else {
        unreachable!()
    };
    assert_eq!(decode(encoded.as_str(), &decode_options).unwrap(), expected);
}

#[test]
fn bracket_notation_is_the_default() {
    let options = EncodeOptions {
        encode: false,
        ..Default::default()
    };
    assert_eq!(
        encode(&vmap! {"a" => vmap! {"b" => s("c")}}, &options).unwrap(),
        "a[b]=c"
    );
}
