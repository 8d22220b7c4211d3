//! End-to-end vectors pinned against the output of the JavaScript `qs`
//! library, exercised through the public API only.

use qsmodem::{
    Charset, DecodeOptions, EncodeOptions, ListFormat, Map, Value, decode, encode,
};

fn str_value(text: &str) -> Value {
    Value::Str(text.to_owned())
}

fn map(pairs: &[(&str, Value)]) -> Map {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), v.clone()))
        .collect()
}

#[test]
fn decode_vectors() {
    let defaults = DecodeOptions::default();

    assert_eq!(
        decode("foo[bar][baz]=foobarbaz", &defaults).unwrap(),
        map(&[(
            "foo",
            Value::Map(map(&[(
                "bar",
                Value::Map(map(&[("baz", str_value("foobarbaz"))]))
            )]))
        )])
    );

    assert_eq!(
        decode("a[1]=b&a[15]=c", &defaults).unwrap(),
        map(&[("a", Value::List(vec![str_value("b"), str_value("c")]))])
    );

    assert_eq!(
        decode("a[100]=b", &defaults).unwrap(),
        map(&[("a", Value::Map(map(&[("100", str_value("b"))])))])
    );

    assert_eq!(
        decode("a=b&a=c", &defaults).unwrap(),
        map(&[("a", Value::List(vec![str_value("b"), str_value("c")]))])
    );
}

#[test]
fn encode_vectors() {
    let plain = EncodeOptions {
        encode: false,
        ..Default::default()
    };
    let nested = Value::Map(map(&[(
        "a",
        Value::Map(map(&[("b", Value::List(vec![str_value("c"), str_value("d")]))])),
    )]));
    assert_eq!(encode(&nested, &plain).unwrap(), "a[b][0]=c&a[b][1]=d");

    let encoded = EncodeOptions::default();
    assert_eq!(encode(&nested, &encoded).unwrap(), "a%5Bb%5D%5B0%5D=c&a%5Bb%5D%5B1%5D=d");
}

#[test]
fn charset_sentinel_negotiates_both_ways() {
    let options = DecodeOptions {
        charset: Charset::Latin1,
        charset_sentinel: true,
        ..Default::default()
    };
    assert_eq!(
        decode("utf8=%E2%9C%93&a=%C3%B8", &options).unwrap(),
        map(&[("a", str_value("ø"))])
    );
}

#[test]
fn full_round_trip_with_lists_and_maps() {
    let original = map(&[
        ("user", Value::Map(map(&[
            ("name", str_value("Jan Smith")),
            ("roles", Value::List(vec![str_value("admin"), str_value("ops")])),
        ]))),
        ("q", str_value("50% off & more")),
    ]);

    let encoded = encode(&Value::Map(original.clone()), &EncodeOptions::default()).unwrap();
    assert_eq!(
        encoded,
        "user%5Bname%5D=Jan%20Smith&user%5Broles%5D%5B0%5D=admin&user%5Broles%5D%5B1%5D=ops\
         &q=50%25%20off%20%26%20more"
    );
    assert_eq!(decode(encoded.as_str(), &DecodeOptions::default()).unwrap(), original);
}

#[test]
fn comma_format_round_trip_needs_the_marker() {
    let options = EncodeOptions {
        list_format: Some(ListFormat::Comma),
        comma_round_trip: true,
        encode: false,
        ..Default::default()
    };
    let original = map(&[("a", Value::List(vec![str_value("b")]))]);
    let encoded = encode(&Value::Map(original.clone()), &options).unwrap();
    assert_eq!(encoded, "a[]=b");

    let decode_options = DecodeOptions {
        comma: true,
        ..Default::default()
    };
    assert_eq!(decode(encoded.as_str(), &decode_options).unwrap(), original);
}
