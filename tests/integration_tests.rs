use coordinate_converter::processors::{BatchOutcome, BatchProcessor};
use coordinate_converter::{ConversionError, Converter, Format, Settings, Side};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::TempDir;

const PARIS: (f64, f64) = (48.886161111111, 2.343080555556);

fn parse_dd(text: &str) -> (f64, f64) {
    let parts: Vec<f64> = text
        .split_whitespace()
        .map(|p| p.parse().expect("decimal degrees"))
        .collect();
    assert_eq!(parts.len(), 2, "expected two values in {:?}", text);
    (parts[0], parts[1])
}

fn paris_in(format: Format) -> &'static str {
    match format {
        Format::Dms => "48° 53' 10.2\" N 2° 20' 35.1\" E",
        Format::Dd => "48.886161111111 2.343080555556",
        Format::Mgrs => "31UDQ5184115008",
        Format::PlusCode => "8FW4V8PV+F6",
    }
}

#[test]
fn test_dms_to_dd_paris() {
    let converter = Converter::new();
    let dd = converter
        .convert("48°53'10.18\"N 2°20'35.09\"E", Format::Dms, Format::Dd)
        .unwrap();

    let (lat, lon) = parse_dd(&dd);
    assert!((lat - 48.886).abs() < 1e-3);
    assert!((lon - 2.343).abs() < 1e-3);
}

#[test]
fn test_dd_to_dms_southern_western() {
    let converter = Converter::new();
    let dms = converter
        .convert("-48.8866111111 -2.34330555556", Format::Dd, Format::Dms)
        .unwrap();

    assert!(dms.contains('S'));
    assert!(dms.contains('W'));
    assert!(dms.starts_with("48°"));
    assert!(dms.contains(" 2°"));
}

#[test]
fn test_pluscode_round_trip() {
    let converter = Converter::new();
    let dd = converter
        .convert("8FVC9G8F+6X", Format::PlusCode, Format::Dd)
        .unwrap();
    assert_eq!(dd, "47.3655625 8.5249375");

    let code = converter.convert(&dd, Format::Dd, Format::PlusCode).unwrap();
    assert_eq!(code, "8FVC9G8F+6X");
}

#[test]
fn test_comma_separated_dms_keeps_hemispheres() {
    let converter = Converter::new();

    for text in [
        "48°53'10.18\"S, 2°20'35.09\"W",
        "48°53'10.18\"S. 2°20'35.09\"W.",
        "48° 53' 10.18\" S, 2° 20' 35.09\" W",
    ] {
        let dd = converter.convert(text, Format::Dms, Format::Dd).unwrap();
        let (lat, lon) = parse_dd(&dd);
        assert!((lat + 48.886161).abs() < 1e-6, "{} gave {}", text, dd);
        assert!((lon + 2.343081).abs() < 1e-6, "{} gave {}", text, dd);
    }
}

#[test]
fn test_out_of_range_dd_to_dms() {
    let converter = Converter::new();
    for text in ["1e20 -1e20", "200 400", "-91 0"] {
        let err = converter.convert(text, Format::Dd, Format::Dms).unwrap_err();
        assert!(
            matches!(err, ConversionError::MalformedInput { .. }),
            "{} gave {:?}",
            text,
            err
        );
    }
}

#[test]
fn test_polar_mgrs() {
    let converter = Converter::new();
    assert_eq!(
        converter.convert("85 10", Format::Dd, Format::Mgrs).unwrap(),
        "ZAB9645452981"
    );

    let dd = converter
        .convert("BAN0000000000", Format::Mgrs, Format::Dd)
        .unwrap();
    assert_eq!(dd, "-90 0");
}

#[test]
fn test_malformed_dms() {
    let converter = Converter::new();
    let err = converter
        .convert("north by northwest", Format::Dms, Format::Dd)
        .unwrap_err();
    assert!(matches!(err, ConversionError::MalformedInput { .. }));
}

#[test]
fn test_unknown_format_names_side() {
    let converter = Converter::new();
    let err = converter.convert_tags("1 2", "utm", "dd").unwrap_err();
    assert!(matches!(
        err,
        ConversionError::UnsupportedFormat {
            side: Side::Input,
            ..
        }
    ));

    let err = converter.convert_tags("1 2", "DD", "geohash").unwrap_err();
    assert_eq!(
        err.to_string(),
        "I don't support that output coordinate type: 'geohash'"
    );
}

#[test]
fn test_identity_returns_input_unchanged() {
    let converter = Converter::new();
    for format in Format::ALL {
        let text = paris_in(format);
        assert_eq!(converter.convert(text, format, format).unwrap(), text);
    }
    // Identity does not validate the input.
    assert_eq!(
        converter.convert("anything", Format::Mgrs, Format::Mgrs).unwrap(),
        "anything"
    );
}

#[test]
fn test_every_pair_lands_near_paris() {
    let converter = Converter::new();

    for source in Format::ALL {
        for destination in Format::ALL {
            let converted = converter
                .convert(paris_in(source), source, destination)
                .unwrap_or_else(|e| panic!("{} -> {}: {}", source, destination, e));
            let dd = converter
                .convert(&converted, destination, Format::Dd)
                .unwrap_or_else(|e| panic!("{} -> dd: {}", destination, e));

            let (lat, lon) = parse_dd(&dd);
            assert!(
                (lat - PARIS.0).abs() < 2e-4 && (lon - PARIS.1).abs() < 2e-4,
                "{} -> {} gave {} ({})",
                source,
                destination,
                converted,
                dd
            );
        }
    }
}

#[test]
fn test_exact_outputs_from_decimal_degrees() {
    let converter = Converter::new();
    for destination in [Format::Dms, Format::Mgrs, Format::PlusCode] {
        assert_eq!(
            converter
                .convert(paris_in(Format::Dd), Format::Dd, destination)
                .unwrap(),
            paris_in(destination)
        );
    }
}

#[test]
fn test_json_requests() {
    let converter = Converter::new();

    assert_eq!(
        converter
            .handle_request(r#"{"coordinates": "42 -93", "from": "DD", "to": "mgrs"}"#)
            .unwrap(),
        "15TWG0000049776"
    );
    assert!(converter.handle_request("").unwrap().contains("pluscode"));
    assert_eq!(
        converter.respond(r#"{"from": "dd", "to": "mgrs"}"#),
        "Required key missing in JSON: coordinates"
    );
    assert_eq!(converter.respond("{}"), "Could not deserialize JSON: empty object");
}

#[test]
fn test_settings_change_output_precision() {
    let settings = Settings::default()
        .with_pluscode_length(8)
        .with_mgrs_precision(1);
    let converter = Converter::from_settings(&settings).unwrap();

    assert_eq!(
        converter
            .convert("42 -93", Format::Dd, Format::Mgrs)
            .unwrap(),
        "15TWG04"
    );
    assert_eq!(
        converter
            .convert(paris_in(Format::Dd), Format::Dd, Format::PlusCode)
            .unwrap(),
        "8FW4V8PV+"
    );
}

#[test]
fn test_batch_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("requests.jsonl");
    let output = temp_dir.path().join("out").join("results.jsonl");

    let mut file = std::fs::File::create(&input).unwrap();
    writeln!(file, r#"{{"coordinates": "8FVC9G8F+6X", "from": "pluscode", "to": "dd"}}"#).unwrap();
    writeln!(file).unwrap();
    writeln!(file, r#"{{"coordinates": "abc", "from": "dms", "to": "dd"}}"#).unwrap();
    writeln!(
        file,
        r#"{{"coordinates": "15TWG0000049776", "from": "mgrs", "to": "mgrs"}}"#
    )
    .unwrap();
    drop(file);

    let summary = BatchProcessor::new(2)
        .process_file(&Converter::new(), &input, Some(&output), None)
        .unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);

    let written: Vec<BatchOutcome> = std::fs::read_to_string(&output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(
        written.iter().map(|o| o.line).collect::<Vec<_>>(),
        vec![1, 3, 4]
    );
    assert_eq!(written[0].result.as_deref(), Some("47.3655625 8.5249375"));
    assert_eq!(written[1].kind.as_deref(), Some("malformed_input"));
    assert_eq!(written[2].result.as_deref(), Some("15TWG0000049776"));
}
