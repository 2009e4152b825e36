//! End-to-end conversion scenarios.

use vdoc_catalog::InferenceMode;
use vdoc_convert::{ConversionRequest, ConvertError, Converter, Diagnostic, Format};
use vdoc_model::{
    Document, Group, Object, ObjectAttrs, PaperDescriptor, Point, SettingsMode, Version,
};

/// A closed path matching A4 dimensions exactly (210x297 mm).
fn a4_document() -> Document {
    Document::new(Group::new(vec![Object::Path {
        attrs: ObjectAttrs::default(),
        closed: true,
        points: vec![
            Point::new(0.0, 0.0),
            Point::new(210.0, 0.0),
            Point::new(210.0, 297.0),
            Point::new(0.0, 297.0),
        ],
    }]))
}

fn encode_binary(document: &Document, version: Version, mode: SettingsMode) -> Vec<u8> {
    vdoc_binary::encode_to_vec(document, &vdoc_binary::EncodeOptions::new(version, mode)).unwrap()
}

fn convert(input: &[u8], request: ConversionRequest) -> (Vec<u8>, vdoc_convert::ConversionReport) {
    let mut output = Vec::new();
    let report = Converter::new(request).convert(input, &mut output).unwrap();
    (output, report)
}

#[test]
fn test_a4_inference_on_import() {
    // Source has no settings; the destination wants a paper descriptor.
    let input = encode_binary(&a4_document(), Version::new(1, 5), SettingsMode::None);
    let request = ConversionRequest::new(Format::Binary)
        .with_version(Version::new(1, 5))
        .with_settings_mode(SettingsMode::PaperOnly)
        .with_inference(InferenceMode::ClosestFit);

    let (output, report) = convert(&input, request);
    assert_eq!(report.source_mode, SettingsMode::None);
    assert_eq!(report.effective_mode, SettingsMode::PaperOnly);
    assert!(report.diagnostics.is_empty());

    let decoded = vdoc_binary::decode_bytes(&output).unwrap();
    assert_eq!(
        decoded.document.settings.unwrap().paper,
        Some(PaperDescriptor::named("a4"))
    );
}

#[test]
fn test_paper_only_downgraded_at_1_0() {
    let input = encode_binary(&a4_document(), Version::new(1, 5), SettingsMode::None);
    let request = ConversionRequest::new(Format::Binary)
        .with_version(Version::new(1, 0))
        .with_settings_mode(SettingsMode::PaperOnly);

    let (output, report) = convert(&input, request);
    assert_eq!(report.effective_mode, SettingsMode::All);
    assert_eq!(
        report.diagnostics,
        vec![Diagnostic::PolicyDowngrade {
            requested: SettingsMode::PaperOnly,
            effective: SettingsMode::All,
            version: Version::new(1, 0),
        }]
    );

    // The written stream carries a full settings block, not a paper-only one.
    let decoded = vdoc_binary::decode_bytes(&output).unwrap();
    assert_eq!(decoded.mode, SettingsMode::All);
    assert_eq!(
        decoded.document.settings.unwrap().paper,
        Some(PaperDescriptor::named("a4"))
    );
}

#[test]
fn test_source_paper_suppresses_inference() {
    let doc = a4_document().with_settings(vdoc_model::CanvasSettings::with_paper(
        PaperDescriptor::named("letter"),
    ));
    let input = encode_binary(&doc, Version::new(1, 5), SettingsMode::All);
    let request = ConversionRequest::new(Format::Binary)
        .with_version(Version::new(1, 5))
        .with_settings_mode(SettingsMode::PaperOnly);

    let (output, report) = convert(&input, request);
    assert_eq!(report.source_mode, SettingsMode::All);
    let decoded = vdoc_binary::decode_bytes(&output).unwrap();
    assert_eq!(
        decoded.document.settings.unwrap().paper,
        Some(PaperDescriptor::named("letter"))
    );
}

#[test]
fn test_cross_format_roundtrip() {
    let doc = a4_document().with_description("sheet");
    let binary = encode_binary(&doc, Version::CURRENT, SettingsMode::None);

    let (text, report) = convert(
        &binary,
        ConversionRequest::new(Format::Text).with_version(Version::CURRENT),
    );
    assert_eq!(report.source_format, Format::Binary);
    assert!(text.starts_with(b"%VDRW 2.3 none\n"));

    let (back, report) = convert(
        &text,
        ConversionRequest::new(Format::Binary).with_version(Version::CURRENT),
    );
    assert_eq!(report.source_format, Format::Text);
    assert_eq!(back, binary);
}

#[test]
fn test_unknown_input_rejected() {
    let err = Converter::new(ConversionRequest::new(Format::Text))
        .convert(&b"%PDF-1.7 ..."[..], &mut Vec::new())
        .unwrap_err();
    assert!(matches!(err, ConvertError::UnknownFormat));
}

#[test]
fn test_binary_decode_error_keeps_offset() {
    let mut input = encode_binary(&a4_document(), Version::new(1, 5), SettingsMode::None);
    input[10] = 0x7e;

    let err = Converter::new(ConversionRequest::new(Format::Text))
        .convert(input.as_slice(), &mut Vec::new())
        .unwrap_err();
    match err {
        ConvertError::Binary(inner) => assert_eq!(inner.offset(), Some(10)),
        other => panic!("expected wrapped binary error, got {other}"),
    }
}

#[test]
fn test_text_decode_error_keeps_line() {
    let input = b"%VDRW 1.5 none\ngroup\npth closed 0\nend\n%end\n";
    let err = Converter::new(ConversionRequest::new(Format::Binary))
        .convert(&input[..], &mut Vec::new())
        .unwrap_err();
    match err {
        ConvertError::Text(inner) => assert_eq!(inner.line(), Some(3)),
        other => panic!("expected wrapped text error, got {other}"),
    }
}

#[test]
fn test_unrepresentable_target_fails_conversion() {
    // Source has a description, which 1.0 cannot carry.
    let doc = a4_document().with_description("sheet");
    let input = encode_binary(&doc, Version::new(1, 5), SettingsMode::None);

    let err = Converter::new(
        ConversionRequest::new(Format::Binary).with_version(Version::new(1, 0)),
    )
    .convert(input.as_slice(), &mut Vec::new())
    .unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Binary(vdoc_binary::BinaryError::UnsupportedFeature { .. })
    ));
}

#[test]
fn test_empty_document_infers_smallest_enclosing_paper() {
    let input = encode_binary(&Document::default(), Version::CURRENT, SettingsMode::None);
    let request = ConversionRequest::new(Format::Binary)
        .with_settings_mode(SettingsMode::PaperOnly)
        .with_inference(InferenceMode::ClosestEnclosing);

    let (output, _) = convert(&input, request);
    let decoded = vdoc_binary::decode_bytes(&output).unwrap();
    assert_eq!(
        decoded.document.settings.unwrap().paper,
        Some(PaperDescriptor::named("a5"))
    );
}
