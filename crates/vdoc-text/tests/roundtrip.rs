//! Round-trip integration tests for the text codec.

use vdoc_model::{
    CanvasSettings, Document, FlowKind, FlowMetadata, Group, KNOWN_VERSIONS, Object, ObjectAttrs,
    PaperDescriptor, Point, Rect, SettingsEntry, SettingsMode, Version,
};
use vdoc_text::{EncodeOptions, TextError, encode_to_string, parse_str, read_text, write_text};

fn roundtrip(document: &Document, version: Version, mode: SettingsMode) -> Document {
    let text = encode_to_string(document, &EncodeOptions::new(version, mode)).unwrap();
    let decoded = parse_str(&text).unwrap();
    assert_eq!(decoded.version, version);
    assert_eq!(decoded.mode, mode);
    decoded.document
}

fn plain_document() -> Document {
    Document::new(Group::new(vec![
        Object::Path {
            attrs: ObjectAttrs::default(),
            closed: true,
            points: vec![
                Point::new(10.0, 20.0),
                Point::new(110.0, 20.0),
                Point::new(110.0, 80.0),
                Point::new(10.0, 80.0),
            ],
        },
        Object::Text {
            attrs: ObjectAttrs::default(),
            anchor: Point::new(30.0, 40.0),
            size: 12.0,
            content: "Kitchen".to_string(),
        },
        Object::Group(Group::new(vec![Object::Path {
            attrs: ObjectAttrs::default(),
            closed: false,
            points: vec![Point::new(-5.0, 0.0), Point::new(0.0, 7.0)],
        }])),
    ]))
}

fn rich_document() -> Document {
    let mut doc = plain_document().with_description("floor plan");
    doc.root.attrs.tag = Some("walls".to_string());
    doc.root.children[0].attrs_mut().flow =
        Some(FlowMetadata::new(FlowKind::Static, "frame"));
    doc.root.children[1].attrs_mut().tag = Some("room label".to_string());
    doc.root.children.push(Object::Image {
        attrs: ObjectAttrs::default(),
        frame: Rect::new(10.0, 20.0, 100.0, 60.0),
        data: vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a],
    });
    doc.settings = Some(CanvasSettings {
        paper: Some(PaperDescriptor::named("a4")),
        extras: vec![
            SettingsEntry::new("grid", vec![10, 20, 30]),
            SettingsEntry::new("snap", vec![1]),
        ],
    });
    doc
}

#[test]
fn test_roundtrip_v1_0_plain() {
    let doc = plain_document();
    assert_eq!(roundtrip(&doc, Version::new(1, 0), SettingsMode::None), doc);
}

#[test]
fn test_roundtrip_all_features_at_1_5() {
    let doc = rich_document();
    assert_eq!(roundtrip(&doc, Version::new(1, 5), SettingsMode::All), doc);
}

#[test]
fn test_roundtrip_float_coords_at_current() {
    let mut doc = rich_document();
    if let Object::Path { points, .. } = &mut doc.root.children[0] {
        points[0] = Point::new(10.25, 20.125);
    }
    let back = roundtrip(&doc, Version::CURRENT, SettingsMode::All);
    assert_eq!(back, doc);
}

#[test]
fn test_integer_coords_rounded_below_2_0() {
    let mut doc = plain_document();
    if let Object::Text { anchor, .. } = &mut doc.root.children[1] {
        *anchor = Point::new(30.6, 40.4);
    }
    let back = roundtrip(&doc, Version::new(1, 9), SettingsMode::None);
    if let Object::Text { anchor, .. } = &back.root.children[1] {
        assert_eq!(*anchor, Point::new(31.0, 40.0));
    } else {
        panic!("expected text object");
    }
}

#[test]
fn test_paper_only_roundtrip_at_1_3() {
    let doc = plain_document().with_settings(CanvasSettings {
        paper: Some(PaperDescriptor::named("letter")),
        extras: vec![SettingsEntry::new("dropped", vec![9])],
    });
    let back = roundtrip(&doc, Version::new(1, 3), SettingsMode::PaperOnly);
    let settings = back.settings.unwrap();
    assert_eq!(settings.paper, Some(PaperDescriptor::named("letter")));
    assert!(settings.extras.is_empty());
}

#[test]
fn test_settings_mode_none_omits_settings() {
    let doc = rich_document();
    let back = roundtrip(&doc, Version::new(1, 5), SettingsMode::None);
    assert_eq!(back.settings, None);
}

#[test]
fn test_encoding_is_deterministic() {
    let doc = rich_document();
    let options = EncodeOptions::new(Version::CURRENT, SettingsMode::All);
    let first = encode_to_string(&doc, &options).unwrap();
    let second = encode_to_string(&doc, &options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_attr_lines_attach_to_their_owner() {
    let doc = rich_document();
    let text =
        encode_to_string(&doc, &EncodeOptions::new(Version::new(1, 5), SettingsMode::None))
            .unwrap();
    // Root tag line directly follows the root group line.
    assert!(text.contains("group\ntag \"walls\"\n"));
    // Path flow line directly follows the path record.
    assert!(text.contains("80\nflow static \"frame\"\n"));

    let back = parse_str(&text).unwrap().document;
    assert_eq!(back.root.attrs.tag.as_deref(), Some("walls"));
    assert_eq!(
        back.root.children[0].attrs().flow,
        Some(FlowMetadata::new(FlowKind::Static, "frame"))
    );
}

#[test]
fn test_nested_group_attrs() {
    let mut doc = plain_document();
    if let Object::Group(inner) = &mut doc.root.children[2] {
        inner.attrs.tag = Some("detail".to_string());
    }
    let back = roundtrip(&doc, Version::new(1, 5), SettingsMode::None);
    assert_eq!(back, doc);
}

#[test]
fn test_settings_keys_preserved_verbatim() {
    // Keys come from the binary form as arbitrary strings; whitespace,
    // quotes and the empty key must survive the textual rendition.
    let doc = Document::default().with_settings(CanvasSettings {
        paper: None,
        extras: vec![
            SettingsEntry::new("grid spacing", vec![0x0a]),
            SettingsEntry::new("", vec![0x01]),
            SettingsEntry::new("snap \"major\"", vec![]),
        ],
    });
    let back = roundtrip(&doc, Version::CURRENT, SettingsMode::All);
    assert_eq!(back, doc);
}

#[test]
fn test_version_monotonicity() {
    let doc = plain_document();
    for &version in KNOWN_VERSIONS {
        let text =
            encode_to_string(&doc, &EncodeOptions::new(version, SettingsMode::None)).unwrap();
        assert_eq!(parse_str(&text).unwrap().version, version);
    }

    let err = encode_to_string(
        &doc,
        &EncodeOptions::new(Version::new(2, 4), SettingsMode::None),
    )
    .unwrap_err();
    assert!(matches!(err, TextError::UnsupportedVersion { .. }));
}

#[test]
fn test_corrupted_record_fails_with_line_and_no_document() {
    let doc = plain_document();
    let text =
        encode_to_string(&doc, &EncodeOptions::new(Version::new(1, 5), SettingsMode::None))
            .unwrap();
    let corrupted = text.replace("text 30 40", "text 30 forty");

    let err = parse_str(&corrupted).unwrap_err();
    // Header, group, path, then the text record.
    assert_eq!(err.line(), Some(4));
    assert!(format!("{err}").contains("forty"));
}

#[test]
fn test_truncated_stream_fails() {
    let doc = rich_document();
    let text =
        encode_to_string(&doc, &EncodeOptions::new(Version::CURRENT, SettingsMode::All)).unwrap();
    let cut = text.rfind("%end").unwrap();
    let err = parse_str(&text[..cut]).unwrap_err();
    assert!(format!("{err}").contains("unexpected end of stream"));
}

#[test]
fn test_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.vdt");

    let doc = rich_document();
    write_text(&path, &doc, EncodeOptions::new(Version::CURRENT, SettingsMode::All)).unwrap();

    let decoded = read_text(&path).unwrap();
    assert_eq!(decoded.document, doc);
}

#[test]
fn test_missing_file_error() {
    let err = read_text(std::path::Path::new("/nonexistent/plan.vdt")).unwrap_err();
    assert!(matches!(err, TextError::FileNotFound { .. }));
}

#[test]
fn test_hand_edited_stream() {
    let input = "\
%VDRW 1.4 paper-only

# outline only
group
path closed 4 0 0 210 0 210 297 0 297
end
paper named a5
%end
";
    let decoded = parse_str(input).unwrap();
    assert_eq!(decoded.version, Version::new(1, 4));
    assert_eq!(decoded.mode, SettingsMode::PaperOnly);
    assert_eq!(
        decoded.document.settings.unwrap().paper,
        Some(PaperDescriptor::named("a5"))
    );
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn coord() -> impl Strategy<Value = f64> {
        (-2000i32..2000).prop_map(f64::from)
    }

    fn label() -> impl Strategy<Value = String> {
        "[a-z0-9 ]{0,12}"
    }

    fn attrs() -> impl Strategy<Value = ObjectAttrs> {
        (
            proptest::option::of(label()),
            proptest::option::of((0u8..3, label())),
        )
            .prop_map(|(tag, flow)| ObjectAttrs {
                tag,
                flow: flow.map(|(kind, flow_label)| FlowMetadata {
                    kind: FlowKind::from_wire_tag(kind).unwrap(),
                    label: flow_label,
                }),
            })
    }

    fn object() -> impl Strategy<Value = Object> {
        prop_oneof![
            (attrs(), any::<bool>(), proptest::collection::vec((coord(), coord()), 0..6))
                .prop_map(|(attrs, closed, raw)| Object::Path {
                    attrs,
                    closed,
                    points: raw.into_iter().map(|(x, y)| Point::new(x, y)).collect(),
                }),
            (attrs(), coord(), coord(), 1u8..64, label()).prop_map(
                |(attrs, x, y, size, content)| Object::Text {
                    attrs,
                    anchor: Point::new(x, y),
                    size: f64::from(size),
                    content,
                }
            ),
            (attrs(), coord(), coord(), proptest::collection::vec(any::<u8>(), 0..32)).prop_map(
                |(attrs, x, y, data)| Object::Image {
                    attrs,
                    frame: Rect::new(x, y, 50.0, 25.0),
                    data,
                }
            ),
        ]
    }

    fn document() -> impl Strategy<Value = Document> {
        (
            proptest::option::of(label()),
            proptest::collection::vec(object(), 0..8),
        )
            .prop_map(|(description, children)| Document {
                description,
                root: Group::new(children),
                settings: None,
            })
    }

    proptest! {
        #[test]
        fn prop_roundtrip_identity_at_current(doc in document()) {
            let options = EncodeOptions::new(Version::CURRENT, SettingsMode::None);
            let text = encode_to_string(&doc, &options).unwrap();
            let decoded = parse_str(&text).unwrap();
            prop_assert_eq!(decoded.document, doc);
        }

        #[test]
        fn prop_roundtrip_identity_at_1_5(doc in document()) {
            // Integer-valued coordinates survive the integer encoding exactly.
            let options = EncodeOptions::new(Version::new(1, 5), SettingsMode::None);
            let text = encode_to_string(&doc, &options).unwrap();
            let decoded = parse_str(&text).unwrap();
            prop_assert_eq!(decoded.document, doc);
        }

        #[test]
        fn prop_encoding_deterministic(doc in document()) {
            let options = EncodeOptions::new(Version::CURRENT, SettingsMode::All);
            let first = encode_to_string(&doc, &options).unwrap();
            let second = encode_to_string(&doc, &options).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
