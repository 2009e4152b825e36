//! The in-memory drawing document tree.
//!
//! A document is an ordered tree of drawing objects with a group at the
//! root. The codecs treat the geometry as payload; the attributes they care
//! about are the optional labels, the flow metadata (preserved verbatim,
//! never interpreted) and the optional canvas settings at the root.

use serde::Serialize;

use crate::geometry::{Point, Rect};
use crate::settings::CanvasSettings;

/// Layout annotation kind carried by [`FlowMetadata`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    Static,
    Flow,
    Dynamic,
}

impl FlowKind {
    /// Keyword used by the text format.
    #[must_use]
    pub const fn as_keyword(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Flow => "flow",
            Self::Dynamic => "dynamic",
        }
    }

    /// Inverse of [`as_keyword`](Self::as_keyword).
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "static" => Some(Self::Static),
            "flow" => Some(Self::Flow),
            "dynamic" => Some(Self::Dynamic),
            _ => None,
        }
    }

    /// Wire tag used by the binary format.
    #[must_use]
    pub const fn wire_tag(self) -> u8 {
        match self {
            Self::Static => 0,
            Self::Flow => 1,
            Self::Dynamic => 2,
        }
    }

    /// Inverse of [`wire_tag`](Self::wire_tag).
    #[must_use]
    pub const fn from_wire_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Static),
            1 => Some(Self::Flow),
            2 => Some(Self::Dynamic),
            _ => None,
        }
    }
}

/// Per-object layout annotation, carried through both formats byte-for-byte.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowMetadata {
    pub kind: FlowKind,
    pub label: String,
}

impl FlowMetadata {
    #[must_use]
    pub fn new(kind: FlowKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
        }
    }
}

/// Attributes common to every drawing object.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ObjectAttrs {
    /// Optional human-readable label, preserved verbatim.
    pub tag: Option<String>,
    /// Optional flow annotation, preserved verbatim.
    pub flow: Option<FlowMetadata>,
}

impl ObjectAttrs {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tag.is_none() && self.flow.is_none()
    }
}

/// An ordered container of drawing objects.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Group {
    pub attrs: ObjectAttrs,
    pub children: Vec<Object>,
}

impl Group {
    #[must_use]
    pub fn new(children: Vec<Object>) -> Self {
        Self {
            attrs: ObjectAttrs::default(),
            children,
        }
    }

    /// Bounding box of all children, or `None` for an empty group.
    #[must_use]
    pub fn bounding_box(&self) -> Option<Rect> {
        let mut boxes = self.children.iter().filter_map(Object::bounding_box);
        let first = boxes.next()?;
        Some(boxes.fold(first, |acc, b| acc.union(&b)))
    }
}

/// A single drawing object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Object {
    Path {
        attrs: ObjectAttrs,
        closed: bool,
        points: Vec<Point>,
    },
    Text {
        attrs: ObjectAttrs,
        anchor: Point,
        size: f64,
        content: String,
    },
    Image {
        attrs: ObjectAttrs,
        frame: Rect,
        #[serde(skip)]
        data: Vec<u8>,
    },
    Group(Group),
}

impl Object {
    /// The object's common attributes.
    #[must_use]
    pub fn attrs(&self) -> &ObjectAttrs {
        match self {
            Self::Path { attrs, .. } | Self::Text { attrs, .. } | Self::Image { attrs, .. } => {
                attrs
            }
            Self::Group(group) => &group.attrs,
        }
    }

    /// Mutable access to the object's common attributes.
    pub fn attrs_mut(&mut self) -> &mut ObjectAttrs {
        match self {
            Self::Path { attrs, .. } | Self::Text { attrs, .. } | Self::Image { attrs, .. } => {
                attrs
            }
            Self::Group(group) => &mut group.attrs,
        }
    }

    /// Bounding box derived from the geometry. Text anchors contribute a
    /// degenerate point rectangle; the rendered extent is not known here.
    #[must_use]
    pub fn bounding_box(&self) -> Option<Rect> {
        match self {
            Self::Path { points, .. } => Rect::from_points(points),
            Self::Text { anchor, .. } => Some(Rect::at_point(*anchor)),
            Self::Image { frame, .. } => Some(*frame),
            Self::Group(group) => group.bounding_box(),
        }
    }
}

/// Per-kind object totals, used for diagnostics output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ObjectCounts {
    pub paths: usize,
    pub texts: usize,
    pub images: usize,
    pub groups: usize,
}

/// A complete drawing document: root group, optional description and
/// optional canvas settings.
///
/// A document is owned by exactly one conversion at a time; the codecs
/// never share one across concurrent pipelines.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Document {
    pub description: Option<String>,
    pub root: Group,
    pub settings: Option<CanvasSettings>,
}

impl Document {
    #[must_use]
    pub fn new(root: Group) -> Self {
        Self {
            description: None,
            root,
            settings: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: CanvasSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Bounding box of the whole drawing, recomputed from the geometry.
    #[must_use]
    pub fn bounding_box(&self) -> Option<Rect> {
        self.root.bounding_box()
    }

    /// Count objects per kind across the whole tree (nested groups included).
    #[must_use]
    pub fn object_counts(&self) -> ObjectCounts {
        fn walk(group: &Group, counts: &mut ObjectCounts) {
            for child in &group.children {
                match child {
                    Object::Path { .. } => counts.paths += 1,
                    Object::Text { .. } => counts.texts += 1,
                    Object::Image { .. } => counts.images += 1,
                    Object::Group(inner) => {
                        counts.groups += 1;
                        walk(inner, counts);
                    }
                }
            }
        }
        let mut counts = ObjectCounts::default();
        walk(&self.root, &mut counts);
        counts
    }

    /// Whether any object in the tree is an image.
    #[must_use]
    pub fn contains_images(&self) -> bool {
        self.object_counts().images > 0
    }

    /// Whether any object in the tree carries a tag, or the document has a
    /// description.
    #[must_use]
    pub fn contains_tags(&self) -> bool {
        fn walk(group: &Group) -> bool {
            group.attrs.tag.is_some()
                || group.children.iter().any(|child| {
                    child.attrs().tag.is_some()
                        || matches!(child, Object::Group(inner) if walk(inner))
                })
        }
        self.description.is_some() || walk(&self.root)
    }

    /// Whether any object in the tree carries flow metadata.
    #[must_use]
    pub fn contains_flow_metadata(&self) -> bool {
        fn walk(group: &Group) -> bool {
            group.attrs.flow.is_some()
                || group.children.iter().any(|child| {
                    child.attrs().flow.is_some()
                        || matches!(child, Object::Group(inner) if walk(inner))
                })
        }
        walk(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> Document {
        Document::new(Group::new(vec![
            Object::Path {
                attrs: ObjectAttrs::default(),
                closed: true,
                points: vec![
                    Point::new(10.0, 20.0),
                    Point::new(110.0, 20.0),
                    Point::new(110.0, 80.0),
                ],
            },
            Object::Group(Group::new(vec![Object::Text {
                attrs: ObjectAttrs::default(),
                anchor: Point::new(200.0, 300.0),
                size: 12.0,
                content: "label".to_string(),
            }])),
        ]))
    }

    #[test]
    fn test_bounding_box_union() {
        let doc = sample_document();
        let bbox = doc.bounding_box().unwrap();
        assert_eq!(bbox, Rect::new(10.0, 20.0, 190.0, 280.0));
    }

    #[test]
    fn test_empty_document_has_no_bbox() {
        let doc = Document::default();
        assert_eq!(doc.bounding_box(), None);
    }

    #[test]
    fn test_object_counts() {
        let counts = sample_document().object_counts();
        assert_eq!(counts.paths, 1);
        assert_eq!(counts.texts, 1);
        assert_eq!(counts.images, 0);
        assert_eq!(counts.groups, 1);
    }

    #[test]
    fn test_feature_probes() {
        let mut doc = sample_document();
        assert!(!doc.contains_tags());
        assert!(!doc.contains_flow_metadata());
        assert!(!doc.contains_images());

        doc.root.children[0].attrs_mut().tag = Some("outer".to_string());
        assert!(doc.contains_tags());

        doc.root.children[0].attrs_mut().flow =
            Some(FlowMetadata::new(FlowKind::Static, "frame"));
        assert!(doc.contains_flow_metadata());
    }

    #[test]
    fn test_flow_kind_roundtrips() {
        for kind in [FlowKind::Static, FlowKind::Flow, FlowKind::Dynamic] {
            assert_eq!(FlowKind::from_keyword(kind.as_keyword()), Some(kind));
            assert_eq!(FlowKind::from_wire_tag(kind.wire_tag()), Some(kind));
        }
        assert_eq!(FlowKind::from_keyword("fixed"), None);
        assert_eq!(FlowKind::from_wire_tag(3), None);
    }
}
