//! Binary format reader.
//!
//! The stream is read fully into memory and parsed from a slice so that
//! every format error can report an absolute byte offset. Decoding fails
//! fast: a corrupt record aborts the whole parse, no partial document is
//! ever returned.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use vdoc_catalog::lookup;
use vdoc_model::{
    CanvasSettings, Document, FlowKind, FlowMetadata, Group, Object, ObjectAttrs, PaperDescriptor,
    Point, Rect, SettingsEntry, SettingsMode, Version,
};

use crate::error::{BinaryError, Result};
use crate::record::{
    ATTR_FLOW, ATTR_TAG, Decoder, HEADER_LEN, MAGIC, PAPER_ABSENT, PAPER_CUSTOM, PAPER_NAMED,
    TAG_DESCRIPTION, TAG_END, TAG_GROUP_BEGIN, TAG_GROUP_END, TAG_IMAGE, TAG_PATH, TAG_SETTINGS,
    TAG_TEXT,
};

/// A decoded document together with the header metadata it arrived with.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub document: Document,
    pub version: Version,
    pub mode: SettingsMode,
}

/// Binary format reader.
pub struct BinaryReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> BinaryReader<R> {
    /// Create a new reader over a byte stream.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }

    /// Read the stream to the end and decode it.
    pub fn read_document(mut self) -> Result<Decoded> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        decode_bytes(&data)
    }
}

impl BinaryReader<File> {
    /// Open a binary drawing file for reading.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BinaryError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                BinaryError::Io(e)
            }
        })?;
        Ok(Self::new(file))
    }
}

/// Read and decode a binary drawing file.
pub fn read_binary(path: &Path) -> Result<Decoded> {
    BinaryReader::open(path)?.read_document()
}

/// Decode a binary drawing stream from bytes.
pub fn decode_bytes(data: &[u8]) -> Result<Decoded> {
    let mut dec = Decoder::new(data);

    let (version, mode) = parse_header(&mut dec)?;

    let mut tag_offset = dec.position();
    let mut tag = dec.read_u8()?;

    let mut description = None;
    if tag == TAG_DESCRIPTION {
        if !version.supports_tags() {
            return Err(BinaryError::invalid_format(
                tag_offset,
                format!("description record not valid at version {version}"),
            ));
        }
        description = Some(dec.read_string()?);
        tag_offset = dec.position();
        tag = dec.read_u8()?;
    }

    if tag != TAG_GROUP_BEGIN {
        return Err(BinaryError::invalid_format(
            tag_offset,
            format!("expected root group, found tag 0x{tag:02x}"),
        ));
    }
    let root = parse_group_body(&mut dec, version)?;

    let mut tag_offset = dec.position();
    let mut tag = dec.read_u8()?;
    let mut settings = None;
    if tag == TAG_SETTINGS {
        if mode == SettingsMode::None {
            return Err(BinaryError::invalid_format(
                tag_offset,
                "settings record present but header mode is none",
            ));
        }
        settings = Some(parse_settings(&mut dec, version, mode)?);
        tag_offset = dec.position();
        tag = dec.read_u8()?;
    } else if mode != SettingsMode::None {
        return Err(BinaryError::invalid_format(
            tag_offset,
            format!("settings record required by header mode {mode}"),
        ));
    }

    if tag != TAG_END {
        return Err(BinaryError::invalid_format(
            tag_offset,
            format!("expected end marker, found tag 0x{tag:02x}"),
        ));
    }
    if !dec.is_at_end() {
        return Err(BinaryError::invalid_format(
            dec.position(),
            "trailing bytes after end marker",
        ));
    }

    Ok(Decoded {
        document: Document {
            description,
            root,
            settings,
        },
        version,
        mode,
    })
}

/// Parse the fixed 8-byte header, returning version and settings mode.
fn parse_header(dec: &mut Decoder<'_>) -> Result<(Version, SettingsMode)> {
    if dec.remaining() < HEADER_LEN {
        return Err(BinaryError::invalid_format(0, "stream too small"));
    }
    let magic = dec.take(4)?;
    if magic != MAGIC {
        return Err(BinaryError::invalid_format(0, "bad magic, not a binary drawing stream"));
    }

    let version_offset = dec.position();
    let major = dec.read_u8()?;
    let minor = dec.read_u8()?;
    let version = Version::new(major, minor);
    if !version.is_known() {
        return Err(BinaryError::invalid_format(
            version_offset,
            format!("unknown format version {version}"),
        ));
    }

    let mode_offset = dec.position();
    let mode_tag = dec.read_u8()?;
    let mode = SettingsMode::from_wire_tag(mode_tag).ok_or_else(|| {
        BinaryError::invalid_format(mode_offset, format!("invalid settings mode tag {mode_tag}"))
    })?;
    if mode == SettingsMode::PaperOnly && !version.supports_paper_only() {
        return Err(BinaryError::invalid_format(
            mode_offset,
            format!("paper-only settings not representable at version {version}"),
        ));
    }

    let reserved_offset = dec.position();
    if dec.read_u8()? != 0 {
        return Err(BinaryError::invalid_format(
            reserved_offset,
            "reserved header byte must be zero",
        ));
    }

    Ok((version, mode))
}

/// Parse group contents after its GROUP_BEGIN tag, consuming the matching
/// GROUP_END.
fn parse_group_body(dec: &mut Decoder<'_>, version: Version) -> Result<Group> {
    let attrs = parse_attrs(dec, version)?;
    let mut children = Vec::new();

    loop {
        let tag_offset = dec.position();
        let tag = dec.read_u8()?;
        match tag {
            TAG_GROUP_END => break,
            TAG_GROUP_BEGIN => {
                children.push(Object::Group(parse_group_body(dec, version)?));
            }
            TAG_PATH => children.push(parse_path(dec, version)?),
            TAG_TEXT => children.push(parse_text(dec, version)?),
            TAG_IMAGE => {
                if !version.supports_images() {
                    return Err(BinaryError::invalid_format(
                        tag_offset,
                        format!("image record not valid at version {version}"),
                    ));
                }
                children.push(parse_image(dec, version)?);
            }
            other => {
                return Err(BinaryError::invalid_format(
                    tag_offset,
                    format!("unknown record tag 0x{other:02x}"),
                ));
            }
        }
    }

    Ok(Group { attrs, children })
}

/// Parse an attrs block. Before 1.1 no attrs are stored at all.
fn parse_attrs(dec: &mut Decoder<'_>, version: Version) -> Result<ObjectAttrs> {
    if !version.supports_tags() {
        return Ok(ObjectAttrs::default());
    }

    let flags_offset = dec.position();
    let flags = dec.read_u8()?;
    if flags & !(ATTR_TAG | ATTR_FLOW) != 0 {
        return Err(BinaryError::invalid_format(
            flags_offset,
            format!("invalid attribute flags 0x{flags:02x}"),
        ));
    }
    if flags & ATTR_FLOW != 0 && !version.supports_flow_metadata() {
        return Err(BinaryError::invalid_format(
            flags_offset,
            format!("flow metadata not valid at version {version}"),
        ));
    }

    let tag = if flags & ATTR_TAG != 0 {
        Some(dec.read_string()?)
    } else {
        None
    };
    let flow = if flags & ATTR_FLOW != 0 {
        let kind_offset = dec.position();
        let kind_tag = dec.read_u8()?;
        let kind = FlowKind::from_wire_tag(kind_tag).ok_or_else(|| {
            BinaryError::invalid_format(kind_offset, format!("invalid flow kind tag {kind_tag}"))
        })?;
        let label = dec.read_string()?;
        Some(FlowMetadata { kind, label })
    } else {
        None
    };

    Ok(ObjectAttrs { tag, flow })
}

fn parse_path(dec: &mut Decoder<'_>, version: Version) -> Result<Object> {
    let attrs = parse_attrs(dec, version)?;

    let closed_offset = dec.position();
    let closed = match dec.read_u8()? {
        0 => false,
        1 => true,
        other => {
            return Err(BinaryError::invalid_format(
                closed_offset,
                format!("invalid closed flag {other}"),
            ));
        }
    };

    let count_offset = dec.position();
    let count = dec.read_u32()? as usize;
    let coord_size = if version.supports_float_coords() { 8 } else { 4 };
    if count.saturating_mul(2 * coord_size) > dec.remaining() {
        return Err(BinaryError::invalid_format(
            count_offset,
            format!("point count {count} exceeds remaining stream"),
        ));
    }

    let mut points = Vec::with_capacity(count);
    for _ in 0..count {
        let x = dec.read_coord(version)?;
        let y = dec.read_coord(version)?;
        points.push(Point::new(x, y));
    }

    Ok(Object::Path {
        attrs,
        closed,
        points,
    })
}

fn parse_text(dec: &mut Decoder<'_>, version: Version) -> Result<Object> {
    let attrs = parse_attrs(dec, version)?;
    let anchor = Point::new(dec.read_coord(version)?, dec.read_coord(version)?);
    let size = dec.read_coord(version)?;
    let content = dec.read_string()?;
    Ok(Object::Text {
        attrs,
        anchor,
        size,
        content,
    })
}

fn parse_image(dec: &mut Decoder<'_>, version: Version) -> Result<Object> {
    let attrs = parse_attrs(dec, version)?;
    let frame = Rect::new(
        dec.read_coord(version)?,
        dec.read_coord(version)?,
        dec.read_coord(version)?,
        dec.read_coord(version)?,
    );
    let data = dec.read_bytes()?;
    Ok(Object::Image { attrs, frame, data })
}

/// Parse a settings record body. The layout depends on the header mode:
/// paper-only blocks stop after the paper descriptor.
fn parse_settings(
    dec: &mut Decoder<'_>,
    version: Version,
    mode: SettingsMode,
) -> Result<CanvasSettings> {
    let paper_offset = dec.position();
    let paper = match dec.read_u8()? {
        PAPER_ABSENT => None,
        PAPER_NAMED => {
            let name_offset = dec.position();
            let name = dec.read_string()?;
            if lookup(&name, version).is_none() {
                return Err(BinaryError::invalid_format(
                    name_offset,
                    format!("unknown paper name {name:?} at version {version}"),
                ));
            }
            Some(PaperDescriptor::named(name))
        }
        PAPER_CUSTOM => {
            let width = dec.read_coord(version)?;
            let height = dec.read_coord(version)?;
            Some(PaperDescriptor::custom(width, height))
        }
        other => {
            return Err(BinaryError::invalid_format(
                paper_offset,
                format!("invalid paper tag {other}"),
            ));
        }
    };

    let mut extras = Vec::new();
    if mode == SettingsMode::All {
        let count_offset = dec.position();
        let count = dec.read_u32()? as usize;
        // Each entry takes at least the two length prefixes.
        if count.saturating_mul(8) > dec.remaining() {
            return Err(BinaryError::invalid_format(
                count_offset,
                format!("settings entry count {count} exceeds remaining stream"),
            ));
        }
        for _ in 0..count {
            let key = dec.read_string()?;
            let value = dec.read_bytes()?;
            extras.push(SettingsEntry { key, value });
        }
    }

    Ok(CanvasSettings { paper, extras })
}
