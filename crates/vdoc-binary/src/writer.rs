//! Binary format writer.
//!
//! Encoding is deterministic: the same document, version and settings mode
//! always produce byte-identical output. Records are emitted in canonical
//! order (header, description, root group, settings, end marker).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use vdoc_catalog::lookup;
use vdoc_model::{
    CanvasSettings, Document, Group, Object, ObjectAttrs, PaperDescriptor, SettingsMode, Version,
    unrepresentable_feature,
};

use crate::error::{BinaryError, Result};
use crate::record::{
    ATTR_FLOW, ATTR_TAG, Encoder, MAGIC, PAPER_ABSENT, PAPER_CUSTOM, PAPER_NAMED, TAG_DESCRIPTION,
    TAG_END, TAG_GROUP_BEGIN, TAG_GROUP_END, TAG_IMAGE, TAG_PATH, TAG_SETTINGS, TAG_TEXT,
};

/// Encoding parameters: the target version and the effective settings mode.
///
/// The settings policy (paper-only promotion below 1.3) is resolved by the
/// caller before these options are built; the writer itself refuses a mode
/// the version cannot carry.
#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions {
    pub version: Version,
    pub mode: SettingsMode,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            version: Version::CURRENT,
            mode: SettingsMode::None,
        }
    }
}

impl EncodeOptions {
    #[must_use]
    pub fn new(version: Version, mode: SettingsMode) -> Self {
        Self { version, mode }
    }
}

/// Binary format writer.
pub struct BinaryWriter<W: Write> {
    writer: BufWriter<W>,
    options: EncodeOptions,
}

impl<W: Write> BinaryWriter<W> {
    /// Create a new writer with options.
    pub fn new(writer: W, options: EncodeOptions) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options,
        }
    }

    /// Encode the document and write it to the sink.
    pub fn write_document(mut self, document: &Document) -> Result<()> {
        let bytes = encode_to_vec(document, &self.options)?;
        self.writer.write_all(&bytes)?;
        self.writer.flush()?;
        Ok(())
    }
}

impl BinaryWriter<File> {
    /// Create a binary drawing file for writing.
    pub fn create(path: &Path, options: EncodeOptions) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file, options))
    }
}

/// Encode a document to a binary drawing file.
pub fn write_binary(path: &Path, document: &Document, options: EncodeOptions) -> Result<()> {
    BinaryWriter::create(path, options)?.write_document(document)
}

/// Encode a document into an in-memory byte vector.
pub fn encode_to_vec(document: &Document, options: &EncodeOptions) -> Result<Vec<u8>> {
    let version = options.version;
    validate_target(document, options)?;

    let mut enc = Encoder::new();
    enc.put_u8(MAGIC[0]);
    enc.put_u8(MAGIC[1]);
    enc.put_u8(MAGIC[2]);
    enc.put_u8(MAGIC[3]);
    enc.put_u8(version.major);
    enc.put_u8(version.minor);
    enc.put_u8(options.mode.wire_tag());
    enc.put_u8(0);

    if let Some(description) = &document.description {
        enc.put_u8(TAG_DESCRIPTION);
        enc.put_string(description);
    }

    write_group(&mut enc, &document.root, version)?;

    if options.mode != SettingsMode::None {
        let empty = CanvasSettings::default();
        let settings = document.settings.as_ref().unwrap_or(&empty);
        write_settings(&mut enc, settings, options)?;
    }

    enc.put_u8(TAG_END);
    Ok(enc.finish())
}

/// Refuse targets the document cannot be represented at. Data is never
/// silently dropped to fit an older version.
fn validate_target(document: &Document, options: &EncodeOptions) -> Result<()> {
    let version = options.version;
    if !version.is_known() {
        return Err(BinaryError::UnsupportedVersion {
            requested: version,
            maximum: Version::CURRENT,
        });
    }
    if let Some(feature) = unrepresentable_feature(document, version, options.mode) {
        return Err(BinaryError::UnsupportedFeature { feature, version });
    }
    Ok(())
}

fn write_group(enc: &mut Encoder, group: &Group, version: Version) -> Result<()> {
    enc.put_u8(TAG_GROUP_BEGIN);
    write_attrs(enc, &group.attrs, version);
    for child in &group.children {
        write_object(enc, child, version)?;
    }
    enc.put_u8(TAG_GROUP_END);
    Ok(())
}

fn write_object(enc: &mut Encoder, object: &Object, version: Version) -> Result<()> {
    match object {
        Object::Path {
            attrs,
            closed,
            points,
        } => {
            enc.put_u8(TAG_PATH);
            write_attrs(enc, attrs, version);
            enc.put_u8(u8::from(*closed));
            enc.put_u32(points.len() as u32);
            for point in points {
                enc.put_coord(point.x, version)?;
                enc.put_coord(point.y, version)?;
            }
        }
        Object::Text {
            attrs,
            anchor,
            size,
            content,
        } => {
            enc.put_u8(TAG_TEXT);
            write_attrs(enc, attrs, version);
            enc.put_coord(anchor.x, version)?;
            enc.put_coord(anchor.y, version)?;
            enc.put_coord(*size, version)?;
            enc.put_string(content);
        }
        Object::Image { attrs, frame, data } => {
            enc.put_u8(TAG_IMAGE);
            write_attrs(enc, attrs, version);
            enc.put_coord(frame.x, version)?;
            enc.put_coord(frame.y, version)?;
            enc.put_coord(frame.width, version)?;
            enc.put_coord(frame.height, version)?;
            enc.put_bytes(data);
        }
        Object::Group(group) => write_group(enc, group, version)?,
    }
    Ok(())
}

fn write_attrs(enc: &mut Encoder, attrs: &ObjectAttrs, version: Version) {
    if !version.supports_tags() {
        // No attrs block exists before 1.1; validate_target already
        // guaranteed the attrs are empty.
        return;
    }
    let mut flags = 0u8;
    if attrs.tag.is_some() {
        flags |= ATTR_TAG;
    }
    if attrs.flow.is_some() {
        flags |= ATTR_FLOW;
    }
    enc.put_u8(flags);
    if let Some(tag) = &attrs.tag {
        enc.put_string(tag);
    }
    if let Some(flow) = &attrs.flow {
        enc.put_u8(flow.kind.wire_tag());
        enc.put_string(&flow.label);
    }
}

fn write_settings(
    enc: &mut Encoder,
    settings: &CanvasSettings,
    options: &EncodeOptions,
) -> Result<()> {
    let version = options.version;
    enc.put_u8(TAG_SETTINGS);
    match &settings.paper {
        None => enc.put_u8(PAPER_ABSENT),
        Some(PaperDescriptor::Named(name)) => {
            if lookup(name, version).is_none() {
                return Err(BinaryError::UnknownPaper {
                    name: name.clone(),
                    version,
                });
            }
            enc.put_u8(PAPER_NAMED);
            enc.put_string(name);
        }
        Some(PaperDescriptor::Custom { width, height }) => {
            enc.put_u8(PAPER_CUSTOM);
            enc.put_coord(*width, version)?;
            enc.put_coord(*height, version)?;
        }
    }
    if options.mode == SettingsMode::All {
        enc.put_u32(settings.extras.len() as u32);
        for entry in &settings.extras {
            enc.put_string(&entry.key);
            enc.put_bytes(&entry.value);
        }
    }
    Ok(())
}
