//! Text format writer.
//!
//! Output is deterministic: one record per line, canonical record order,
//! no comments or blank lines. Coordinates are written as integers below
//! version 2.0 and as shortest round-trip decimals from 2.0 on.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use vdoc_catalog::lookup;
use vdoc_model::{
    CanvasSettings, Document, Group, Object, ObjectAttrs, PaperDescriptor, SettingsMode, Version,
    unrepresentable_feature,
};

use crate::error::{Result, TextError};
use crate::reader::{END_KEYWORD, HEADER_KEYWORD};
use crate::token::quote;

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

/// Text format writer.
pub struct TextWriter<W: Write> {
    writer: BufWriter<W>,
    options: EncodeOptions,
}

impl<W: Write> TextWriter<W> {
    /// Create a new writer with options.
    pub fn new(writer: W, options: EncodeOptions) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options,
        }
    }

    /// Encode the document and write it to the sink.
    pub fn write_document(mut self, document: &Document) -> Result<()> {
        let text = encode_to_string(document, &self.options)?;
        self.writer.write_all(text.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

impl TextWriter<File> {
    /// Create a text drawing file for writing.
    pub fn create(path: &Path, options: EncodeOptions) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file, options))
    }
}

/// Encode a document to a text drawing file.
pub fn write_text(path: &Path, document: &Document, options: EncodeOptions) -> Result<()> {
    TextWriter::create(path, options)?.write_document(document)
}

/// Encode a document into an in-memory string.
pub fn encode_to_string(document: &Document, options: &EncodeOptions) -> Result<String> {
    let version = options.version;
    validate_target(document, options)?;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{HEADER_KEYWORD} {version} {mode}",
        mode = options.mode.as_keyword()
    );

    if let Some(description) = &document.description {
        let _ = writeln!(out, "desc {}", quote(description));
    }

    write_group(&mut out, &document.root, version)?;

    if options.mode != SettingsMode::None {
        let empty = CanvasSettings::default();
        let settings = document.settings.as_ref().unwrap_or(&empty);
        write_settings(&mut out, settings, options)?;
    }

    out.push_str(END_KEYWORD);
    out.push('\n');
    Ok(out)
}

/// Refuse targets the document cannot be represented at. Data is never
/// silently dropped to fit an older version.
fn validate_target(document: &Document, options: &EncodeOptions) -> Result<()> {
    let version = options.version;
    if !version.is_known() {
        return Err(TextError::UnsupportedVersion {
            requested: version,
            maximum: Version::CURRENT,
        });
    }
    if let Some(feature) = unrepresentable_feature(document, version, options.mode) {
        return Err(TextError::UnsupportedFeature { feature, version });
    }
    Ok(())
}

fn write_group(out: &mut String, group: &Group, version: Version) -> Result<()> {
    out.push_str("group\n");
    write_attrs(out, &group.attrs);
    for child in &group.children {
        write_object(out, child, version)?;
    }
    out.push_str("end\n");
    Ok(())
}

fn write_object(out: &mut String, object: &Object, version: Version) -> Result<()> {
    match object {
        Object::Path {
            attrs,
            closed,
            points,
        } => {
            let _ = write!(
                out,
                "path {} {}",
                if *closed { "closed" } else { "open" },
                points.len()
            );
            for point in points {
                let _ = write!(
                    out,
                    " {} {}",
                    coord_text(point.x, version)?,
                    coord_text(point.y, version)?
                );
            }
            out.push('\n');
            write_attrs(out, attrs);
        }
        Object::Text {
            attrs,
            anchor,
            size,
            content,
        } => {
            let _ = writeln!(
                out,
                "text {} {} {} {}",
                coord_text(anchor.x, version)?,
                coord_text(anchor.y, version)?,
                coord_text(*size, version)?,
                quote(content)
            );
            write_attrs(out, attrs);
        }
        Object::Image { attrs, frame, data } => {
            let _ = writeln!(
                out,
                "image {} {} {} {} {} {}",
                coord_text(frame.x, version)?,
                coord_text(frame.y, version)?,
                coord_text(frame.width, version)?,
                coord_text(frame.height, version)?,
                data.len(),
                payload_text(data)
            );
            write_attrs(out, attrs);
        }
        Object::Group(group) => write_group(out, group, version)?,
    }
    Ok(())
}

/// Attribute lines follow the opening line of their owner.
fn write_attrs(out: &mut String, attrs: &ObjectAttrs) {
    if let Some(tag) = &attrs.tag {
        let _ = writeln!(out, "tag {}", quote(tag));
    }
    if let Some(flow) = &attrs.flow {
        let _ = writeln!(out, "flow {} {}", flow.kind.as_keyword(), quote(&flow.label));
    }
}

fn write_settings(
    out: &mut String,
    settings: &CanvasSettings,
    options: &EncodeOptions,
) -> Result<()> {
    let version = options.version;
    if let Some(paper) = &settings.paper {
        match paper {
            PaperDescriptor::Named(name) => {
                if lookup(name, version).is_none() {
                    return Err(TextError::UnknownPaper {
                        name: name.clone(),
                        version,
                    });
                }
                let _ = writeln!(out, "paper named {name}");
            }
            PaperDescriptor::Custom { width, height } => {
                let _ = writeln!(
                    out,
                    "paper custom {} {}",
                    coord_text(*width, version)?,
                    coord_text(*height, version)?
                );
            }
        }
    }
    if options.mode == SettingsMode::All {
        for entry in &settings.extras {
            // Keys are arbitrary strings in the binary form, so they are
            // quoted here to survive whitespace and empty keys.
            let _ = writeln!(
                out,
                "setting {} {}",
                quote(&entry.key),
                payload_text(&entry.value)
            );
        }
    }
    Ok(())
}

/// Coordinate text for the target version: rounded integers below 2.0,
/// shortest round-trip decimals from 2.0 on.
fn coord_text(value: f64, version: Version) -> Result<String> {
    if version.supports_float_coords() {
        if !value.is_finite() {
            return Err(TextError::CoordinateRange { value });
        }
        Ok(value.to_string())
    } else {
        let rounded = value.round();
        if !rounded.is_finite() || rounded < f64::from(i32::MIN) || rounded > f64::from(i32::MAX) {
            return Err(TextError::CoordinateRange { value });
        }
        Ok((rounded as i32).to_string())
    }
}

fn payload_text(data: &[u8]) -> String {
    if data.is_empty() {
        "-".to_string()
    } else {
        hex::encode(data)
    }
}
