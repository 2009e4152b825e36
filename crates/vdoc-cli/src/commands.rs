//! Subcommand implementations.

use std::fs::File;
use std::io::Read;

use anyhow::{Context, Result, bail};
use comfy_table::{Table, presets};
use serde::Serialize;

use vdoc_catalog::{InferenceMode, entries_at};
use vdoc_convert::{ConversionReport, ConversionRequest, Converter, Format, detect_format};
use vdoc_model::{
    Document, ObjectCounts, PaperDescriptor, Rect, SettingsMode, Version,
};

use crate::cli::{ConvertArgs, FormatArg, InfoArgs, InferArg, PapersArgs, SettingsModeArg};

pub fn run_convert(args: &ConvertArgs) -> Result<ConversionReport> {
    let input = File::open(&args.input)
        .with_context(|| format!("cannot open input {}", args.input.display()))?;
    let output = File::create(&args.output)
        .with_context(|| format!("cannot create output {}", args.output.display()))?;

    let request = ConversionRequest::new(match args.to {
        FormatArg::Binary => Format::Binary,
        FormatArg::Text => Format::Text,
    })
    .with_version(args.to_version)
    .with_settings_mode(match args.settings {
        SettingsModeArg::None => SettingsMode::None,
        SettingsModeArg::All => SettingsMode::All,
        SettingsModeArg::PaperOnly => SettingsMode::PaperOnly,
    })
    .with_inference(match args.infer {
        InferArg::ClosestFit => InferenceMode::ClosestFit,
        InferArg::ClosestEnclosing => InferenceMode::ClosestEnclosing,
    });

    let report = Converter::new(request)
        .convert(input, output)
        .with_context(|| format!("cannot convert {}", args.input.display()))?;
    Ok(report)
}

/// Machine-readable document summary for `info --json`.
#[derive(Serialize)]
struct InfoReport<'a> {
    format: Format,
    version: Version,
    settings_mode: SettingsMode,
    description: Option<&'a str>,
    counts: ObjectCounts,
    bounding_box: Option<Rect>,
    paper: Option<&'a PaperDescriptor>,
}

pub fn run_info(args: &InfoArgs) -> Result<()> {
    let (format, document, version, mode) = read_any(&args.input)?;

    let report = InfoReport {
        format,
        version,
        settings_mode: mode,
        description: document.description.as_deref(),
        counts: document.object_counts(),
        bounding_box: document.bounding_box(),
        paper: document.settings.as_ref().and_then(|s| s.paper.as_ref()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("format:        {format}");
    println!("version:       {version}");
    println!("settings mode: {mode}");
    if let Some(description) = report.description {
        println!("description:   {description:?}");
    }
    let counts = report.counts;
    println!(
        "objects:       {} paths, {} texts, {} images, {} groups",
        counts.paths, counts.texts, counts.images, counts.groups
    );
    match report.bounding_box {
        Some(bbox) => println!(
            "bounding box:  {} x {} mm at ({}, {})",
            bbox.width, bbox.height, bbox.x, bbox.y
        ),
        None => println!("bounding box:  (empty document)"),
    }
    match report.paper {
        Some(PaperDescriptor::Named(name)) => println!("paper:         {name}"),
        Some(PaperDescriptor::Custom { width, height }) => {
            println!("paper:         custom {width} x {height} mm");
        }
        None => {}
    }
    Ok(())
}

pub fn run_papers(args: &PapersArgs) -> Result<()> {
    let version = args.at_version.unwrap_or(Version::CURRENT);
    let entries: Vec<_> = entries_at(version).collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_header(["Name", "Width (mm)", "Height (mm)", "Since"]);
    for entry in entries {
        table.add_row([
            entry.name.to_string(),
            entry.width.to_string(),
            entry.height.to_string(),
            entry.min_version.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Read and decode a document in either format.
fn read_any(path: &std::path::Path) -> Result<(Format, Document, Version, SettingsMode)> {
    let mut bytes = Vec::new();
    File::open(path)
        .with_context(|| format!("cannot open input {}", path.display()))?
        .read_to_end(&mut bytes)
        .with_context(|| format!("cannot read input {}", path.display()))?;

    match detect_format(&bytes) {
        Some(Format::Binary) => {
            let decoded = vdoc_binary::decode_bytes(&bytes)
                .with_context(|| format!("cannot decode {}", path.display()))?;
            Ok((Format::Binary, decoded.document, decoded.version, decoded.mode))
        }
        Some(Format::Text) => {
            let decoded = vdoc_text::TextReader::new(bytes.as_slice())
                .read_document()
                .with_context(|| format!("cannot decode {}", path.display()))?;
            Ok((Format::Text, decoded.document, decoded.version, decoded.mode))
        }
        None => bail!("{} is not a drawing document", path.display()),
    }
}
