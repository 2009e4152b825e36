//! The conversion pipeline.
//!
//! A [`Converter`] runs one conversion end to end: read, decode, resolve
//! the settings policy, infer a paper descriptor when the destination
//! needs one, encode, write. The converter is single-use and consumes
//! itself; a failed run cannot be resumed or retried in place.

use std::fmt;
use std::io::{Read, Write};

use serde::Serialize;
use tracing::{debug, warn};

use vdoc_catalog::{InferenceMode, infer_paper};
use vdoc_model::{
    CanvasSettings, Document, Rect, SettingsMode, Version, resolve_settings_mode,
};

use crate::error::{ConvertError, Result};
use crate::format::{Format, detect_format};

/// What the caller wants out of a conversion.
#[derive(Debug, Clone, Copy)]
pub struct ConversionRequest {
    pub target_format: Format,
    pub target_version: Version,
    pub settings_mode: SettingsMode,
    pub inference: InferenceMode,
}

impl ConversionRequest {
    /// Request with defaults: current version, no settings, closest-fit
    /// inference.
    #[must_use]
    pub fn new(target_format: Format) -> Self {
        Self {
            target_format,
            target_version: Version::CURRENT,
            settings_mode: SettingsMode::None,
            inference: InferenceMode::default(),
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.target_version = version;
        self
    }

    #[must_use]
    pub fn with_settings_mode(mut self, mode: SettingsMode) -> Self {
        self.settings_mode = mode;
        self
    }

    #[must_use]
    pub fn with_inference(mut self, inference: InferenceMode) -> Self {
        self.inference = inference;
        self
    }
}

/// Non-fatal signal attached to a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Diagnostic {
    /// The requested settings mode is not representable at the target
    /// version and was promoted instead of failing the run.
    PolicyDowngrade {
        requested: SettingsMode,
        effective: SettingsMode,
        version: Version,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PolicyDowngrade {
                requested,
                effective,
                version,
            } => write!(
                f,
                "settings mode {requested} is not representable at version {version}; \
                 promoted to {effective}"
            ),
        }
    }
}

/// What a conversion found and did, reported to the caller on success.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionReport {
    pub source_format: Format,
    pub source_version: Version,
    pub source_mode: SettingsMode,
    pub effective_mode: SettingsMode,
    pub diagnostics: Vec<Diagnostic>,
}

/// Pipeline phases, in order. Logged at `debug`; never re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Reading,
    Decoded,
    PolicyResolved,
    Inferring,
    Writing,
    Done,
    Failed,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Reading => "reading",
            Self::Decoded => "decoded",
            Self::PolicyResolved => "policy-resolved",
            Self::Inferring => "inferring",
            Self::Writing => "writing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Single-use conversion driver.
pub struct Converter {
    request: ConversionRequest,
    state: State,
}

impl Converter {
    #[must_use]
    pub fn new(request: ConversionRequest) -> Self {
        Self {
            request,
            state: State::Idle,
        }
    }

    /// Run the conversion, consuming the converter.
    ///
    /// On error the destination may hold a partial prefix; callers that
    /// need atomicity write to a temporary location first.
    pub fn convert<R: Read, W: Write>(
        mut self,
        reader: R,
        writer: W,
    ) -> Result<ConversionReport> {
        match self.run(reader, writer) {
            Ok(report) => {
                self.transition(State::Done);
                Ok(report)
            }
            Err(err) => {
                self.transition(State::Failed);
                Err(err)
            }
        }
    }

    fn run<R: Read, W: Write>(&mut self, mut reader: R, mut writer: W) -> Result<ConversionReport> {
        self.transition(State::Reading);
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let source_format = detect_format(&bytes).ok_or(ConvertError::UnknownFormat)?;

        let (mut document, source_version, source_mode) = match source_format {
            Format::Binary => {
                let decoded = vdoc_binary::decode_bytes(&bytes)?;
                (decoded.document, decoded.version, decoded.mode)
            }
            Format::Text => {
                let decoded = vdoc_text::TextReader::new(bytes.as_slice()).read_document()?;
                (decoded.document, decoded.version, decoded.mode)
            }
        };
        self.transition(State::Decoded);
        debug!(
            format = %source_format,
            version = %source_version,
            mode = %source_mode,
            "decoded source stream"
        );

        let resolution =
            resolve_settings_mode(self.request.settings_mode, self.request.target_version);
        let mut diagnostics = Vec::new();
        if resolution.downgraded {
            let diagnostic = Diagnostic::PolicyDowngrade {
                requested: self.request.settings_mode,
                effective: resolution.effective,
                version: self.request.target_version,
            };
            warn!(%diagnostic, "settings policy adjusted");
            diagnostics.push(diagnostic);
        }
        self.transition(State::PolicyResolved);

        if self.needs_inference(source_mode, resolution.effective, &document) {
            self.transition(State::Inferring);
            self.attach_inferred_paper(&mut document);
        }

        self.transition(State::Writing);
        let options_version = self.request.target_version;
        match self.request.target_format {
            Format::Binary => {
                let options =
                    vdoc_binary::EncodeOptions::new(options_version, resolution.effective);
                let encoded = vdoc_binary::encode_to_vec(&document, &options)?;
                writer.write_all(&encoded)?;
            }
            Format::Text => {
                let options = vdoc_text::EncodeOptions::new(options_version, resolution.effective);
                let encoded = vdoc_text::encode_to_string(&document, &options)?;
                writer.write_all(encoded.as_bytes())?;
            }
        }
        writer.flush()?;

        Ok(ConversionReport {
            source_format,
            source_version,
            source_mode,
            effective_mode: resolution.effective,
            diagnostics,
        })
    }

    /// Inference runs only when the source carried no settings, the
    /// destination requires some, and the document has no paper of its own.
    fn needs_inference(
        &self,
        source_mode: SettingsMode,
        effective: SettingsMode,
        document: &Document,
    ) -> bool {
        source_mode == SettingsMode::None
            && effective != SettingsMode::None
            && document
                .settings
                .as_ref()
                .is_none_or(|settings| settings.paper.is_none())
    }

    fn attach_inferred_paper(&self, document: &mut Document) {
        // An empty document infers against a zero-size box, which selects
        // the smallest paper in enclosing mode.
        let bbox = document
            .bounding_box()
            .unwrap_or_else(|| Rect::new(0.0, 0.0, 0.0, 0.0));
        let paper = infer_paper(&bbox, self.request.target_version, self.request.inference);
        debug!(?paper, "inferred paper descriptor");
        document
            .settings
            .get_or_insert_with(CanvasSettings::default)
            .paper = Some(paper);
    }

    fn transition(&mut self, next: State) {
        debug!(from = %self.state, to = %next, "converter state");
        self.state = next;
    }
}
