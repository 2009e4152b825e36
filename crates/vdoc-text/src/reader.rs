//! Text format reader.
//!
//! Line-oriented parsing with a 1-based line counter; every format error
//! names the line and the offending token. Blank lines and `#` comment
//! lines are tolerated on input (the writer never emits them) so streams
//! stay hand-editable.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use vdoc_catalog::lookup;
use vdoc_model::{
    CanvasSettings, Document, FlowKind, FlowMetadata, Group, Object, ObjectAttrs, PaperDescriptor,
    Point, Rect, SettingsEntry, SettingsMode, Version,
};

use crate::error::{Result, TextError};
use crate::token::{Token, tokenize};

/// Header keyword, also used for format detection.
pub const HEADER_KEYWORD: &str = "%VDRW";

/// Terminator line.
pub const END_KEYWORD: &str = "%end";

/// A decoded document together with the header metadata it arrived with.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub document: Document,
    pub version: Version,
    pub mode: SettingsMode,
}

/// Text format reader.
pub struct TextReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> TextReader<R> {
    /// Create a new reader over a character stream.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }

    /// Read the stream to the end and parse it.
    pub fn read_document(mut self) -> Result<Decoded> {
        let mut input = String::new();
        self.reader.read_to_string(&mut input)?;
        parse_str(&input)
    }
}

impl TextReader<File> {
    /// Open a text drawing file for reading.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TextError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                TextError::Io(e)
            }
        })?;
        Ok(Self::new(file))
    }
}

/// Read and parse a text drawing file.
pub fn read_text(path: &Path) -> Result<Decoded> {
    TextReader::open(path)?.read_document()
}

/// Parse a text drawing stream from a string.
pub fn parse_str(input: &str) -> Result<Decoded> {
    Parser::new(input).parse()
}

/// What the next `tag`/`flow` line attaches to.
enum AttrTarget {
    /// The group most recently opened.
    OpenGroup,
    /// The object most recently parsed in the open group.
    LastObject,
    /// Nothing; attribute lines are invalid here.
    Detached,
}

struct Parser<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    /// Line number of the last record consumed, for end-of-stream errors.
    last_line: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines().enumerate(),
            last_line: 0,
        }
    }

    /// Next non-blank, non-comment record with its 1-based line number.
    fn next_record(&mut self) -> Result<Option<(usize, Vec<Token>)>> {
        for (idx, line) in self.lines.by_ref() {
            let number = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            self.last_line = number;
            let tokens = tokenize(line).map_err(|e| {
                TextError::invalid_format(number, e.fragment.clone(), e.message)
            })?;
            return Ok(Some((number, tokens)));
        }
        Ok(None)
    }

    /// Like [`next_record`](Self::next_record) but end-of-stream is an error.
    fn require_record(&mut self, expected: &'static str) -> Result<(usize, Vec<Token>)> {
        self.next_record()?.ok_or_else(|| {
            TextError::invalid_format(
                self.last_line + 1,
                "",
                format!("unexpected end of stream, expected {expected}"),
            )
        })
    }

    fn parse(mut self) -> Result<Decoded> {
        let (version, mode) = self.parse_header()?;

        let (mut line, mut tokens) = self.require_record("document description or root group")?;
        let mut description = None;
        if keyword(&tokens) == Some("desc") {
            if !version.supports_tags() {
                return Err(TextError::invalid_format(
                    line,
                    "desc",
                    format!("description not valid at version {version}"),
                ));
            }
            expect_arity(line, &tokens, 2, "desc <string>")?;
            description = Some(expect_quoted(line, &tokens[1])?.to_string());
            (line, tokens) = self.require_record("root group")?;
        }

        if keyword(&tokens) != Some("group") || tokens.len() != 1 {
            return Err(TextError::invalid_format(
                line,
                first_raw(&tokens),
                "expected root group",
            ));
        }

        let root = self.parse_groups(version)?;
        let settings = self.parse_settings(version, mode)?;

        if let Some((line, tokens)) = self.next_record()? {
            return Err(TextError::invalid_format(
                line,
                first_raw(&tokens),
                "content after terminator",
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

    fn parse_header(&mut self) -> Result<(Version, SettingsMode)> {
        let (line, tokens) = self.require_record("header")?;
        if keyword(&tokens) != Some(HEADER_KEYWORD) {
            return Err(TextError::invalid_format(
                line,
                first_raw(&tokens),
                "not a text drawing stream",
            ));
        }
        expect_arity(line, &tokens, 3, "%VDRW <version> <mode>")?;

        let version_text = expect_word(line, &tokens[1])?;
        let version: Version = version_text.parse().map_err(|e| {
            TextError::invalid_format_caused_by(line, version_text, "invalid version", e)
        })?;
        if !version.is_known() {
            return Err(TextError::invalid_format(
                line,
                version_text,
                format!("unknown format version {version}"),
            ));
        }

        let mode_text = expect_word(line, &tokens[2])?;
        let mode = SettingsMode::from_keyword(mode_text).ok_or_else(|| {
            TextError::invalid_format(line, mode_text, "invalid settings mode")
        })?;
        if mode == SettingsMode::PaperOnly && !version.supports_paper_only() {
            return Err(TextError::invalid_format(
                line,
                mode_text,
                format!("paper-only settings not representable at version {version}"),
            ));
        }

        Ok((version, mode))
    }

    /// Parse group contents after the root `group` line, consuming the
    /// matching root `end`.
    fn parse_groups(&mut self, version: Version) -> Result<Group> {
        let mut stack = vec![Group::default()];
        let mut target = AttrTarget::OpenGroup;

        loop {
            let (line, tokens) = self.require_record("object record or end")?;
            let word = keyword(&tokens).unwrap_or_default().to_string();
            match word.as_str() {
                "group" => {
                    expect_arity(line, &tokens, 1, "group")?;
                    stack.push(Group::default());
                    target = AttrTarget::OpenGroup;
                }
                "end" => {
                    expect_arity(line, &tokens, 1, "end")?;
                    let group = stack.pop().expect("stack is never empty");
                    match stack.last_mut() {
                        Some(parent) => {
                            parent.children.push(Object::Group(group));
                            target = AttrTarget::Detached;
                        }
                        None => return Ok(group),
                    }
                }
                "path" => {
                    let object = self.parse_path(line, &tokens, version)?;
                    push_child(&mut stack, object);
                    target = AttrTarget::LastObject;
                }
                "text" => {
                    let object = self.parse_text(line, &tokens, version)?;
                    push_child(&mut stack, object);
                    target = AttrTarget::LastObject;
                }
                "image" => {
                    if !version.supports_images() {
                        return Err(TextError::invalid_format(
                            line,
                            "image",
                            format!("image record not valid at version {version}"),
                        ));
                    }
                    let object = self.parse_image(line, &tokens, version)?;
                    push_child(&mut stack, object);
                    target = AttrTarget::LastObject;
                }
                "tag" => {
                    if !version.supports_tags() {
                        return Err(TextError::invalid_format(
                            line,
                            "tag",
                            format!("object tags not valid at version {version}"),
                        ));
                    }
                    expect_arity(line, &tokens, 2, "tag <string>")?;
                    let value = expect_quoted(line, &tokens[1])?.to_string();
                    let attrs = target_attrs(&mut stack, &target).ok_or_else(|| {
                        TextError::invalid_format(line, "tag", "attribute line has no target")
                    })?;
                    if attrs.tag.replace(value).is_some() {
                        return Err(TextError::invalid_format(line, "tag", "duplicate tag line"));
                    }
                }
                "flow" => {
                    if !version.supports_flow_metadata() {
                        return Err(TextError::invalid_format(
                            line,
                            "flow",
                            format!("flow metadata not valid at version {version}"),
                        ));
                    }
                    expect_arity(line, &tokens, 3, "flow <kind> <string>")?;
                    let kind_text = expect_word(line, &tokens[1])?;
                    let kind = FlowKind::from_keyword(kind_text).ok_or_else(|| {
                        TextError::invalid_format(line, kind_text, "invalid flow kind")
                    })?;
                    let flow_label = expect_quoted(line, &tokens[2])?.to_string();
                    let attrs = target_attrs(&mut stack, &target).ok_or_else(|| {
                        TextError::invalid_format(line, "flow", "attribute line has no target")
                    })?;
                    if attrs.flow.replace(FlowMetadata { kind, label: flow_label }).is_some() {
                        return Err(TextError::invalid_format(line, "flow", "duplicate flow line"));
                    }
                }
                _ => {
                    return Err(TextError::invalid_format(
                        line,
                        word,
                        "unknown record keyword",
                    ));
                }
            }
        }
    }

    fn parse_path(&self, line: usize, tokens: &[Token], version: Version) -> Result<Object> {
        if tokens.len() < 3 {
            return Err(TextError::invalid_format(
                line,
                first_raw(tokens),
                "usage: path <closed|open> <n> x1 y1 ...",
            ));
        }
        let closed = match expect_word(line, &tokens[1])? {
            "closed" => true,
            "open" => false,
            other => {
                return Err(TextError::invalid_format(line, other, "expected closed or open"));
            }
        };
        let count = parse_count(line, &tokens[2])?;
        let expected = count
            .checked_mul(2)
            .and_then(|n| n.checked_add(3))
            .ok_or_else(|| {
                TextError::invalid_format(line, tokens[2].raw(), "point count too large")
            })?;
        expect_arity(line, tokens, expected, "path <closed|open> <n> x1 y1 ...")?;

        let mut points = Vec::with_capacity(count);
        for pair in tokens[3..].chunks(2) {
            let x = parse_coord(line, &pair[0], version)?;
            let y = parse_coord(line, &pair[1], version)?;
            points.push(Point::new(x, y));
        }

        Ok(Object::Path {
            attrs: ObjectAttrs::default(),
            closed,
            points,
        })
    }

    fn parse_text(&self, line: usize, tokens: &[Token], version: Version) -> Result<Object> {
        expect_arity(line, tokens, 5, "text <x> <y> <size> <string>")?;
        let anchor = Point::new(
            parse_coord(line, &tokens[1], version)?,
            parse_coord(line, &tokens[2], version)?,
        );
        let size = parse_coord(line, &tokens[3], version)?;
        let content = expect_quoted(line, &tokens[4])?.to_string();
        Ok(Object::Text {
            attrs: ObjectAttrs::default(),
            anchor,
            size,
            content,
        })
    }

    fn parse_image(&self, line: usize, tokens: &[Token], version: Version) -> Result<Object> {
        expect_arity(line, tokens, 7, "image <x> <y> <w> <h> <len> <hex>")?;
        let frame = Rect::new(
            parse_coord(line, &tokens[1], version)?,
            parse_coord(line, &tokens[2], version)?,
            parse_coord(line, &tokens[3], version)?,
            parse_coord(line, &tokens[4], version)?,
        );
        let len = parse_count(line, &tokens[5])?;
        let data = parse_payload(line, &tokens[6])?;
        if data.len() != len {
            return Err(TextError::invalid_format(
                line,
                tokens[5].raw(),
                format!("payload length {} does not match declared {len}", data.len()),
            ));
        }
        Ok(Object::Image {
            attrs: ObjectAttrs::default(),
            frame,
            data,
        })
    }

    /// Parse the settings section between the root `end` and `%end`.
    fn parse_settings(
        &mut self,
        version: Version,
        mode: SettingsMode,
    ) -> Result<Option<CanvasSettings>> {
        let mut settings = if mode == SettingsMode::None {
            None
        } else {
            Some(CanvasSettings::default())
        };

        loop {
            let (line, tokens) = self.require_record("settings record or %end")?;
            let word = keyword(&tokens).unwrap_or_default().to_string();
            match word.as_str() {
                END_KEYWORD => return Ok(settings),
                "paper" => {
                    let settings = settings.as_mut().ok_or_else(|| {
                        TextError::invalid_format(
                            line,
                            "paper",
                            "settings not allowed when mode is none",
                        )
                    })?;
                    if settings.paper.is_some() {
                        return Err(TextError::invalid_format(line, "paper", "duplicate paper line"));
                    }
                    settings.paper = Some(self.parse_paper(line, &tokens, version)?);
                }
                "setting" => {
                    if mode != SettingsMode::All {
                        return Err(TextError::invalid_format(
                            line,
                            "setting",
                            format!("setting entries not allowed when mode is {mode}"),
                        ));
                    }
                    expect_arity(line, &tokens, 3, "setting <key> <hex>")?;
                    // The writer quotes keys; bare keys are accepted for
                    // hand-written streams.
                    let key = tokens[1].raw().to_string();
                    let value = parse_payload(line, &tokens[2])?;
                    settings
                        .as_mut()
                        .expect("mode all implies settings")
                        .extras
                        .push(SettingsEntry { key, value });
                }
                _ => {
                    return Err(TextError::invalid_format(
                        line,
                        word,
                        "unknown settings keyword",
                    ));
                }
            }
        }
    }

    fn parse_paper(
        &self,
        line: usize,
        tokens: &[Token],
        version: Version,
    ) -> Result<PaperDescriptor> {
        if tokens.len() < 2 {
            return Err(TextError::invalid_format(
                line,
                "paper",
                "usage: paper named <name> | paper custom <w> <h>",
            ));
        }
        match expect_word(line, &tokens[1])? {
            "named" => {
                expect_arity(line, tokens, 3, "paper named <name>")?;
                let name = expect_word(line, &tokens[2])?;
                if lookup(name, version).is_none() {
                    return Err(TextError::invalid_format(
                        line,
                        name,
                        format!("unknown paper name at version {version}"),
                    ));
                }
                Ok(PaperDescriptor::named(name))
            }
            "custom" => {
                expect_arity(line, tokens, 4, "paper custom <w> <h>")?;
                Ok(PaperDescriptor::custom(
                    parse_coord(line, &tokens[2], version)?,
                    parse_coord(line, &tokens[3], version)?,
                ))
            }
            other => Err(TextError::invalid_format(
                line,
                other,
                "expected named or custom",
            )),
        }
    }
}

fn keyword(tokens: &[Token]) -> Option<&str> {
    match tokens.first() {
        Some(Token::Word(word)) => Some(word.as_str()),
        _ => None,
    }
}

fn first_raw(tokens: &[Token]) -> String {
    tokens.first().map(|t| t.raw().to_string()).unwrap_or_default()
}

fn push_child(stack: &mut [Group], object: Object) {
    stack
        .last_mut()
        .expect("stack is never empty")
        .children
        .push(object);
}

fn target_attrs<'a>(stack: &'a mut [Group], target: &AttrTarget) -> Option<&'a mut ObjectAttrs> {
    match target {
        AttrTarget::OpenGroup => Some(&mut stack.last_mut()?.attrs),
        AttrTarget::LastObject => Some(stack.last_mut()?.children.last_mut()?.attrs_mut()),
        AttrTarget::Detached => None,
    }
}

fn expect_arity(line: usize, tokens: &[Token], expected: usize, usage: &str) -> Result<()> {
    if tokens.len() != expected {
        return Err(TextError::invalid_format(
            line,
            first_raw(tokens),
            format!("expected {expected} tokens (usage: {usage})"),
        ));
    }
    Ok(())
}

fn expect_word<'t>(line: usize, token: &'t Token) -> Result<&'t str> {
    match token {
        Token::Word(word) => Ok(word),
        Token::Quoted(text) => Err(TextError::invalid_format(
            line,
            text.clone(),
            "expected a bare word, found quoted string",
        )),
    }
}

fn expect_quoted<'t>(line: usize, token: &'t Token) -> Result<&'t str> {
    match token {
        Token::Quoted(text) => Ok(text),
        Token::Word(word) => Err(TextError::invalid_format(
            line,
            word.clone(),
            "expected a quoted string",
        )),
    }
}

fn parse_count(line: usize, token: &Token) -> Result<usize> {
    let word = expect_word(line, token)?;
    word.parse::<usize>().map_err(|e| {
        TextError::invalid_format_caused_by(line, word, "expected a non-negative count", e)
    })
}

fn parse_coord(line: usize, token: &Token, version: Version) -> Result<f64> {
    let word = expect_word(line, token)?;
    if version.supports_float_coords() {
        word.parse::<f64>().map_err(|e| {
            TextError::invalid_format_caused_by(line, word, "expected a coordinate", e)
        })
    } else {
        // Below 2.0 the wire encoding is integral; fractions are invalid.
        let value = word.parse::<i32>().map_err(|e| {
            TextError::invalid_format_caused_by(line, word, "expected an integer coordinate", e)
        })?;
        Ok(f64::from(value))
    }
}

/// Parse a hex payload token; `-` denotes the empty payload.
fn parse_payload(line: usize, token: &Token) -> Result<Vec<u8>> {
    let word = expect_word(line, token)?;
    if word == "-" {
        return Ok(Vec::new());
    }
    hex::decode(word)
        .map_err(|e| TextError::invalid_format_caused_by(line, word, "invalid hex payload", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_document() {
        let decoded = parse_str("%VDRW 1.5 none\ngroup\nend\n%end\n").unwrap();
        assert_eq!(decoded.version, Version::new(1, 5));
        assert_eq!(decoded.mode, SettingsMode::None);
        assert!(decoded.document.root.children.is_empty());
        assert_eq!(decoded.document.settings, None);
    }

    #[test]
    fn test_blank_lines_and_comments_skipped() {
        let decoded = parse_str("%VDRW 1.5 none\n\n# a comment\ngroup\n\nend\n%end\n").unwrap();
        assert!(decoded.document.root.children.is_empty());
    }

    #[test]
    fn test_bad_header() {
        let err = parse_str("%FIG 3.2\n").unwrap_err();
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn test_unknown_version() {
        let err = parse_str("%VDRW 3.0 none\ngroup\nend\n%end\n").unwrap_err();
        assert_eq!(err.line(), Some(1));
        assert!(format!("{err}").contains("3.0"));
    }

    #[test]
    fn test_paper_only_rejected_below_1_3() {
        let err = parse_str("%VDRW 1.2 paper-only\ngroup\nend\n%end\n").unwrap_err();
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn test_unknown_keyword_reports_line_and_token() {
        let err = parse_str("%VDRW 1.5 none\ngroup\npth closed 0\nend\n%end\n").unwrap_err();
        assert_eq!(err.line(), Some(3));
        assert!(format!("{err}").contains("pth"));
    }

    #[test]
    fn test_fractional_coordinate_rejected_below_2_0() {
        let err =
            parse_str("%VDRW 1.9 none\ngroup\ntext 10.5 20 12 \"x\"\nend\n%end\n").unwrap_err();
        assert_eq!(err.line(), Some(3));

        let decoded =
            parse_str("%VDRW 2.0 none\ngroup\ntext 10.5 20 12 \"x\"\nend\n%end\n").unwrap();
        match &decoded.document.root.children[0] {
            Object::Text { anchor, .. } => assert_eq!(anchor.x, 10.5),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_absurd_point_count_rejected() {
        let err = parse_str(
            "%VDRW 1.5 none\ngroup\npath closed 18446744073709551615 1 2\nend\n%end\n",
        )
        .unwrap_err();
        assert_eq!(err.line(), Some(3));
        assert!(format!("{err}").contains("point count"));
    }

    #[test]
    fn test_missing_terminator() {
        let err = parse_str("%VDRW 1.5 none\ngroup\nend\n").unwrap_err();
        assert_eq!(err.line(), Some(4));
        assert!(format!("{err}").contains("unexpected end of stream"));
    }

    #[test]
    fn test_content_after_terminator() {
        let err = parse_str("%VDRW 1.5 none\ngroup\nend\n%end\ngroup\n").unwrap_err();
        assert_eq!(err.line(), Some(5));
    }

    #[test]
    fn test_settings_section_respects_mode() {
        let err = parse_str("%VDRW 1.5 none\ngroup\nend\npaper named a4\n%end\n").unwrap_err();
        assert_eq!(err.line(), Some(4));

        let decoded = parse_str("%VDRW 1.5 all\ngroup\nend\npaper named a4\nsetting grid 0a14\n%end\n")
            .unwrap();
        let settings = decoded.document.settings.unwrap();
        assert_eq!(settings.paper, Some(PaperDescriptor::named("a4")));
        assert_eq!(settings.extras[0].value, vec![0x0a, 0x14]);
    }

    #[test]
    fn test_unknown_paper_name() {
        let err = parse_str("%VDRW 1.3 all\ngroup\nend\npaper named a5\n%end\n").unwrap_err();
        assert_eq!(err.line(), Some(4));
        assert!(format!("{err}").contains("a5"));
    }

    #[test]
    fn test_attr_line_without_target() {
        let err = parse_str("%VDRW 1.5 none\ngroup\ngroup\nend\ntag \"late\"\nend\n%end\n")
            .unwrap_err();
        assert_eq!(err.line(), Some(5));
    }
}
