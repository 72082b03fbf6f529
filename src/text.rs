//! The line based text format.
//!
//! Every line is a tag name followed by `key=value` attributes:
//!
//! ```text
//! info face="Arial" size=-26 bold=1 italic=1 charset="" unicode=1 stretchH=90 smooth=1 aa=2 padding=1,2,3,4 spacing=2,1 outline=2
//! common lineHeight=27 base=22 scaleW=32 scaleH=64 pages=2 packed=0 alphaChnl=0 redChnl=1 greenChnl=3 blueChnl=4
//! page id=0 file="test_0.png"
//! chars count=1
//! char id=65 x=0 y=0 width=29 height=25 xoffset=-6 yoffset=2 xadvance=19 page=0 chnl=15
//! kernings count=1
//! kerning first=86 second=65 amount=-2
//! ```

use std::io::{self, Write};

use thiserror::Error;

use crate::meta::{Channel, ChannelData, Char, Common, Font, Info, Kerning, Page};

/// Why a line was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TextErrorKind {
    /// A line with nothing but whitespace.
    #[error("expected a tag, found an empty line")]
    EmptyLine,
    /// Bytes that are not valid UTF-8.
    #[error("invalid UTF-8 at column {column}")]
    InvalidUtf8 {
        /// 0-based byte offset of the first invalid byte within the line.
        column: usize,
    },
    /// A `"` without a closing partner.
    #[error("unterminated quoted string")]
    UnterminatedQuote,
    /// An attribute that is not of the form `key=value`.
    #[error("expected key=value pair, found '{0}'")]
    ExpectedKeyValue(String),
    /// A numeric attribute whose value is not an integer.
    #[error("expected an integer for {key}, found '{value}'")]
    InvalidInteger {
        /// Attribute name.
        key: String,
        /// The offending value.
        value: String,
    },
    /// A numeric attribute whose value does not fit the field.
    #[error("{value} is out of range for {key}")]
    OutOfRange {
        /// Attribute name.
        key: String,
        /// The offending value.
        value: i64,
    },
}

/// A text file could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("format error in line {line_number} '{line}': {kind}")]
pub struct TextError {
    /// 1-based number of the offending line.
    pub line_number: usize,
    /// The offending line.
    pub line: String,
    /// What is wrong with it.
    #[source]
    pub kind: TextErrorKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Value {
    Quoted(String),
    Int(i64),
    Literal(String),
}

impl Value {
    fn int<T: TryFrom<i64>>(&self, key: &str) -> Result<T, TextErrorKind> {
        let value = match self {
            Value::Int(value) => *value,
            Value::Quoted(s) | Value::Literal(s) => {
                s.trim()
                    .parse()
                    .map_err(|_| TextErrorKind::InvalidInteger {
                        key: key.to_owned(),
                        value: s.clone(),
                    })?
            }
        };
        T::try_from(value).map_err(|_| TextErrorKind::OutOfRange {
            key: key.to_owned(),
            value,
        })
    }

    fn flag(&self, key: &str) -> Result<bool, TextErrorKind> {
        self.int::<i64>(key).map(|value| value != 0)
    }

    fn text(&self) -> String {
        match self {
            Value::Quoted(s) | Value::Literal(s) => s.clone(),
            Value::Int(value) => value.to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Tag {
    name: String,
    attrs: Vec<(String, Value)>,
}

/// Split a line into its tag name and attributes.
///
/// Quoted strings are cut out first and each replaced by a lone `"`, so they
/// may contain spaces and `=`. A value that is exactly that placeholder refers
/// back to the next cut out string.
fn tokenize(line: &str) -> Result<Tag, TextErrorKind> {
    if line.matches('"').count() % 2 != 0 {
        return Err(TextErrorKind::UnterminatedQuote);
    }

    let mut stripped = String::with_capacity(line.len());
    let mut quoted = Vec::new();
    for (i, part) in line.split('"').enumerate() {
        if i % 2 == 0 {
            if i > 0 {
                stripped.push('"');
            }
            stripped.push_str(part);
        } else {
            quoted.push(part);
        }
    }

    let mut tokens = stripped.split_whitespace();
    let Some(name) = tokens.next() else {
        return Err(TextErrorKind::EmptyLine);
    };
    let mut next_quoted = name.matches('"').count();

    let mut attrs = Vec::new();
    for token in tokens {
        let mut parts = token.split('=');
        let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(TextErrorKind::ExpectedKeyValue(token.to_owned()));
        };
        next_quoted += key.matches('"').count();
        let value = if value == "\"" {
            let s = quoted.get(next_quoted).copied().unwrap_or_default();
            next_quoted += 1;
            Value::Quoted(s.to_owned())
        } else {
            next_quoted += value.matches('"').count();
            match value.parse() {
                Ok(int) => Value::Int(int),
                Err(_) => Value::Literal(value.to_owned()),
            }
        };
        attrs.push((key.to_owned(), value));
    }

    Ok(Tag {
        name: name.to_owned(),
        attrs,
    })
}

/// Parse a text descriptor.
///
/// Lines with unknown tags, like the `chars count=N` headers, are skipped.
/// Blank lines are errors, except that a final line break ends the last line.
pub fn parse_text(data: &[u8]) -> Result<Font, TextError> {
    let text = std::str::from_utf8(data).map_err(|err| invalid_utf8(data, err.valid_up_to()))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut font = Font::default();
    for (index, line) in text.lines().enumerate() {
        parse_line(line, &mut font).map_err(|kind| TextError {
            line_number: index + 1,
            line: line.to_owned(),
            kind,
        })?;
    }
    Ok(font)
}

fn invalid_utf8(data: &[u8], valid_up_to: usize) -> TextError {
    let (before, after) = data.split_at(valid_up_to);
    let start = before.iter().rposition(|&b| b == b'\n').map_or(0, |i| i + 1);
    let end = after
        .iter()
        .position(|&b| b == b'\n')
        .map_or(data.len(), |i| valid_up_to + i);
    TextError {
        line_number: before.iter().filter(|&&b| b == b'\n').count() + 1,
        line: String::from_utf8_lossy(&data[start..end])
            .trim_end_matches('\r')
            .to_owned(),
        kind: TextErrorKind::InvalidUtf8 {
            column: valid_up_to - start,
        },
    }
}

fn parse_line(line: &str, font: &mut Font) -> Result<(), TextErrorKind> {
    let tag = tokenize(line)?;
    match tag.name.as_str() {
        "info" => font.info = parse_info(&tag.attrs)?,
        "common" => font.common = parse_common(&tag.attrs)?,
        "page" => {
            let page = parse_page(&tag.attrs)?;
            if usize::try_from(page.id).map_or(true, |id| id != font.pages.len()) {
                log::warn!("page {} is listed at position {}", page.id, font.pages.len());
            }
            font.pages.push(page);
        }
        "char" => font.chars.push(parse_char(&tag.attrs)?),
        "kerning" => font.kernings.push(parse_kerning(&tag.attrs)?),
        other => log::trace!("skipping {other} line"),
    }
    Ok(())
}

fn parse_info(attrs: &[(String, Value)]) -> Result<Info, TextErrorKind> {
    let mut info = Info::default();
    for (key, value) in attrs {
        match key.as_str() {
            "face" => info.face = value.text(),
            "size" => info.size = value.int(key)?,
            "bold" => info.bold = value.flag(key)?,
            "italic" => info.italic = value.flag(key)?,
            "charset" => info.charset = value.text(),
            "unicode" => info.unicode = value.flag(key)?,
            "stretchH" => info.stretch_h = value.int(key)?,
            "smooth" => info.smooth = value.flag(key)?,
            "aa" => info.aa = value.int(key)?,
            "padding" => info.padding = value.text().parse().unwrap_or_default(),
            "spacing" => info.spacing = value.text().parse().unwrap_or_default(),
            "outline" => info.outline = value.int(key)?,
            _ => {}
        }
    }
    Ok(info)
}

fn parse_common(attrs: &[(String, Value)]) -> Result<Common, TextErrorKind> {
    let mut common = Common::default();
    for (key, value) in attrs {
        match key.as_str() {
            "lineHeight" => common.line_height = value.int(key)?,
            "base" => common.base = value.int(key)?,
            "scaleW" => common.scale_w = value.int(key)?,
            "scaleH" => common.scale_h = value.int(key)?,
            "pages" => common.pages = value.int(key)?,
            "packed" => common.packed = value.flag(key)?,
            "alphaChnl" => common.alpha_chnl = ChannelData(value.int(key)?),
            "redChnl" => common.red_chnl = ChannelData(value.int(key)?),
            "greenChnl" => common.green_chnl = ChannelData(value.int(key)?),
            "blueChnl" => common.blue_chnl = ChannelData(value.int(key)?),
            _ => {}
        }
    }
    Ok(common)
}

fn parse_page(attrs: &[(String, Value)]) -> Result<Page, TextErrorKind> {
    let mut page = Page::default();
    for (key, value) in attrs {
        match key.as_str() {
            "id" => page.id = value.int(key)?,
            "file" => page.file = value.text(),
            _ => {}
        }
    }
    Ok(page)
}

fn parse_char(attrs: &[(String, Value)]) -> Result<Char, TextErrorKind> {
    let mut ch = Char::default();
    for (key, value) in attrs {
        match key.as_str() {
            "id" => ch.id = value.int(key)?,
            "x" => ch.x = value.int(key)?,
            "y" => ch.y = value.int(key)?,
            "width" => ch.width = value.int(key)?,
            "height" => ch.height = value.int(key)?,
            "xoffset" => ch.xoffset = value.int(key)?,
            "yoffset" => ch.yoffset = value.int(key)?,
            "xadvance" => ch.xadvance = value.int(key)?,
            "page" => ch.page = value.int(key)?,
            "chnl" => ch.chnl = Channel(value.int(key)?),
            _ => {}
        }
    }
    Ok(ch)
}

fn parse_kerning(attrs: &[(String, Value)]) -> Result<Kerning, TextErrorKind> {
    let mut kerning = Kerning::default();
    for (key, value) in attrs {
        match key.as_str() {
            "first" => kerning.first = value.int(key)?,
            "second" => kerning.second = value.int(key)?,
            "amount" => kerning.amount = value.int(key)?,
            _ => {}
        }
    }
    Ok(kerning)
}

/// Serialize `font` as a text descriptor.
pub fn serialize_text(font: &Font) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    write_text(font, &mut out)?;
    Ok(out)
}

/// Write `font` as a text descriptor into `dst`, one tag per line.
pub fn write_text<W: Write>(font: &Font, mut dst: W) -> io::Result<()> {
    let info = &font.info;
    writeln!(
        dst,
        "info face=\"{}\" size={} bold={} italic={} charset=\"{}\" unicode={} stretchH={} smooth={} aa={} padding={} spacing={} outline={}",
        info.face,
        info.size,
        u8::from(info.bold),
        u8::from(info.italic),
        info.charset,
        u8::from(info.unicode),
        info.stretch_h,
        u8::from(info.smooth),
        info.aa,
        info.padding,
        info.spacing,
        info.outline,
    )?;

    let common = &font.common;
    writeln!(
        dst,
        "common lineHeight={} base={} scaleW={} scaleH={} pages={} packed={} alphaChnl={} redChnl={} greenChnl={} blueChnl={}",
        common.line_height,
        common.base,
        common.scale_w,
        common.scale_h,
        common.pages,
        u8::from(common.packed),
        common.alpha_chnl.0,
        common.red_chnl.0,
        common.green_chnl.0,
        common.blue_chnl.0,
    )?;

    for page in &font.pages {
        writeln!(dst, "page id={} file=\"{}\"", page.id, page.file)?;
    }

    writeln!(dst, "chars count={}", font.chars.len())?;
    for ch in &font.chars {
        writeln!(
            dst,
            "char id={} x={} y={} width={} height={} xoffset={} yoffset={} xadvance={} page={} chnl={}",
            ch.id, ch.x, ch.y, ch.width, ch.height, ch.xoffset, ch.yoffset, ch.xadvance, ch.page, ch.chnl.0,
        )?;
    }

    writeln!(dst, "kernings count={}", font.kernings.len())?;
    for kerning in &font.kernings {
        writeln!(
            dst,
            "kerning first={} second={} amount={}",
            kerning.first, kerning.second, kerning.amount,
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{Padding, Spacing};

    #[test]
    fn quoted_values_may_hold_spaces() {
        let tag = tokenize(r#"info face="Times New Roman" size=12 charset="" x=a=b"#);
        assert_eq!(
            tag,
            Err(TextErrorKind::ExpectedKeyValue("x=a=b".into()))
        );

        let tag = tokenize(r#"info face="Times New Roman" size=-12 charset="" aa=two"#).unwrap();
        assert_eq!(tag.name, "info");
        assert_eq!(
            tag.attrs,
            [
                ("face".to_owned(), Value::Quoted("Times New Roman".into())),
                ("size".to_owned(), Value::Int(-12)),
                ("charset".to_owned(), Value::Quoted(String::new())),
                ("aa".to_owned(), Value::Literal("two".into())),
            ]
        );
    }

    #[test]
    fn quoted_strings_stay_aligned() {
        let tag = tokenize(r#"page id=0 weird=x"y" file="f.png""#).unwrap();
        assert_eq!(tag.attrs[1], ("weird".to_owned(), Value::Literal("x\"".into())));
        assert_eq!(tag.attrs[2], ("file".to_owned(), Value::Quoted("f.png".into())));
    }

    #[test]
    fn blank_lines_are_rejected() {
        assert_eq!(tokenize("   \t"), Err(TextErrorKind::EmptyLine));

        let err = parse_text(b"info face=\"a\"\n\ncommon lineHeight=1\n").unwrap_err();
        assert_eq!(err.line_number, 2);
        assert_eq!(err.line, "");
        assert_eq!(err.kind, TextErrorKind::EmptyLine);

        let err = parse_text(b"common lineHeight=3\r\n \r\n").unwrap_err();
        assert_eq!(err.line_number, 2);

        let font = parse_text(b"common lineHeight=3\r\n").unwrap();
        assert_eq!(font.common.line_height, 3);
    }

    #[test]
    fn input_must_be_utf8() {
        let err = parse_text(b"info face=\"Arial\"\r\npage id=0 file=\"p\xe1gina.png\"\r\n").unwrap_err();
        assert_eq!(err.line_number, 2);
        assert_eq!(err.line, "page id=0 file=\"p\u{fffd}gina.png\"");
        assert_eq!(err.kind, TextErrorKind::InvalidUtf8 { column: 17 });

        let font = parse_text("info face=\"Café\"".as_bytes()).unwrap();
        assert_eq!(font.info.face, "Café");
    }

    #[test]
    fn malformed_lines_report_their_number() {
        let err = parse_text(b"info face=\"Arial\"\ncommon lineHeight=27 base\n").unwrap_err();
        assert_eq!(err.line_number, 2);
        assert_eq!(err.line, "common lineHeight=27 base");
        assert_eq!(err.kind, TextErrorKind::ExpectedKeyValue("base".into()));

        let err = parse_text(b"info face=\"Arial size=1").unwrap_err();
        assert_eq!(err.line_number, 1);
        assert_eq!(err.kind, TextErrorKind::UnterminatedQuote);
    }

    #[test]
    fn numeric_fields_are_checked() {
        let err = parse_text(b"char id=65 x=-1").unwrap_err();
        assert_eq!(
            err.kind,
            TextErrorKind::OutOfRange { key: "x".into(), value: -1 }
        );

        let err = parse_text(b"kerning first=A").unwrap_err();
        assert_eq!(
            err.kind,
            TextErrorKind::InvalidInteger { key: "first".into(), value: "A".into() }
        );

        let font = parse_text(br#"page id="1" file=plain.png"#).unwrap();
        assert_eq!(font.pages, [Page { id: 1, file: "plain.png".into() }]);
    }

    #[test]
    fn unknown_tags_are_ignored() {
        let font = parse_text(b"chars count=1\nmystery a=1 b=\"2\"\nchar id=-1 chnl=15").unwrap();
        assert_eq!(font.chars.len(), 1);
        assert_eq!(font.chars[0].id, -1);
        assert_eq!(font.chars[0].chnl, Channel::ALL);
    }

    #[test]
    fn compound_attributes() {
        let font = parse_text(b"info padding=1,2,3,4 spacing=\"2,1\"").unwrap();
        assert_eq!(font.info.padding, Padding { up: 1, right: 2, down: 3, left: 4 });
        assert_eq!(font.info.spacing, Spacing { horizontal: 2, vertical: 1 });

        let font = parse_text(b"info padding=\"7\" spacing=1,2,3").unwrap();
        assert_eq!(font.info.padding, Padding { up: 7, right: 0, down: 0, left: 0 });
        assert_eq!(font.info.spacing, Spacing { horizontal: 1, vertical: 2 });
    }

    #[test]
    fn booleans() {
        let font = parse_text(b"info bold=1 italic=0 unicode=1 smooth=0\ncommon packed=1").unwrap();
        assert!(font.info.bold);
        assert!(!font.info.italic);
        assert!(font.info.unicode);
        assert!(!font.info.smooth);
        assert!(font.common.packed);
    }

    #[test]
    fn writes_canonical_lines() {
        let font = Font {
            info: Info {
                face: "Arial".into(),
                size: 32,
                unicode: true,
                stretch_h: 100,
                aa: 1,
                ..Info::default()
            },
            common: Common {
                line_height: 36,
                pages: 1,
                alpha_chnl: ChannelData::OUTLINE,
                ..Common::default()
            },
            pages: vec![Page { id: 0, file: "arial 0.png".into() }],
            chars: vec![Char { id: 32, xadvance: 8, chnl: Channel::ALL, ..Char::default() }],
            kernings: Vec::new(),
        };
        let text = String::from_utf8(serialize_text(&font).unwrap()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "info face=\"Arial\" size=32 bold=0 italic=0 charset=\"\" unicode=1 stretchH=100 smooth=0 aa=1 padding=0,0,0,0 spacing=0,0 outline=0",
                "common lineHeight=36 base=0 scaleW=0 scaleH=0 pages=1 packed=0 alphaChnl=1 redChnl=0 greenChnl=0 blueChnl=0",
                "page id=0 file=\"arial 0.png\"",
                "chars count=1",
                "char id=32 x=0 y=0 width=0 height=0 xoffset=0 yoffset=0 xadvance=8 page=0 chnl=15",
                "kernings count=0",
            ]
        );
        assert_eq!(parse_text(text.as_bytes()).unwrap(), font);
    }
}
