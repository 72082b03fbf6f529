//! Reader and writer for [AngelCode BMFont](https://www.angelcode.com/products/bmfont/doc/file_format.html)
//! descriptor files.
//!
//! BMFont descriptors come in three encodings, all holding the same
//! information: a line based text format, an XML format and a compact binary
//! format (version 3). Each of them is read into the one [`Font`] model and
//! can be written back out from it.
//!
//! # Usage
//! ## Auto-detection
//! ```
//! # fn test() -> Result<(), bmf_codec::Error> {
//! const DESCRIPTOR: &str = r#"info face="Arial" size=32 bold=0 italic=0 charset="" unicode=1 stretchH=100 smooth=1 aa=1 padding=0,0,0,0 spacing=1,1 outline=0
//! common lineHeight=36 base=29 scaleW=256 scaleH=256 pages=1 packed=0 alphaChnl=1 redChnl=0 greenChnl=0 blueChnl=0
//! page id=0 file="arial.png"
//! chars count=1
//! char id=65 x=0 y=0 width=22 height=24 xoffset=0 yoffset=5 xadvance=21 page=0 chnl=15
//! "#;
//! let font = bmf_codec::parse(DESCRIPTOR.as_bytes())?;
//! assert_eq!(font.info.face, "Arial");
//! assert_eq!(font.chars[0].xadvance, 21);
//! # Ok(())
//! # }
//! # test().unwrap();
//! ```
//!
//! ## Converting
//! ```
//! # fn test() -> Result<(), bmf_codec::Error> {
//! use bmf_codec::{Font, Format, Page};
//!
//! let mut font = Font::default();
//! font.pages.push(Page { id: 0, file: "atlas.png".into() });
//!
//! let binary = bmf_codec::serialize(&font, Format::Binary)?;
//! assert_eq!(Format::detect(&binary)?, Format::Binary);
//!
//! let back = bmf_codec::parse_binary(&binary)?;
//! assert_eq!(back.pages, font.pages);
//! # Ok(())
//! # }
//! # test().unwrap();
//! ```

#![cfg_attr(docs_rs, feature(doc_cfg))]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]

mod binary;
mod charset;
mod error;
mod meta;
pub mod reader;
mod text;
pub mod writer;
mod xml;

use std::fmt;
use std::io::Read;

pub use binary::{
    parse_binary, serialize_binary, write_binary, BinaryError, BinaryErrorKind, Block, Location,
};
pub use charset::{charset_id, charset_name, lookup_charset, resolve_charset, CHARSETS};
pub use error::{Error, Result};
pub use meta::{Channel, ChannelData, Char, Common, Font, Info, Kerning, Padding, Page, Spacing};
pub use text::{parse_text, serialize_text, write_text, TextError, TextErrorKind};
pub use xml::{parse_xml, serialize_xml, XmlError};

/// Bytes inspected by [`Format::detect`].
const SNIFF_LEN: usize = 5;

/// One of the three descriptor encodings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// Line based `key=value` text.
    Text,
    /// XML with a `<font>` root.
    Xml,
    /// Block based binary, version 3.
    Binary,
}

impl Format {
    /// Tell the encoding of `data` from its first bytes.
    ///
    /// Anything that is neither binary (`BMF`) nor XML (`<?xml`) is assumed to
    /// be text, so errors in malformed input surface from the text parser.
    pub fn detect(data: &[u8]) -> Result<Format> {
        if data.len() < SNIFF_LEN {
            return Err(Error::InsufficientData { len: data.len() });
        }
        Ok(if data.starts_with(b"BMF") {
            Format::Binary
        } else if data.starts_with(b"<?xml") {
            Format::Xml
        } else {
            Format::Text
        })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Text => "text",
            Format::Xml => "XML",
            Format::Binary => "binary",
        })
    }
}

/// Parse a descriptor in any of the three encodings.
pub fn parse(data: &[u8]) -> Result<Font> {
    let format = Format::detect(data)?;
    log::debug!("parsing {} byte {format} descriptor", data.len());
    Ok(match format {
        Format::Binary => parse_binary(data)?,
        Format::Xml => parse_xml(data)?,
        Format::Text => parse_text(data)?,
    })
}

/// Read `src` to its end and [`parse`] it.
pub fn from_reader<R: Read>(mut src: R) -> Result<Font> {
    let mut data = Vec::new();
    src.read_to_end(&mut data)?;
    parse(&data)
}

/// Serialize `font` in the given encoding.
pub fn serialize(font: &Font, format: Format) -> Result<Vec<u8>> {
    Ok(match format {
        Format::Binary => serialize_binary(font)?,
        Format::Xml => serialize_xml(font)?,
        Format::Text => serialize_text(font)?,
    })
}
