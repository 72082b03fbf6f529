//! The binary descriptor format, version 3.
//!
//! A file starts with the bytes `BMF` and a version byte, followed by blocks.
//! Each block is a type byte, a little-endian `u32` body length and the body:
//!
//! | type | block         | body                                              |
//! |------|---------------|---------------------------------------------------|
//! | 1    | info          | 14 bytes of fields and a null terminated face name |
//! | 2    | common        | 15 bytes of fields                                 |
//! | 3    | pages         | null terminated names, all padded to one width     |
//! | 4    | chars         | 20 bytes per glyph                                 |
//! | 5    | kerning pairs | 10 bytes per pair                                  |

use std::error::Error as StdError;
use std::fmt;
use std::io::{self, Write};

use thiserror::Error;

use crate::charset::{lookup_charset, resolve_charset};
use crate::meta::{Char, Channel, ChannelData, Common, Font, Info, Kerning, Padding, Page, Spacing};
use crate::reader::{Endian, ReadError, Reader};
use crate::writer::Writer;

const MAGIC: &[u8; 3] = b"BMF";
const VERSION: u8 = 3;

const INFO_FIXED_LEN: usize = 14;
const COMMON_LEN: usize = 15;
const CHAR_LEN: usize = 20;
const KERNING_LEN: usize = 10;

const SMOOTH: u8 = 1 << 7;
const UNICODE: u8 = 1 << 6;
const ITALIC: u8 = 1 << 5;
const BOLD: u8 = 1 << 4;
const PACKED: u8 = 1;

/// One of the five block types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Block {
    /// Block type 1.
    Info,
    /// Block type 2.
    Common,
    /// Block type 3.
    Pages,
    /// Block type 4.
    Chars,
    /// Block type 5.
    KerningPairs,
}

impl Block {
    /// The block stored under type byte `typ`.
    #[must_use]
    pub fn from_type(typ: u8) -> Option<Block> {
        match typ {
            1 => Some(Block::Info),
            2 => Some(Block::Common),
            3 => Some(Block::Pages),
            4 => Some(Block::Chars),
            5 => Some(Block::KerningPairs),
            _ => None,
        }
    }

    /// Type byte of this block.
    #[must_use]
    pub fn type_byte(self) -> u8 {
        match self {
            Block::Info => 1,
            Block::Common => 2,
            Block::Pages => 3,
            Block::Chars => 4,
            Block::KerningPairs => 5,
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Block::Info => "info",
            Block::Common => "common",
            Block::Pages => "pages",
            Block::Chars => "chars",
            Block::KerningPairs => "kerning pairs",
        })
    }
}

/// The part of a binary file an error was found in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Location {
    /// The `BMF` identifier and version byte.
    Header,
    /// The type byte of the next block.
    BetweenBlocks,
    /// Inside a block, including its length field.
    Block(Block),
}

/// Why a binary file was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BinaryErrorKind {
    /// A fixed-width field could not be read.
    #[error("expected {field}: {source}")]
    Field {
        /// Name of the field.
        field: &'static str,
        /// The failed read.
        #[source]
        source: ReadError,
    },
    /// The file does not start with `BMF`.
    #[error("expected file identifier 'BMF', found '{0}'")]
    BadMagic(String),
    /// The version byte is not 3.
    #[error("unsupported format version {0}, expected 3")]
    UnsupportedVersion(u8),
    /// The block type byte is not one of 1 to 5.
    #[error("invalid block type {0}, expected one of 1, 2, 3, 4, 5")]
    InvalidBlockType(u8),
    /// A block body was not consumed exactly.
    #[error("block length mismatch: declared {declared} bytes, used {consumed}")]
    LengthMismatch {
        /// Length from the block header.
        declared: u32,
        /// Bytes the block's fields took up.
        consumed: usize,
    },
    /// The pages block is no multiple of the record size set by its first name.
    #[error("block length {len} is not a multiple of the record size {record_len}")]
    InvalidRecordSize {
        /// Body length.
        len: usize,
        /// Size of one record.
        record_len: usize,
    },
    /// A string field does not end in a zero byte.
    #[error("{field} is not null terminated")]
    MissingTerminator {
        /// Name of the field.
        field: &'static str,
    },
    /// A record of the chars or kerning pairs block failed.
    #[error("{record} {index} of {total}: {source}")]
    Record {
        /// Kind of record.
        record: &'static str,
        /// 1-based index of the failing record.
        index: usize,
        /// Number of records in the block.
        total: usize,
        /// What went wrong inside the record.
        #[source]
        source: Box<BinaryErrorKind>,
    },
}

/// A binary file could not be parsed.
///
/// Carries where the problem was found; the cause is [`BinaryError::kind`],
/// also reachable through [`StdError::source`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryError {
    /// Absolute byte offset at which parsing stopped.
    pub offset: usize,
    /// Where in the file parsing stopped.
    pub location: Location,
    /// Body length declared by the block, once known.
    pub block_len: Option<u32>,
    /// The cause.
    pub kind: BinaryErrorKind,
}

impl fmt::Display for BinaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "format error at byte {}", self.offset)?;
        match (self.location, self.block_len) {
            (Location::Header, _) => f.write_str(" in header")?,
            (Location::BetweenBlocks, _) => f.write_str(" between blocks")?,
            (Location::Block(block), Some(len)) => write!(f, " in {block} block ({len} bytes)")?,
            (Location::Block(block), None) => write!(f, " in {block} block")?,
        }
        write!(f, ": {}", self.kind)
    }
}

impl BinaryError {
    /// The block parsing stopped in, if any.
    #[must_use]
    pub fn block(&self) -> Option<Block> {
        match self.location {
            Location::Block(block) => Some(block),
            Location::Header | Location::BetweenBlocks => None,
        }
    }
}

impl StdError for BinaryError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.kind)
    }
}

trait FieldExt<T> {
    fn field(self, field: &'static str) -> Result<T, BinaryErrorKind>;
}

impl<T> FieldExt<T> for Result<T, ReadError> {
    fn field(self, field: &'static str) -> Result<T, BinaryErrorKind> {
        self.map_err(|source| BinaryErrorKind::Field { field, source })
    }
}

/// Parse a binary descriptor.
///
/// Blocks may come in any order; a repeated info or common block replaces the
/// earlier one, repeated pages, chars and kerning pairs blocks append.
pub fn parse_binary(data: &[u8]) -> Result<Font, BinaryError> {
    let mut rd = Reader::new(data, Endian::Little);
    read_header(&mut rd).map_err(|kind| BinaryError {
        offset: rd.position(),
        location: Location::Header,
        block_len: None,
        kind,
    })?;

    let mut font = Font::default();
    while !rd.is_empty() {
        let typ = rd.read_u8().field("block type").map_err(|kind| BinaryError {
            offset: rd.position(),
            location: Location::BetweenBlocks,
            block_len: None,
            kind,
        })?;
        let block = Block::from_type(typ).ok_or(BinaryError {
            offset: rd.position() - 1,
            location: Location::BetweenBlocks,
            block_len: None,
            kind: BinaryErrorKind::InvalidBlockType(typ),
        })?;
        let len = rd.read_u32().field("block length").map_err(|kind| BinaryError {
            offset: rd.position(),
            location: Location::Block(block),
            block_len: None,
            kind,
        })?;

        let start = rd.position();
        let body = rd
            .read_bytes(usize::try_from(len).unwrap_or(usize::MAX))
            .field("block body")
            .map_err(|kind| BinaryError {
                offset: start,
                location: Location::Block(block),
                block_len: Some(len),
                kind,
            })?;

        let mut brd = Reader::with_base(body, start, Endian::Little);
        read_block(&mut brd, block, &mut font)
            .and_then(|()| {
                if brd.is_empty() {
                    Ok(())
                } else {
                    Err(BinaryErrorKind::LengthMismatch {
                        declared: len,
                        consumed: brd.consumed(),
                    })
                }
            })
            .map_err(|kind| BinaryError {
                offset: brd.position(),
                location: Location::Block(block),
                block_len: Some(len),
                kind,
            })?;
        log::debug!("decoded {block} block of {len} bytes at offset {start}");
    }

    Ok(font)
}

fn read_header(rd: &mut Reader<'_>) -> Result<(), BinaryErrorKind> {
    let magic = rd.read_bytes(MAGIC.len()).field("file identifier")?;
    if magic != MAGIC {
        return Err(BinaryErrorKind::BadMagic(
            String::from_utf8_lossy(magic).into_owned(),
        ));
    }
    let version = rd.read_u8().field("format version")?;
    if version != VERSION {
        return Err(BinaryErrorKind::UnsupportedVersion(version));
    }
    Ok(())
}

fn read_block(rd: &mut Reader<'_>, block: Block, font: &mut Font) -> Result<(), BinaryErrorKind> {
    match block {
        Block::Info => font.info = read_info(rd)?,
        Block::Common => font.common = read_common(rd)?,
        Block::Pages => {
            let pages = read_pages(rd, font.pages.len())?;
            font.pages.extend(pages);
        }
        Block::Chars => {
            let chars = read_records(rd, CHAR_LEN, "character", read_char)?;
            font.chars.extend(chars);
        }
        Block::KerningPairs => {
            let kernings = read_records(rd, KERNING_LEN, "kerning pair", read_kerning)?;
            font.kernings.extend(kernings);
        }
    }
    Ok(())
}

fn read_info(rd: &mut Reader<'_>) -> Result<Info, BinaryErrorKind> {
    let size = rd.read_i16().field("fontSize")?;
    let bits = rd.read_bits().field("bitField")?;
    let charset = rd.read_u8().field("charSet")?;
    let stretch_h = rd.read_u16().field("stretchH")?;
    let aa = rd.read_u8().field("aa")?;
    let padding = Padding {
        up: rd.read_i8().field("paddingUp")?,
        right: rd.read_i8().field("paddingRight")?,
        down: rd.read_i8().field("paddingDown")?,
        left: rd.read_i8().field("paddingLeft")?,
    };
    let spacing = Spacing {
        horizontal: rd.read_i8().field("spacingHoriz")?,
        vertical: rd.read_i8().field("spacingVert")?,
    };
    let outline = rd.read_u8().field("outline")?;

    let face_len = rd.remaining();
    let raw_face = rd.read_fixed_string(face_len).field("fontName")?;
    let face = raw_face
        .strip_suffix('\0')
        .ok_or(BinaryErrorKind::MissingTerminator { field: "fontName" })?;

    let unicode = bits & UNICODE != 0;
    Ok(Info {
        face: face.to_owned(),
        size,
        bold: bits & BOLD != 0,
        italic: bits & ITALIC != 0,
        charset: if unicode {
            String::new()
        } else {
            lookup_charset(charset.into()).into_owned()
        },
        unicode,
        stretch_h,
        smooth: bits & SMOOTH != 0,
        aa,
        padding,
        spacing,
        outline,
    })
}

fn read_common(rd: &mut Reader<'_>) -> Result<Common, BinaryErrorKind> {
    Ok(Common {
        line_height: rd.read_u16().field("lineHeight")?,
        base: rd.read_u16().field("base")?,
        scale_w: rd.read_u16().field("scaleW")?,
        scale_h: rd.read_u16().field("scaleH")?,
        pages: rd.read_u16().field("pages")?,
        packed: rd.read_bits().field("bitField")? & PACKED != 0,
        alpha_chnl: ChannelData(rd.read_u8().field("alphaChnl")?),
        red_chnl: ChannelData(rd.read_u8().field("redChnl")?),
        green_chnl: ChannelData(rd.read_u8().field("greenChnl")?),
        blue_chnl: ChannelData(rd.read_u8().field("blueChnl")?),
    })
}

/// The first name fixes the record width for the whole block.
fn read_pages(rd: &mut Reader<'_>, first_id: usize) -> Result<Vec<Page>, BinaryErrorKind> {
    let len = rd.remaining();
    if len == 0 {
        return Ok(Vec::new());
    }

    let first = rd.read_null_string(len).field("pageName")?;
    let stride = rd.consumed();
    if len % stride != 0 {
        return Err(BinaryErrorKind::InvalidRecordSize {
            len,
            record_len: stride,
        });
    }

    let mut names = vec![first];
    while !rd.is_empty() {
        let raw = rd.read_fixed_string(stride).field("pageName")?;
        let name = raw
            .strip_suffix('\0')
            .ok_or(BinaryErrorKind::MissingTerminator { field: "pageName" })?;
        names.push(name.to_owned());
    }

    Ok(names
        .into_iter()
        .zip(first_id..)
        .map(|(name, id)| Page {
            id: u32::try_from(id).unwrap_or(u32::MAX),
            file: name.trim_end_matches(' ').to_owned(),
        })
        .collect())
}

/// Reads records until the block is used up; a trailing partial record fails
/// on the first field that does not fit.
fn read_records<T>(
    rd: &mut Reader<'_>,
    record_len: usize,
    record: &'static str,
    read_one: fn(&mut Reader<'_>) -> Result<T, BinaryErrorKind>,
) -> Result<Vec<T>, BinaryErrorKind> {
    let total = rd.remaining().div_ceil(record_len);
    let mut records = Vec::with_capacity(total);
    while !rd.is_empty() {
        let index = records.len() + 1;
        let one = read_one(rd).map_err(|source| BinaryErrorKind::Record {
            record,
            index,
            total,
            source: Box::new(source),
        })?;
        records.push(one);
    }
    Ok(records)
}

fn read_char(rd: &mut Reader<'_>) -> Result<Char, BinaryErrorKind> {
    Ok(Char {
        id: rd.read_i32().field("id")?,
        x: rd.read_u16().field("x")?,
        y: rd.read_u16().field("y")?,
        width: rd.read_u16().field("width")?,
        height: rd.read_u16().field("height")?,
        xoffset: rd.read_i16().field("xoffset")?,
        yoffset: rd.read_i16().field("yoffset")?,
        xadvance: rd.read_i16().field("xadvance")?,
        page: rd.read_u8().field("page")?,
        chnl: Channel(rd.read_u8().field("chnl")?),
    })
}

fn read_kerning(rd: &mut Reader<'_>) -> Result<Kerning, BinaryErrorKind> {
    Ok(Kerning {
        first: rd.read_i32().field("first")?,
        second: rd.read_i32().field("second")?,
        amount: rd.read_i16().field("amount")?,
    })
}

/// Serialize `font` as a binary descriptor.
pub fn serialize_binary(font: &Font) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    write_binary(font, &mut out)?;
    Ok(out)
}

/// Write `font` as a binary descriptor into `dst`.
///
/// All five blocks are always written, in type order. Page names are padded
/// with spaces to the length of the longest one.
///
/// The charset is stored as a single byte id. An empty or unknown charset name
/// is written as 0, which reads back as `"Ansi"`; a charset whose id is above
/// 255 fails with [`io::ErrorKind::InvalidInput`].
pub fn write_binary<W: Write>(font: &Font, dst: W) -> io::Result<()> {
    let mut wr = Writer::new(dst, Endian::Little);
    wr.write_bytes(MAGIC)?;
    wr.write_u8(VERSION)?;

    write_info(&mut wr, &font.info)?;
    write_common(&mut wr, &font.common)?;
    write_pages(&mut wr, &font.pages)?;

    block_header(&mut wr, Block::Chars, CHAR_LEN * font.chars.len())?;
    for ch in &font.chars {
        wr.write_i32(ch.id)?;
        wr.write_u16(ch.x)?;
        wr.write_u16(ch.y)?;
        wr.write_u16(ch.width)?;
        wr.write_u16(ch.height)?;
        wr.write_i16(ch.xoffset)?;
        wr.write_i16(ch.yoffset)?;
        wr.write_i16(ch.xadvance)?;
        wr.write_u8(ch.page)?;
        wr.write_u8(ch.chnl.0)?;
    }

    block_header(&mut wr, Block::KerningPairs, KERNING_LEN * font.kernings.len())?;
    for kerning in &font.kernings {
        wr.write_i32(kerning.first)?;
        wr.write_i32(kerning.second)?;
        wr.write_i16(kerning.amount)?;
    }

    Ok(())
}

fn block_header<W: Write>(wr: &mut Writer<W>, block: Block, len: usize) -> io::Result<()> {
    let len = u32::try_from(len).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{block} block of {len} bytes does not fit a u32 length"),
        )
    })?;
    log::debug!("encoding {block} block of {len} bytes");
    wr.write_u8(block.type_byte())?;
    wr.write_u32(len)
}

/// Charset byte of a non-unicode font.
///
/// Names that resolve to no id at all are written as 0; ids that resolve but do
/// not fit a byte are rejected.
fn charset_byte(info: &Info) -> io::Result<u8> {
    if info.charset.is_empty() {
        return Ok(0);
    }
    let Some(id) = resolve_charset(&info.charset) else {
        log::warn!("unknown charset {:?}, writing 0", info.charset);
        return Ok(0);
    };
    u8::try_from(id).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("charset id {id} does not fit the single charset byte"),
        )
    })
}

fn write_info<W: Write>(wr: &mut Writer<W>, info: &Info) -> io::Result<()> {
    let charset = charset_byte(info)?;
    block_header(wr, Block::Info, INFO_FIXED_LEN + info.face.len() + 1)?;
    wr.write_i16(info.size)?;

    let mut bits = 0;
    for (flag, bit) in [
        (info.smooth, SMOOTH),
        (info.unicode, UNICODE),
        (info.italic, ITALIC),
        (info.bold, BOLD),
    ] {
        if flag {
            bits |= bit;
        }
    }
    wr.write_bits(bits)?;
    wr.write_u8(charset)?;
    wr.write_u16(info.stretch_h)?;
    wr.write_u8(info.aa)?;
    wr.write_i8(info.padding.up)?;
    wr.write_i8(info.padding.right)?;
    wr.write_i8(info.padding.down)?;
    wr.write_i8(info.padding.left)?;
    wr.write_i8(info.spacing.horizontal)?;
    wr.write_i8(info.spacing.vertical)?;
    wr.write_u8(info.outline)?;
    wr.write_null_str(&info.face)
}

fn write_common<W: Write>(wr: &mut Writer<W>, common: &Common) -> io::Result<()> {
    block_header(wr, Block::Common, COMMON_LEN)?;
    wr.write_u16(common.line_height)?;
    wr.write_u16(common.base)?;
    wr.write_u16(common.scale_w)?;
    wr.write_u16(common.scale_h)?;
    wr.write_u16(common.pages)?;
    wr.write_bits(if common.packed { PACKED } else { 0 })?;
    wr.write_u8(common.alpha_chnl.0)?;
    wr.write_u8(common.red_chnl.0)?;
    wr.write_u8(common.green_chnl.0)?;
    wr.write_u8(common.blue_chnl.0)
}

fn write_pages<W: Write>(wr: &mut Writer<W>, pages: &[Page]) -> io::Result<()> {
    let width = pages.iter().map(|page| page.file.len()).max().unwrap_or(0);
    block_header(wr, Block::Pages, (width + 1) * pages.len())?;
    for (index, page) in pages.iter().enumerate() {
        if usize::try_from(page.id).map_or(true, |id| id != index) {
            log::warn!("page {} is stored at position {index}", page.id);
        }
        wr.write_str(&page.file)?;
        wr.write_bytes(&vec![b' '; width - page.file.len()])?;
        wr.write_u8(0)?;
    }
    Ok(())
}
