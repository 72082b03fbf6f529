use std::convert::Infallible;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

/// Runtime representation of a complete BMFont descriptor.
///
/// Every codec in this crate reads into and writes out of this one structure.
/// The order of `pages`, `chars` and `kernings` is kept exactly as it was
/// encountered, so a parse followed by a serialize reproduces the input order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "serde-deserialize", derive(serde::Deserialize))]
pub struct Font {
    /// How the font was generated.
    pub info: Info,
    /// Metrics shared by all glyphs.
    pub common: Common,
    /// Texture pages, indexed by [`Char::page`].
    pub pages: Vec<Page>,
    /// Glyph descriptions.
    pub chars: Vec<Char>,
    /// Pairwise horizontal adjustments.
    pub kernings: Vec<Kerning>,
}

/// Information on how the font was generated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "serde-deserialize", derive(serde::Deserialize))]
pub struct Info {
    /// Name of the true type font.
    pub face: String,
    /// Size of the true type font. Negative values mean the size matches the cell height.
    pub size: i16,
    /// Whether the font is bold.
    pub bold: bool,
    /// Whether the font is italic.
    pub italic: bool,
    /// Name of the OEM charset, empty when `unicode` is set.
    ///
    /// Unknown charset ids are kept as their decimal representation.
    pub charset: String,
    /// Whether the font uses the unicode charset.
    pub unicode: bool,
    /// Font height stretch in percent; 100 means no stretch.
    pub stretch_h: u16,
    /// Whether smoothing was turned on.
    pub smooth: bool,
    /// Supersampling level; 1 means no supersampling.
    pub aa: u8,
    /// Padding around each glyph.
    pub padding: Padding,
    /// Spacing between glyphs.
    pub spacing: Spacing,
    /// Outline thickness.
    pub outline: u8,
}

/// Information common to all glyphs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "serde-deserialize", derive(serde::Deserialize))]
pub struct Common {
    /// Distance in pixels between each line of text.
    pub line_height: u16,
    /// Pixels from the absolute top of the line to the base of the glyphs.
    pub base: u16,
    /// Width of the texture pages.
    pub scale_w: u16,
    /// Height of the texture pages.
    pub scale_h: u16,
    /// Number of texture pages, as declared by the descriptor.
    pub pages: u16,
    /// Whether monochrome glyphs are packed into each of the color channels.
    pub packed: bool,
    /// Contents of the alpha channel.
    pub alpha_chnl: ChannelData,
    /// Contents of the red channel.
    pub red_chnl: ChannelData,
    /// Contents of the green channel.
    pub green_chnl: ChannelData,
    /// Contents of the blue channel.
    pub blue_chnl: ChannelData,
}

/// A texture page holding glyph images.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "serde-deserialize", derive(serde::Deserialize))]
pub struct Page {
    /// Page index, equal to the page's position in [`Font::pages`].
    pub id: u32,
    /// Texture file name.
    pub file: String,
}

/// Description of one glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "serde-deserialize", derive(serde::Deserialize))]
pub struct Char {
    /// Code point. Negative ids occur in the wild (`-1` for the fallback glyph) and are kept as is.
    pub id: i32,
    /// Left edge of the glyph image in the texture.
    pub x: u16,
    /// Top edge of the glyph image in the texture.
    pub y: u16,
    /// Width of the glyph image.
    pub width: u16,
    /// Height of the glyph image.
    pub height: u16,
    /// Horizontal offset applied when copying the image to the screen.
    pub xoffset: i16,
    /// Vertical offset applied when copying the image to the screen.
    pub yoffset: i16,
    /// How far to advance the cursor after drawing the glyph.
    pub xadvance: i16,
    /// Texture page holding the glyph image.
    pub page: u8,
    /// Channels holding the glyph image.
    pub chnl: Channel,
}

/// Horizontal adjustment between a pair of glyphs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "serde-deserialize", derive(serde::Deserialize))]
pub struct Kerning {
    /// Code point of the left glyph.
    pub first: i32,
    /// Code point of the right glyph.
    pub second: i32,
    /// Adjustment of the cursor position when `second` follows `first`.
    pub amount: i16,
}

/// Padding around each glyph, in pixels.
///
/// Written as `up,right,down,left` in the text and XML formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "serde-deserialize", derive(serde::Deserialize))]
pub struct Padding {
    /// Padding above.
    pub up: i8,
    /// Padding to the right.
    pub right: i8,
    /// Padding below.
    pub down: i8,
    /// Padding to the left.
    pub left: i8,
}

/// Spacing between glyphs, in pixels.
///
/// Written as `horizontal,vertical` in the text and XML formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "serde-deserialize", derive(serde::Deserialize))]
pub struct Spacing {
    /// Horizontal spacing.
    pub horizontal: i8,
    /// Vertical spacing.
    pub vertical: i8,
}

/// Splits a comma separated list into at most `N` integers.
///
/// Missing and unparsable components are zero, extra components are ignored.
fn comma_list<const N: usize>(s: &str) -> [i8; N] {
    let mut out = [0; N];
    for (slot, part) in out.iter_mut().zip(s.split(',')) {
        *slot = part.trim().parse().unwrap_or(0);
    }
    out
}

impl FromStr for Padding {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [up, right, down, left] = comma_list(s);
        Ok(Padding { up, right, down, left })
    }
}

impl fmt::Display for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.up, self.right, self.down, self.left)
    }
}

impl FromStr for Spacing {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [horizontal, vertical] = comma_list(s);
        Ok(Spacing { horizontal, vertical })
    }
}

impl fmt::Display for Spacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.horizontal, self.vertical)
    }
}

/// What a texture color channel holds.
///
/// Stored as a raw ordinal so that values outside the documented range
/// survive a round trip unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "serde-deserialize", derive(serde::Deserialize))]
#[cfg_attr(any(feature = "serde-serialize", feature = "serde-deserialize"), serde(transparent))]
pub struct ChannelData(pub u8);

impl ChannelData {
    /// The channel holds the glyph data.
    pub const GLYPH: ChannelData = ChannelData(0);
    /// The channel holds the outline.
    pub const OUTLINE: ChannelData = ChannelData(1);
    /// The channel holds the glyph and the outline.
    pub const GLYPH_AND_OUTLINE: ChannelData = ChannelData(2);
    /// The channel is set to zero.
    pub const ZERO: ChannelData = ChannelData(3);
    /// The channel is set to one.
    pub const ONE: ChannelData = ChannelData(4);

    /// Whether this is one of the five documented values.
    #[must_use]
    pub fn is_known(self) -> bool {
        self.0 <= Self::ONE.0
    }
}

impl From<u8> for ChannelData {
    fn from(raw: u8) -> Self {
        ChannelData(raw)
    }
}

impl fmt::Display for ChannelData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::GLYPH => f.write_str("glyph"),
            Self::OUTLINE => f.write_str("outline"),
            Self::GLYPH_AND_OUTLINE => f.write_str("glyph and outline"),
            Self::ZERO => f.write_str("zero"),
            Self::ONE => f.write_str("one"),
            ChannelData(raw) => write!(f, "unknown ({raw})"),
        }
    }
}

/// Bitmask of the texture channels a glyph is found in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "serde-deserialize", derive(serde::Deserialize))]
#[cfg_attr(any(feature = "serde-serialize", feature = "serde-deserialize"), serde(transparent))]
pub struct Channel(pub u8);

impl Channel {
    /// Blue channel.
    pub const BLUE: Channel = Channel(0x1);
    /// Green channel.
    pub const GREEN: Channel = Channel(0x2);
    /// Red channel.
    pub const RED: Channel = Channel(0x4);
    /// Alpha channel.
    pub const ALPHA: Channel = Channel(0x8);
    /// All four channels.
    pub const ALL: Channel = Channel(0xf);

    /// Whether every bit of `other` is set in `self`.
    #[must_use]
    pub fn contains(self, other: Channel) -> bool {
        self.0 & other.0 == other.0
    }
}

impl From<u8> for Channel {
    fn from(raw: u8) -> Self {
        Channel(raw)
    }
}

impl BitOr for Channel {
    type Output = Channel;

    fn bitor(self, rhs: Channel) -> Channel {
        Channel(self.0 | rhs.0)
    }
}

impl BitOrAssign for Channel {
    fn bitor_assign(&mut self, rhs: Channel) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_lists() {
        let full: Padding = "1,2,3,4".parse().unwrap();
        assert_eq!(full, Padding { up: 1, right: 2, down: 3, left: 4 });
        assert_eq!(full.to_string(), "1,2,3,4");

        let short: Padding = "5,6".parse().unwrap();
        assert_eq!(short, Padding { up: 5, right: 6, down: 0, left: 0 });

        let garbled: Padding = "x, 7,,-2,9".parse().unwrap();
        assert_eq!(garbled, Padding { up: 0, right: 7, down: 0, left: -2 });
    }

    #[test]
    fn spacing_lists() {
        let spacing: Spacing = "2,1,8".parse().unwrap();
        assert_eq!(spacing, Spacing { horizontal: 2, vertical: 1 });
        assert_eq!(spacing.to_string(), "2,1");
        assert_eq!("".parse::<Spacing>().unwrap(), Spacing::default());
    }

    #[test]
    fn channel_bits() {
        let rgb = Channel::RED | Channel::GREEN | Channel::BLUE;
        assert!(Channel::ALL.contains(rgb));
        assert!(!rgb.contains(Channel::ALPHA));

        let mut all = rgb;
        all |= Channel::ALPHA;
        assert_eq!(all, Channel::ALL);
    }

    #[test]
    fn unknown_channel_data_is_kept() {
        let odd = ChannelData::from(9);
        assert!(!odd.is_known());
        assert!(ChannelData::ONE.is_known());
        assert_eq!(odd.to_string(), "unknown (9)");
        assert_eq!(ChannelData::GLYPH_AND_OUTLINE.to_string(), "glyph and outline");
    }
}
