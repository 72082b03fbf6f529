//! The XML format.
//!
//! Same attribute names as the text format, nested under a `<font>` root:
//!
//! ```xml
//! <?xml version="1.0"?>
//! <font>
//!   <info face="Arial" size="-26" bold="1" italic="1" charset="" unicode="1" stretchH="90" smooth="1" aa="2" padding="1,2,3,4" spacing="2,1" outline="2"/>
//!   <common lineHeight="27" base="22" scaleW="32" scaleH="64" pages="2" packed="0" alphaChnl="0" redChnl="1" greenChnl="3" blueChnl="4"/>
//!   <pages>
//!     <page id="0" file="test_0.png"/>
//!   </pages>
//!   <chars count="1">
//!     <char id="65" x="0" y="0" width="29" height="25" xoffset="-6" yoffset="2" xadvance="19" page="0" chnl="15"/>
//!   </chars>
//!   <kernings count="1">
//!     <kerning first="86" second="65" amount="-2"/>
//!   </kernings>
//! </font>
//! ```

use quick_xml::DeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::meta::{Channel, ChannelData, Char, Common, Font, Info, Kerning, Padding, Page, Spacing};

/// An XML document could not be read or written.
#[derive(Debug, Error)]
pub enum XmlError {
    /// The document is not well formed or an attribute has the wrong type.
    #[error("malformed XML descriptor: {0}")]
    Decode(#[source] DeError),
    /// The font could not be encoded.
    #[error("could not encode XML descriptor: {0}")]
    Encode(#[source] DeError),
}

/// Booleans are written as `0` and `1`.
mod bin_bool {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(if *value { "1" } else { "0" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(d)?;
        match raw.trim() {
            "true" => Ok(true),
            "false" | "" => Ok(false),
            other => other
                .parse::<i64>()
                .map(|value| value != 0)
                .map_err(|_| D::Error::custom(format!("expected 0 or 1, found '{other}'"))),
        }
    }
}

/// Padding and spacing are comma separated lists.
mod comma_list {
    use std::convert::Infallible;
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<T: Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(d: D) -> Result<T, D::Error>
    where
        T: FromStr<Err = Infallible>,
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(d)?;
        Ok(raw.parse().unwrap_or_else(|never: Infallible| match never {}))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "font")]
struct XmlFont {
    #[serde(default)]
    info: XmlInfo,
    #[serde(default)]
    common: XmlCommon,
    #[serde(default)]
    pages: XmlPages,
    #[serde(default)]
    chars: XmlChars,
    #[serde(default)]
    kernings: XmlKernings,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct XmlInfo {
    #[serde(rename = "@face")]
    face: String,
    #[serde(rename = "@size")]
    size: i16,
    #[serde(rename = "@bold", with = "bin_bool")]
    bold: bool,
    #[serde(rename = "@italic", with = "bin_bool")]
    italic: bool,
    #[serde(rename = "@charset")]
    charset: String,
    #[serde(rename = "@unicode", with = "bin_bool")]
    unicode: bool,
    #[serde(rename = "@stretchH")]
    stretch_h: u16,
    #[serde(rename = "@smooth", with = "bin_bool")]
    smooth: bool,
    #[serde(rename = "@aa")]
    aa: u8,
    #[serde(rename = "@padding", with = "comma_list")]
    padding: Padding,
    #[serde(rename = "@spacing", with = "comma_list")]
    spacing: Spacing,
    #[serde(rename = "@outline")]
    outline: u8,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct XmlCommon {
    #[serde(rename = "@lineHeight")]
    line_height: u16,
    #[serde(rename = "@base")]
    base: u16,
    #[serde(rename = "@scaleW")]
    scale_w: u16,
    #[serde(rename = "@scaleH")]
    scale_h: u16,
    #[serde(rename = "@pages")]
    pages: u16,
    #[serde(rename = "@packed", with = "bin_bool")]
    packed: bool,
    #[serde(rename = "@alphaChnl")]
    alpha_chnl: u8,
    #[serde(rename = "@redChnl")]
    red_chnl: u8,
    #[serde(rename = "@greenChnl")]
    green_chnl: u8,
    #[serde(rename = "@blueChnl")]
    blue_chnl: u8,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlPages {
    #[serde(rename = "page", default)]
    pages: Vec<XmlPage>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct XmlPage {
    #[serde(rename = "@id")]
    id: u32,
    #[serde(rename = "@file")]
    file: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlChars {
    #[serde(rename = "@count", default)]
    count: usize,
    #[serde(rename = "char", default)]
    chars: Vec<XmlChar>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct XmlChar {
    #[serde(rename = "@id")]
    id: i32,
    #[serde(rename = "@x")]
    x: u16,
    #[serde(rename = "@y")]
    y: u16,
    #[serde(rename = "@width")]
    width: u16,
    #[serde(rename = "@height")]
    height: u16,
    #[serde(rename = "@xoffset")]
    xoffset: i16,
    #[serde(rename = "@yoffset")]
    yoffset: i16,
    #[serde(rename = "@xadvance")]
    xadvance: i16,
    #[serde(rename = "@page")]
    page: u8,
    #[serde(rename = "@chnl")]
    chnl: u8,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlKernings {
    #[serde(rename = "@count", default)]
    count: usize,
    #[serde(rename = "kerning", default)]
    kernings: Vec<XmlKerning>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct XmlKerning {
    #[serde(rename = "@first")]
    first: i32,
    #[serde(rename = "@second")]
    second: i32,
    #[serde(rename = "@amount")]
    amount: i16,
}

impl From<XmlFont> for Font {
    fn from(xml: XmlFont) -> Self {
        let XmlInfo {
            face,
            size,
            bold,
            italic,
            charset,
            unicode,
            stretch_h,
            smooth,
            aa,
            padding,
            spacing,
            outline,
        } = xml.info;
        let XmlCommon {
            line_height,
            base,
            scale_w,
            scale_h,
            pages,
            packed,
            alpha_chnl,
            red_chnl,
            green_chnl,
            blue_chnl,
        } = xml.common;

        Font {
            info: Info {
                face,
                size,
                bold,
                italic,
                charset,
                unicode,
                stretch_h,
                smooth,
                aa,
                padding,
                spacing,
                outline,
            },
            common: Common {
                line_height,
                base,
                scale_w,
                scale_h,
                pages,
                packed,
                alpha_chnl: ChannelData(alpha_chnl),
                red_chnl: ChannelData(red_chnl),
                green_chnl: ChannelData(green_chnl),
                blue_chnl: ChannelData(blue_chnl),
            },
            pages: xml
                .pages
                .pages
                .into_iter()
                .map(|XmlPage { id, file }| Page { id, file })
                .collect(),
            chars: xml
                .chars
                .chars
                .into_iter()
                .map(|ch| Char {
                    id: ch.id,
                    x: ch.x,
                    y: ch.y,
                    width: ch.width,
                    height: ch.height,
                    xoffset: ch.xoffset,
                    yoffset: ch.yoffset,
                    xadvance: ch.xadvance,
                    page: ch.page,
                    chnl: Channel(ch.chnl),
                })
                .collect(),
            kernings: xml
                .kernings
                .kernings
                .into_iter()
                .map(|XmlKerning { first, second, amount }| Kerning { first, second, amount })
                .collect(),
        }
    }
}

impl From<&Font> for XmlFont {
    fn from(font: &Font) -> Self {
        let info = &font.info;
        let common = &font.common;
        XmlFont {
            info: XmlInfo {
                face: info.face.clone(),
                size: info.size,
                bold: info.bold,
                italic: info.italic,
                charset: info.charset.clone(),
                unicode: info.unicode,
                stretch_h: info.stretch_h,
                smooth: info.smooth,
                aa: info.aa,
                padding: info.padding,
                spacing: info.spacing,
                outline: info.outline,
            },
            common: XmlCommon {
                line_height: common.line_height,
                base: common.base,
                scale_w: common.scale_w,
                scale_h: common.scale_h,
                pages: common.pages,
                packed: common.packed,
                alpha_chnl: common.alpha_chnl.0,
                red_chnl: common.red_chnl.0,
                green_chnl: common.green_chnl.0,
                blue_chnl: common.blue_chnl.0,
            },
            pages: XmlPages {
                pages: font
                    .pages
                    .iter()
                    .map(|page| XmlPage {
                        id: page.id,
                        file: page.file.clone(),
                    })
                    .collect(),
            },
            chars: XmlChars {
                count: font.chars.len(),
                chars: font
                    .chars
                    .iter()
                    .map(|ch| XmlChar {
                        id: ch.id,
                        x: ch.x,
                        y: ch.y,
                        width: ch.width,
                        height: ch.height,
                        xoffset: ch.xoffset,
                        yoffset: ch.yoffset,
                        xadvance: ch.xadvance,
                        page: ch.page,
                        chnl: ch.chnl.0,
                    })
                    .collect(),
            },
            kernings: XmlKernings {
                count: font.kernings.len(),
                kernings: font
                    .kernings
                    .iter()
                    .map(|k| XmlKerning {
                        first: k.first,
                        second: k.second,
                        amount: k.amount,
                    })
                    .collect(),
            },
        }
    }
}

/// Parse an XML descriptor.
///
/// Missing elements and attributes keep their default values; unknown ones
/// are ignored.
pub fn parse_xml(data: &[u8]) -> Result<Font, XmlError> {
    let xml: XmlFont = quick_xml::de::from_reader(data).map_err(XmlError::Decode)?;
    log::debug!(
        "decoded XML descriptor with {} pages, {} chars, {} kerning pairs",
        xml.pages.pages.len(),
        xml.chars.chars.len(),
        xml.kernings.kernings.len(),
    );
    Ok(xml.into())
}

/// Serialize `font` as an indented XML descriptor.
pub fn serialize_xml(font: &Font) -> Result<Vec<u8>, XmlError> {
    let mut out = String::from("<?xml version=\"1.0\"?>\n");
    let mut ser = quick_xml::se::Serializer::new(&mut out);
    ser.indent(' ', 2);
    XmlFont::from(font)
        .serialize(ser)
        .map_err(XmlError::Encode)?;
    out.push('\n');
    Ok(out.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0"?>
<font>
  <info face="Times New Roman" size="32" bold="0" italic="1" charset="Russian" unicode="0" stretchH="100" smooth="1" aa="1" padding="0,1,2,3" spacing="1,1" outline="0"/>
  <common lineHeight="36" base="29" scaleW="256" scaleH="256" pages="1" packed="0" alphaChnl="1" redChnl="0" greenChnl="0" blueChnl="0"/>
  <pages>
    <page id="0" file="times_0.png" />
  </pages>
  <chars count="2">
    <char id="-1" x="0" y="26" width="24" height="23" xoffset="-3" yoffset="4" xadvance="19" page="0" chnl="15" />
    <char id="65" x="0" y="0" width="22" height="24" xoffset="0" yoffset="5" xadvance="21" page="0" chnl="15" />
  </chars>
</font>
"#;

    #[test]
    fn reads_attributes() {
        let font = parse_xml(DOC.as_bytes()).unwrap();
        assert_eq!(font.info.face, "Times New Roman");
        assert!(font.info.italic);
        assert!(!font.info.bold);
        assert_eq!(font.info.charset, "Russian");
        assert_eq!(font.info.padding, Padding { up: 0, right: 1, down: 2, left: 3 });
        assert_eq!(font.info.spacing, Spacing { horizontal: 1, vertical: 1 });
        assert_eq!(font.common.alpha_chnl, ChannelData::OUTLINE);
        assert_eq!(font.pages, [Page { id: 0, file: "times_0.png".into() }]);
        assert_eq!(font.chars.len(), 2);
        assert_eq!(font.chars[0].id, -1);
        assert_eq!(font.chars[0].xoffset, -3);
        assert_eq!(font.chars[1].chnl, Channel::ALL);
        assert!(font.kernings.is_empty());
    }

    #[test]
    fn writes_digits_for_booleans() {
        let mut font = parse_xml(DOC.as_bytes()).unwrap();
        font.kernings.push(Kerning { first: 65, second: 86, amount: -2 });
        let out = String::from_utf8(serialize_xml(&font).unwrap()).unwrap();
        assert!(out.starts_with("<?xml"));
        assert!(out.contains(r#"bold="0""#));
        assert!(out.contains(r#"italic="1""#));
        assert!(out.contains(r#"padding="0,1,2,3""#));
        assert!(out.contains(r#"spacing="1,1""#));
        assert!(out.contains(r#"first="65" second="86" amount="-2""#));
        assert_eq!(parse_xml(out.as_bytes()).unwrap(), font);
    }

    #[test]
    fn empty_font_round_trips() {
        let out = serialize_xml(&Font::default()).unwrap();
        assert_eq!(parse_xml(&out).unwrap(), Font::default());
    }

    #[test]
    fn rejects_bad_attribute_values() {
        let doc = r#"<?xml version="1.0"?><font><common lineHeight="tall"/></font>"#;
        assert!(matches!(parse_xml(doc.as_bytes()), Err(XmlError::Decode(_))));

        let doc = r#"<?xml version="1.0"?><font><info bold="maybe"/></font>"#;
        assert!(matches!(parse_xml(doc.as_bytes()), Err(XmlError::Decode(_))));
    }

    #[test]
    fn rejects_broken_documents() {
        let doc = r#"<?xml version="1.0"?><font><info face="x"></font>"#;
        assert!(parse_xml(doc.as_bytes()).is_err());
    }
}
