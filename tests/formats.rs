use pretty_assertions::assert_eq;

use bmf_codec::{
    parse, parse_binary, parse_text, parse_xml, serialize, serialize_binary, Channel, ChannelData, Char, Common,
    Font, Format, Info, Kerning, Padding, Page, Spacing,
};

const TEXT: &[u8] = include_bytes!("data/test-text.fnt");
const XML: &[u8] = include_bytes!("data/test-xml.fnt");
const BINARY: &[u8] = include_bytes!("data/test-bin.fnt");

fn glyph(id: i32, x: u16, y: u16, width: u16, height: u16, offset: (i16, i16), xadvance: i16, page: u8) -> Char {
    Char {
        id,
        x,
        y,
        width,
        height,
        xoffset: offset.0,
        yoffset: offset.1,
        xadvance,
        page,
        chnl: Channel::ALL,
    }
}

fn expected() -> Font {
    Font {
        info: Info {
            face: "Arial".into(),
            size: -26,
            bold: true,
            italic: true,
            charset: String::new(),
            unicode: true,
            stretch_h: 90,
            smooth: true,
            aa: 2,
            padding: Padding { up: 1, right: 2, down: 3, left: 4 },
            spacing: Spacing { horizontal: 2, vertical: 1 },
            outline: 2,
        },
        common: Common {
            line_height: 27,
            base: 22,
            scale_w: 32,
            scale_h: 64,
            pages: 2,
            packed: false,
            alpha_chnl: ChannelData::GLYPH,
            red_chnl: ChannelData::OUTLINE,
            green_chnl: ChannelData::ZERO,
            blue_chnl: ChannelData::ONE,
        },
        pages: vec![
            Page { id: 0, file: "test-bin_0.png".into() },
            Page { id: 1, file: "test-bin_1.png".into() },
        ],
        chars: vec![
            glyph(-1, 0, 26, 24, 23, (-3, 4), 19, 1),
            glyph(65, 0, 0, 29, 25, (-6, 2), 19, 0),
            glyph(84, 0, 0, 26, 25, (-3, 2), 16, 1),
            glyph(86, 0, 26, 29, 25, (-4, 2), 17, 0),
        ],
        kernings: vec![
            Kerning { first: 86, second: 65, amount: -2 },
            Kerning { first: 84, second: 65, amount: -2 },
            Kerning { first: 65, second: 86, amount: -2 },
            Kerning { first: 65, second: 84, amount: -2 },
        ],
    }
}

#[test]
fn text_fixture() {
    assert_eq!(parse_text(TEXT).unwrap(), expected());
}

#[test]
fn xml_fixture() {
    assert_eq!(parse_xml(XML).unwrap(), expected());
}

#[test]
fn binary_fixture() {
    assert_eq!(parse_binary(BINARY).unwrap(), expected());
}

#[test]
fn fixtures_are_detected() {
    assert_eq!(Format::detect(TEXT).unwrap(), Format::Text);
    assert_eq!(Format::detect(XML).unwrap(), Format::Xml);
    assert_eq!(Format::detect(BINARY).unwrap(), Format::Binary);

    for data in [TEXT, XML, BINARY] {
        assert_eq!(parse(data).unwrap(), expected());
    }
}

#[test]
fn binary_output_matches_the_fixture() {
    assert_eq!(serialize_binary(&expected()).unwrap(), BINARY);
}

#[test]
fn converts_between_all_formats() {
    let font = expected();
    for from in [Format::Text, Format::Xml, Format::Binary] {
        let source = parse(&serialize(&font, from).unwrap()).unwrap();
        for to in [Format::Text, Format::Xml, Format::Binary] {
            let converted = parse(&serialize(&source, to).unwrap()).unwrap();
            assert_eq!(converted, font, "{from} -> {to}");
        }
    }
}

#[test]
fn text_output_reads_like_bmfont() {
    let out = String::from_utf8(serialize(&expected(), Format::Text).unwrap()).unwrap();
    let mut lines = out.lines();
    assert!(lines.next().unwrap().starts_with(r#"info face="Arial" size=-26 bold=1 italic=1 charset="" unicode=1"#));
    assert!(lines.next().unwrap().starts_with("common lineHeight=27 base=22"));
    assert_eq!(lines.next(), Some(r#"page id=0 file="test-bin_0.png""#));
    assert_eq!(lines.next(), Some(r#"page id=1 file="test-bin_1.png""#));
    assert_eq!(lines.next(), Some("chars count=4"));
    assert!(out.contains("kernings count=4"));
}

#[test]
fn named_charsets_survive_binary() {
    let mut font = expected();
    font.info.unicode = false;
    font.info.charset = "Russian".into();
    let back = parse_binary(&serialize_binary(&font).unwrap()).unwrap();
    assert_eq!(back.info.charset, "Russian");

    font.info.charset = "204".into();
    let back = parse_binary(&serialize_binary(&font).unwrap()).unwrap();
    assert_eq!(back.info.charset, "Russian");
}

#[test]
fn truncated_binary_is_rejected() {
    for len in [5, 20, 60, BINARY.len() - 1] {
        assert!(parse(&BINARY[..len]).is_err(), "accepted {len} bytes");
    }
}
