//! Legacy Windows charset identifiers.
//!
//! The binary format stores the charset as a numeric id while the text and XML
//! formats use its symbolic name. Ids missing from the table are carried around
//! as decimal strings.

use std::borrow::Cow;

/// Known charset ids and their names.
///
/// Taken from the `CHARSET` constants of the Windows GDI.
pub const CHARSETS: &[(i32, &str)] = &[
    (0, "Ansi"),
    (1, "Default"),
    (2, "Symbol"),
    (77, "Mac"),
    (128, "ShiftJIS"),
    (129, "Hangul"),
    (130, "Johab"),
    (134, "GB2312"),
    (136, "ChineseBig5"),
    (161, "Greek"),
    (162, "Turkish"),
    (163, "Vietnamese"),
    (177, "Hebrew"),
    (178, "Arabic"),
    (186, "Baltic"),
    (204, "Russian"),
    (222, "Thai"),
    (238, "EastEurope"),
    (255, "Oem"),
];

/// Name of a known charset id.
#[must_use]
pub fn charset_name(id: i32) -> Option<&'static str> {
    CHARSETS
        .iter()
        .find(|&&(known, _)| known == id)
        .map(|&(_, name)| name)
}

/// Id of a known charset name, compared case-insensitively.
#[must_use]
pub fn charset_id(name: &str) -> Option<i32> {
    CHARSETS
        .iter()
        .find(|(_, known)| known.eq_ignore_ascii_case(name))
        .map(|&(id, _)| id)
}

/// Name of a charset id, or the id as a decimal string when it is not known.
///
/// ```
/// assert_eq!(bmf_codec::lookup_charset(204), "Russian");
/// assert_eq!(bmf_codec::lookup_charset(999), "999");
/// ```
#[must_use]
pub fn lookup_charset(id: i32) -> Cow<'static, str> {
    match charset_name(id) {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Owned(id.to_string()),
    }
}

/// Inverse of [`lookup_charset`]: a known name or a decimal literal.
#[must_use]
pub fn resolve_charset(name: &str) -> Option<i32> {
    let name = name.trim();
    charset_id(name).or_else(|| name.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_ids_agree() {
        for &(id, name) in CHARSETS {
            assert_eq!(charset_name(id), Some(name));
            assert_eq!(charset_id(name), Some(id));
        }
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(charset_id("shiftjis"), Some(128));
        assert_eq!(charset_id("OEM"), Some(255));
        assert_eq!(charset_id("Klingon"), None);
    }

    #[test]
    fn unknown_ids_fall_back_to_decimal() {
        assert_eq!(lookup_charset(0), "Ansi");
        assert_eq!(lookup_charset(999), "999");
        assert_eq!(resolve_charset("999"), Some(999));
        assert_eq!(resolve_charset("greek"), Some(161));
        assert_eq!(resolve_charset(""), None);
        assert_eq!(resolve_charset("nonsense"), None);
    }
}
