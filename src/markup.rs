//! Markup codec
//!
//! Converts `<COREF ID="X">payload</COREF>` annotations into an inline token
//! triplet and back:
//!
//! ```text
//! <COREF ID="A1">the committee</COREF> voted
//!    ↕
//! coref_tag_beg_A1_ the committee coref_tag_end_A1_ voted
//! ```
//!
//! The inline form survives sentence splitting and word tokenization, since
//! each marker is a single word that no ordinary text produces. Neither
//! direction ever fails: fragments that do not form a complete annotation are
//! passed through untouched.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::segment::Span;

/// Element name of a coreference annotation
pub const ANNOTATION_ELEMENT: &str = "COREF";

/// Prefix of the inline token opening an annotation
pub const BEGIN_PREFIX: &str = "coref_tag_beg_";

/// Prefix of the inline token closing an annotation
pub const END_PREFIX: &str = "coref_tag_end_";

static ANNOTATION_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<COREF ID="([A-Za-z0-9]+)">(.*?)</COREF>"#)
        .expect("annotation pattern is valid")
});

static BEGIN_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"coref_tag_beg_([A-Za-z0-9]+)_").expect("marker pattern is valid"));

static BEGIN_MARKER_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^coref_tag_beg_([A-Za-z0-9]+)_$").expect("marker pattern is valid")
});

static END_MARKER_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^coref_tag_end_([A-Za-z0-9]+)_$").expect("marker pattern is valid")
});

/// An inline annotation triplet found in decoded text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAnnotation<'a> {
    /// Annotation identifier
    pub id: &'a str,

    /// Text between the markers, without the padding spaces added by [`decode`]
    pub payload: &'a str,

    /// Byte range of the whole triplet, markers included
    pub span: Span,
}

/// Inline token opening annotation `id`
#[must_use]
pub fn begin_marker(id: &str) -> String {
    format!("{BEGIN_PREFIX}{id}_")
}

/// Inline token closing annotation `id`
#[must_use]
pub fn end_marker(id: &str) -> String {
    format!("{END_PREFIX}{id}_")
}

/// Identifier carried by a begin marker token, if `token` is one
#[must_use]
pub fn begin_marker_id(token: &str) -> Option<&str> {
    BEGIN_MARKER_TOKEN
        .captures(token)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Whether `token` is exactly an end marker
#[must_use]
pub fn is_end_marker(token: &str) -> bool {
    END_MARKER_TOKEN.is_match(token)
}

/// Opening annotation tag, optionally carrying a `REF` attribute
#[must_use]
pub fn open_tag(id: &str, reference: Option<&str>) -> String {
    match reference {
        Some(reference) => format!(r#"<{ANNOTATION_ELEMENT} ID="{id}" REF="{reference}">"#),
        None => format!(r#"<{ANNOTATION_ELEMENT} ID="{id}">"#),
    }
}

/// Replace every well-formed annotation element with its inline triplet
///
/// A candidate whose payload contains another opening tag is skipped and the
/// search resumes just after its opening `<`, so an unterminated tag never
/// swallows the annotations that follow it.
#[must_use]
pub fn decode(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    let mut last = 0;
    let mut pos = 0;

    while let Some(caps) = ANNOTATION_TAG.captures_at(text, pos) {
        let (Some(whole), Some(id), Some(payload)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            break;
        };

        if payload.as_str().to_ascii_lowercase().contains("<coref") {
            pos = whole.start() + 1;
            continue;
        }

        out.push_str(&text[last..whole.start()]);
        out.push_str(&begin_marker(id.as_str()));
        out.push(' ');
        out.push_str(payload.as_str());
        out.push(' ');
        out.push_str(&end_marker(id.as_str()));

        last = whole.end();
        pos = whole.end();
    }

    out.push_str(&text[last..]);
    out
}

/// Find every complete inline triplet, in text order
#[must_use]
pub fn inline_annotations(text: &str) -> Vec<InlineAnnotation<'_>> {
    let mut found = Vec::new();
    let mut pos = 0;

    while let Some(caps) = BEGIN_MARKER.captures_at(text, pos) {
        let (Some(begin), Some(id)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let id = id.as_str();
        let closing = end_marker(id);

        let Some(offset) = text[begin.end()..].find(&closing) else {
            pos = begin.end();
            continue;
        };

        let inner = &text[begin.end()..begin.end() + offset];
        if BEGIN_MARKER.is_match(inner) {
            pos = begin.end();
            continue;
        }

        let payload = inner.strip_prefix(' ').unwrap_or(inner);
        let payload = payload.strip_suffix(' ').unwrap_or(payload);
        let end = begin.end() + offset + closing.len();

        found.push(InlineAnnotation {
            id,
            payload,
            span: Span::new(begin.start(), end),
        });
        pos = end;
    }

    found
}

/// Replace every inline triplet with its annotation element
///
/// Exact inverse of [`decode`] on well-formed input. [`decode`] matches the
/// element and attribute names case-insensitively, but encode always writes
/// the upper-case `<COREF ID="...">` form, so lower-case tags come back
/// normalized.
#[must_use]
pub fn encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for annotation in inline_annotations(text) {
        out.push_str(&text[last..annotation.span.start]);
        out.push_str(&open_tag(annotation.id, None));
        out.push_str(annotation.payload);
        out.push_str("</");
        out.push_str(ANNOTATION_ELEMENT);
        out.push('>');
        last = annotation.span.end;
    }

    out.push_str(&text[last..]);
    out
}

/// Escape the XML special characters `&`, `<` and `>`
#[must_use]
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Undo [`escape`]
#[must_use]
pub fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// The document root element wrapping every input and output file
#[derive(Debug, Clone)]
pub struct RootElement {
    name: String,
    pattern: Regex,
}

impl RootElement {
    /// Create a root element handler for `name` (e.g. `TXT`)
    ///
    /// # Errors
    ///
    /// Returns an error if the name cannot be turned into a tag pattern
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::Config("root element name must not be empty".to_string()));
        }

        let pattern = Regex::new(&format!("(?i)</?{}>", regex::escape(&name)))
            .map_err(|e| Error::Config(format!("invalid root element `{name}`: {e}")))?;

        Ok(Self { name, pattern })
    }

    /// Element name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Remove every opening and closing root tag
    #[must_use]
    pub fn strip(&self, text: &str) -> String {
        self.pattern.replace_all(text, "").into_owned()
    }

    /// Wrap `body` in the root element, followed by a newline
    #[must_use]
    pub fn wrap(&self, body: &str) -> String {
        format!("<{0}>{body}</{0}>\n", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_single_annotation() {
        let text = r#"<COREF ID="A1">the committee</COREF> voted."#;
        assert_eq!(
            decode(text),
            "coref_tag_beg_A1_ the committee coref_tag_end_A1_ voted."
        );
    }

    #[test]
    fn test_round_trip() {
        let texts = [
            r#"<COREF ID="A1">John Smith</COREF> said <COREF ID="A2">he</COREF> left."#,
            r#"Before<COREF ID="7">Mr. Jones, the CEO,</COREF>after"#,
            r#"<COREF ID="E">  </COREF> spaced <COREF ID="F"></COREF>"#,
            "no annotations at all",
            "",
        ];

        for text in texts {
            assert_eq!(encode(&decode(text)), text, "round trip failed for {text:?}");
        }
    }

    #[test]
    fn test_lower_case_tags_are_normalized() {
        let decoded = decode(r#"<coref id="a1">the board</coref> met."#);
        assert_eq!(decoded, "coref_tag_beg_a1_ the board coref_tag_end_a1_ met.");
        assert_eq!(encode(&decoded), r#"<COREF ID="a1">the board</COREF> met."#);
    }

    #[test]
    fn test_unterminated_tag_left_untouched() {
        let text = r#"<COREF ID="A1">the dog barked. The cat sat."#;
        assert_eq!(decode(text), text);
    }

    #[test]
    fn test_unterminated_tag_does_not_hide_later_annotation() {
        let text = r#"<COREF ID="A1">the dog. <COREF ID="A2">the cat</COREF> sat."#;
        assert_eq!(
            decode(text),
            r#"<COREF ID="A1">the dog. coref_tag_beg_A2_ the cat coref_tag_end_A2_ sat."#
        );
    }

    #[test]
    fn test_malformed_identifier_left_untouched() {
        let text = r#"<COREF ID="A-1">x</COREF>"#;
        assert_eq!(decode(text), text);
    }

    #[test]
    fn test_inline_annotations_spans() {
        let decoded = decode(r#"a <COREF ID="A1">b c</COREF> d"#);
        let found = inline_annotations(&decoded);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "A1");
        assert_eq!(found[0].payload, "b c");
        assert_eq!(
            &decoded[found[0].span.start..found[0].span.end],
            "coref_tag_beg_A1_ b c coref_tag_end_A1_"
        );
    }

    #[test]
    fn test_encode_skips_unmatched_marker() {
        let text = "coref_tag_beg_A1_ dangling";
        assert_eq!(encode(text), text);
    }

    #[test]
    fn test_marker_helpers() {
        assert_eq!(begin_marker_id("coref_tag_beg_X12_"), Some("X12"));
        assert_eq!(begin_marker_id("coref_tag_beg_X12_x"), None);
        assert!(is_end_marker("coref_tag_end_A1_"));
        assert!(!is_end_marker("coref_tag_beg_A1_"));
        assert_eq!(open_tag("A2", Some("A1")), r#"<COREF ID="A2" REF="A1">"#);
    }

    #[test]
    fn test_escape_unescape() {
        assert_eq!(escape("a & b < c > d"), "a &amp; b &lt; c &gt; d");
        assert_eq!(unescape("a &amp; b &lt; c &gt; d"), "a & b < c > d");
        assert_eq!(unescape("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_root_element() {
        let root = RootElement::new("TXT").unwrap();
        assert_eq!(root.strip("<TXT>body</txt>"), "body");
        assert_eq!(root.wrap("body"), "<TXT>body</TXT>\n");
        assert!(RootElement::new("  ").is_err());
    }
}
