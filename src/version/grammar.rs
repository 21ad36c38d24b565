//! Version grammars
//!
//! Four grammars are tried in a fixed precedence order and the first match
//! wins:
//!
//! 1. standard   `major.minor.patch[.hotfix][(.|-)qualifier[num]]`
//!    (CalVer when `major` is a four digit year after 1970)
//! 2. release train `Name(_|-|.)qualifier[num]`
//! 3. legacy     `major.minor[(.|-)qualifier[num]]`
//! 4. opaque     anything else

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

use super::{Qualifier, VersionKind, VersionParts};

const QUALIFIER: &str = r"(?:[.-]([A-Za-z]+(?:-[A-Za-z]+)*)(\d+)?)?";

fn standard() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^(\d+)\.(\d+)\.(\d+)(?:\.(\d+))?{}$", QUALIFIER))
            .expect("standard version pattern is valid")
    })
}

fn release_train() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z][A-Za-z0-9]*)[_.-]([A-Za-z]+(?:-[A-Za-z]+)*)(\d+)?$")
            .expect("release train pattern is valid")
    })
}

fn legacy() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^(\d+)\.(\d+){}$", QUALIFIER))
            .expect("legacy version pattern is valid")
    })
}

/// Result of matching a cleaned version string against the grammars
#[derive(Debug, Clone)]
pub(super) struct Parsed {
    pub kind: VersionKind,
    pub major: Option<String>,
    pub minor: Option<String>,
    pub parts: Option<VersionParts>,
    pub qualifier: Option<Qualifier>,
}

impl Parsed {
    fn opaque() -> Self {
        Self {
            kind: VersionKind::Opaque,
            major: None,
            minor: None,
            parts: None,
            qualifier: None,
        }
    }
}

/// Remove URL encoding and any `?query` suffix.
///
/// Text that does not decode to UTF-8 is kept as given.
pub(super) fn clean(text: &str) -> String {
    let decoded = urlencoding::decode(text).unwrap_or(Cow::Borrowed(text));
    let without_query = match decoded.find('?') {
        Some(index) => &decoded[..index],
        None => &decoded[..],
    };
    without_query.trim().to_string()
}

pub(super) fn parse(cleaned: &str) -> Parsed {
    if let Some(caps) = standard().captures(cleaned) {
        return parse_standard(&caps);
    }
    if let Some(caps) = release_train().captures(cleaned) {
        return Parsed {
            kind: VersionKind::ReleaseTrain,
            major: None,
            minor: Some(caps[1].to_string()),
            parts: None,
            qualifier: qualifier(&caps, 2, 3),
        };
    }
    if let Some(caps) = legacy().captures(cleaned) {
        return parse_legacy(&caps);
    }
    Parsed::opaque()
}

fn parse_standard(caps: &Captures<'_>) -> Parsed {
    let (Some(major), Some(minor), Some(patch)) =
        (number(caps, 1), number(caps, 2), number(caps, 3))
    else {
        return Parsed::opaque();
    };
    let major_text = &caps[1];
    let kind = if major_text.len() == 4 && major > 1970 {
        VersionKind::CalVer
    } else {
        VersionKind::Semantic
    };
    Parsed {
        kind,
        major: Some(major.to_string()),
        minor: Some(format!("{}.{}", major, minor)),
        parts: Some(VersionParts::new(
            Some(major),
            Some(minor),
            Some(patch),
            number(caps, 4),
        )),
        qualifier: qualifier(caps, 5, 6),
    }
}

fn parse_legacy(caps: &Captures<'_>) -> Parsed {
    let (Some(major), Some(minor)) = (number(caps, 1), number(caps, 2)) else {
        return Parsed::opaque();
    };
    Parsed {
        kind: VersionKind::Legacy,
        major: Some(major.to_string()),
        minor: Some(format!("{}.{}", major, minor)),
        parts: Some(VersionParts::new(Some(major), Some(minor), None, None)),
        qualifier: qualifier(caps, 3, 4),
    }
}

// Digit runs too long for u32 make the whole text opaque.
fn number(caps: &Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group).and_then(|m| m.as_str().parse().ok())
}

fn qualifier(caps: &Captures<'_>, label: usize, num: usize) -> Option<Qualifier> {
    caps.get(label).map(|m| Qualifier {
        label: m.as_str().to_string(),
        number: number(caps, num),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_strips_encoding_and_query() {
        assert_eq!(clean("3.2.0%2DSNAPSHOT"), "3.2.0-SNAPSHOT");
        assert_eq!(clean("3.2.0?foo=bar"), "3.2.0");
        assert_eq!(clean(" 2.7.1 "), "2.7.1");
    }

    #[test]
    fn test_standard_grammar_groups() {
        let parsed = parse("2.7.19.1");
        assert_eq!(parsed.kind, VersionKind::Semantic);
        assert_eq!(parsed.minor.as_deref(), Some("2.7"));
        let parts = parsed.parts.unwrap();
        assert_eq!(parts.hotfix, Some(1));

        let parsed = parse("5.3.9.RELEASE");
        assert_eq!(parsed.kind, VersionKind::Semantic);
        assert_eq!(parsed.qualifier.unwrap().label, "RELEASE");

        let parsed = parse("3.0.0-RC2");
        let qualifier = parsed.qualifier.unwrap();
        assert_eq!(qualifier.label, "RC");
        assert_eq!(qualifier.number, Some(2));

        let parsed = parse("1.0.0.BUILD-SNAPSHOT");
        assert_eq!(parsed.qualifier.unwrap().label, "BUILD-SNAPSHOT");
    }

    #[test]
    fn test_calver_detection() {
        assert_eq!(parse("2023.0.1").kind, VersionKind::CalVer);
        assert_eq!(parse("2022.0.0-M1").kind, VersionKind::CalVer);
        // four digits but not a plausible year
        assert_eq!(parse("1234.1.0").kind, VersionKind::Semantic);
    }

    #[test]
    fn test_release_train() {
        let parsed = parse("Gosling-RELEASE");
        assert_eq!(parsed.kind, VersionKind::ReleaseTrain);
        assert_eq!(parsed.minor.as_deref(), Some("Gosling"));
        assert!(parsed.parts.is_none());

        let parsed = parse("Moore.SR3");
        assert_eq!(parsed.minor.as_deref(), Some("Moore"));
        assert_eq!(parsed.qualifier.unwrap().number, Some(3));
    }

    #[test]
    fn test_legacy_and_opaque() {
        let parsed = parse("1.2-RC1");
        assert_eq!(parsed.kind, VersionKind::Legacy);
        assert_eq!(parsed.minor.as_deref(), Some("1.2"));

        assert_eq!(parse("current").kind, VersionKind::Opaque);
        assert_eq!(parse("1.2.3.4.5").kind, VersionKind::Opaque);
        assert_eq!(parse("").kind, VersionKind::Opaque);
    }
}
