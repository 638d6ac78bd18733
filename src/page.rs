//! Pattern matching over text cut from HTML pages.
//!
//! Pages rarely carry scripts verbatim: line breaks, escaped slashes and
//! entities get in the way of the call-site patterns. [`normalize`] flattens
//! those before [`find_all`] and [`find_first`] run a case-insensitive search.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::error::UnpackError;

/// Literal rewrites applied in order by [`normalize`].
const REPLACEMENTS: &[(&str, &str)] = &[
    ("\r", ""),
    ("\n", ""),
    ("\t", ""),
    ("\\/", "/"),
    ("&amp;", "&"),
    ("&#039;", "'"),
    ("&#8211;", "-"),
    ("&#8212;", "-"),
    ("&eacute;", "é"),
    ("&acirc;", "â"),
    ("&ecirc;", "ê"),
    ("&icirc;", "î"),
    ("&ocirc;", "ô"),
    ("&hellip;", "..."),
    ("&quot;", "\""),
    ("&gt;", ">"),
    ("&egrave;", "è"),
    ("&ccedil;", "ç"),
    ("&laquo;", "<<"),
    ("&raquo;", ">>"),
    ("\u{c9}", "E"),
    ("&ndash;", "-"),
    ("&ugrave;", "ù"),
    ("&agrave;", "à"),
    ("&lt;", "<"),
    ("&rsquo;", "'"),
    ("&lsquo;", "'"),
    ("&nbsp;", ""),
    ("&#8217;", "'"),
    ("&#8230;", "..."),
    ("&#8242;", "'"),
    ("&#884;", "'"),
    ("&#39;", "'"),
    ("&#038;", "&"),
    ("&iuml;", "ï"),
    ("&#8220;", "\""),
    ("&#8221;", "\""),
    ("–", "-"),
    ("—", "-"),
    ("&#58;", ":"),
];

/// Flattens page text for pattern matching.
///
/// Drops CR, LF and TAB, unescapes `\/`, decodes a fixed set of named and
/// numeric entities, folds en and em dashes to `-`, and removes spaces
/// around every `:`.
pub fn normalize(text: &str) -> String {
    static COLON: LazyLock<Regex> = LazyLock::new(|| Regex::new(" *: *").unwrap());

    let flattened = REPLACEMENTS
        .iter()
        .fold(text.to_owned(), |acc, (from, to)| acc.replace(from, to));
    COLON.replace_all(&flattened, ":").into_owned()
}

/// Every non-empty match of `pattern` in the normalized `text`.
///
/// Matching is case-insensitive. When the pattern has a capture group, the
/// first group is returned for each match, otherwise the whole match.
///
/// # Errors
///
/// Returns [`UnpackError::Pattern`] if `pattern` does not compile.
pub fn find_all(text: &str, pattern: &str) -> Result<Vec<String>, UnpackError> {
    let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
    let text = normalize(text);

    Ok(regex
        .captures_iter(&text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
        .map(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .map(String::from)
        .collect())
}

/// The first non-empty result of [`find_all`].
pub fn find_first(text: &str, pattern: &str) -> Result<Option<String>, UnpackError> {
    Ok(find_all(text, pattern)?.into_iter().next())
}
