//! Recovers the four decoder arguments from a packed call site.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Grammar, UnpackError};

/// Arguments passed to the packer's decoder function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArgs {
    /// The compressed code with placeholder words.
    pub payload: String,
    /// Base used for encoding the placeholders. `0` means "default", see [`crate::Unbaser::new`].
    pub radix: usize,
    /// Declared number of symbols.
    pub count: usize,
    /// The symbol table before splitting.
    pub raw_symtab: String,
    /// Separator for [`raw_symtab`](Self::raw_symtab), never empty.
    pub delimiter: String,
    /// Which grammar matched.
    pub grammar: Grammar,
}

/// Extracts the P.A.C.K.E.R. arguments from the source code.
///
/// Before matching, `,[],` is rewritten to `,0,` and `\'` to `'`. Two
/// patterns are then tried, first match wins:
/// 1. `}(<payload>, radix, count, (<symtab>).split(<delim>)`, where payload,
///    symtab and delimiter go through [`clean_literal`].
/// 2. `}('<payload>', radix, count, '<symtab>'.split('<delim>')`, taken as is.
///
/// # Errors
///
/// Returns [`UnpackError::CorruptedPayload`] if neither pattern matches, if
/// the radix or count do not parse as numbers, or if the delimiter is empty.
pub fn extract(source: &str) -> Result<ExtractedArgs, UnpackError> {
    static PRIMARY: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"(?s)\}\s*\(\s*(.*?)\s*,\s*(\d+)\s*,\s*(\d+)\s*,\s*\((.*?)\)\.split\((.*?)\)",
        )
        .unwrap()
    });
    static LEGACY: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)\}\('(.*)', *(\d+), *(\d+), *'(.*)'\.split\('(.*?)'\)").unwrap()
    });

    let source = source.replace(",[],", ",0,").replace(r"\'", "'");

    if let Some(caps) = PRIMARY.captures(&source) {
        return build(
            Grammar::Primary,
            clean_literal(&caps[1]),
            &caps[2],
            &caps[3],
            clean_literal(&caps[4]),
            clean_literal(&caps[5]),
        );
    }

    if let Some(caps) = LEGACY.captures(&source) {
        return build(
            Grammar::Legacy,
            caps[1].to_owned(),
            &caps[2],
            &caps[3],
            caps[4].to_owned(),
            caps[5].to_owned(),
        );
    }

    Err(UnpackError::CorruptedPayload {
        grammar: None,
        reason: "unexpected code structure",
    })
}

fn build(
    grammar: Grammar,
    payload: String,
    radix: &str,
    count: &str,
    raw_symtab: String,
    delimiter: String,
) -> Result<ExtractedArgs, UnpackError> {
    let corrupted = |reason| UnpackError::CorruptedPayload {
        grammar: Some(grammar),
        reason,
    };

    let radix = radix.parse::<usize>().map_err(|_| corrupted("invalid radix"))?;
    let count = count.parse::<usize>().map_err(|_| corrupted("invalid count"))?;
    if delimiter.is_empty() {
        return Err(corrupted("empty symtab delimiter"));
    }

    log::debug!("{grammar} grammar matched: radix {radix}, count {count}, delimiter {delimiter:?}");

    Ok(ExtractedArgs {
        payload,
        radix,
        count,
        raw_symtab,
        delimiter,
        grammar,
    })
}

/// Normalizes a captured argument expression into a plain string.
///
/// - `function ... ="<text>" ... }(<n>)`: rotates every ASCII letter of
///   `<text>` by `n` within its case, then percent-decodes.
/// - `decodeURIComponent('<text>')`: unwraps the call, then percent-decodes.
/// - `"..."` or `'...'`: drops the surrounding quotes and the `"+"` joins of
///   concatenated pieces such as `"a"+"b"`. Quoted strings inside the
///   literal are kept.
/// - Anything else is returned trimmed.
pub fn clean_literal(raw: &str) -> String {
    static ROTATION: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"(?s)="([^"]+).*\}\s*\((\d+)\)"#).unwrap());
    static URI_CALL: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(^decodeURIComponent\s*\(\s*(['"]))|((['"])\s*\)$)"#).unwrap()
    });
    static DOUBLE_QUOTED: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"(^")|("$)|("\s*\+\s*")"#).unwrap());
    static SINGLE_QUOTED: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(^')|('$)|('\s*\+\s*')").unwrap());

    let text = raw.trim();

    if text.starts_with("function") {
        return match ROTATION.captures(text) {
            Some(caps) => match caps[2].parse::<u32>() {
                Ok(shift) => percent_decode(&rotate(&caps[1], shift)),
                Err(_) => text.to_owned(),
            },
            None => text.to_owned(),
        };
    }

    if text.starts_with("decodeURIComponent") {
        return percent_decode(&URI_CALL.replace_all(text, ""));
    }

    if text.starts_with('"') {
        return DOUBLE_QUOTED.replace_all(text, "").into_owned();
    }

    if text.starts_with('\'') {
        return SINGLE_QUOTED.replace_all(text, "").into_owned();
    }

    text.to_owned()
}

/// Shifts ASCII letters forward by `shift`, wrapping once past `Z`/`z`.
fn rotate(text: &str, shift: u32) -> String {
    text.chars()
        .map(|c| {
            if !c.is_ascii_alphabetic() {
                return c;
            }
            let limit = if c <= 'Z' { 'Z' as u32 } else { 'z' as u32 };
            let shifted = (c as u32).saturating_add(shift);
            let code = if shifted <= limit { shifted } else { shifted - 26 };
            char::from_u32(code).unwrap_or(c)
        })
        .collect()
}

/// `%XX` decoding, with invalid UTF-8 replaced rather than rejected.
fn percent_decode(text: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(text.as_bytes())).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_grammar() {
        let args = extract(
            "eval(function(p,a,c,k,e,r){e=String;return p}('1 0=2;3(0)',4,4,'x|var|5|alert'.split('|'),0,{}))",
        )
        .unwrap();
        assert_eq!(args.grammar, Grammar::Legacy);
        assert_eq!(args.payload, "1 0=2;3(0)");
        assert_eq!(args.radix, 4);
        assert_eq!(args.count, 4);
        assert_eq!(args.raw_symtab, "x|var|5|alert");
        assert_eq!(args.delimiter, "|");
    }

    #[test]
    fn test_legacy_grammar_custom_delimiter() {
        let args = extract("}('0 1',10,2,'a,b'.split(','),0,{}))").unwrap();
        assert_eq!(args.raw_symtab, "a,b");
        assert_eq!(args.delimiter, ",");
    }

    #[test]
    fn test_empty_array_radix() {
        let args = extract("}('0 1',[],2,'a|b'.split('|'),0,{}))").unwrap();
        assert_eq!(args.radix, 0);
        assert_eq!(args.count, 2);
    }

    #[test]
    fn test_escaped_quotes_are_normalized() {
        let args = extract(r"}('0=\'1\'',10,2,'a|b'.split('|'),0,{}))").unwrap();
        assert_eq!(args.payload, "0='1'");
    }

    #[test]
    fn test_primary_grammar() {
        let args = extract(
            r#"eval(function(p,a,c,k,e,d){return p}("0 1 2", 10, 3, ("x|y|z").split("|")))"#,
        )
        .unwrap();
        assert_eq!(args.grammar, Grammar::Primary);
        assert_eq!(args.payload, "0 1 2");
        assert_eq!(args.radix, 10);
        assert_eq!(args.count, 3);
        assert_eq!(args.raw_symtab, "x|y|z");
        assert_eq!(args.delimiter, "|");
    }

    #[test]
    fn test_primary_grammar_with_uri_component() {
        let args = extract(
            "}(decodeURIComponent('0%201'),36,2,(decodeURIComponent('a%7Cb')).split('|')))",
        )
        .unwrap();
        assert_eq!(args.grammar, Grammar::Primary);
        assert_eq!(args.payload, "0 1");
        assert_eq!(args.raw_symtab, "a|b");
    }

    #[test]
    fn test_no_grammar_matches() {
        match extract("var a = 1;") {
            Err(UnpackError::CorruptedPayload { grammar: None, .. }) => {}
            other => panic!("expected corrupted payload, got {other:?}"),
        }
    }

    #[test]
    fn test_radix_overflow_is_corrupted() {
        match extract("}('0',99999999999999999999999,1,'a'.split('|'))") {
            Err(UnpackError::CorruptedPayload {
                grammar: Some(Grammar::Legacy),
                reason,
            }) => assert_eq!(reason, "invalid radix"),
            other => panic!("expected corrupted payload, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_delimiter_is_corrupted() {
        match extract(r#"}("0",10,1,("a").split("")))"#) {
            Err(UnpackError::CorruptedPayload {
                grammar: Some(Grammar::Primary),
                ..
            }) => {}
            other => panic!("expected corrupted payload, got {other:?}"),
        }
    }

    #[test]
    fn test_clean_literal_quotes() {
        assert_eq!(clean_literal(r#"  "abc"  "#), "abc");
        assert_eq!(clean_literal("'abc'"), "abc");
        assert_eq!(clean_literal(r#""ab"+"cd""#), "abcd");
        assert_eq!(clean_literal("'ab' + 'cd'"), "abcd");
        assert_eq!(clean_literal(r#""""#), "");
        assert_eq!(clean_literal("  plain  "), "plain");
    }

    #[test]
    fn test_clean_literal_keeps_inner_strings() {
        assert_eq!(clean_literal(r#""a=\"x\";b""#), r#"a=\"x\";b"#);
        assert_eq!(clean_literal("'$(0).1('.2')'"), "$(0).1('.2')");
        assert_eq!(clean_literal("'0('a')'+'1'"), "0('a')1");
    }

    #[test]
    fn test_primary_grammar_with_inner_strings() {
        let args = extract(
            r"eval(function(p,a,c,k,e,d){return p}('$(0).1(\'.2\')',10,3,('document|html|main').split('|')))",
        )
        .unwrap();
        assert_eq!(args.grammar, Grammar::Primary);
        assert_eq!(args.payload, "$(0).1('.2')");
        assert_eq!(args.raw_symtab, "document|html|main");
    }

    #[test]
    fn test_clean_literal_uri_component() {
        assert_eq!(clean_literal("decodeURIComponent('a%20b')"), "a b");
        assert_eq!(clean_literal(r#"decodeURIComponent ( "%7C" )"#), "|");
    }

    #[test]
    fn test_clean_literal_rotation() {
        // Each letter moves one step, `z` wraps to `a`; `%20` decodes afterwards.
        assert_eq!(
            clean_literal(r#"function(){var s="Gdkkn%20vnqkc";return s}(1)"#),
            "Hello world"
        );
        assert_eq!(clean_literal(r#"function(){var s="zZ";}(1)"#), "aA");
    }

    #[test]
    fn test_clean_literal_rotation_without_match() {
        assert_eq!(clean_literal("function(){}"), "function(){}");
    }
}
