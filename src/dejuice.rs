//! Unwraps packed scripts hidden behind a `JuicyCodes.Run(...)` envelope.
//!
//! ```javascript
//! JuicyCodes.Run("ZXZhbChmdW5j"+"dGlvbihwLGEs...");
//! ```
//!
//! The argument is a base64 string, usually split into concatenated pieces,
//! whose decoded form is a P.A.C.K.E.R. call site.

use std::sync::LazyLock;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use regex::Regex;

use crate::error::UnpackError;
use crate::report::{LogReporter, Reporter};
use crate::{Unpacker, detect};

/// Default envelope pattern. The first capture group is the encoded expression.
pub const DEFAULT_PATTERN: &str = r"JuicyCodes\.Run\(([^)]*)\)[^<]*</script>";

/// Locates, decodes and unpacks JuicyCodes envelopes.
#[derive(Debug, Clone)]
pub struct Dejuicer<R = LogReporter> {
    pattern: Regex,
    unpacker: Unpacker<R>,
}

impl Default for Dejuicer {
    fn default() -> Self {
        Self::new()
    }
}

impl Dejuicer {
    /// Uses [`DEFAULT_PATTERN`] and a default [`Unpacker`].
    pub fn new() -> Self {
        static DEFAULT_REGEX: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(DEFAULT_PATTERN).unwrap());

        Self {
            pattern: DEFAULT_REGEX.clone(),
            unpacker: Unpacker::new(),
        }
    }
}

impl<R: Reporter> Dejuicer<R> {
    /// Replaces the envelope pattern. Its first capture group, or the whole
    /// match when it has none, is taken as the encoded expression.
    ///
    /// # Errors
    ///
    /// Returns [`UnpackError::Pattern`] if `pattern` does not compile.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, UnpackError> {
        self.pattern = Regex::new(pattern)?;
        Ok(self)
    }

    /// Uses `unpacker` (and its options and reporter) for the decoded script.
    pub fn with_unpacker<S: Reporter>(self, unpacker: Unpacker<S>) -> Dejuicer<S> {
        Dejuicer {
            pattern: self.pattern,
            unpacker,
        }
    }

    /// Decodes the first envelope in `page`.
    ///
    /// Returns `Ok(None)` when the page has no envelope. A decoded script that
    /// is not packed is returned as is.
    ///
    /// # Errors
    ///
    /// Returns [`UnpackError::InvalidBase64`] if the envelope does not decode,
    /// or any error raised while unpacking the decoded script.
    pub fn dejuice(&self, page: &str) -> Result<Option<String>, UnpackError> {
        self.unpacker
            .options()
            .check_len(page)
            .inspect_err(|err| self.unpacker.report(err))?;

        let Some(caps) = self.pattern.captures(page) else {
            log::debug!("No JuicyCodes envelope found");
            return Ok(None);
        };
        let expression = caps.get(1).or_else(|| caps.get(0)).map_or("", |m| m.as_str());

        let encoded: String = expression
            .chars()
            .filter(|&c| !matches!(c, '+' | '"' | '\'') && !c.is_whitespace())
            .collect();
        let bytes = BASE64_STANDARD
            .decode(encoded)
            .map_err(UnpackError::from)
            .inspect_err(|err| self.unpacker.report(err))?;
        let script = String::from_utf8_lossy(&bytes).into_owned();

        if !detect(&script) {
            log::debug!("JuicyCodes envelope does not hold p.a.c.k.e.r. code");
            return Ok(Some(script));
        }

        self.unpacker.unpack_unchecked(&script).map(Some)
    }

    /// Like [`dejuice`](Self::dejuice), with an absent envelope mapped to an
    /// empty string.
    pub fn locate_and_decode(&self, page: &str) -> Result<String, UnpackError> {
        Ok(self.dejuice(page)?.unwrap_or_default())
    }
}

/// Decodes the first `JuicyCodes.Run(...)` envelope in `page` with the
/// default pattern and options.
///
/// An empty string means the page has no envelope; an error means one was
/// found but could not be decoded.
///
/// # Examples
///
/// ```rust
/// assert_eq!(packer_unpack::locate_and_decode("<p>no scripts here</p>").unwrap(), "");
/// ```
pub fn locate_and_decode(page: &str) -> Result<String, UnpackError> {
    Dejuicer::new().locate_and_decode(page)
}

#[cfg(test)]
mod tests {
    use crate::NullReporter;

    use super::*;

    // eval(function(p,a,c,k,e,d){}('0 1="2"',10,3,'var|src|video.m3u8'.split('|'),0,{}))
    const PACKED_HEAD: &str = "ZXZhbChmdW5jdGlvbihwLGEsYyxrLGUsZCl7fSgn";
    const PACKED_TAIL: &str =
        "MCAxPSIyIicsMTAsMywndmFyfHNyY3x2aWRlby5tM3U4Jy5zcGxpdCgnfCcpLDAse30pKQ==";

    fn quiet() -> Dejuicer<NullReporter> {
        Dejuicer::new().with_unpacker(Unpacker::new().with_reporter(NullReporter))
    }

    #[test]
    fn test_dejuice() {
        let page = format!(
            "<html><script>JuicyCodes.Run(\"{PACKED_HEAD}\" + \"{PACKED_TAIL}\");</script></html>"
        );
        assert_eq!(
            locate_and_decode(&page).unwrap(),
            r#"var src="video.m3u8""#
        );
    }

    #[test]
    fn test_dejuice_multiline() {
        let page = format!(
            "<script>\nJuicyCodes.Run(\n  '{PACKED_HEAD}'+\n  '{PACKED_TAIL}'\n)\n</script>"
        );
        assert_eq!(
            quiet().dejuice(&page).unwrap().as_deref(),
            Some(r#"var src="video.m3u8""#)
        );
    }

    #[test]
    fn test_no_envelope() {
        assert_eq!(locate_and_decode("<html>nothing</html>").unwrap(), "");
        assert_eq!(quiet().dejuice("JuicyCodes.Run(\"abc\");").unwrap(), None);
    }

    #[test]
    fn test_not_packed_inside() {
        let page = "<script>JuicyCodes.Run(\"dmFyIGE9MTs=\");</script>";
        assert_eq!(quiet().locate_and_decode(page).unwrap(), "var a=1;");
    }

    #[test]
    fn test_code_after_envelope() {
        let page = "<script>JuicyCodes.Run(\"dmFyIGE9MTs=\");init();</script>";
        assert_eq!(quiet().locate_and_decode(page).unwrap(), "var a=1;");

        let page = format!(
            "<script>JuicyCodes.Run(\"{PACKED_HEAD}\"+\"{PACKED_TAIL}\");\nplayer.setup({{}});\n</script>"
        );
        assert_eq!(
            quiet().locate_and_decode(&page).unwrap(),
            r#"var src="video.m3u8""#
        );
    }

    #[test]
    fn test_invalid_base64() {
        let page = "<script>JuicyCodes.Run(\"@@@@\");</script>";
        assert!(matches!(
            quiet().dejuice(page),
            Err(UnpackError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_custom_pattern() {
        let page = format!("<div data-juice=\"{PACKED_HEAD}{PACKED_TAIL}\"></div>");
        let dejuicer = quiet().with_pattern(r#"data-juice="([^"]+)""#).unwrap();
        assert_eq!(
            dejuicer.locate_and_decode(&page).unwrap(),
            r#"var src="video.m3u8""#
        );
    }

    #[test]
    fn test_bad_pattern() {
        assert!(matches!(
            quiet().with_pattern("("),
            Err(UnpackError::Pattern(_))
        ));
    }
}
