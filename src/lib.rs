//! A utility for unpacking P.A.C.K.E.R. encoded JavaScript code.
//!
//! This unpacker **restores** the original code from P.A.C.K.E.R. compressed/obfuscated JavaScript,
//! including payloads hidden behind a base64 `JuicyCodes.Run(...)` envelope.
//!
//! ## Typical P.A.C.K.E.R. Structure
//! ```javascript
//! eval(function(p,a,c,k,e,r){
//!   // Unpacking logic
//! }('payload', radix, count, 'symbol|table'.split('|'), 0, {}))
//! ```
//!
//! # Examples
//!
//! ```rust
//! let packed_code = r#"eval(function(p,a,c,k,e,r){...}('0 2=1',62,3,'var||a'.split('|'),0,{}))"#;
//!
//! // Unpack to original JavaScript
//! let original = packer_unpack::unpack(&packed_code).unwrap();
//! assert_eq!(original, "var a=1");
//! ```
//!
//! Failures are reported through a [`Reporter`] before being returned. The
//! default [`LogReporter`] logs through the [`log`] facade:
//!
//! ```rust
//! use packer_unpack::{Stage, UnpackError, Unpacker};
//!
//! let unpacker = Unpacker::new().with_reporter(|stage: Stage, error: &UnpackError| {
//!     eprintln!("{stage}: {error}");
//! });
//! assert!(unpacker.unpack("eval(function(p,a,c,k,e,r){}").is_err());
//! assert_eq!(unpacker.unpack("var a = 1;").unwrap(), None);
//! ```

pub mod args;
pub mod config;
pub mod dejuice;
pub mod error;
pub mod page;
pub mod report;
pub mod strings;
pub mod symtab;
mod unbaser;
pub mod words;

pub use crate::args::ExtractedArgs;
pub use crate::config::UnpackOptions;
pub use crate::dejuice::{Dejuicer, locate_and_decode};
pub use crate::error::{Grammar, Stage, UnbaseError, UnpackError};
pub use crate::report::{LogReporter, NullReporter, Reporter};
pub use crate::unbaser::Unbaser;

/// Prefix every packed call site starts with, once spaces are removed.
pub const SIGNATURE: &str = "eval(function(p,a,c,k,e,";

/// Default pattern used by [`Unpacker::unpack_page`] to cut a call site out of a page.
pub const PAGE_PATTERN: &str = r"(eval\(function\(p,a,c,k,e(?:.|\s)+?\))</script>";

/// Detects whether the input string is P.A.C.K.E.R. encoded JavaScript.
///
/// True when `source`, with every space removed, starts with
/// `eval(function(p,a,c,k,e,`.
///
/// # Examples
///
/// ```rust
/// assert!(packer_unpack::detect("eval(function(p,a,c,k,e,r){...}"));
/// assert!(packer_unpack::detect("eval ( function(p, a, c, k, e, r"));
/// assert!(!packer_unpack::detect("var x = 1;"));
/// assert!(!packer_unpack::detect(""));
/// ```
pub fn detect(source: &str) -> bool {
    let mut compact = source.chars().filter(|&c| c != ' ');
    SIGNATURE.chars().all(|expected| compact.next() == Some(expected))
}

/// Unpacks P.A.C.K.E.R. encoded JavaScript code back to its original form.
///
/// Input that is not packed (see [`detect`]) is returned unchanged.
///
/// # Errors
///
/// Returns an error if:
/// - The call site matches neither argument grammar
/// - The symbol table count can't be reconciled with the actual symbols
/// - The radix is unsupported by [`Unbaser`]
///
/// # Examples
///
/// ```rust
/// let packed = "eval(function(p,a,c,k,e,r){...}('0 2=1',62,3,'var||a'.split('|'),0,{}))";
/// let unpacked = packer_unpack::unpack(packed).unwrap();
/// assert_eq!(unpacked, "var a=1");
///
/// assert_eq!(packer_unpack::unpack("var a=1").unwrap(), "var a=1");
/// ```
pub fn unpack(source: &str) -> Result<String, UnpackError> {
    Ok(Unpacker::new()
        .unpack(source)?
        .unwrap_or_else(|| source.to_owned()))
}

/// Unpacks P.A.C.K.E.R. encoded JavaScript code without validation.
///
/// Use this when you've already validated the input with [`detect`] to avoid
/// double validation, or for call sites that carry a non-standard prefix.
///
/// # Examples
///
/// ```rust
/// let packed = "eval(function(p,a,c,k,e,r){...}('0 2=1',62,3,'var||a'.split('|'),0,{}))";
///
/// if packer_unpack::detect(packed) {
///     let unpacked = packer_unpack::unpack_unchecked(packed).unwrap();
///     assert_eq!(unpacked, "var a=1");
/// }
/// ```
pub fn unpack_unchecked(source: &str) -> Result<String, UnpackError> {
    Unpacker::new().unpack_unchecked(source)
}

/// Configured unpacking pipeline.
///
/// Holds no per-call state, so one instance can serve any number of inputs,
/// including from several threads when the reporter allows it.
#[derive(Debug, Clone, Default)]
pub struct Unpacker<R = LogReporter> {
    options: UnpackOptions,
    reporter: R,
}

impl Unpacker {
    /// Lenient pipeline that reports failures through [`LogReporter`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: Reporter> Unpacker<R> {
    /// Replaces the options, keeping the reporter.
    pub fn with_options(mut self, options: UnpackOptions) -> Self {
        self.options = options;
        self
    }

    /// Sends every failure to `reporter` before it is returned.
    pub fn with_reporter<S: Reporter>(self, reporter: S) -> Unpacker<S> {
        Unpacker {
            options: self.options,
            reporter,
        }
    }

    /// Options in effect for this pipeline.
    pub fn options(&self) -> &UnpackOptions {
        &self.options
    }

    /// Unpacks `source`, or returns `Ok(None)` when it is not packed.
    ///
    /// # Errors
    ///
    /// See [`unpack`]. Oversized input fails with
    /// [`UnpackError::InputTooLarge`].
    pub fn unpack(&self, source: &str) -> Result<Option<String>, UnpackError> {
        if !detect(source) {
            log::debug!("Input is not p.a.c.k.e.r. coded");
            return Ok(None);
        }
        self.unpack_unchecked(source).map(Some)
    }

    /// Runs the pipeline without checking the signature first.
    pub fn unpack_unchecked(&self, source: &str) -> Result<String, UnpackError> {
        self.run(source).inspect_err(|err| self.report(err))
    }

    /// Cuts the first packed block terminated by `</script>` out of a page
    /// and unpacks it.
    ///
    /// The page goes through [`page::normalize`] first and `pattern`
    /// (default [`PAGE_PATTERN`]) is matched case-insensitively; its first
    /// capture group is the call site. A page without a match is returned
    /// unchanged.
    pub fn unpack_page(&self, text: &str, pattern: Option<&str>) -> Result<String, UnpackError> {
        self.options.check_len(text).inspect_err(|err| self.report(err))?;

        let found = page::find_first(text, pattern.unwrap_or(PAGE_PATTERN))
            .inspect_err(|err| self.report(err))?;

        match found {
            Some(call_site) => self.unpack_unchecked(&call_site),
            None => Ok(text.to_owned()),
        }
    }

    pub(crate) fn report(&self, error: &UnpackError) {
        self.reporter.report(error.stage(), error);
    }

    fn run(&self, source: &str) -> Result<String, UnpackError> {
        self.options.check_len(source)?;

        let args = args::extract(source)?;
        let symtab = symtab::build(
            &args.raw_symtab,
            &args.delimiter,
            args.count,
            self.options.strict,
        )?;
        let unbaser = Unbaser::new(args.radix)?;
        log::trace!("Decoding {} words in base {}", symtab.len(), unbaser.base());

        let decoded = words::decode_words(&args.payload, &symtab, &unbaser);
        Ok(strings::replace_strings(&decoded))
    }
}
