use thiserror::Error;

/// Pipeline stage a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Detection and argument extraction from the call site.
    Extract,
    /// Symbol table construction and length correction.
    Symtab,
    /// Numeral decoder construction.
    Decode,
    /// Locating and decoding the outer JuicyCodes envelope.
    Locate,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Extract => "extract",
            Stage::Symtab => "symtab",
            Stage::Decode => "decode",
            Stage::Locate => "locate",
        };
        f.write_str(name)
    }
}

/// Which call-site grammar produced an argument parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// `}(<payload>, radix, count, (<symtab>).split(<delim>)` with literal cleaning.
    Primary,
    /// `}('<payload>', radix, count, '<symtab>'.split('<delim>')`.
    Legacy,
}

impl std::fmt::Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Grammar::Primary => f.write_str("primary"),
            Grammar::Legacy => f.write_str("legacy"),
        }
    }
}

#[derive(Debug, Error)]
pub enum UnpackError {
    /// No grammar matched (`grammar` is `None`), or the matching grammar
    /// captured fields that do not parse.
    #[error("Corrupted p.a.c.k.e.r. data: {reason}")]
    CorruptedPayload {
        grammar: Option<Grammar>,
        reason: &'static str,
    },

    #[error("Malformed p.a.c.k.e.r. symtab. ({expected} != {found})")]
    MalformedSymtab { expected: usize, found: usize },

    #[error("Unsupported base encoding: {0}")]
    UnsupportedRadix(usize),

    #[error("Input of {len} bytes exceeds the limit of {limit} bytes")]
    InputTooLarge { len: usize, limit: usize },

    #[error("Invalid base64 envelope: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Invalid locate pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl UnpackError {
    /// Pipeline stage the error was raised in.
    pub fn stage(&self) -> Stage {
        match self {
            UnpackError::CorruptedPayload { .. }
            | UnpackError::InputTooLarge { .. } => Stage::Extract,
            UnpackError::MalformedSymtab { .. } => Stage::Symtab,
            UnpackError::UnsupportedRadix(_) => Stage::Decode,
            UnpackError::InvalidBase64(_) | UnpackError::Pattern(_) => Stage::Locate,
        }
    }
}

/// Failure to turn a single token into an index. Never leaves the substitution pass.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnbaseError {
    #[error("Invalid character in input string.")]
    InvalidDigit,

    #[error("Numeral does not fit in usize.")]
    Overflow,
}
