use crate::error::UnpackError;

/// Default cap on input size, in bytes.
pub const DEFAULT_MAX_INPUT_LEN: usize = 8 * 1024 * 1024;

/// Knobs shared by every entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnpackOptions {
    /// Reject symbol tables whose length differs from the declared count
    /// instead of truncating or padding them.
    pub strict: bool,
    /// Inputs longer than this fail with [`UnpackError::InputTooLarge`]
    /// before any pattern is run.
    pub max_input_len: usize,
}

impl Default for UnpackOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_input_len: DEFAULT_MAX_INPUT_LEN,
        }
    }
}

impl UnpackOptions {
    /// Fails on a symbol count mismatch instead of truncating or padding.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Largest input, in bytes, any entry point accepts.
    pub fn max_input_len(mut self, max_input_len: usize) -> Self {
        self.max_input_len = max_input_len;
        self
    }

    pub(crate) fn check_len(&self, source: &str) -> Result<(), UnpackError> {
        if source.len() > self.max_input_len {
            return Err(UnpackError::InputTooLarge {
                len: source.len(),
                limit: self.max_input_len,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = UnpackOptions::default();
        assert!(!options.strict);
        assert_eq!(options.max_input_len, DEFAULT_MAX_INPUT_LEN);
    }

    #[test]
    fn test_check_len() {
        let options = UnpackOptions::default().max_input_len(4);
        assert!(options.check_len("abcd").is_ok());
        assert!(matches!(
            options.check_len("abcde"),
            Err(UnpackError::InputTooLarge { len: 5, limit: 4 })
        ));
    }
}
