use std::sync::LazyLock;

use regex::Regex;

use crate::unbaser::Unbaser;

/// Decodes placeholder words in the payload using the symbol table.
///
/// Every maximal run of `[A-Za-z0-9_]` is converted from the unbaser's base
/// to an index. When the index points at a non-empty symbol table entry the
/// word is replaced by it; otherwise (out of range, empty entry, or a word
/// that is not a valid numeral) the word is left exactly as written.
pub fn decode_words(payload: &str, symtab: &[String], unbaser: &Unbaser) -> String {
    static WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z0-9_]+").unwrap());

    WORD_REGEX
        .replace_all(payload, |caps: &regex::Captures| {
            let word = &caps[0];
            match unbaser.unbase(word) {
                Ok(index) => match symtab.get(index) {
                    Some(symbol) if !symbol.is_empty() => symbol.clone(),
                    _ => word.to_owned(),
                },
                Err(err) => {
                    log::trace!("Keeping {word:?}: {err}");
                    word.to_owned()
                }
            }
        })
        .into_owned()
}
