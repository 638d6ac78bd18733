use crate::error::UnpackError;

/// Placeholder appended when the split table is shorter than declared.
pub const BUGGED: &str = "BUGGED";

/// Splits `raw` on `delimiter` and reconciles the result with the declared
/// `count`.
///
/// When `count > 0`, a longer table is truncated and a shorter one is padded
/// with [`BUGGED`] until the lengths agree. In `strict` mode neither
/// correction is applied.
///
/// # Errors
///
/// Returns [`UnpackError::MalformedSymtab`] if the lengths still differ.
pub fn build(
    raw: &str,
    delimiter: &str,
    count: usize,
    strict: bool,
) -> Result<Vec<String>, UnpackError> {
    let mut symtab: Vec<String> = raw.split(delimiter).map(String::from).collect();
    let found = symtab.len();

    if !strict && count > 0 && found != count {
        log::debug!("Correcting symtab length from {found} to {count}");
        symtab.resize(count, BUGGED.to_owned());
    }

    if symtab.len() != count {
        return Err(UnpackError::MalformedSymtab {
            expected: count,
            found: symtab.len(),
        });
    }

    Ok(symtab)
}
