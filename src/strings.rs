use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Replaces string array references with their actual string values.
///
/// Some P.A.C.K.E.R. variants create string arrays like:
/// ```javascript
/// var _0x1234=["string1","string2","string3"];
/// // Later referenced as: _0x1234[0], _0x1234[1], _0x1234[2]
/// ```
///
/// When such a declaration is found, the code after it is returned with every
/// `_0x1234[i]` that names an existing entry replaced by the quoted literal.
/// The declaration, and anything before it, is dropped. Without a
/// declaration the source is returned unchanged.
///
/// # Examples
///
/// Input:
/// ```javascript
/// var _0x1234=["hello","world"];
/// console.log(_0x1234[0] + " " + _0x1234[1]);
/// ```
///
/// Output:
/// ```javascript
/// console.log("hello" + " " + "world");
/// ```
pub fn replace_strings(source: &str) -> String {
    static STRING_REGEX: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"(?s)var *(_\w+)=\["(.*?)"\];"#).unwrap());

    let Some(caps) = STRING_REGEX.captures(source) else {
        return source.to_owned();
    };

    let var_name = &caps[1];
    let lookup = caps[2].split("\",\"").collect::<Vec<_>>();
    let rest = &source[caps.get(0).map_or(0, |m| m.end())..];

    let access = match Regex::new(&format!(r"{}\[(0|[1-9][0-9]*)\]", regex::escape(var_name))) {
        Ok(access) => access,
        Err(err) => {
            log::warn!("Could not build lookup for {var_name}: {err}");
            return rest.to_owned();
        }
    };

    access
        .replace_all(rest, |caps: &Captures| {
            match caps[1].parse::<usize>().ok().and_then(|i| lookup.get(i)) {
                Some(value) => format!("\"{value}\""),
                None => caps[0].to_owned(),
            }
        })
        .into_owned()
}
