//! Naming helpers.

/// Converts a field or type identifier to its Pascal-cased wire form.
///
/// Separators (`_`, `-`, whitespace) are dropped and the character following
/// them is upper-cased; existing capitals are kept, so `someThing` becomes
/// `SomeThing`.
#[must_use]
pub fn pascalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.trim().chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
