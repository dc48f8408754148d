//! Query syntax escaping.

/// Backslash-escape characters that carry meaning in the Lucene/Solr query
/// syntax, so the value matches literally.
pub fn escape_query_chars(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        if is_special(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn is_special(c: char) -> bool {
    matches!(
        c,
        '\\' | '+' | '-' | '!' | '(' | ')' | ':' | '^' | '[' | ']' | '"' | '{' | '}' | '~' | '*' | '?' | '|' | '&'
            | ';' | '/'
    ) || c.is_whitespace()
}
