/// Single-quote a string for a POSIX shell.
pub fn shell_quote(raw: &str) -> String {
    if !raw.is_empty()
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'/'))
    {
        return raw.to_string();
    }
    format!("'{}'", raw.replace('\'', r"'\''"))
}

/// Like `shell_quote`, but keeps a leading `~/` outside the quotes so the
/// remote shell still expands it.
pub fn quote_path(path: &str) -> String {
    match path.strip_prefix("~/") {
        Some(rest) if rest.is_empty() => "~".to_string(),
        Some(rest) => format!("~/{}", shell_quote(rest)),
        None if path == "~" => "~".to_string(),
        None => shell_quote(path),
    }
}
