/// Extract the credential from an `Authorization` header value.
///
/// Returns `None` unless the value has the form `Bearer <token>` with a
/// non-empty token.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let token = header_value.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
