/// Join a rule's path prefix with a user supplied sub-path.
///
/// Exactly one `/` ends up at the junction. Interior slashes are left alone and nothing
/// is percent-encoded.
pub fn join_path(prefix: &str, suffix: &str) -> String {
    match (prefix.ends_with('/'), suffix.starts_with('/')) {
        (true, true) => format!("{prefix}{}", &suffix[1..]),
        (false, false) => format!("{prefix}/{suffix}"),
        _ => format!("{prefix}{suffix}"),
    }
}
