/// Result of expanding `${VAR}` placeholders in raw config text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expanded {
    pub text: String,
    /// Names that had no value, in order of first appearance. Their
    /// placeholders are left in `text` untouched.
    pub unresolved: Vec<String>,
}

/// Expand placeholders from the process environment.
pub fn substitute_env(input: &str) -> Expanded {
    substitute_with(input, |name| std::env::var(name).ok())
}

/// Same as [`substitute_env`], resolving names through `lookup`.
///
/// `${}` and an unterminated `${NAME` are copied through literally.
pub fn substitute_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> Expanded {
    let mut text = String::with_capacity(input.len());
    let mut unresolved: Vec<String> = Vec::new();
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        text.push_str(&rest[..start]);
        let body = &rest[start + 2..];
        let Some(len) = body.find('}') else {
            rest = &rest[start..];
            break;
        };
        let placeholder = &rest[start..start + 2 + len + 1];
        let name = &body[..len];
        match lookup(name).filter(|_| !name.is_empty()) {
            Some(value) => text.push_str(&value),
            None => {
                if !name.is_empty() && !unresolved.iter().any(|n| n == name) {
                    unresolved.push(name.to_string());
                }
                text.push_str(placeholder);
            },
        }
        rest = &body[len + 1..];
    }
    text.push_str(rest);

    Expanded { text, unresolved }
}
