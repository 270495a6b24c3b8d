/// Base username for an account synthesized from a profile.
///
/// Uses the local part of `email`, or the lowercased `fallback` (an enrollment
/// code) when there is no usable e-mail.
pub fn base_username(email: Option<&str>, fallback: &str) -> String {
    email
        .and_then(|email| email.split('@').next())
        .map(str::trim)
        .filter(|local| !local.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback.trim().to_lowercase())
}

/// Returns `base` if free, otherwise `base1`, `base2`, ... until `is_taken` says no
pub fn disambiguate<F>(base: &str, mut is_taken: F) -> String
where
    F: FnMut(&str) -> bool,
{
    if !is_taken(base) {
        return base.to_string();
    }

    (1u64..)
        .map(|counter| format!("{base}{counter}"))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_base_username_from_email() {
        assert_eq!(base_username(Some("grace.hopper@navy.mil"), "X1"), "grace.hopper");
    }

    #[test]
    fn test_base_username_falls_back_to_code() {
        assert_eq!(base_username(None, "MAT2025001"), "mat2025001");
        assert_eq!(base_username(Some(""), "MAT2025001"), "mat2025001");
        assert_eq!(base_username(Some("@nowhere"), "ABC"), "abc");
    }

    #[test]
    fn test_disambiguate() {
        let taken: HashSet<&str> = ["ana", "ana1", "ana2"].into_iter().collect();
        assert_eq!(disambiguate("ana", |c| taken.contains(c)), "ana3");
        assert_eq!(disambiguate("bruno", |c| taken.contains(c)), "bruno");
    }
}
