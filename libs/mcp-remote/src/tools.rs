//! Tool filtering by allow-set (spec §4.5): "if non-empty, the toolset
//! exposes only matching tools" — an absent or empty allow-set both mean
//! unrestricted, since the spec only restricts on the non-empty case.

pub fn is_allowed(tool_name: &str, allowed: &Option<Vec<String>>) -> bool {
    match allowed {
        None => true,
        Some(set) if set.is_empty() => true,
        Some(set) => set.iter().any(|a| a == tool_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_allow_set_admits_everything() {
        assert!(is_allowed("search", &None));
    }

    #[test]
    fn empty_allow_set_admits_everything() {
        assert!(is_allowed("search", &Some(vec![])));
    }

    #[test]
    fn allow_set_admits_only_named_tools() {
        let allowed = Some(vec!["search".to_string(), "read_file".to_string()]);
        assert!(is_allowed("search", &allowed));
        assert!(!is_allowed("delete_file", &allowed));
    }
}
