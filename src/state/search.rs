/// Case-insensitive substring filtering over display names

use super::data::Named;

/// True when `name` contains `query`, ignoring case.
/// An empty query matches everything.
pub fn matches_query(name: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    name.to_lowercase().contains(&query.to_lowercase())
}

/// Keep the items whose display name matches `query`, preserving order
pub fn filter_by_name<T: Named + Clone>(items: &[T], query: Option<&str>) -> Vec<T> {
    let query = query.unwrap_or("");
    items
        .iter()
        .filter(|item| matches_query(item.display_name(), query))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_is_case_insensitive_and_ordered() {
        let folders = vec![
            "Invoices".to_string(),
            "invoice-2024".to_string(),
            "Contracts".to_string(),
        ];

        let found = filter_by_name(&folders, Some("invoice"));
        assert_eq!(found, vec!["Invoices".to_string(), "invoice-2024".to_string()]);
    }

    #[test]
    fn test_uppercase_query() {
        let names = vec!["scan_001.jpg".to_string(), "Receipt.pdf".to_string()];
        assert_eq!(filter_by_name(&names, Some("SCAN")), vec!["scan_001.jpg".to_string()]);
    }

    #[test]
    fn test_empty_query_returns_everything() {
        let names = vec!["a".to_string(), "b".to_string()];
        assert_eq!(filter_by_name(&names, None), names);
        assert_eq!(filter_by_name(&names, Some("")), names);
    }

    #[test]
    fn test_matches_query() {
        assert!(matches_query("Legal Documents", "docu"));
        assert!(!matches_query("Legal Documents", "invoice"));
        assert!(matches_query("anything", ""));
    }
}
