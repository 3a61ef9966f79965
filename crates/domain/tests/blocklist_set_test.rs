use ferrous_frontend_domain::BlocklistSet;

#[test]
fn test_insert_appends_trailing_dot() {
    let mut set = BlocklistSet::new();
    assert!(set.insert("ads.example.com"));
    assert!(set.contains("ads.example.com."));
}

#[test]
fn test_insert_duplicate_returns_false() {
    let mut set = BlocklistSet::new();
    assert!(set.insert("ads.example.com"));
    assert!(!set.insert("ads.example.com."));
    assert!(!set.insert("ADS.Example.COM"));
    assert_eq!(set.len(), 1);
}

#[test]
fn test_contains_is_case_insensitive() {
    let mut set = BlocklistSet::new();
    set.insert("Tracker.Example.NET.");
    assert!(set.contains("tracker.example.net."));
    assert!(set.contains("TRACKER.EXAMPLE.NET."));
}

#[test]
fn test_contains_matches_exact_names_only() {
    let mut set = BlocklistSet::new();
    set.insert("example.com");
    assert!(!set.contains("www.example.com."));
    assert!(!set.contains("com."));
}

#[test]
fn test_clear_empties_set() {
    let mut set = BlocklistSet::new();
    set.insert("a.example.");
    set.clear();
    assert!(set.is_empty());
    assert!(!set.contains("a.example."));
}
