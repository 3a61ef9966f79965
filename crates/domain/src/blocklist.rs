use rustc_hash::FxHashSet;

/// Case-insensitive set of fully qualified names whose queries are refused.
///
/// Entries always end in `.`; lookups compare ASCII case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlocklistSet {
    domains: FxHashSet<Box<str>>,
}

impl BlocklistSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a name, appending the trailing dot when absent.
    /// Returns `false` if the name was already present.
    pub fn insert(&mut self, domain: &str) -> bool {
        self.domains.insert(normalize(domain).into_boxed_str())
    }

    pub fn contains(&self, qname: &str) -> bool {
        if qname.bytes().any(|b| b.is_ascii_uppercase()) || !qname.ends_with('.') {
            self.domains.contains(normalize(qname).as_str())
        } else {
            self.domains.contains(qname)
        }
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn clear(&mut self) {
        self.domains.clear();
    }
}

fn normalize(domain: &str) -> String {
    let mut name = domain.to_ascii_lowercase();
    if !name.ends_with('.') {
        name.push('.');
    }
    name
}
