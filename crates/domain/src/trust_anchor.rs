/// Ordered, duplicate-free set of DNSKEY trust anchors in presentation form.
///
/// Order is plain byte-wise string order so two sets holding the same
/// anchors compare equal element by element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustAnchorSet {
    anchors: Vec<String>,
}

impl TrustAnchorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts in sorted position. Returns `false` for a duplicate.
    pub fn add(&mut self, anchor: impl Into<String>) -> bool {
        let anchor = anchor.into();
        match self.anchors.binary_search(&anchor) {
            Ok(_) => false,
            Err(pos) => {
                self.anchors.insert(pos, anchor);
                true
            }
        }
    }

    /// Replaces `self` with `proposed` if they differ.
    ///
    /// Returns whether the active set changed. An identical proposal is
    /// discarded and `self` is left untouched.
    pub fn merge(&mut self, proposed: TrustAnchorSet) -> bool {
        if *self == proposed {
            return false;
        }
        *self = proposed;
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.anchors.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn clear(&mut self) {
        self.anchors.clear();
    }

    /// File representation: one anchor per line.
    pub fn to_file_contents(&self) -> String {
        let mut out = String::with_capacity(self.anchors.iter().map(|a| a.len() + 1).sum());
        for anchor in &self.anchors {
            out.push_str(anchor);
            out.push('\n');
        }
        out
    }
}

impl FromIterator<String> for TrustAnchorSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = TrustAnchorSet::new();
        for anchor in iter {
            set.add(anchor);
        }
        set
    }
}
