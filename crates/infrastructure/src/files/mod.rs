pub mod blocklist_file;
pub mod trust_anchor_file;

pub use blocklist_file::{parse_blocklist, FileBlocklistSource};
pub use trust_anchor_file::FileTrustAnchorStore;
