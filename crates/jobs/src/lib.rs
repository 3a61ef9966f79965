pub mod blocklist_reload;
pub mod runner;

pub use blocklist_reload::BlocklistReloadJob;
pub use runner::JobRunner;
