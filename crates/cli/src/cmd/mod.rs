mod config;
mod diff;
mod edit;
mod history;
mod rollback;
mod show;
mod update;

pub use config::cmd_config;
pub use diff::cmd_diff;
pub use edit::cmd_edit;
pub use history::{HistoryCommand, cmd_history};
pub use rollback::cmd_rollback;
pub use show::cmd_show;
pub use update::{UpdateArgs, cmd_update};
