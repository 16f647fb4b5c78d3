mod search;
mod show;
mod sync;

pub use search::cmd_search;
pub use show::cmd_show;
pub use sync::cmd_sync;
