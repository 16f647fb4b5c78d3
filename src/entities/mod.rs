pub mod prelude;

pub mod agents;
pub mod crate_references;
pub mod crates;
pub mod keys;
pub mod skins;
