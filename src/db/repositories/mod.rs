pub mod catalog;
pub mod crate_links;
pub mod records;
