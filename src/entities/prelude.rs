pub use super::agents::Entity as Agents;
pub use super::crate_references::Entity as CrateReferences;
pub use super::crates::Entity as Crates;
pub use super::keys::Entity as Keys;
pub use super::skins::Entity as Skins;
