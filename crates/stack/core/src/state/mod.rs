//! Stack state and the identifiers shared with the host.

mod ids;
mod item;
mod kind;
mod registry;
mod stack;
mod world;

pub use ids::{CreatureId, PlayerId, StackId};
pub use item::ItemStack;
pub use kind::{DamageCause, EntityKind};
pub use registry::{StackRef, StackRegistry};
pub use stack::{EntityStack, SpawnCause};
pub use world::{Difficulty, Location};
