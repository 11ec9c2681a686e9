//! # VIGIL Shared - Common Types
//!
//! Plain data shared between the detection core and whatever host embeds it.
//!
//! ## Modules
//!
//! - `math`: world-space vectors and block-coordinate helpers
//! - `ids`: stable identity keys for players and spawned actors
//! - `device`: coarse client platform classification
//! - `constants`: tick-rate conversions

pub mod constants;
pub mod device;
pub mod ids;
pub mod math;

pub use constants::{ticks_from_secs, TICKS_PER_SECOND};
pub use device::DeviceClass;
pub use ids::{ActorId, PlayerId};
pub use math::{ceil_to_block, BlockPos, Vec3};
