//! Slot bookkeeping for a tiled, cycle-scheduled processor.
//!
//! Each tile of the target has a fixed number of instruction slots,
//! data memory words and scalar registers, all taken from a
//! [`Machine`] description.  A [`Tile`] answers "where can the next
//! thing go" and records "put it here", so that the code generator
//! never double-books a register, reuses an instruction cycle or
//! overlaps two arrays.
//!
//! ```
//! use tile_alloc::{InstructionPolicy, MachineDescription, Tile};
//!
//! fn main() -> anyhow::Result<()> {
//!     let machine = MachineDescription::new(4, 8, 2);
//!     let mut tile = Tile::new(&machine, InstructionPolicy::CycleOrdered);
//!
//!     let reg = tile.find_free_register().expect("a free register");
//!     tile.use_register(reg)?;
//!
//!     let cycle = tile.find_free_instruction(0).expect("a free cycle");
//!     tile.use_instruction(cycle)?;
//!     assert_eq!(tile.last_used_instruction(), Some(cycle));
//!     Ok(())
//! }
//! ```

mod errors;
mod instruction;
mod machine;
mod slot;
mod tile;

pub use errors::{ResourceKind, TileError};
pub use instruction::InstructionPolicy;
pub use machine::{Machine, MachineDescription};
pub use slot::SlotState;
pub use tile::Tile;
