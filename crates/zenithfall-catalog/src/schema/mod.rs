//! Schema definitions for RON content files

pub mod dungeon;
pub mod material;
pub mod race;
pub mod recipe;
