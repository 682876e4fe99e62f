//! Domain layer - Core carving logic
//!
//! Entities, repository traits and the pure services that locate and
//! validate embedded objects. Nothing here touches the filesystem.

pub mod entities;
pub mod repositories;
pub mod services;
