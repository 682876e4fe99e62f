//! Volume buffer implementations

mod in_memory_volume;
mod mmap_volume;

pub use in_memory_volume::InMemoryVolume;
pub use mmap_volume::MmapVolume;
