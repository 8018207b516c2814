pub mod memory;

pub use memory::ClusterRegistry;
