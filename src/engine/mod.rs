pub mod coordination;

pub use coordination::ClusterCoordinator;
