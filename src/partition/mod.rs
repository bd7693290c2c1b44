//! Node partitions and hierarchical subpartitions.

pub mod parts;
pub mod subpartition;

pub use parts::{Destination, PartId, Partition, PartitionSize, Relocation};
pub use subpartition::SubPartition;
