#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

pub mod config;
pub mod dialect;
pub mod enumerator;
pub mod fragmenter;
pub mod hosts;
pub mod partition;
pub mod predicate;


pub use crate::config::FragmenterConfig;
pub use crate::fragmenter::JdbcPartitionFragmenter;
pub use crate::partition::{IntervalUnit, PartitionKind, PartitionPlan};
