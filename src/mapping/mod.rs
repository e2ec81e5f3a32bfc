//! Label mapping layer
//!
//! Turns class definitions into stacked node labels and answers queries
//! against them:
//! - [`LabelResolver`] derives the ordered label sequence of a class
//! - [`LabelRegistry`] records which classes map to which labels
//! - [`IndexCoordinator`] propagates index declarations up the hierarchy
//! - [`QueryRouter`] picks an index lookup or a label scan per query
//! - [`Mapper`] ties them together over one [`GraphBackend`](crate::graph::GraphBackend)

pub mod class;
pub mod config;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod mapper;
pub mod registry;
pub mod resolver;
pub mod router;

pub use class::{ClassId, ClassRef, ClassSpec, LabelModule, LabelProvider};
pub use config::MapperConfig;
pub use coordinator::{IndexCoordinator, IndexDescriptor};
pub use entity::Entity;
pub use error::{MapError, MapResult};
pub use mapper::Mapper;
pub use registry::{ClassMapping, LabelRegistry, LabelSpec};
pub use resolver::LabelResolver;
pub use router::{QueryIter, QueryResult, QueryRoute, QueryRouter};
