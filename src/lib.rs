//! labelgraph
//!
//! Maps application classes onto labelled nodes of a property graph.
//!
//! # Model
//!
//! - A class maps to one label per ancestor, most general first, plus one
//!   label per included module that exposes a label
//! - Every node created through a class carries that whole label sequence
//! - An index declared on a class also exists on its ancestors' labels; an
//!   index declared on a base class stays on the base label
//! - `all`/`find` use an index lookup when every filtered property is
//!   indexed on the queried label and fall back to a label scan otherwise
//!
//! Storage is reached through [`graph::GraphBackend`]; [`graph::GraphStore`]
//! is the in-memory implementation.
//!
//! ## Example Usage
//!
//! ```rust
//! use labelgraph::graph::{props, GraphStore, Label, PropertyMap};
//! use labelgraph::mapping::{ClassSpec, LabelModule, Mapper};
//! use std::sync::Arc;
//!
//! let mapper = Mapper::new(Arc::new(GraphStore::new()));
//!
//! let base = mapper.define(ClassSpec::new("MyBaseClass").property("things")).unwrap();
//! let sub = mapper
//!     .define(ClassSpec::new("MySubClass").extends(&base).property("stuff"))
//!     .unwrap();
//! assert_eq!(
//!     mapper.labels_for(&sub).unwrap(),
//!     vec![Label::new("MyBaseClass"), Label::new("MySubClass")]
//! );
//!
//! // Indexes both :MyBaseClass(things) and :MySubClass(things)
//! mapper.index(&sub, "things").unwrap();
//!
//! let thing = mapper.create(&sub, props([("things", "a")])).unwrap();
//! assert_eq!(mapper.find(&sub, props([("things", "a")])).unwrap(), thing);
//! assert!(mapper.all(&base, PropertyMap::new()).unwrap().contains(&thing).unwrap());
//!
//! // Modules exposing a label are queryable on their own
//! let mixin = LabelModule::new("SomeLabelMixin").with_label("some_label");
//! let tagged = mapper.define(ClassSpec::new("SomeLabelClass").include(mixin.clone())).unwrap();
//! let t = mapper.create(&tagged, PropertyMap::new()).unwrap();
//! assert!(mapper.all(&mixin, PropertyMap::new()).unwrap().contains(&t).unwrap());
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod graph;
pub mod index;
pub mod mapping;

// Re-export main types for convenience
pub use graph::{
    GraphBackend, GraphStore, IndexHandle, Label, Node, NodeId, PropertyMap, PropertyValue,
    StorageError, StorageResult,
};

pub use mapping::{
    ClassRef, ClassSpec, Entity, IndexCoordinator, LabelModule, LabelProvider, LabelRegistry,
    LabelResolver, MapError, MapResult, Mapper, MapperConfig, QueryResult, QueryRoute,
    QueryRouter,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
