//! Caller-facing facade
//!
//! A [`Mapper`] owns one registry, one index coordinator and one router over
//! a shared backend. Create it once at start-up and hand out references;
//! [`Mapper::reset`] restores the empty state between tests.

use super::class::{ClassRef, ClassSpec, LabelProvider};
use super::config::MapperConfig;
use super::coordinator::IndexCoordinator;
use super::entity::Entity;
use super::error::MapResult;
use super::registry::LabelRegistry;
use super::resolver::LabelResolver;
use super::router::{label_of, QueryResult, QueryRouter};
use crate::graph::{GraphBackend, IndexHandle, Label, PropertyMap};
use std::sync::Arc;
use tracing::info;

/// Entry point for defining classes, declaring indexes and querying
#[derive(Debug)]
pub struct Mapper {
    registry: Arc<LabelRegistry>,
    coordinator: Arc<IndexCoordinator>,
    resolver: LabelResolver,
    router: QueryRouter,
}

impl Mapper {
    pub fn new(backend: Arc<dyn GraphBackend>) -> Self {
        Self::with_config(backend, MapperConfig::default())
    }

    pub fn with_config(backend: Arc<dyn GraphBackend>, config: MapperConfig) -> Self {
        let registry = Arc::new(LabelRegistry::new());
        let coordinator = Arc::new(IndexCoordinator::new(Arc::clone(&backend), Arc::clone(&registry)));
        let router = QueryRouter::new(
            backend,
            Arc::clone(&registry),
            Arc::clone(&coordinator),
            Arc::new(config),
        );
        Self {
            registry,
            coordinator,
            resolver: LabelResolver::new(),
            router,
        }
    }

    /// Resolve and register a class. Fails without registering anything.
    pub fn define(&self, spec: ClassSpec) -> MapResult<ClassRef> {
        let mapping = self.resolver.mapping(&spec)?;
        let class_ref = ClassRef::new(mapping.class.clone(), mapping.primary.clone(), spec);
        let labels = mapping.labels.clone();
        self.registry.register(mapping)?;

        info!("Defined {} with labels {:?}", class_ref.id(), labels);
        Ok(class_ref)
    }

    /// Label sequence attached to every instance of `class`
    pub fn labels_for(&self, class: &ClassRef) -> MapResult<Vec<Label>> {
        self.registry.labels_for(class.id())
    }

    /// Declare an index on the provider's label (and its ancestors' labels)
    pub fn index<P: LabelProvider + ?Sized>(&self, provider: &P, property: &str) -> MapResult<Vec<IndexHandle>> {
        let label = label_of(provider)?;
        self.coordinator.declare_index(&label, property)
    }

    pub fn drop_index<P: LabelProvider + ?Sized>(&self, provider: &P, property: &str) -> MapResult<()> {
        let label = label_of(provider)?;
        self.coordinator.drop_index(&label, property)
    }

    pub fn has_index<P: LabelProvider + ?Sized>(&self, provider: &P, property: &str) -> bool {
        provider
            .mapped_label_name()
            .map(|label| self.coordinator.has_index(&label, property))
            .unwrap_or(false)
    }

    pub fn all<P: LabelProvider + ?Sized>(&self, provider: &P, filter: PropertyMap) -> MapResult<QueryResult> {
        self.router.all(provider, filter)
    }

    pub fn find<P: LabelProvider + ?Sized>(&self, provider: &P, filter: PropertyMap) -> MapResult<Entity> {
        self.router.find(provider, filter)
    }

    pub fn create(&self, class: &ClassRef, properties: PropertyMap) -> MapResult<Entity> {
        self.router.create(class, properties)
    }

    pub fn destroy(&self, entity: &Entity) -> MapResult<()> {
        self.router.destroy(entity)
    }

    pub fn destroy_all<P: LabelProvider + ?Sized>(&self, provider: &P) -> MapResult<usize> {
        self.router.destroy_all(provider)
    }

    pub fn registry(&self) -> &LabelRegistry {
        &self.registry
    }

    pub fn coordinator(&self) -> &IndexCoordinator {
        &self.coordinator
    }

    pub fn router(&self) -> &QueryRouter {
        &self.router
    }

    /// Forget all classes and index descriptors; stored data is untouched
    pub fn reset(&self) {
        self.registry.reset();
        self.coordinator.reset();
    }
}
