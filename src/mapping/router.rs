//! Query routing
//!
//! Every query targets one label. A filtered query uses an indexed lookup
//! when each filtered property has an index declared on that label, and a
//! label scan with in-process filtering otherwise. Both routes return the
//! same nodes; only the amount of work differs.

use super::class::{ClassRef, LabelProvider};
use super::config::MapperConfig;
use super::coordinator::IndexCoordinator;
use super::entity::Entity;
use super::error::{MapError, MapResult};
use super::registry::LabelRegistry;
use crate::graph::{GraphBackend, Label, NodeId, PropertyMap, StorageError};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// How a query reaches storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryRoute {
    LabelScan,
    IndexLookup { property: String },
}

impl fmt::Display for QueryRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryRoute::LabelScan => write!(f, "label scan"),
            QueryRoute::IndexLookup { property } => write!(f, "index lookup on {}", property),
        }
    }
}

/// Stateless query entry points; cheap to clone
#[derive(Clone)]
pub struct QueryRouter {
    backend: Arc<dyn GraphBackend>,
    registry: Arc<LabelRegistry>,
    coordinator: Arc<IndexCoordinator>,
    config: Arc<MapperConfig>,
}

impl QueryRouter {
    pub fn new(
        backend: Arc<dyn GraphBackend>,
        registry: Arc<LabelRegistry>,
        coordinator: Arc<IndexCoordinator>,
        config: Arc<MapperConfig>,
    ) -> Self {
        Self {
            backend,
            registry,
            coordinator,
            config,
        }
    }

    /// Route a query on `label` would take right now
    pub fn plan(&self, label: &Label, filter: &PropertyMap) -> QueryRoute {
        let mut keys: Vec<&String> = filter.keys().collect();
        keys.sort();

        match keys.first() {
            Some(first) if keys.iter().all(|key| self.coordinator.has_index(label, key)) => {
                QueryRoute::IndexLookup {
                    property: (*first).clone(),
                }
            }
            _ => QueryRoute::LabelScan,
        }
    }

    /// Lazy query over every node carrying the provider's label and matching `filter`
    pub fn all<P: LabelProvider + ?Sized>(&self, provider: &P, filter: PropertyMap) -> MapResult<QueryResult> {
        Ok(QueryResult {
            router: self.clone(),
            label: label_of(provider)?,
            filter,
        })
    }

    /// First match of `filter`, or [`MapError::NotFound`]
    pub fn find<P: LabelProvider + ?Sized>(&self, provider: &P, filter: PropertyMap) -> MapResult<Entity> {
        let result = self.all(provider, filter)?;
        result.first()?.ok_or_else(|| MapError::NotFound {
            label: result.label.clone(),
            filter: describe_filter(&result.filter),
        })
    }

    /// Create a node carrying the class's full label sequence in one storage call
    pub fn create(&self, class: &ClassRef, properties: PropertyMap) -> MapResult<Entity> {
        let mapping = self.registry.mapping_for(class.id())?;

        if self.config.strict_properties {
            let mut keys: Vec<&String> = properties.keys().collect();
            keys.sort();
            if let Some(unknown) = keys.into_iter().find(|key| !mapping.declares(key)) {
                return Err(MapError::UnknownProperty {
                    class: mapping.class.clone(),
                    property: unknown.clone(),
                });
            }
        }

        let id = self.backend.create_node(&mapping.labels, properties.clone())?;
        debug!("Created {} as {}", mapping.class, id);
        Ok(Entity::new(id, Some(mapping.class), mapping.labels, properties))
    }

    /// Delete the entity's node
    pub fn destroy(&self, entity: &Entity) -> MapResult<()> {
        self.backend.delete_node(entity.id())?;
        debug!("Destroyed {}", entity.id());
        Ok(())
    }

    /// Delete every node carrying the provider's label; returns how many went
    pub fn destroy_all<P: LabelProvider + ?Sized>(&self, provider: &P) -> MapResult<usize> {
        let label = label_of(provider)?;
        let mut deleted = 0;
        for id in self.backend.label_scan(&label)? {
            match self.backend.delete_node(id) {
                Ok(()) => deleted += 1,
                // Deleted concurrently; the goal state is reached either way
                Err(StorageError::NodeNotFound(_)) => {}
                Err(err) => return Err(err.into()),
            }
        }
        debug!("Destroyed {} nodes labelled {}", deleted, label);
        Ok(deleted)
    }

    /// Candidate ids plus the route that actually produced them
    fn candidates(
        &self,
        label: &Label,
        filter: &PropertyMap,
        route: QueryRoute,
    ) -> MapResult<(Vec<NodeId>, QueryRoute)> {
        if let QueryRoute::IndexLookup { property } = &route {
            if let Some(value) = filter.get(property) {
                match self.backend.indexed_lookup(label, property, value) {
                    Ok(ids) => return Ok((ids, route)),
                    // Dropped after the route was chosen
                    Err(StorageError::IndexNotFound(handle)) => {
                        debug!("Index {} vanished before lookup, scanning {}", handle, label);
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }
        Ok((self.backend.label_scan(label)?, QueryRoute::LabelScan))
    }
}

impl fmt::Debug for QueryRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryRouter").field("config", &self.config).finish()
    }
}

/// Label a provider queries, or [`MapError::UnresolvableLabel`]
pub(crate) fn label_of<P: LabelProvider + ?Sized>(provider: &P) -> MapResult<Label> {
    provider
        .mapped_label_name()
        .ok_or_else(|| MapError::UnresolvableLabel(provider.provider_name()))
}

fn describe_filter(filter: &PropertyMap) -> String {
    let mut pairs: Vec<String> = filter.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
    pairs.sort();
    format!("{{{}}}", pairs.join(", "))
}

/// Lazy, restartable query
///
/// Nothing touches storage until [`iter`](Self::iter) is called, and every
/// call plans and runs the query afresh, so results follow the store's
/// current state rather than a snapshot.
#[derive(Debug, Clone)]
pub struct QueryResult {
    router: QueryRouter,
    label: Label,
    filter: PropertyMap,
}

impl QueryResult {
    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn filter(&self) -> &PropertyMap {
        &self.filter
    }

    /// Route the next iteration will take
    pub fn route(&self) -> QueryRoute {
        self.router.plan(&self.label, &self.filter)
    }

    /// Run the query; nodes are fetched one at a time as the iterator advances
    pub fn iter(&self) -> MapResult<QueryIter> {
        let (ids, route) = self.router.candidates(&self.label, &self.filter, self.route())?;
        debug!("Query on {} via {} with {} candidates", self.label, route, ids.len());

        let residual = match &route {
            QueryRoute::IndexLookup { property } if !self.router.config.verify_index_hits => {
                let mut rest = self.filter.clone();
                rest.remove(property);
                rest
            }
            _ => self.filter.clone(),
        };

        Ok(QueryIter {
            backend: Arc::clone(&self.router.backend),
            registry: Arc::clone(&self.router.registry),
            label: self.label.clone(),
            residual,
            ids: ids.into_iter(),
        })
    }

    pub fn to_vec(&self) -> MapResult<Vec<Entity>> {
        self.iter()?.collect()
    }

    pub fn first(&self) -> MapResult<Option<Entity>> {
        self.iter()?.next().transpose()
    }

    pub fn contains(&self, entity: &Entity) -> MapResult<bool> {
        for item in self.iter()? {
            if &item? == entity {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn count(&self) -> MapResult<usize> {
        self.iter()?.try_fold(0, |n, item| item.map(|_| n + 1))
    }
}

/// One pass over a [`QueryResult`]
pub struct QueryIter {
    backend: Arc<dyn GraphBackend>,
    registry: Arc<LabelRegistry>,
    label: Label,
    residual: PropertyMap,
    ids: std::vec::IntoIter<NodeId>,
}

impl Iterator for QueryIter {
    type Item = MapResult<Entity>;

    fn next(&mut self) -> Option<Self::Item> {
        for id in self.ids.by_ref() {
            let node = match self.backend.get_node(id) {
                Ok(Some(node)) => node,
                // Deleted since the candidates were collected
                Ok(None) => continue,
                Err(err) => return Some(Err(err.into())),
            };
            if !node.has_label(&self.label) || !node.matches(&self.residual) {
                continue;
            }
            let class = self.registry.class_for_labels(node.labels());
            return Some(Ok(Entity::from_node(node, class)));
        }
        None
    }
}
