//! Label resolution
//!
//! A class maps to one label per ancestor, most general first, followed by
//! the labels of its mixed-in modules in declaration order. A label
//! reachable along two paths appears once, at its first position.

use super::class::ClassSpec;
use super::error::{MapError, MapResult};
use super::registry::ClassMapping;
use crate::graph::Label;
use indexmap::IndexSet;
use std::collections::BTreeSet;

/// Computes label sequences from class definitions
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelResolver;

impl LabelResolver {
    pub fn new() -> Self {
        Self
    }

    /// Ordered, duplicate-free label sequence of `spec`
    pub fn resolve(&self, spec: &ClassSpec) -> MapResult<Vec<Label>> {
        Ok(self.mapping(spec)?.labels)
    }

    /// Full mapping of `spec`: ancestry, module labels and effective properties
    pub fn mapping(&self, spec: &ClassSpec) -> MapResult<ClassMapping> {
        let class = spec
            .class_id()
            .ok_or_else(|| MapError::UnresolvableLabel(spec.display_name()))?;
        let primary = spec
            .own_label()
            .ok_or_else(|| MapError::UnresolvableLabel(spec.display_name()))?;

        // Most specific first while walking, reversed below
        let mut chain = Vec::new();
        let mut current = Some(spec);
        while let Some(class_spec) = current {
            chain.push(class_spec);
            current = class_spec.parent();
        }
        chain.reverse();

        let mut ancestry: IndexSet<Label> = IndexSet::new();
        let mut properties = BTreeSet::new();
        for class_spec in &chain {
            let label = class_spec
                .own_label()
                .ok_or_else(|| MapError::UnresolvableLabel(class_spec.display_name()))?;
            ancestry.insert(label);
            properties.extend(class_spec.properties.iter().cloned());
        }

        // Modules included by an ancestor are inherited too, ancestor's first
        let mut module_labels: IndexSet<Label> = IndexSet::new();
        for class_spec in &chain {
            for module in &class_spec.mixins {
                if let Some(label) = module.mapped_label_name() {
                    if !ancestry.contains(&label) {
                        module_labels.insert(label);
                    }
                }
            }
        }

        let labels: Vec<Label> = ancestry.iter().chain(module_labels.iter()).cloned().collect();

        Ok(ClassMapping {
            class,
            primary,
            ancestry: ancestry.into_iter().collect(),
            module_labels: module_labels.into_iter().collect(),
            labels,
            properties,
        })
    }
}
