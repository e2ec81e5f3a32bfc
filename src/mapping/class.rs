//! Class definitions and label providers
//!
//! Rust has no class inheritance or runtime mixins, so a mapped class is
//! described explicitly by a [`ClassSpec`]: its name, the already defined
//! parent it extends, the modules it includes and the properties it
//! declares. Defining a class spec through [`Mapper::define`] yields a
//! [`ClassRef`] that later specs can extend and queries can target.
//!
//! [`Mapper::define`]: crate::mapping::Mapper::define

use crate::graph::Label;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identity of a mapped class
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(String);

impl ClassId {
    pub fn new(name: impl Into<String>) -> Self {
        ClassId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ClassId {
    fn from(s: &str) -> Self {
        ClassId(s.to_string())
    }
}

/// Anything that maps to a label and can therefore be queried
///
/// Implemented by [`ClassRef`] (its own label) and [`LabelModule`]. Include a
/// provider in a [`ClassSpec`] to stack its label onto every instance of
/// that class.
pub trait LabelProvider: Send + Sync {
    /// Label this provider contributes, `None` if it contributes none
    fn mapped_label_name(&self) -> Option<Label>;

    /// Human readable name used in errors and logs
    fn provider_name(&self) -> String;
}

/// A reusable module that is not itself a class.
///
/// ```rust
/// use labelgraph::mapping::{LabelModule, LabelProvider};
///
/// let mixin = LabelModule::new("SomeLabelMixin").with_label("some_label");
/// assert_eq!(mixin.mapped_label_name().unwrap().as_str(), "some_label");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelModule {
    name: String,
    label: Option<Label>,
}

impl LabelModule {
    /// A module without a label of its own
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<Label>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl LabelProvider for LabelModule {
    fn mapped_label_name(&self) -> Option<Label> {
        self.label.clone()
    }

    fn provider_name(&self) -> String {
        self.name.clone()
    }
}

/// Definition of a mapped class
#[derive(Clone, Default)]
pub struct ClassSpec {
    pub(crate) name: Option<String>,
    pub(crate) label: Option<Label>,
    pub(crate) parent: Option<Arc<ClassSpec>>,
    pub(crate) mixins: Vec<Arc<dyn LabelProvider>>,
    pub(crate) properties: Vec<String>,
}

impl ClassSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// A class with no name; it cannot be defined unless given a label
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Override the label derived from the class name
    pub fn with_label(mut self, label: impl Into<Label>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Inherit from an already defined class
    pub fn extends(mut self, parent: &ClassRef) -> Self {
        self.parent = Some(Arc::clone(&parent.spec));
        self
    }

    /// Mix in a module; its label is stacked after the ancestry labels
    pub fn include<P: LabelProvider + 'static>(mut self, module: P) -> Self {
        self.mixins.push(Arc::new(module));
        self
    }

    pub fn property(mut self, key: impl Into<String>) -> Self {
        self.properties.push(key.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn parent(&self) -> Option<&ClassSpec> {
        self.parent.as_deref()
    }

    /// The class's own label: the override if set, else its name
    pub fn own_label(&self) -> Option<Label> {
        self.label
            .clone()
            .or_else(|| self.name.as_deref().map(Label::new))
    }

    /// Class identity: the name, falling back to the label override
    pub fn class_id(&self) -> Option<ClassId> {
        self.name
            .clone()
            .or_else(|| self.label.as_ref().map(|l| l.as_str().to_string()))
            .map(ClassId)
    }

    pub(crate) fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| "<anonymous class>".to_string())
    }
}

impl fmt::Debug for ClassSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mixins: Vec<String> = self.mixins.iter().map(|m| m.provider_name()).collect();
        f.debug_struct("ClassSpec")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("parent", &self.parent.as_ref().map(|p| p.display_name()))
            .field("mixins", &mixins)
            .field("properties", &self.properties)
            .finish()
    }
}

/// Handle to a defined class
#[derive(Debug, Clone)]
pub struct ClassRef {
    id: ClassId,
    label: Label,
    spec: Arc<ClassSpec>,
}

impl ClassRef {
    pub(crate) fn new(id: ClassId, label: Label, spec: ClassSpec) -> Self {
        Self {
            id,
            label,
            spec: Arc::new(spec),
        }
    }

    pub fn id(&self) -> &ClassId {
        &self.id
    }

    /// The class's own (most specific) label
    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn spec(&self) -> &ClassSpec {
        &self.spec
    }
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ClassRef {}

impl LabelProvider for ClassRef {
    fn mapped_label_name(&self) -> Option<Label> {
        Some(self.label.clone())
    }

    fn provider_name(&self) -> String {
        self.id.to_string()
    }
}
