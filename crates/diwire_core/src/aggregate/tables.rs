//! Set-valued aggregation tables keyed by owning module.

use crate::model::binding::BindingDeclaration;
use crate::model::type_name::TypeName;
use std::collections::{BTreeMap, BTreeSet};

static NO_BINDINGS: BTreeSet<BindingDeclaration> = BTreeSet::new();
static NO_SUBMODULES: BTreeSet<TypeName> = BTreeSet::new();

/// Module-to-bindings and module-to-submodules multimaps with set semantics.
#[derive(Debug, Default)]
pub struct AggregationTables {
    bindings: BTreeMap<TypeName, BTreeSet<BindingDeclaration>>,
    submodules: BTreeMap<TypeName, BTreeSet<TypeName>>,
}

impl AggregationTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `child` to the submodules of `owner`.
    ///
    /// Returns `false` when the pair was already present.
    pub fn record_submodule(&mut self, owner: &TypeName, child: TypeName) -> bool {
        self.submodules
            .entry(owner.clone())
            .or_default()
            .insert(child)
    }

    /// Adds `binding` to the bindings of `owner`.
    ///
    /// Returns `false` when an equal declaration was already present.
    pub fn record_binding(&mut self, owner: &TypeName, binding: BindingDeclaration) -> bool {
        self.bindings
            .entry(owner.clone())
            .or_default()
            .insert(binding)
    }

    /// Current bindings of `owner`, empty when none were recorded.
    pub fn bindings_of(&self, owner: &TypeName) -> &BTreeSet<BindingDeclaration> {
        self.bindings.get(owner).unwrap_or(&NO_BINDINGS)
    }

    /// Current submodules of `owner`, empty when none were recorded.
    pub fn submodules_of(&self, owner: &TypeName) -> &BTreeSet<TypeName> {
        self.submodules.get(owner).unwrap_or(&NO_SUBMODULES)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty() && self.submodules.is_empty()
    }
}
