//! Binding declaration value.

use crate::model::type_name::TypeName;
use serde::Serialize;

/// One discovered implementer-to-interface fact to wire into a module.
///
/// Equality covers all four fields: two declarations reported separately with
/// identical fields are the same binding and collapse inside a set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BindingDeclaration {
    pub implementer: TypeName,
    pub implemented: Option<TypeName>,
    pub scope: Option<TypeName>,
    pub eager_singleton: bool,
}

impl BindingDeclaration {
    pub fn new(
        implementer: TypeName,
        implemented: Option<TypeName>,
        scope: Option<TypeName>,
        eager_singleton: bool,
    ) -> Self {
        Self {
            implementer,
            implemented,
            scope,
            eager_singleton,
        }
    }

    /// Binding of a concrete type to itself, without scope.
    pub fn concrete(implementer: TypeName) -> Self {
        Self::new(implementer, None, None, false)
    }
}
