use crate::advisor::{AdvisoryCapability, RoleContext};
use concord_types::Role;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A capability bound to a role.
#[derive(Clone)]
pub struct AdvisorBinding {
    pub role: Role,
    pub capability: Arc<dyn AdvisoryCapability>,
    /// Reflective roles are dispatched after their peers and read their votes.
    pub reflective: bool,
    pub focus: String,
}

impl AdvisorBinding {
    pub fn new(role: Role, capability: Arc<dyn AdvisoryCapability>) -> Self {
        Self {
            role,
            capability,
            reflective: false,
            focus: default_focus(role).to_string(),
        }
    }

    pub fn reflective(mut self) -> Self {
        self.reflective = true;
        self
    }

    pub fn with_focus(mut self, focus: impl Into<String>) -> Self {
        self.focus = focus.into();
        self
    }

    pub fn context(&self) -> RoleContext {
        RoleContext::for_role(self.role, self.focus.clone())
    }
}

impl std::fmt::Debug for AdvisorBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisorBinding")
            .field("role", &self.role)
            .field("reflective", &self.reflective)
            .field("focus", &self.focus)
            .finish_non_exhaustive()
    }
}

fn default_focus(role: Role) -> &'static str {
    match role {
        Role::Ledger => "persistence and lineage",
        Role::Garden => "consolidation and pruning",
        Role::Mirror => "self-model and reflexivity",
        Role::Compass => "priority and ethics",
        Role::Orchestra => "alignment and expression",
    }
}

/// Fixed role → capability bindings, built once at construction.
#[derive(Clone, Debug, Default)]
pub struct AdvisorRegistry {
    bindings: BTreeMap<Role, AdvisorBinding>,
}

impl AdvisorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a role. A second binding for the same role replaces the first.
    pub fn bind(mut self, binding: AdvisorBinding) -> Self {
        self.bindings.insert(binding.role, binding);
        self
    }

    pub fn with_advisor(self, role: Role, capability: Arc<dyn AdvisoryCapability>) -> Self {
        self.bind(AdvisorBinding::new(role, capability))
    }

    pub fn get(&self, role: Role) -> Option<&AdvisorBinding> {
        self.bindings.get(&role)
    }

    /// Bound roles in canonical order.
    pub fn roles(&self) -> Vec<Role> {
        self.bindings.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
