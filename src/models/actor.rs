//! The acting user passed explicitly into every workflow operation.

use serde::{Deserialize, Serialize};

use super::EmployeeId;

/// The role an actor holds in the HR application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May review requests and run payroll.
    Admin,
    /// Regular employee.
    Staff,
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Identity and capability of whoever is calling into the engine.
///
/// # Example
///
/// ```
/// use attendance_engine::models::ActorContext;
///
/// let admin = ActorContext::admin(1);
/// assert!(admin.is_admin());
/// assert!(!ActorContext::staff(5).is_admin());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    /// The acting employee.
    pub actor_id: EmployeeId,
    /// The role the actor holds.
    pub role: Role,
}

impl ActorContext {
    /// An actor holding the admin role.
    pub fn admin(actor_id: EmployeeId) -> Self {
        Self {
            actor_id,
            role: Role::Admin,
        }
    }

    /// An actor holding the staff role.
    pub fn staff(actor_id: EmployeeId) -> Self {
        Self {
            actor_id,
            role: Role::Staff,
        }
    }

    /// Returns true if the actor may review requests and run payroll.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
