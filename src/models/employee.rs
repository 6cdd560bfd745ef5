//! Employee model and related types.
//!
//! This module defines the Employee struct and Role enum for representing
//! members of an organization.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The permission tier of an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Operates across all organizations.
    SuperAdmin,
    /// Administers a single organization (policies, approvals, adjustments).
    OrgAdmin,
    /// A regular employee who submits leave and records attendance.
    Employee,
}

/// Represents an employee belonging to exactly one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: Uuid,
    /// The organization the employee belongs to.
    pub organization_id: Uuid,
    /// Display name.
    pub name: String,
    /// The employee's permission tier.
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Employee
}

impl Employee {
    /// Returns true if the employee may administer their organization.
    ///
    /// # Examples
    ///
    /// ```
    /// use leave_ledger::models::{Employee, Role};
    /// use uuid::Uuid;
    ///
    /// let admin = Employee {
    ///     id: Uuid::new_v4(),
    ///     organization_id: Uuid::new_v4(),
    ///     name: "Priya".to_string(),
    ///     role: Role::OrgAdmin,
    /// };
    /// assert!(admin.is_admin());
    /// ```
    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::SuperAdmin | Role::OrgAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_employee_defaults_role() {
        let json = r#"{
            "id": "6d1f4f0e-3c59-4a4e-9b7e-0a1c2d3e4f50",
            "organization_id": "0b6f2c52-57a4-4a63-8f0e-7f6b1c2d3e4f",
            "name": "Arun"
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.role, Role::Employee);
        assert_eq!(employee.name, "Arun");
        assert!(!employee.is_admin());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            "\"super_admin\""
        );
        assert_eq!(
            serde_json::to_string(&Role::OrgAdmin).unwrap(),
            "\"org_admin\""
        );
        assert_eq!(
            serde_json::to_string(&Role::Employee).unwrap(),
            "\"employee\""
        );
    }

    #[test]
    fn test_super_admin_is_admin() {
        let employee = Employee {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            name: "Root".to_string(),
            role: Role::SuperAdmin,
        };
        assert!(employee.is_admin());
    }
}
