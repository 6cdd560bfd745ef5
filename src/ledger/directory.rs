//! Employee directory.
//!
//! Resolves an employee to the organization that owns them.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::info;
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::models::Employee;

/// In-memory employee registry keyed by employee id.
#[derive(Debug, Default)]
pub struct EmployeeDirectory {
    employees: DashMap<Uuid, Employee>,
}

impl EmployeeDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an employee.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Validation`] if the id is taken or the name is blank.
    pub fn register(&self, employee: Employee) -> LedgerResult<Employee> {
        if employee.name.trim().is_empty() {
            return Err(LedgerError::validation("name", "must not be blank"));
        }

        match self.employees.entry(employee.id) {
            Entry::Occupied(_) => Err(LedgerError::validation("id", "employee already exists")),
            Entry::Vacant(vacant) => {
                info!(
                    employee_id = %employee.id,
                    organization_id = %employee.organization_id,
                    role = ?employee.role,
                    "Registered employee"
                );
                vacant.insert(employee.clone());
                Ok(employee)
            }
        }
    }

    /// Looks up an employee.
    pub fn get(&self, id: Uuid) -> LedgerResult<Employee> {
        self.employees
            .get(&id)
            .map(|e| e.clone())
            .ok_or(LedgerError::NotFound { entity: "employee" })
    }

    /// Returns the number of registered employees.
    pub fn len(&self) -> usize {
        self.employees.len()
    }

    /// Returns true if no employee is registered.
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }
}
