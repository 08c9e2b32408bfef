// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Onboarding state-machine guards and department defaulting.

use crate::error::CoreError;
use helpdesk_domain::{DomainError, Role, User, UserStatus};

/// Department ids substituted for privileged roles that register
/// without one. Resolved once at startup from configured department
/// names and injected wherever registration is handled.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleDefaults {
    /// Fallback department for admins.
    pub admin_department_id: Option<i64>,
    /// Fallback department for managers.
    pub manager_department_id: Option<i64>,
}

impl RoleDefaults {
    /// The fallback department for a role, if one is configured.
    #[must_use]
    pub const fn for_role(&self, role: Role) -> Option<i64> {
        match role {
            Role::Admin => self.admin_department_id,
            Role::Manager => self.manager_department_id,
            Role::Supervisor | Role::Agent => None,
        }
    }
}

/// Resolves the department a registering user belongs to.
///
/// Non-admin roles must supply a department. Admins may omit one, and
/// admins and managers fall back to the configured default when they
/// do not supply one.
///
/// # Errors
///
/// Returns `MissingDepartment` when a role that requires a department
/// supplies none and no default covers it.
pub fn resolve_department(
    role: Role,
    requested: Option<i64>,
    defaults: &RoleDefaults,
) -> Result<Option<i64>, CoreError> {
    if let Some(id) = requested {
        return Ok(Some(id));
    }
    if let Some(id) = defaults.for_role(role) {
        return Ok(Some(id));
    }
    if role.allows_missing_department() {
        return Ok(None);
    }
    Err(CoreError::DomainViolation(DomainError::MissingDepartment {
        role: role.as_str().to_string(),
    }))
}

/// Checks a user may consume their email verification token.
///
/// # Errors
///
/// Returns `AlreadyVerified` for a consumed token and
/// `NotAwaitingVerification` for any status other than `pending_email`.
pub const fn guard_verification(user: &User) -> Result<(), CoreError> {
    if user.email_verified {
        return Err(CoreError::AlreadyVerified);
    }
    match user.status {
        UserStatus::PendingEmail => Ok(()),
        status => Err(CoreError::NotAwaitingVerification { status }),
    }
}

/// Checks a user may be approved by an admin.
///
/// # Errors
///
/// Returns `NotAwaitingApproval` for any status other than
/// `pending_admin`.
pub const fn guard_approval(user: &User) -> Result<(), CoreError> {
    match user.status {
        UserStatus::PendingAdmin => Ok(()),
        status => Err(CoreError::NotAwaitingApproval { status }),
    }
}

/// Checks a user may be deactivated.
///
/// # Errors
///
/// Returns `NotActive` for any status other than `active`.
pub const fn guard_deactivation(user: &User) -> Result<(), CoreError> {
    match user.status {
        UserStatus::Active => Ok(()),
        status => Err(CoreError::NotActive { status }),
    }
}
