// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Password policy validation for account credentials.

/// Password policy errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordPolicyError {
    /// Password is too short.
    TooShort {
        /// The minimum accepted length.
        min_length: usize,
    },
    /// Password does not meet complexity requirements.
    InsufficientComplexity {
        /// Character classes required.
        required: usize,
        /// Character classes found.
        found: usize,
    },
    /// Password matches the login name.
    MatchesUsername,
}

impl std::fmt::Display for PasswordPolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooShort { min_length } => {
                write!(f, "Password must be at least {min_length} characters long")
            }
            Self::InsufficientComplexity { required, found } => {
                write!(
                    f,
                    "Password must contain at least {required} of the following: \
                     uppercase letter, lowercase letter, digit, symbol (found {found})"
                )
            }
            Self::MatchesUsername => write!(f, "Password must not match the username"),
        }
    }
}

impl std::error::Error for PasswordPolicyError {}

/// Password policy configuration.
pub struct PasswordPolicy {
    /// Minimum password length.
    pub min_length: usize,
    /// Minimum number of character classes required (out of 4).
    pub min_complexity: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            min_complexity: 2,
        }
    }
}

impl PasswordPolicy {
    /// Validates a password against the policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the password is too short, too simple, or
    /// matches the username.
    pub fn validate(&self, password: &str, username: &str) -> Result<(), PasswordPolicyError> {
        if password.len() < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min_length: self.min_length,
            });
        }

        let complexity: usize = Self::calculate_complexity(password);
        if complexity < self.min_complexity {
            return Err(PasswordPolicyError::InsufficientComplexity {
                required: self.min_complexity,
                found: complexity,
            });
        }

        if password.to_lowercase() == username.to_lowercase() {
            return Err(PasswordPolicyError::MatchesUsername);
        }

        Ok(())
    }

    /// Counts the character classes present in a password.
    fn calculate_complexity(password: &str) -> usize {
        let has_uppercase: bool = password.chars().any(char::is_uppercase);
        let has_lowercase: bool = password.chars().any(char::is_lowercase);
        let has_digit: bool = password.chars().any(|c| c.is_ascii_digit());
        let has_symbol: bool = password.chars().any(|c| !c.is_alphanumeric());

        usize::from(has_uppercase)
            + usize::from(has_lowercase)
            + usize::from(has_digit)
            + usize::from(has_symbol)
    }
}
