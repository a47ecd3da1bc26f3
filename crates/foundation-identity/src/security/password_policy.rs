//! Password policy evaluation.
//!
//! A password is accepted when it satisfies every composition rule and its
//! zxcvbn strength score reaches the configured minimum. The username and
//! email of the account are passed as user inputs so passwords derived from
//! them are penalized.

use serde::{Deserialize, Serialize};
use zxcvbn::feedback::Feedback;
use zxcvbn::zxcvbn;

use crate::{Error, Result, TRACING_TARGET_PASSWORD_POLICY as TRACING_TARGET};

/// Composition rules and strength threshold for new passwords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    /// Minimum number of characters.
    pub min_length: usize,
    /// Requires at least one ASCII digit.
    pub require_digit: bool,
    /// Requires at least one lowercase letter.
    pub require_lowercase: bool,
    /// Requires at least one uppercase letter.
    pub require_uppercase: bool,
    /// Requires at least one character that is neither a letter nor a digit.
    pub require_non_alphanumeric: bool,
    /// Minimum acceptable zxcvbn score (0-4).
    pub min_score: u8,
}

/// Result of a password evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordStrengthResult {
    /// Score from 0 (weakest) to 4 (strongest).
    pub score: u8,
    /// Estimated guesses required to crack the password.
    pub guesses: u64,
    /// Human-readable descriptions of every failed rule.
    pub violations: Vec<String>,
    /// Optional feedback for improving the password.
    pub feedback: Option<PasswordFeedback>,
}

/// Feedback for improving password strength.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordFeedback {
    /// Warning message about password weaknesses.
    pub warning: Option<String>,
    /// Suggestions for improving the password.
    pub suggestions: Vec<String>,
}

impl PasswordStrengthResult {
    /// Returns whether the password satisfied every rule.
    #[inline]
    pub fn is_acceptable(&self) -> bool {
        self.violations.is_empty()
    }
}

impl PasswordPolicy {
    /// Creates a policy with the default composition rules.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the default policy with custom length and score thresholds.
    pub fn with_thresholds(min_length: usize, min_score: u8) -> Self {
        Self {
            min_length,
            min_score: min_score.min(4),
            ..Self::default()
        }
    }

    /// Evaluates a password against every rule.
    ///
    /// # Arguments
    ///
    /// * `password` - The password to evaluate
    /// * `user_inputs` - User-specific words to penalize (username, email)
    pub fn evaluate(&self, password: &str, user_inputs: &[&str]) -> PasswordStrengthResult {
        let mut violations = Vec::new();

        if password.chars().count() < self.min_length {
            violations.push(format!(
                "must be at least {} characters long",
                self.min_length
            ));
        }

        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            violations.push("must contain a digit".to_owned());
        }

        if self.require_lowercase && !password.chars().any(char::is_lowercase) {
            violations.push("must contain a lowercase letter".to_owned());
        }

        if self.require_uppercase && !password.chars().any(char::is_uppercase) {
            violations.push("must contain an uppercase letter".to_owned());
        }

        if self.require_non_alphanumeric && password.chars().all(char::is_alphanumeric) {
            violations.push("must contain a non-alphanumeric character".to_owned());
        }

        let entropy = zxcvbn(password, user_inputs);
        let score: u8 = entropy.score().into();
        if score < self.min_score {
            violations.push(format!("is too easy to guess (score {score} of 4)"));
        }

        tracing::debug!(
            target: TRACING_TARGET,
            score = score,
            guesses = entropy.guesses(),
            violations = violations.len(),
            "password evaluation completed"
        );

        PasswordStrengthResult {
            score,
            guesses: entropy.guesses(),
            violations,
            feedback: entropy.feedback().map(convert_feedback),
        }
    }

    /// Validates a password, failing with every violated rule.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidInput`](crate::ErrorKind::InvalidInput)
    /// describing each failed rule.
    pub fn validate(&self, password: &str, user_inputs: &[&str]) -> Result<()> {
        let result = self.evaluate(password, user_inputs);
        if result.is_acceptable() {
            return Ok(());
        }

        tracing::warn!(
            target: TRACING_TARGET,
            score = result.score,
            min_score = self.min_score,
            violations = result.violations.len(),
            "password rejected by policy"
        );

        let mut message = format!("Password {}", result.violations.join(", "));
        if let Some(warning) = result.feedback.and_then(|feedback| feedback.warning) {
            message.push_str(". ");
            message.push_str(&warning);
        }

        Err(Error::invalid_input(message))
    }

    /// Checks a password without building an error.
    pub fn meets_requirements(&self, password: &str, user_inputs: &[&str]) -> bool {
        self.evaluate(password, user_inputs).is_acceptable()
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
            min_score: 1,
        }
    }
}

fn convert_feedback(feedback: &Feedback) -> PasswordFeedback {
    PasswordFeedback {
        warning: feedback.warning().map(|w| w.to_string()),
        suggestions: feedback
            .suggestions()
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn accepts_a_password_meeting_every_rule() {
        let policy = PasswordPolicy::new();
        assert!(policy.meets_requirements("Secr3t!23", &["alice", "a@x.com"]));
        assert!(policy.validate("Tr0ub4dor&3-horse", &[]).is_ok());
    }

    #[test]
    fn reports_each_failed_composition_rule() {
        let policy = PasswordPolicy::new();
        let result = policy.evaluate("password", &[]);

        assert!(!result.is_acceptable());
        assert!(result.violations.iter().any(|v| v.contains("digit")));
        assert!(result.violations.iter().any(|v| v.contains("uppercase")));
        assert!(result.violations.iter().any(|v| v.contains("non-alphanumeric")));
        assert!(!result.violations.iter().any(|v| v.contains("lowercase")));
    }

    #[test]
    fn short_password_is_rejected() {
        let policy = PasswordPolicy::new();
        let error = policy.validate("A1!a", &[]).expect_err("too short");

        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        assert!(error.message().contains("at least 8 characters"));
    }

    #[test]
    fn strength_threshold_is_enforced() {
        let policy = PasswordPolicy::with_thresholds(8, 4);
        let result = policy.evaluate("Password1!", &[]);

        assert!(result.score < 4);
        assert!(result.violations.iter().any(|v| v.contains("too easy")));
    }

    #[test]
    fn threshold_is_clamped_to_zxcvbn_range() {
        let policy = PasswordPolicy::with_thresholds(12, 9);
        assert_eq!(policy.min_score, 4);
        assert_eq!(policy.min_length, 12);
    }
}
