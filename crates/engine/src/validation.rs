//! Body validation utilities.
//!
//! `BodyValidator` checks that a rigid body can take part in geometry queries:
//! strictly positive finite dimensions and a finite transform. Malformed bodies
//! are skipped by the snapping and collision passes, never propagated as a crash.

use shared::RigidBody;

use crate::error::{EngineError, Result};

/// Validator for `RigidBody` integrity checks.
pub struct BodyValidator<'a> {
    body: &'a RigidBody,
}

impl<'a> BodyValidator<'a> {
    /// Create a new validator for the given body.
    pub fn new(body: &'a RigidBody) -> Self {
        Self { body }
    }

    /// Check that every dimension is finite and greater than zero.
    pub fn are_dimensions_valid(&self) -> bool {
        self.body.dimensions.is_valid()
    }

    /// Check that position and rotation contain no NaN or infinity.
    pub fn is_transform_finite(&self) -> bool {
        self.body
            .position
            .iter()
            .chain(self.body.rotation.iter())
            .all(|v| v.is_finite())
    }

    /// Run all validation checks and return a list of error messages.
    /// An empty list means the body is valid.
    pub fn validate_all(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.are_dimensions_valid() {
            let d = self.body.dimensions;
            errors.push(format!(
                "Dimensions must be positive, got {}x{}x{}",
                d.width, d.height, d.depth
            ));
        }

        if !self.is_transform_finite() {
            errors.push("Transform contains non-finite values".to_string());
        }

        errors
    }

    /// First failing check as an `EngineError`.
    pub fn check(&self) -> Result<()> {
        match self.validate_all().into_iter().next() {
            None => Ok(()),
            Some(reason) => Err(EngineError::MalformedBody {
                id: self.body.id.clone(),
                reason,
            }),
        }
    }
}

/// Whether a body takes part in geometry queries. Logs the rejection.
pub fn is_usable(body: &RigidBody) -> bool {
    match BodyValidator::new(body).check() {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Skipping body in geometry pass: {e}");
            false
        }
    }
}
