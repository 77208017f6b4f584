//! Domain-level errors

use thiserror::Error;

use crate::value_objects::InvalidCoordinate;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Latitude or longitude outside the valid range
    #[error(transparent)]
    InvalidCoordinate(#[from] InvalidCoordinate),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_coordinate_converts_transparently() {
        let err = DomainError::from(InvalidCoordinate {
            latitude: 91.0,
            longitude: 0.0,
        });
        assert!(err.to_string().contains("latitude"));
        assert!(matches!(err, DomainError::InvalidCoordinate(_)));
    }
}
