use persona_crypto::CryptoError;
use thiserror::Error;

/// Errors from claim token signing, decoding, and verification.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("decoded payload does not match the raw token")]
    PayloadMismatch,

    #[error("signature check failed: {0}")]
    Signature(#[from] CryptoError),
}

/// Errors from the registry collaborator.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry unavailable: {0}")]
    Unavailable(String),

    #[error("registry rejected request: {status} - {message}")]
    Rejected { status: u16, message: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors from persona operations.
#[derive(Debug, Error)]
pub enum PersonaError {
    #[error("invalid claim token: {0}")]
    InvalidClaim(#[from] TokenError),

    #[error("attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("no such claim associated with this persona")]
    ClaimNotFound,

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("profile projection failed for claim '{attribute}': {source}")]
    Projection {
        attribute: String,
        #[source]
        source: TokenError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_error_display() {
        let e = TokenError::PayloadMismatch;
        assert!(format!("{}", e).contains("does not match"));
    }

    #[test]
    fn persona_error_from_token_error() {
        let te = TokenError::Malformed("bad json".into());
        let pe: PersonaError = te.into();
        assert!(matches!(pe, PersonaError::InvalidClaim(_)));
    }

    #[test]
    fn persona_error_from_registry_error() {
        let re = RegistryError::Unavailable("connection refused".into());
        let pe: PersonaError = re.into();
        assert!(format!("{}", pe).contains("connection refused"));
    }

    #[test]
    fn projection_error_names_attribute() {
        let e = PersonaError::Projection {
            attribute: "name".into(),
            source: TokenError::PayloadMismatch,
        };
        assert!(format!("{}", e).contains("'name'"));
    }
}
