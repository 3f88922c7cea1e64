use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AutomationError;

/// Trigger credentials expire after an hour; callbacks arriving later than
/// that are rejected.
const TOKEN_TTL_SECS: u64 = 3600;

/// Claims carried by the signed trigger credential. The automation service
/// presents the same token on its callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerClaims {
    pub project_id: String,
    /// Proposal id, named to match the trigger body.
    pub id: String,
    pub iat: u64,
    pub exp: u64,
}

pub fn mint(secret: &str, project_id: Uuid, proposal_id: Uuid) -> Result<String, AutomationError> {
    let now = jsonwebtoken::get_current_timestamp();
    let claims = TriggerClaims {
        project_id: project_id.to_string(),
        id: proposal_id.to_string(),
        iat: now,
        exp: now + TOKEN_TTL_SECS,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn verify(secret: &str, token: &str) -> Result<TriggerClaims, AutomationError> {
    let data = decode::<TriggerClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_and_verify_roundtrip() {
        let project_id = Uuid::new_v4();
        let proposal_id = Uuid::new_v4();

        let token = mint("test-secret", project_id, proposal_id).unwrap();
        let claims = verify("test-secret", &token).unwrap();

        assert_eq!(claims.project_id, project_id.to_string());
        assert_eq!(claims.id, proposal_id.to_string());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = mint("secret-a", Uuid::new_v4(), Uuid::new_v4()).unwrap();
        assert!(verify("secret-b", &token).is_err());
    }

    #[test]
    fn verify_rejects_tampered_token() {
        let token = mint("test-secret", Uuid::new_v4(), Uuid::new_v4()).unwrap();
        let mut tampered = token.clone();
        tampered.truncate(token.len() - 2);
        assert!(verify("test-secret", &tampered).is_err());
    }
}
