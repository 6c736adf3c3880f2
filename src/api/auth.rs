use crate::error::{auth_error, ClientResult};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Response of the password-grant token endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Claims the client reads from the token. Nothing here is verified.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub userrole: Option<String>,
    #[serde(default)]
    pub userid: Option<i64>,
    #[serde(default)]
    pub useremail: Option<String>,
}

/// Role used for navigation routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Student,
    Faculty,
    Admin,
    Unknown,
}

impl Role {
    pub fn from_claim(claim: &str) -> Self {
        match claim.trim().to_ascii_lowercase().as_str() {
            "student" => Role::Student,
            "faculty" => Role::Faculty,
            "admin" => Role::Admin,
            _ => Role::Unknown,
        }
    }

    /// Landing route for this role
    pub fn home_route(&self) -> &'static str {
        match self {
            Role::Student => "/student_dashboard",
            Role::Faculty => "/faculty_dashboard",
            Role::Admin => "/admin",
            Role::Unknown => "/login",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
            Role::Admin => "admin",
            Role::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Decode the payload of a JWT without checking its signature or expiry.
///
/// The server is the only party that enforces the token; the client just routes on the role.
pub fn decode_claims(token: &str) -> ClientResult<TokenClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| auth_error(&format!("Failed to decode token: {}", e)))
}

/// Role claim of a token; undecodable tokens and missing claims yield `Role::Unknown`
pub fn role_from_token(token: &str) -> Role {
    match decode_claims(token) {
        Ok(claims) => claims
            .userrole
            .as_deref()
            .map(Role::from_claim)
            .unwrap_or(Role::Unknown),
        Err(e) => {
            tracing::warn!("{}", e);
            Role::Unknown
        }
    }
}
