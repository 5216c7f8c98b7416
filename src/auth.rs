use crate::{
    errors::{AppError, AppResult},
    models::{Claims, Role},
    state::AppState,
};
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

/// Authenticated actor extractor. Add `ctx: ActorContext` as a parameter in
/// any handler that requires authentication. Immutable for the life of the
/// request; every core operation receives it explicitly.
#[derive(Debug, Clone)]
pub struct ActorContext {
    pub user_id: Uuid,
    pub name: String,
    /// None only for global roles (SUPER_ADMIN).
    pub tenant_id: Option<Uuid>,
    pub roles: Vec<Role>,
}

impl ActorContext {
    /// Resolve the tenant scope or reject. Tenant-scoped operations must not
    /// run without one, even for global roles.
    pub fn require_tenant(&self) -> AppResult<Uuid> {
        self.tenant_id.ok_or_else(|| {
            AppError::Forbidden("operation requires an institution scope".to_string())
        })
    }

    pub fn has_any_role(&self, allowed: &[Role]) -> bool {
        self.roles.iter().any(|r| allowed.contains(r))
    }

    pub fn require_any_role(&self, allowed: &[Role]) -> AppResult<()> {
        if self.has_any_role(allowed) {
            Ok(())
        } else {
            let names: Vec<&str> = allowed.iter().map(Role::as_str).collect();
            Err(AppError::Forbidden(format!(
                "requires one of roles: {}",
                names.join(", ")
            )))
        }
    }
}

impl FromRequestParts<AppState> for ActorContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let headers: &HeaderMap = &parts.headers;

        let auth_header = headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization format".to_string()))?;

        let secret = state.config.jwt_secret.as_bytes();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        let user_id =
            Uuid::parse_str(&token_data.claims.sub).map_err(|_| AppError::InvalidToken)?;

        // A session must carry a tenant unless every role it holds is global.
        let claims = token_data.claims;
        if claims.tenant_id.is_none() && !claims.roles.iter().any(Role::is_global) {
            return Err(AppError::Unauthorized(
                "session has no resolvable institution scope".to_string(),
            ));
        }

        Ok(ActorContext {
            user_id,
            name: claims.name,
            tenant_id: claims.tenant_id,
            roles: claims.roles,
        })
    }
}

pub fn generate_token(
    user_id: Uuid,
    name: &str,
    tenant_id: Option<Uuid>,
    roles: &[Role],
    secret: &str,
    expiry_hours: i64,
) -> Result<String, AppError> {
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};

    let now = Utc::now().timestamp() as usize;
    let exp = (Utc::now() + chrono::Duration::hours(expiry_hours)).timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        name: name.to_string(),
        tenant_id,
        roles: roles.to_vec(),
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(roles: Vec<Role>, tenant_id: Option<Uuid>) -> ActorContext {
        ActorContext {
            user_id: Uuid::new_v4(),
            name: "Test Actor".to_string(),
            tenant_id,
            roles,
        }
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        let user_id = Uuid::new_v4();
        let tenant_id = Some(Uuid::new_v4());
        let roles = vec![Role::Admin, Role::Hr];

        let token =
            generate_token(user_id, "Jane Doe", tenant_id, &roles, "test-secret", 1).unwrap();

        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(data.claims.sub, user_id.to_string());
        assert_eq!(data.claims.name, "Jane Doe");
        assert_eq!(data.claims.tenant_id, tenant_id);
        assert_eq!(data.claims.roles, roles);
    }

    #[test]
    fn role_gate_accepts_any_listed_role() {
        let c = ctx(vec![Role::Director], Some(Uuid::new_v4()));
        assert!(c.require_any_role(&[Role::Admin, Role::Director]).is_ok());
        assert!(matches!(
            c.require_any_role(&[Role::Admin, Role::SuperAdmin]),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn tenant_scope_is_mandatory_for_scoped_operations() {
        let c = ctx(vec![Role::SuperAdmin], None);
        assert!(matches!(c.require_tenant(), Err(AppError::Forbidden(_))));

        let t = Uuid::new_v4();
        let c = ctx(vec![Role::Admin], Some(t));
        assert_eq!(c.require_tenant().unwrap(), t);
    }
}
