use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

const RECRUITER_ROLES: [&str; 2] = ["recruiter", "admin"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

/// Authenticated recruiter, inserted into request extensions by [`require_recruiter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecruiterId(pub Uuid);

#[derive(Clone)]
pub struct AuthKeys {
    decoding: DecodingKey,
}

impl AuthKeys {
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(jwt_secret.as_bytes()),
        }
    }

    fn verify(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        decode::<Claims>(token, &self.decoding, &validation)
            .ok()
            .map(|data| data.claims)
    }
}

fn reject(status: StatusCode, code: &str) -> Response {
    (status, Json(json!({ "error": code }))).into_response()
}

pub async fn require_recruiter(
    State(keys): State<AuthKeys>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return reject(StatusCode::UNAUTHORIZED, "missing_authorization");
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return reject(StatusCode::UNAUTHORIZED, "bad_authorization");
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return reject(StatusCode::UNAUTHORIZED, "unsupported_scheme");
    };

    let Some(claims) = keys.verify(token) else {
        return reject(StatusCode::UNAUTHORIZED, "invalid_token");
    };
    let role = claims.role.clone().unwrap_or_default();
    if !RECRUITER_ROLES.iter().any(|r| r.eq_ignore_ascii_case(&role)) {
        return reject(StatusCode::FORBIDDEN, "forbidden");
    }
    let Ok(recruiter_id) = Uuid::parse_str(&claims.sub) else {
        return reject(StatusCode::UNAUTHORIZED, "invalid_subject");
    };

    req.extensions_mut().insert(RecruiterId(recruiter_id));
    req.extensions_mut().insert(claims);
    next.run(req).await
}
