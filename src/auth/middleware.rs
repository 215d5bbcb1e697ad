//! 認証ミドルウェア実装

use crate::common::auth::{Claims, UserRole};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// JWT認証ミドルウェア
///
/// Authorizationヘッダーから "Bearer {token}" を抽出してJWT検証を行う。
/// 検証済みのClaimsはrequestの拡張データに格納され、ハンドラーから
/// `Extension<Claims>` で取り出せる。
///
/// # Returns
/// * `Ok(Response)` - 認証成功、requestにClaimsを追加
/// * `Err(Response)` - 認証失敗、401 Unauthorized
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                "Missing Authorization header".to_string(),
            )
                .into_response()
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        (
            StatusCode::UNAUTHORIZED,
            "Invalid Authorization header format. Expected 'Bearer <token>'".to_string(),
        )
            .into_response()
    })?;

    let claims = crate::auth::jwt::verify_jwt(token, &state.jwt_secret).map_err(|e| {
        tracing::warn!("JWT verification failed: {}", e);
        (StatusCode::UNAUTHORIZED, format!("Invalid token: {}", e)).into_response()
    })?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// 管理者ロール要求ミドルウェア
///
/// `jwt_auth_middleware` の後段に配置し、Claimsのロールを検査する。
pub async fn require_admin_middleware(request: Request, next: Next) -> Result<Response, Response> {
    let claims = request.extensions().get::<Claims>().ok_or_else(|| {
        (
            StatusCode::UNAUTHORIZED,
            "Missing authentication".to_string(),
        )
            .into_response()
    })?;

    if claims.role != UserRole::Admin {
        return Err((StatusCode::FORBIDDEN, "Admin access required".to_string()).into_response());
    }

    Ok(next.run(request).await)
}
