//! 身份边界
//!
//! Token 由外部签发；这里只负责校验并得到 [`OwnerId`]。核心操作都显式接收
//! `OwnerId` 参数，不依赖任何全局会话状态。

use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::{PostbenchError, Result};

/// 已认证用户的标识，历史记录的归属键
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// 把 bearer token 解析为用户身份
pub trait IdentityProvider: Send + Sync {
    fn authenticate(&self, token: &str) -> Result<OwnerId>;
}

/// 外部签发的会话 token 中的声明
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
}

/// HS256 token 校验，只检查签名和过期时间
pub struct JwtIdentity {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIdentity {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.validate_nbf = false;

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl IdentityProvider for JwtIdentity {
    fn authenticate(&self, token: &str) -> Result<OwnerId> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| PostbenchError::Unauthorized(format!("token 无效或已过期: {}", e)))?;

        if data.claims.id.trim().is_empty() {
            return Err(PostbenchError::Unauthorized("token 缺少用户 id".to_string()));
        }
        Ok(OwnerId::new(data.claims.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn token(secret: &[u8], id: &str, exp_offset: i64) -> String {
        let claims = SessionClaims {
            id: id.to_string(),
            email: Some("dev@example.com".to_string()),
            exp: chrono::Utc::now().timestamp() + exp_offset,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[test]
    fn test_valid_token_yields_owner() {
        let identity = JwtIdentity::new(b"secret");
        let owner = identity.authenticate(&token(b"secret", "user-1", 3600)).unwrap();
        assert_eq!(owner, OwnerId::from("user-1"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let identity = JwtIdentity::new(b"secret");
        let err = identity
            .authenticate(&token(b"other", "user-1", 3600))
            .unwrap_err();
        assert!(matches!(err, PostbenchError::Unauthorized(_)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let identity = JwtIdentity::new(b"secret");
        // 超出默认 60 秒的时钟偏差容忍
        let err = identity
            .authenticate(&token(b"secret", "user-1", -3600))
            .unwrap_err();
        assert!(matches!(err, PostbenchError::Unauthorized(_)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let identity = JwtIdentity::new(b"secret");
        assert!(identity.authenticate("not.a.jwt").is_err());
    }

    #[test]
    fn test_empty_id_rejected() {
        let identity = JwtIdentity::new(b"secret");
        assert!(identity.authenticate(&token(b"secret", " ", 3600)).is_err());
    }
}
