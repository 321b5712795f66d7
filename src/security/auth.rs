use poem::Request;

use crate::domain::{Order, UserId};
use crate::error::AppError;

/// Set by the upstream authentication layer once the token is verified
pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";
pub const ADMIN_ROLE: &str = "admin";

/// The authenticated party behind a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl Caller {
    pub fn user(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: false,
        }
    }

    pub fn admin(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: true,
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("admin access required".to_string()))
        }
    }

    /// Owners and admins may read an order
    pub fn can_view(&self, order: &Order) -> bool {
        self.is_admin || self.user_id == order.user_id
    }

    /// Only the owner may answer a price offer
    pub fn require_owner(&self, order: &Order) -> Result<(), AppError> {
        if self.user_id == order.user_id {
            Ok(())
        } else {
            Err(AppError::Forbidden("order belongs to another user".to_string()))
        }
    }
}

pub fn extract_caller(req: &Request) -> Result<Caller, AppError> {
    let user_id = req
        .header(USER_ID_HEADER)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(AppError::Unauthorized)?;

    let is_admin = req
        .header(USER_ROLE_HEADER)
        .map(|role| role.trim().eq_ignore_ascii_case(ADMIN_ROLE))
        .unwrap_or(false);

    Ok(Caller {
        user_id: user_id.to_string(),
        is_admin,
    })
}
