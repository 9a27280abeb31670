//! Product Review Model

use serde::{Deserialize, Serialize};

/// Customer review, hidden until approved by an admin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Review {
    pub id: String,
    pub product_id: String,
    pub customer_name: String,
    /// 1..=5
    pub rating: i32,
    pub comment: String,
    pub approved: bool,
    pub created_at: i64,
}

/// Moderation decision on a pending review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    /// Deletes the review
    Reject,
}

impl std::str::FromStr for ReviewAction {
    type Err = crate::error::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(ReviewAction::Approve),
            "reject" => Ok(ReviewAction::Reject),
            other => Err(
                crate::error::AppError::new(crate::error::ErrorCode::InvalidReviewAction)
                    .with_detail("value", other),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn parses_known_actions_only() {
        assert_eq!("approve".parse::<ReviewAction>().unwrap(), ReviewAction::Approve);
        assert_eq!("reject".parse::<ReviewAction>().unwrap(), ReviewAction::Reject);
        let err = "delete".parse::<ReviewAction>().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidReviewAction);
    }
}
