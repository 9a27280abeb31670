//! Unified error codes for the storefront
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 4xxx: Order errors
//! - 5xxx: Upload errors (payment proof, product media)
//! - 6xxx: Product errors
//! - 7xxx: Review errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so that the admin UI and
/// the public storefront can switch on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,
    /// Wrong admin password
    InvalidCredentials = 1002,
    /// Session token is malformed, unknown or revoked
    TokenInvalid = 1004,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has no line items
    OrderEmpty = 4007,
    /// Status value outside pending/processing/completed/rejected
    InvalidOrderStatus = 4008,
    /// Transition rejected by the active transition policy
    InvalidStatusTransition = 4009,

    // ==================== 5xxx: Uploads ====================
    /// Payment screenshot missing from an upload that requires it
    PaymentProofRequired = 5001,
    /// Uploaded proof exceeds the configured size limit
    FileTooLarge = 5002,
    /// Media upload without a file part
    MediaFileRequired = 5003,
    /// Media upload with a content type outside the image/video allow-list
    UnsupportedMediaType = 5004,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product has invalid price
    ProductInvalidPrice = 6002,

    // ==================== 7xxx: Review ====================
    /// Review not found
    ReviewNotFound = 7001,
    /// Moderation action other than approve/reject
    InvalidReviewAction = 7002,
    /// Rating outside 1..=5
    InvalidRating = 7003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "Unauthorized",
            ErrorCode::InvalidCredentials => "Invalid password",
            ErrorCode::TokenInvalid => "Invalid or expired session",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order must contain at least one item",
            ErrorCode::InvalidOrderStatus => "Invalid status",
            ErrorCode::InvalidStatusTransition => "Status transition not allowed",

            // Uploads
            ErrorCode::PaymentProofRequired => "Payment screenshot is required",
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::MediaFileRequired => "No file uploaded",
            ErrorCode::UnsupportedMediaType => {
                "Invalid file type. Only images and videos are allowed."
            }

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInvalidPrice => "Product has invalid price",

            // Review
            ErrorCode::ReviewNotFound => "Review not found",
            ErrorCode::InvalidReviewAction => "Invalid action",
            ErrorCode::InvalidRating => "Rating must be between 1 and 5",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4007 => Ok(ErrorCode::OrderEmpty),
            4008 => Ok(ErrorCode::InvalidOrderStatus),
            4009 => Ok(ErrorCode::InvalidStatusTransition),

            // Uploads
            5001 => Ok(ErrorCode::PaymentProofRequired),
            5002 => Ok(ErrorCode::FileTooLarge),
            5003 => Ok(ErrorCode::MediaFileRequired),
            5004 => Ok(ErrorCode::UnsupportedMediaType),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductInvalidPrice),

            // Review
            7001 => Ok(ErrorCode::ReviewNotFound),
            7002 => Ok(ErrorCode::InvalidReviewAction),
            7003 => Ok(ErrorCode::InvalidRating),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
