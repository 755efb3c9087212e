use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Marketplace error variants. The `Display` text is the client-facing `error` field.
#[derive(Debug, thiserror::Error)]
pub enum MarketplaceError {
    // ── auth ──
    #[error("Email or Password is required")]
    MissingCredentials,
    #[error("Email already exist. Please use a different email or log in")]
    EmailTaken,
    #[error("Tax number is required for agents.")]
    TaxNumberRequired,
    #[error("Invalid role.")]
    InvalidRole,
    #[error("User not found")]
    UserNotFound,
    #[error("Wrong password")]
    WrongPassword,
    #[error("This account uses Google sign-in. Please continue with Google.")]
    OAuthOnlyAccount,
    #[error("Invalid or expired token. Resend again")]
    InvalidResetToken,
    #[error("Failed to send reset email")]
    ResetEmailFailed,
    #[error("Invalid or expired verification token")]
    InvalidVerifyToken,
    #[error("Failed to send verification email")]
    VerificationEmailFailed,
    #[error("Google sign-in is not configured.")]
    OAuthDisabled,
    #[error("Invalid or expired OAuth state.")]
    InvalidOAuthState,

    // ── access ──
    #[error("Forbidden access")]
    Forbidden,
    #[error("You are not able to delete.")]
    DeleteForbidden,
    #[error("Only admins and agents can access this endpoint.")]
    DashboardForbidden,

    // ── users ──
    #[error("User not found.")]
    UserIdNotFound,
    #[error("Please provide a valid data with body.")]
    MissingUpdate,

    // ── properties ──
    #[error("Property not found")]
    PropertyNotFound,
    #[error("No update data provided")]
    NoUpdateData,

    // ── bookings ──
    #[error("Property not found.")]
    BookedPropertyNotFound,
    #[error("Price and total guests are required.")]
    MissingBookingDetails,
    #[error("Invalid date range")]
    InvalidDateRange,
    #[error("Property already booked for the selected dates.")]
    PropertyAlreadyBooked,
    #[error("Booking not found.")]
    BookingNotFound,
    #[error("No bookings found")]
    NoBookingsFound,
    #[error("Invalid action.")]
    InvalidAction,
    #[error("Already confirmed this booking")]
    AlreadyConfirmed,
    #[error(
        "You haven't sent a Payment Request with Payment Details to the user. Please send the payment request before updating the status."
    )]
    PaymentRequestNotSent,
    #[error(
        "Transaction ID has not been received yet. Please wait until the Transaction ID is received before updating the status."
    )]
    TransactionIdNotReceived,
    #[error("This booking has already been confirmed. Cancellation is not allowed at this stage.")]
    CancelAfterConfirm,
    #[error("Payment details already exist.")]
    PaymentDetailsExist,
    #[error("Transaction ID already exists.")]
    TransactionIdExists,
    #[error("Invalid booking price.")]
    InvalidPrice,

    // ── transactions ──
    #[error("No transactions found.")]
    NoTransactionsFound,

    // ── favorites ──
    #[error("Property not found in the favorite list in the user")]
    FavoriteNotFound,

    // ── feedback ──
    #[error("Rating must be between 1 and 5.")]
    InvalidRating,
    #[error("Need to booking first, otherwise you can't provide a review  for this property.")]
    BookingRequired,
    #[error("Your boking request is pending, Please wait until the booking is confirmed.")]
    BookingPending,
    #[error("Feedback not found")]
    FeedbackNotFound,

    #[error("Internal server error!")]
    Internal(#[from] anyhow::Error),
}

impl MarketplaceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "MISSING_CREDENTIALS",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::TaxNumberRequired => "TAX_NUMBER_REQUIRED",
            Self::InvalidRole => "INVALID_ROLE",
            Self::UserNotFound | Self::UserIdNotFound => "USER_NOT_FOUND",
            Self::WrongPassword => "WRONG_PASSWORD",
            Self::OAuthOnlyAccount => "OAUTH_ONLY_ACCOUNT",
            Self::InvalidResetToken => "INVALID_RESET_TOKEN",
            Self::ResetEmailFailed => "RESET_EMAIL_FAILED",
            Self::InvalidVerifyToken => "INVALID_VERIFY_TOKEN",
            Self::VerificationEmailFailed => "VERIFICATION_EMAIL_FAILED",
            Self::OAuthDisabled => "OAUTH_DISABLED",
            Self::InvalidOAuthState => "INVALID_OAUTH_STATE",
            Self::Forbidden | Self::DeleteForbidden | Self::DashboardForbidden => "FORBIDDEN",
            Self::MissingUpdate | Self::NoUpdateData | Self::MissingBookingDetails => {
                "MISSING_DATA"
            }
            Self::PropertyNotFound | Self::BookedPropertyNotFound => "PROPERTY_NOT_FOUND",
            Self::InvalidDateRange => "INVALID_DATE_RANGE",
            Self::PropertyAlreadyBooked => "PROPERTY_ALREADY_BOOKED",
            Self::BookingNotFound | Self::NoBookingsFound => "BOOKING_NOT_FOUND",
            Self::InvalidAction => "INVALID_ACTION",
            Self::AlreadyConfirmed => "ALREADY_CONFIRMED",
            Self::PaymentRequestNotSent => "PAYMENT_REQUEST_NOT_SENT",
            Self::TransactionIdNotReceived => "TRANSACTION_ID_NOT_RECEIVED",
            Self::CancelAfterConfirm => "CANCEL_AFTER_CONFIRM",
            Self::PaymentDetailsExist => "PAYMENT_DETAILS_EXIST",
            Self::TransactionIdExists => "TRANSACTION_ID_EXISTS",
            Self::InvalidPrice => "INVALID_PRICE",
            Self::NoTransactionsFound => "TRANSACTION_NOT_FOUND",
            Self::FavoriteNotFound => "FAVORITE_NOT_FOUND",
            Self::InvalidRating => "INVALID_RATING",
            Self::BookingRequired => "BOOKING_REQUIRED",
            Self::BookingPending => "BOOKING_PENDING",
            Self::FeedbackNotFound => "FEEDBACK_NOT_FOUND",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingCredentials
            | Self::TaxNumberRequired
            | Self::InvalidRole
            | Self::InvalidResetToken
            | Self::InvalidVerifyToken
            | Self::MissingUpdate
            | Self::NoUpdateData
            | Self::MissingBookingDetails
            | Self::InvalidDateRange
            | Self::PropertyAlreadyBooked
            | Self::InvalidAction
            | Self::AlreadyConfirmed
            | Self::PaymentRequestNotSent
            | Self::TransactionIdNotReceived
            | Self::CancelAfterConfirm
            | Self::PaymentDetailsExist
            | Self::TransactionIdExists
            | Self::InvalidPrice
            | Self::InvalidRating => StatusCode::BAD_REQUEST,
            Self::WrongPassword | Self::OAuthOnlyAccount | Self::InvalidOAuthState => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden | Self::DeleteForbidden | Self::DashboardForbidden => {
                StatusCode::FORBIDDEN
            }
            Self::UserNotFound
            | Self::UserIdNotFound
            | Self::OAuthDisabled
            | Self::PropertyNotFound
            | Self::BookedPropertyNotFound
            | Self::BookingNotFound
            | Self::NoBookingsFound
            | Self::NoTransactionsFound
            | Self::FavoriteNotFound
            | Self::BookingRequired
            | Self::BookingPending
            | Self::FeedbackNotFound => StatusCode::NOT_FOUND,
            Self::EmailTaken => StatusCode::CONFLICT,
            Self::ResetEmailFailed | Self::VerificationEmailFailed | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for MarketplaceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // TraceLayer already records every request; only the anyhow chain of 500s is logged here.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        croscout_core::response::failure(status, self.kind(), &self.to_string())
    }
}
