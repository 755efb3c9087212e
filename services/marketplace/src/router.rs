use axum::{
    Router,
    routing::{get, patch, post, put},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use croscout_core::health::{healthz, readyz};
use croscout_core::middleware::{cors_layer, request_id_layer};
use croscout_core::response::route_not_found;

use crate::handlers::{
    auth::{
        forgot_password, google_callback, google_login, login, logout, register, reset_password,
    },
    booking::{
        create_booking, delete_booking, get_booking, list_bookings, list_user_bookings,
        manage_booking, submit_transaction_id, update_payment_details,
    },
    dashboard::stats,
    email_verification::{send_verification_email, verify_email},
    favorite::{check_favorite, list_favorites, remove_favorite, toggle_favorite},
    feedback::{create_feedback, list_feedbacks},
    property::{
        create_property, delete_property, get_property, list_owner_properties, list_properties,
        update_property,
    },
    transaction::{list_transactions, list_user_transactions},
    user::{current_user, delete_user, get_user, list_all, list_by_role, update_password, update_user},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.client_url);

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api", api_routes())
        .fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", get(logout))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/google", get(google_login))
        .route("/auth/google/callback", get(google_callback))
        // Email verification
        .route(
            "/email-verification/send-verification-email",
            post(send_verification_email),
        )
        .route("/email-verification/verify-email", get(verify_email))
        // Properties
        .route("/properties", get(list_properties).post(create_property))
        .route(
            "/properties/{id}",
            get(get_property).put(update_property).delete(delete_property),
        )
        .route("/properties/user/{email}", get(list_owner_properties))
        // Feedback
        .route("/properties/feedback", post(create_feedback))
        .route("/properties/{id}/feedbacks", get(list_feedbacks))
        // Users
        .route("/user/current-user", get(current_user))
        .route("/user/by-userid/{user_id}", get(get_user))
        .route("/user/users/by-role", get(list_by_role))
        .route("/user/all-users", get(list_all))
        .route("/user/{user_id}", put(update_user).delete(delete_user))
        .route("/user/update-password/{user_id}", patch(update_password))
        // Favorites
        .route(
            "/favorites/{user_id}",
            get(list_favorites)
                .post(toggle_favorite)
                .delete(remove_favorite),
        )
        .route("/favorites/{user_id}/check-favorite", get(check_favorite))
        // Bookings
        .route("/bookings", get(list_bookings).post(create_booking))
        .route(
            "/bookings/{id}",
            get(get_booking).put(manage_booking).delete(delete_booking),
        )
        .route("/bookings/user/{user_id}", get(list_user_bookings))
        .route("/bookings/{id}/payment-details", put(update_payment_details))
        .route("/bookings/{id}/transaction-id", post(submit_transaction_id))
        // Transactions
        .route("/transactions", get(list_transactions))
        .route("/transactions/{user_id}", get(list_user_transactions))
        // Dashboard
        .route("/dashboard/stats/{user_id}", get(stats))
}
