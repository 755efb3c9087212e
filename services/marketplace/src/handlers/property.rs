use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use croscout_auth_types::identity::Identity;
use croscout_core::response;
use croscout_domain::pagination::{Sort, resolve_limit};

use crate::domain::types::{PropertyFilter, PropertyUpdate};
use crate::error::MarketplaceError;
use crate::state::AppState;
use crate::usecase::property::{
    CreatePropertyInput, CreatePropertyUseCase, DeletePropertyUseCase, GetPropertyUseCase,
    ListOwnerPropertiesUseCase, ListPropertiesUseCase, UpdatePropertyUseCase,
};
use crate::usecase::translation::{target_lang, translate_all, translate_item};

#[derive(Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

// ── POST /api/properties ─────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub price_per_night: f64,
    pub location: String,
    pub state: String,
    pub property_type: String,
    pub guests: i32,
    #[serde(default)]
    pub property_images: Vec<String>,
}

pub async fn create_property(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreatePropertyRequest>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = CreatePropertyUseCase {
        properties: state.property_repo(),
    };
    let property = usecase
        .execute(
            &identity,
            CreatePropertyInput {
                name: body.name,
                description: body.description,
                amenities: body.amenities,
                price_per_night: body.price_per_night,
                location: body.location,
                state: body.state,
                property_type: body.property_type,
                guests: body.guests,
                property_images: body.property_images,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        response::with_payload(
            "property",
            json!(property),
            Some("Property Created Successfully"),
        ),
    ))
}

// ── GET /api/properties ──────────────────────────────────────────────────────

/// Catalog query string. Values arrive as strings and unparsable ones are ignored.
#[derive(Deserialize)]
pub struct ListPropertiesQuery {
    pub location: Option<String>,
    pub category: Option<String>,
    pub guest: Option<String>,
    pub alphabate: Option<String>,
    pub price: Option<String>,
    pub newest: Option<String>,
    pub limit: Option<String>,
    pub lang: Option<String>,
}

impl ListPropertiesQuery {
    fn filter(&self) -> PropertyFilter {
        PropertyFilter {
            location: self.location.clone(),
            category: self.category.clone(),
            min_guests: self.guest.as_deref().and_then(|g| g.trim().parse().ok()),
            region_sort: self.alphabate.as_deref().and_then(Sort::parse),
            price_sort: self.price.as_deref().and_then(Sort::parse),
            newest: self.newest.as_deref() == Some("true"),
            limit: resolve_limit(self.limit.as_deref()),
        }
    }
}

pub async fn list_properties(
    State(state): State<AppState>,
    Query(query): Query<ListPropertiesQuery>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = ListPropertiesUseCase {
        properties: state.property_repo(),
    };
    let mut properties = usecase.execute(&query.filter()).await?;
    if let Some(lang) = target_lang(query.lang.as_deref()) {
        properties = translate_all(&state.translator, properties, lang).await;
    }
    Ok(response::with_payload("properties", json!(properties), None))
}

// ── GET /api/properties/{id} ─────────────────────────────────────────────────

pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LangQuery>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = GetPropertyUseCase {
        properties: state.property_repo(),
        users: state.user_repo(),
    };
    let mut property = usecase.execute(id).await?;
    if let Some(lang) = target_lang(query.lang.as_deref()) {
        property = translate_item(&state.translator, property, lang).await;
    }
    Ok(response::with_payload("property", json!(property), None))
}

// ── GET /api/properties/user/{email} ─────────────────────────────────────────

pub async fn list_owner_properties(
    _identity: Identity,
    State(state): State<AppState>,
    Path(email): Path<String>,
    Query(query): Query<LangQuery>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = ListOwnerPropertiesUseCase {
        properties: state.property_repo(),
        users: state.user_repo(),
    };
    let mut properties = usecase.execute(&email).await?;
    if let Some(lang) = target_lang(query.lang.as_deref()) {
        properties = translate_all(&state.translator, properties, lang).await;
    }
    Ok(response::with_payload("properties", json!(properties), None))
}

// ── PUT /api/properties/{id} ─────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub price_per_night: Option<f64>,
    pub location: Option<String>,
    pub state: Option<String>,
    pub property_type: Option<String>,
    pub guests: Option<i32>,
    pub property_images: Option<Vec<String>>,
}

pub async fn update_property(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePropertyRequest>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = UpdatePropertyUseCase {
        properties: state.property_repo(),
    };
    let property = usecase
        .execute(
            &identity,
            id,
            PropertyUpdate {
                name: body.name,
                description: body.description,
                amenities: body.amenities,
                price_per_night: body.price_per_night,
                location: body.location,
                state: body.state,
                property_type: body.property_type,
                guests: body.guests,
                property_images: body.property_images,
            },
        )
        .await?;
    Ok(response::with_payload(
        "property",
        json!(property),
        Some("Updated Successfully"),
    ))
}

// ── DELETE /api/properties/{id} ──────────────────────────────────────────────

pub async fn delete_property(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = DeletePropertyUseCase {
        properties: state.property_repo(),
    };
    usecase.execute(&identity, id).await?;
    Ok(response::message("Property deleted successfully"))
}
