use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use croscout_auth_types::identity::Identity;
use croscout_domain::booking::DateRange;

use crate::domain::repository::{PropertyRepository, UserRepository};
use crate::domain::types::{
    Property, PropertyDetail, PropertyFilter, PropertyListing, PropertyUpdate, PublicProfile,
    average_rating,
};
use crate::error::MarketplaceError;

/// Attach booked dates and average rating to each property, preserving order.
pub(crate) async fn with_derived<P: PropertyRepository>(
    properties: &P,
    items: Vec<Property>,
) -> Result<Vec<PropertyListing>, MarketplaceError> {
    let ids: Vec<Uuid> = items.iter().map(|p| p.id).collect();

    let mut booked: HashMap<Uuid, Vec<DateRange>> = HashMap::new();
    for (property_id, range) in properties.booked_dates(&ids).await? {
        booked.entry(property_id).or_default().push(range);
    }
    let mut ratings: HashMap<Uuid, Vec<u8>> = HashMap::new();
    for (property_id, rating) in properties.ratings(&ids).await? {
        ratings.entry(property_id).or_default().push(rating);
    }

    Ok(items
        .into_iter()
        .map(|property| PropertyListing {
            booked_dates: booked.remove(&property.id).unwrap_or_default(),
            average_rating: ratings
                .get(&property.id)
                .and_then(|r| average_rating(r)),
            property,
        })
        .collect())
}

// ── CreateProperty ───────────────────────────────────────────────────────────

pub struct CreatePropertyInput {
    pub name: String,
    pub description: String,
    pub amenities: Vec<String>,
    pub price_per_night: f64,
    pub location: String,
    pub state: String,
    pub property_type: String,
    pub guests: i32,
    pub property_images: Vec<String>,
}

pub struct CreatePropertyUseCase<P: PropertyRepository> {
    pub properties: P,
}

impl<P: PropertyRepository> CreatePropertyUseCase<P> {
    pub async fn execute(
        &self,
        actor: &Identity,
        input: CreatePropertyInput,
    ) -> Result<Property, MarketplaceError> {
        if !actor.role.is_staff() {
            return Err(MarketplaceError::Forbidden);
        }
        let now = Utc::now();
        let property = Property {
            id: Uuid::now_v7(),
            owner_id: actor.user_id,
            name: input.name,
            description: input.description,
            amenities: input.amenities,
            price_per_night: input.price_per_night,
            location: input.location,
            state: input.state,
            property_type: input.property_type,
            guests: input.guests,
            property_images: input.property_images,
            created_at: now,
            updated_at: now,
        };
        self.properties.create(&property).await?;
        tracing::info!(property_id = %property.id, owner_id = %property.owner_id, "property created");
        Ok(property)
    }
}

// ── ListProperties ───────────────────────────────────────────────────────────

pub struct ListPropertiesUseCase<P: PropertyRepository> {
    pub properties: P,
}

impl<P: PropertyRepository> ListPropertiesUseCase<P> {
    pub async fn execute(
        &self,
        filter: &PropertyFilter,
    ) -> Result<Vec<PropertyListing>, MarketplaceError> {
        let items = self.properties.list(filter).await?;
        with_derived(&self.properties, items).await
    }
}

// ── GetProperty ──────────────────────────────────────────────────────────────

pub struct GetPropertyUseCase<P: PropertyRepository, U: UserRepository> {
    pub properties: P,
    pub users: U,
}

impl<P: PropertyRepository, U: UserRepository> GetPropertyUseCase<P, U> {
    pub async fn execute(&self, id: Uuid) -> Result<PropertyDetail, MarketplaceError> {
        let property = self
            .properties
            .find_by_id(id)
            .await?
            .ok_or(MarketplaceError::PropertyNotFound)?;
        let owner = self
            .users
            .find_by_id(property.owner_id)
            .await?
            .map(|u| PublicProfile::from(&u));
        let listing = with_derived(&self.properties, vec![property])
            .await?
            .pop()
            .ok_or(MarketplaceError::PropertyNotFound)?;
        Ok(PropertyDetail { listing, owner })
    }
}

// ── ListOwnerProperties ──────────────────────────────────────────────────────

pub struct ListOwnerPropertiesUseCase<P: PropertyRepository, U: UserRepository> {
    pub properties: P,
    pub users: U,
}

impl<P: PropertyRepository, U: UserRepository> ListOwnerPropertiesUseCase<P, U> {
    pub async fn execute(&self, email: &str) -> Result<Vec<PropertyListing>, MarketplaceError> {
        let owner = self
            .users
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or(MarketplaceError::UserNotFound)?;
        let items = self.properties.list_by_owner(owner.id).await?;
        with_derived(&self.properties, items).await
    }
}

// ── UpdateProperty ───────────────────────────────────────────────────────────

pub struct UpdatePropertyUseCase<P: PropertyRepository> {
    pub properties: P,
}

impl<P: PropertyRepository> UpdatePropertyUseCase<P> {
    pub async fn execute(
        &self,
        actor: &Identity,
        id: Uuid,
        update: PropertyUpdate,
    ) -> Result<Property, MarketplaceError> {
        if update.is_empty() {
            return Err(MarketplaceError::NoUpdateData);
        }
        let property = self
            .properties
            .find_by_id(id)
            .await?
            .ok_or(MarketplaceError::PropertyNotFound)?;
        if !actor.can_act_for(property.owner_id) {
            return Err(MarketplaceError::Forbidden);
        }
        self.properties
            .update(id, &update)
            .await?
            .ok_or(MarketplaceError::PropertyNotFound)
    }
}

// ── DeleteProperty ───────────────────────────────────────────────────────────

pub struct DeletePropertyUseCase<P: PropertyRepository> {
    pub properties: P,
}

impl<P: PropertyRepository> DeletePropertyUseCase<P> {
    pub async fn execute(&self, actor: &Identity, id: Uuid) -> Result<(), MarketplaceError> {
        let property = self
            .properties
            .find_by_id(id)
            .await?
            .ok_or(MarketplaceError::PropertyNotFound)?;
        if !actor.can_act_for(property.owner_id) {
            return Err(MarketplaceError::Forbidden);
        }
        if !self.properties.delete(id).await? {
            return Err(MarketplaceError::PropertyNotFound);
        }
        tracing::info!(property_id = %id, "property deleted");
        Ok(())
    }
}
