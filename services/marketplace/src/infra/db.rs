use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use croscout_core::sea_ext::ContainsInsensitive;
use croscout_domain::booking::{BookingStatus, DateRange};
use croscout_domain::pagination::Sort;
use croscout_domain::user::UserRole;
use croscout_marketplace_schema::{
    bookings, favorites, feedbacks, outbox_events, properties, transactions, users,
};

use crate::domain::repository::{
    BookingRepository, FavoriteRepository, FeedbackRepository, OutboxRepository,
    PropertyRepository, TransactionRepository, UserRepository,
};
use crate::domain::types::{
    Booking, BookingInsert, ConfirmOutcome, Feedback, FeedbackAuthor, FeedbackWithAuthor,
    OutboxEvent, PendingOutboxEvent, Property, PropertyFilter, PropertyUpdate, Transaction, User,
    UserProfile, UserTokenKind, UserUpdate,
};
use crate::error::MarketplaceError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, MarketplaceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, MarketplaceError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let models = users::Entity::find()
            .filter(users::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await
            .context("find users by ids")?;
        Ok(models.into_iter().map(user_from_model).collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, MarketplaceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_google_id(&self, sub: &str) -> Result<Option<User>, MarketplaceError> {
        let model = users::Entity::find()
            .filter(users::Column::GoogleId.eq(sub))
            .one(&self.db)
            .await
            .context("find user by google id")?;
        Ok(model.map(user_from_model))
    }

    async fn list(&self, role: Option<UserRole>) -> Result<Vec<User>, MarketplaceError> {
        let mut query = users::Entity::find();
        if let Some(role) = role {
            query = query.filter(users::Column::Role.eq(i16::from(role.as_u8())));
        }
        let models = query
            .order_by_desc(users::Column::Id)
            .all(&self.db)
            .await
            .context("list users")?;
        Ok(models.into_iter().map(user_from_model).collect())
    }

    async fn count(&self) -> Result<u64, MarketplaceError> {
        let count = users::Entity::find()
            .count(&self.db)
            .await
            .context("count users")?;
        Ok(count)
    }

    async fn create(&self, user: &User) -> Result<(), MarketplaceError> {
        users::ActiveModel {
            id: Set(user.id),
            google_id: Set(user.google_id.clone()),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            role: Set(i16::from(user.role.as_u8())),
            tax_number: Set(user.tax_number.clone()),
            is_completed_profile: Set(user.is_completed_profile),
            is_email_verified: Set(user.is_email_verified),
            telephone_or_phone: Set(user.profile.telephone_or_phone.clone()),
            street: Set(user.profile.street.clone()),
            house_or_building_num: Set(user.profile.house_or_building_num.clone()),
            postcode: Set(user.profile.postcode.clone()),
            city: Set(user.profile.city.clone()),
            state: Set(user.profile.state.clone()),
            image: Set(user.profile.image.clone()),
            reset_password_token: Set(None),
            reset_password_expires: Set(None),
            verify_email_token: Set(None),
            verify_email_expires: Set(None),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create user")?;
        Ok(())
    }

    async fn link_google(
        &self,
        id: Uuid,
        sub: &str,
        email_verified: bool,
    ) -> Result<(), MarketplaceError> {
        let mut update = users::Entity::update_many()
            .col_expr(users::Column::GoogleId, Expr::value(sub))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id));
        if email_verified {
            update = update.col_expr(users::Column::IsEmailVerified, Expr::value(true));
        }
        update.exec(&self.db).await.context("link google account")?;
        Ok(())
    }

    async fn update(&self, id: Uuid, update: &UserUpdate) -> Result<bool, MarketplaceError> {
        let Some(model) = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user for update")?
        else {
            return Ok(false);
        };

        let mut active: users::ActiveModel = model.into();
        if let Some(name) = &update.name {
            active.name = Set(name.clone());
        }
        if let Some(done) = update.is_completed_profile {
            active.is_completed_profile = Set(done);
        }
        if let Some(role) = update.role {
            active.role = Set(i16::from(role.as_u8()));
        }
        if let Some(tax_number) = &update.tax_number {
            active.tax_number = Set(Some(tax_number.clone()));
        }
        let p = &update.profile;
        if p.telephone_or_phone.is_some() {
            active.telephone_or_phone = Set(p.telephone_or_phone.clone());
        }
        if p.street.is_some() {
            active.street = Set(p.street.clone());
        }
        if p.house_or_building_num.is_some() {
            active.house_or_building_num = Set(p.house_or_building_num.clone());
        }
        if p.postcode.is_some() {
            active.postcode = Set(p.postcode.clone());
        }
        if p.city.is_some() {
            active.city = Set(p.city.clone());
        }
        if p.state.is_some() {
            active.state = Set(p.state.clone());
        }
        if p.image.is_some() {
            active.image = Set(p.image.clone());
        }
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await.context("update user")?;
        Ok(true)
    }

    async fn set_password(&self, id: Uuid, password_hash: &str) -> Result<(), MarketplaceError> {
        users::Entity::update_many()
            .col_expr(users::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("set user password")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let result = users::Entity::delete_many()
            .filter(users::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("delete user")?;
        Ok(result.rows_affected > 0)
    }

    async fn set_token(
        &self,
        id: Uuid,
        kind: UserTokenKind,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), MarketplaceError> {
        let (token_col, expires_col) = token_columns(kind);
        users::Entity::update_many()
            .col_expr(token_col, Expr::value(token))
            .col_expr(expires_col, Expr::value(expires_at))
            .filter(users::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("store user token")?;
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        token: &str,
        password_hash: &str,
    ) -> Result<bool, MarketplaceError> {
        let now = Utc::now();
        let result = users::Entity::update_many()
            .col_expr(users::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(users::Column::ResetPasswordToken, Expr::value(Option::<String>::None))
            .col_expr(
                users::Column::ResetPasswordExpires,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::ResetPasswordToken.eq(token))
            .filter(users::Column::ResetPasswordExpires.gt(now))
            .exec(&self.db)
            .await
            .context("consume reset token")?;
        Ok(result.rows_affected > 0)
    }

    async fn consume_verify_token(&self, token: &str) -> Result<bool, MarketplaceError> {
        let now = Utc::now();
        let result = users::Entity::update_many()
            .col_expr(users::Column::IsEmailVerified, Expr::value(true))
            .col_expr(users::Column::VerifyEmailToken, Expr::value(Option::<String>::None))
            .col_expr(
                users::Column::VerifyEmailExpires,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::VerifyEmailToken.eq(token))
            .filter(users::Column::VerifyEmailExpires.gt(now))
            .exec(&self.db)
            .await
            .context("consume verify token")?;
        Ok(result.rows_affected > 0)
    }
}

fn token_columns(kind: UserTokenKind) -> (users::Column, users::Column) {
    match kind {
        UserTokenKind::ResetPassword => (
            users::Column::ResetPasswordToken,
            users::Column::ResetPasswordExpires,
        ),
        UserTokenKind::VerifyEmail => (
            users::Column::VerifyEmailToken,
            users::Column::VerifyEmailExpires,
        ),
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        google_id: model.google_id,
        name: model.name,
        email: model.email,
        password_hash: model.password_hash,
        role: u8::try_from(model.role)
            .ok()
            .and_then(UserRole::from_u8)
            .unwrap_or(UserRole::User),
        tax_number: model.tax_number,
        is_completed_profile: model.is_completed_profile,
        is_email_verified: model.is_email_verified,
        profile: UserProfile {
            telephone_or_phone: model.telephone_or_phone,
            street: model.street,
            house_or_building_num: model.house_or_building_num,
            postcode: model.postcode,
            city: model.city,
            state: model.state,
            image: model.image,
        },
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Property repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPropertyRepository {
    pub db: DatabaseConnection,
}

fn order_by<E: EntityTrait>(query: Select<E>, column: impl ColumnTrait, sort: Sort) -> Select<E> {
    let order = match sort {
        Sort::Asc => Order::Asc,
        Sort::Desc => Order::Desc,
    };
    query.order_by(column, order)
}

impl PropertyRepository for DbPropertyRepository {
    async fn create(&self, property: &Property) -> Result<(), MarketplaceError> {
        properties::ActiveModel {
            id: Set(property.id),
            owner_id: Set(property.owner_id),
            name: Set(property.name.clone()),
            description: Set(property.description.clone()),
            amenities: Set(serde_json::json!(property.amenities)),
            price_per_night: Set(property.price_per_night),
            location: Set(property.location.clone()),
            state: Set(property.state.clone()),
            property_type: Set(property.property_type.clone()),
            guests: Set(property.guests),
            property_images: Set(serde_json::json!(property.property_images)),
            created_at: Set(property.created_at),
            updated_at: Set(property.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create property")?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Property>, MarketplaceError> {
        let model = properties::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find property by id")?;
        model.map(property_from_model).transpose()
    }

    async fn list(&self, filter: &PropertyFilter) -> Result<Vec<Property>, MarketplaceError> {
        let mut query = properties::Entity::find();
        if let Some(location) = filter.location.as_deref().filter(|s| !s.trim().is_empty()) {
            query = query.filter_contains_ci(properties::Column::State, location.trim());
        }
        if let Some(category) = filter.category.as_deref().filter(|s| !s.trim().is_empty()) {
            query = query.filter_contains_ci(properties::Column::PropertyType, category.trim());
        }
        if let Some(min_guests) = filter.min_guests {
            query = query.filter(properties::Column::Guests.gte(min_guests));
        }
        if let Some(sort) = filter.region_sort {
            query = order_by(query, properties::Column::State, sort);
        }
        if let Some(sort) = filter.price_sort {
            query = order_by(query, properties::Column::PricePerNight, sort);
        }
        if filter.newest {
            query = query.order_by_desc(properties::Column::Id);
        }
        let models = query
            .limit(filter.limit)
            .all(&self.db)
            .await
            .context("list properties")?;
        models.into_iter().map(property_from_model).collect()
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Property>, MarketplaceError> {
        let models = properties::Entity::find()
            .filter(properties::Column::OwnerId.eq(owner_id))
            .order_by_desc(properties::Column::Id)
            .all(&self.db)
            .await
            .context("list properties by owner")?;
        models.into_iter().map(property_from_model).collect()
    }

    async fn count(&self, owner_id: Option<Uuid>) -> Result<u64, MarketplaceError> {
        let mut query = properties::Entity::find();
        if let Some(owner_id) = owner_id {
            query = query.filter(properties::Column::OwnerId.eq(owner_id));
        }
        let count = query.count(&self.db).await.context("count properties")?;
        Ok(count)
    }

    async fn update(
        &self,
        id: Uuid,
        update: &PropertyUpdate,
    ) -> Result<Option<Property>, MarketplaceError> {
        let Some(model) = properties::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find property for update")?
        else {
            return Ok(None);
        };

        let mut active: properties::ActiveModel = model.into();
        if let Some(v) = &update.name {
            active.name = Set(v.clone());
        }
        if let Some(v) = &update.description {
            active.description = Set(v.clone());
        }
        if let Some(v) = &update.amenities {
            active.amenities = Set(serde_json::json!(v));
        }
        if let Some(v) = update.price_per_night {
            active.price_per_night = Set(v);
        }
        if let Some(v) = &update.location {
            active.location = Set(v.clone());
        }
        if let Some(v) = &update.state {
            active.state = Set(v.clone());
        }
        if let Some(v) = &update.property_type {
            active.property_type = Set(v.clone());
        }
        if let Some(v) = update.guests {
            active.guests = Set(v);
        }
        if let Some(v) = &update.property_images {
            active.property_images = Set(serde_json::json!(v));
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(&self.db).await.context("update property")?;
        property_from_model(updated).map(Some)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        // bookings, favorites and feedbacks go with it (ON DELETE CASCADE).
        let result = properties::Entity::delete_many()
            .filter(properties::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("delete property")?;
        Ok(result.rows_affected > 0)
    }

    async fn booked_dates(
        &self,
        property_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, DateRange)>, MarketplaceError> {
        if property_ids.is_empty() {
            return Ok(vec![]);
        }
        let models = bookings::Entity::find()
            .filter(bookings::Column::PropertyId.is_in(property_ids.to_vec()))
            .order_by_asc(bookings::Column::StartDate)
            .all(&self.db)
            .await
            .context("load booked dates")?;
        Ok(models
            .into_iter()
            .map(|m| {
                (
                    m.property_id,
                    DateRange {
                        start_date: m.start_date,
                        end_date: m.end_date,
                    },
                )
            })
            .collect())
    }

    async fn ratings(&self, property_ids: &[Uuid]) -> Result<Vec<(Uuid, u8)>, MarketplaceError> {
        if property_ids.is_empty() {
            return Ok(vec![]);
        }
        let models = feedbacks::Entity::find()
            .filter(feedbacks::Column::PropertyId.is_in(property_ids.to_vec()))
            .all(&self.db)
            .await
            .context("load property ratings")?;
        Ok(models
            .into_iter()
            .map(|m| (m.property_id, m.rating.clamp(0, 255) as u8))
            .collect())
    }
}

fn property_from_model(model: properties::Model) -> Result<Property, MarketplaceError> {
    let amenities = serde_json::from_value(model.amenities)
        .with_context(|| format!("decode amenities of property {}", model.id))?;
    let property_images = serde_json::from_value(model.property_images)
        .with_context(|| format!("decode images of property {}", model.id))?;
    Ok(Property {
        id: model.id,
        owner_id: model.owner_id,
        name: model.name,
        description: model.description,
        amenities,
        price_per_night: model.price_per_night,
        location: model.location,
        state: model.state,
        property_type: model.property_type,
        guests: model.guests,
        property_images,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Booking repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbBookingRepository {
    pub db: DatabaseConnection,
}

impl BookingRepository for DbBookingRepository {
    async fn create_if_available(
        &self,
        booking: &Booking,
        event: &OutboxEvent,
    ) -> Result<BookingInsert, MarketplaceError> {
        let outcome = self
            .db
            .transaction::<_, BookingInsert, sea_orm::DbErr>(|txn| {
                let booking = booking.clone();
                let event = event.clone();
                Box::pin(async move {
                    // Row lock on the property serializes concurrent bookings for it.
                    let property = properties::Entity::find_by_id(booking.property_id)
                        .lock_exclusive()
                        .one(txn)
                        .await?;
                    if property.is_none() {
                        return Ok(BookingInsert::PropertyMissing);
                    }

                    let overlapping = bookings::Entity::find()
                        .filter(bookings::Column::PropertyId.eq(booking.property_id))
                        .filter(bookings::Column::StartDate.lte(booking.dates.end_date))
                        .filter(bookings::Column::EndDate.gte(booking.dates.start_date))
                        .count(txn)
                        .await?;
                    if overlapping > 0 {
                        return Ok(BookingInsert::Overlap);
                    }

                    insert_booking(txn, &booking).await?;
                    insert_outbox_event(txn, &event).await?;
                    Ok(BookingInsert::Created)
                })
            })
            .await
            .context("create booking")?;
        Ok(outcome)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, MarketplaceError> {
        let model = bookings::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find booking by id")?;
        Ok(model.map(booking_from_model))
    }

    async fn list_all(&self) -> Result<Vec<Booking>, MarketplaceError> {
        let models = bookings::Entity::find()
            .order_by_desc(bookings::Column::Id)
            .all(&self.db)
            .await
            .context("list bookings")?;
        Ok(models.into_iter().map(booking_from_model).collect())
    }

    async fn list_by_guest(&self, guest_id: Uuid) -> Result<Vec<Booking>, MarketplaceError> {
        let models = bookings::Entity::find()
            .filter(bookings::Column::GuestId.eq(guest_id))
            .order_by_desc(bookings::Column::Id)
            .all(&self.db)
            .await
            .context("list bookings by guest")?;
        Ok(models.into_iter().map(booking_from_model).collect())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Booking>, MarketplaceError> {
        let models = bookings::Entity::find()
            .filter(bookings::Column::OwnerId.eq(owner_id))
            .order_by_desc(bookings::Column::Id)
            .all(&self.db)
            .await
            .context("list bookings by owner")?;
        Ok(models.into_iter().map(booking_from_model).collect())
    }

    async fn latest(
        &self,
        owner_id: Option<Uuid>,
        limit: u64,
    ) -> Result<Vec<Booking>, MarketplaceError> {
        let mut query = bookings::Entity::find();
        if let Some(owner_id) = owner_id {
            query = query.filter(bookings::Column::OwnerId.eq(owner_id));
        }
        let models = query
            .order_by_desc(bookings::Column::CreatedAt)
            .order_by_desc(bookings::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .context("list latest bookings")?;
        Ok(models.into_iter().map(booking_from_model).collect())
    }

    async fn count_by_owner(&self, owner_id: Uuid) -> Result<u64, MarketplaceError> {
        let count = bookings::Entity::find()
            .filter(bookings::Column::OwnerId.eq(owner_id))
            .count(&self.db)
            .await
            .context("count bookings by owner")?;
        Ok(count)
    }

    async fn set_payment_details(
        &self,
        id: Uuid,
        agent_paypal_email: &str,
        payment_instruction: &str,
        event: &OutboxEvent,
    ) -> Result<bool, MarketplaceError> {
        let email = agent_paypal_email.to_owned();
        let instruction = payment_instruction.to_owned();
        let written = self
            .db
            .transaction::<_, bool, sea_orm::DbErr>(|txn| {
                let event = event.clone();
                Box::pin(async move {
                    let result = bookings::Entity::update_many()
                        .col_expr(bookings::Column::AgentPaypalEmail, Expr::value(email))
                        .col_expr(bookings::Column::PaymentInstruction, Expr::value(instruction))
                        .col_expr(bookings::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(bookings::Column::Id.eq(id))
                        .filter(bookings::Column::AgentPaypalEmail.is_null())
                        .filter(bookings::Column::PaymentInstruction.is_null())
                        .exec(txn)
                        .await?;
                    if result.rows_affected == 0 {
                        return Ok(false);
                    }
                    insert_outbox_event(txn, &event).await?;
                    Ok(true)
                })
            })
            .await
            .context("set booking payment details")?;
        Ok(written)
    }

    async fn set_transaction_id(
        &self,
        id: Uuid,
        user_transaction_id: &str,
        event: &OutboxEvent,
    ) -> Result<bool, MarketplaceError> {
        let transaction_id = user_transaction_id.to_owned();
        let written = self
            .db
            .transaction::<_, bool, sea_orm::DbErr>(|txn| {
                let event = event.clone();
                Box::pin(async move {
                    let result = bookings::Entity::update_many()
                        .col_expr(bookings::Column::UserTransactionId, Expr::value(transaction_id))
                        .col_expr(bookings::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(bookings::Column::Id.eq(id))
                        .filter(bookings::Column::UserTransactionId.is_null())
                        .exec(txn)
                        .await?;
                    if result.rows_affected == 0 {
                        return Ok(false);
                    }
                    insert_outbox_event(txn, &event).await?;
                    Ok(true)
                })
            })
            .await
            .context("set booking transaction id")?;
        Ok(written)
    }

    async fn confirm(
        &self,
        id: Uuid,
        transaction: &Transaction,
        event: &OutboxEvent,
    ) -> Result<ConfirmOutcome, MarketplaceError> {
        let outcome = self
            .db
            .transaction::<_, ConfirmOutcome, sea_orm::DbErr>(|txn| {
                let transaction = transaction.clone();
                let event = event.clone();
                Box::pin(async move {
                    let result = bookings::Entity::update_many()
                        .col_expr(
                            bookings::Column::Status,
                            Expr::value(BookingStatus::Confirmed.as_str()),
                        )
                        .col_expr(bookings::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(bookings::Column::Id.eq(id))
                        .filter(bookings::Column::Status.eq(BookingStatus::Pending.as_str()))
                        .filter(bookings::Column::AgentPaypalEmail.is_not_null())
                        .filter(bookings::Column::UserTransactionId.is_not_null())
                        .exec(txn)
                        .await?;
                    if result.rows_affected == 0 {
                        return Ok(ConfirmOutcome::Stale);
                    }
                    insert_transaction(txn, &transaction).await?;
                    insert_outbox_event(txn, &event).await?;
                    Ok(ConfirmOutcome::Confirmed)
                })
            })
            .await
            .context("confirm booking")?;
        Ok(outcome)
    }

    async fn cancel(&self, id: Uuid, event: &OutboxEvent) -> Result<bool, MarketplaceError> {
        let cancelled = self
            .db
            .transaction::<_, bool, sea_orm::DbErr>(|txn| {
                let event = event.clone();
                Box::pin(async move {
                    let result = bookings::Entity::delete_many()
                        .filter(bookings::Column::Id.eq(id))
                        .filter(bookings::Column::Status.ne(BookingStatus::Confirmed.as_str()))
                        .exec(txn)
                        .await?;
                    if result.rows_affected == 0 {
                        return Ok(false);
                    }
                    insert_outbox_event(txn, &event).await?;
                    Ok(true)
                })
            })
            .await
            .context("cancel booking")?;
        Ok(cancelled)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let result = bookings::Entity::delete_many()
            .filter(bookings::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("delete booking")?;
        Ok(result.rows_affected > 0)
    }
}

async fn insert_booking(txn: &DatabaseTransaction, booking: &Booking) -> Result<(), sea_orm::DbErr> {
    bookings::ActiveModel {
        id: Set(booking.id),
        guest_id: Set(booking.guest_id),
        owner_id: Set(booking.owner_id),
        property_id: Set(booking.property_id),
        price: Set(booking.price.clone()),
        total_guests: Set(booking.total_guests.clone()),
        start_date: Set(booking.dates.start_date),
        end_date: Set(booking.dates.end_date),
        status: Set(booking.status.as_str().to_owned()),
        agent_paypal_email: Set(None),
        payment_instruction: Set(None),
        user_transaction_id: Set(None),
        created_at: Set(booking.created_at),
        updated_at: Set(booking.updated_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

async fn insert_transaction(
    txn: &DatabaseTransaction,
    transaction: &Transaction,
) -> Result<(), sea_orm::DbErr> {
    transactions::ActiveModel {
        id: Set(transaction.id),
        booking_id: Set(transaction.booking_id),
        user_id: Set(transaction.user_id),
        agent_id: Set(transaction.agent_id),
        amount: Set(transaction.amount),
        transaction_id: Set(transaction.transaction_id.clone()),
        payment_method: Set(transaction.payment_method.clone()),
        created_at: Set(transaction.created_at),
        updated_at: Set(transaction.updated_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

async fn insert_outbox_event(
    txn: &DatabaseTransaction,
    event: &OutboxEvent,
) -> Result<(), sea_orm::DbErr> {
    let now = Utc::now();
    outbox_events::ActiveModel {
        id: Set(event.id),
        kind: Set(event.kind.clone()),
        payload: Set(event.payload.clone()),
        idempotency_key: Set(event.idempotency_key.clone()),
        attempts: Set(0),
        last_error: Set(None),
        created_at: Set(now),
        next_attempt_at: Set(now),
        processed_at: Set(None),
        failed_at: Set(None),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn booking_from_model(model: bookings::Model) -> Booking {
    Booking {
        id: model.id,
        guest_id: model.guest_id,
        owner_id: model.owner_id,
        property_id: model.property_id,
        price: model.price,
        total_guests: model.total_guests,
        dates: DateRange {
            start_date: model.start_date,
            end_date: model.end_date,
        },
        status: BookingStatus::parse(&model.status).unwrap_or(BookingStatus::Pending),
        agent_paypal_email: model.agent_paypal_email,
        payment_instruction: model.payment_instruction,
        user_transaction_id: model.user_transaction_id,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Transaction repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTransactionRepository {
    pub db: DatabaseConnection,
}

impl TransactionRepository for DbTransactionRepository {
    async fn list_all(&self) -> Result<Vec<Transaction>, MarketplaceError> {
        let models = transactions::Entity::find()
            .order_by_desc(transactions::Column::Id)
            .all(&self.db)
            .await
            .context("list transactions")?;
        Ok(models.into_iter().map(transaction_from_model).collect())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Transaction>, MarketplaceError> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by_desc(transactions::Column::Id)
            .all(&self.db)
            .await
            .context("list transactions by user")?;
        Ok(models.into_iter().map(transaction_from_model).collect())
    }

    async fn list_by_agent(&self, agent_id: Uuid) -> Result<Vec<Transaction>, MarketplaceError> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::AgentId.eq(agent_id))
            .order_by_desc(transactions::Column::Id)
            .all(&self.db)
            .await
            .context("list transactions by agent")?;
        Ok(models.into_iter().map(transaction_from_model).collect())
    }

    async fn revenue(&self, agent_id: Option<Uuid>) -> Result<f64, MarketplaceError> {
        let mut query = transactions::Entity::find();
        if let Some(agent_id) = agent_id {
            query = query.filter(transactions::Column::AgentId.eq(agent_id));
        }
        let total: Option<Option<f64>> = query
            .select_only()
            .column_as(Expr::col(transactions::Column::Amount).sum(), "total")
            .into_tuple()
            .one(&self.db)
            .await
            .context("sum transaction amounts")?;
        Ok(total.flatten().unwrap_or(0.0))
    }
}

fn transaction_from_model(model: transactions::Model) -> Transaction {
    Transaction {
        id: model.id,
        booking_id: model.booking_id,
        user_id: model.user_id,
        agent_id: model.agent_id,
        amount: model.amount,
        transaction_id: model.transaction_id,
        payment_method: model.payment_method,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Favorite repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbFavoriteRepository {
    pub db: DatabaseConnection,
}

impl FavoriteRepository for DbFavoriteRepository {
    async fn toggle(&self, user_id: Uuid, property_id: Uuid) -> Result<bool, MarketplaceError> {
        let added = self
            .db
            .transaction::<_, bool, sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    let removed = favorites::Entity::delete_many()
                        .filter(favorites::Column::UserId.eq(user_id))
                        .filter(favorites::Column::PropertyId.eq(property_id))
                        .exec(txn)
                        .await?;
                    if removed.rows_affected > 0 {
                        return Ok(false);
                    }
                    favorites::ActiveModel {
                        user_id: Set(user_id),
                        property_id: Set(property_id),
                        created_at: Set(Utc::now()),
                    }
                    .insert(txn)
                    .await?;
                    Ok(true)
                })
            })
            .await
            .context("toggle favorite")?;
        Ok(added)
    }

    async fn remove(&self, user_id: Uuid, property_id: Uuid) -> Result<bool, MarketplaceError> {
        let result = favorites::Entity::delete_many()
            .filter(favorites::Column::UserId.eq(user_id))
            .filter(favorites::Column::PropertyId.eq(property_id))
            .exec(&self.db)
            .await
            .context("remove favorite")?;
        Ok(result.rows_affected > 0)
    }

    async fn contains(&self, user_id: Uuid, property_id: Uuid) -> Result<bool, MarketplaceError> {
        let model = favorites::Entity::find_by_id((user_id, property_id))
            .one(&self.db)
            .await
            .context("find favorite")?;
        Ok(model.is_some())
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<Property>, MarketplaceError> {
        let property_ids: Vec<Uuid> = favorites::Entity::find()
            .filter(favorites::Column::UserId.eq(user_id))
            .order_by_desc(favorites::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list favorites")?
            .into_iter()
            .map(|f| f.property_id)
            .collect();
        if property_ids.is_empty() {
            return Ok(vec![]);
        }

        let mut models = properties::Entity::find()
            .filter(properties::Column::Id.is_in(property_ids.clone()))
            .all(&self.db)
            .await
            .context("load favorite properties")?;
        models.sort_by_key(|m| property_ids.iter().position(|id| *id == m.id));
        models.into_iter().map(property_from_model).collect()
    }
}

// ── Feedback repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbFeedbackRepository {
    pub db: DatabaseConnection,
}

impl FeedbackRepository for DbFeedbackRepository {
    async fn create(&self, feedback: &Feedback) -> Result<(), MarketplaceError> {
        feedbacks::ActiveModel {
            id: Set(feedback.id),
            property_id: Set(feedback.property_id),
            user_id: Set(feedback.user_id),
            booking_id: Set(feedback.booking_id),
            rating: Set(i16::from(feedback.rating)),
            comment: Set(feedback.comment.clone()),
            created_at: Set(feedback.created_at),
            updated_at: Set(feedback.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create feedback")?;
        Ok(())
    }

    async fn list_by_property(
        &self,
        property_id: Uuid,
    ) -> Result<Vec<FeedbackWithAuthor>, MarketplaceError> {
        let rows = feedbacks::Entity::find()
            .filter(feedbacks::Column::PropertyId.eq(property_id))
            .order_by_desc(feedbacks::Column::Id)
            .find_also_related(users::Entity)
            .all(&self.db)
            .await
            .context("list feedback by property")?;
        Ok(rows
            .into_iter()
            .map(|(feedback, author)| FeedbackWithAuthor {
                feedback: feedback_from_model(feedback),
                user: author.map(|u| FeedbackAuthor {
                    name: u.name,
                    image: u.image,
                }),
            })
            .collect())
    }
}

fn feedback_from_model(model: feedbacks::Model) -> Feedback {
    Feedback {
        id: model.id,
        property_id: model.property_id,
        user_id: model.user_id,
        booking_id: model.booking_id,
        rating: model.rating.clamp(0, 255) as u8,
        comment: model.comment,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Outbox repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOutboxRepository {
    pub db: DatabaseConnection,
}

impl OutboxRepository for DbOutboxRepository {
    async fn fetch_due(&self, limit: u64) -> Result<Vec<PendingOutboxEvent>, MarketplaceError> {
        let models = outbox_events::Entity::find()
            .filter(outbox_events::Column::ProcessedAt.is_null())
            .filter(outbox_events::Column::FailedAt.is_null())
            .filter(outbox_events::Column::NextAttemptAt.lte(Utc::now()))
            .order_by_asc(outbox_events::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .context("fetch due outbox events")?;
        Ok(models
            .into_iter()
            .map(|m| PendingOutboxEvent {
                id: m.id,
                kind: m.kind,
                payload: m.payload,
                attempts: m.attempts,
            })
            .collect())
    }

    async fn mark_processed(&self, id: Uuid) -> Result<(), MarketplaceError> {
        outbox_events::Entity::update_many()
            .col_expr(outbox_events::Column::ProcessedAt, Expr::value(Utc::now()))
            .filter(outbox_events::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("mark outbox event processed")?;
        Ok(())
    }

    async fn record_failure(
        &self,
        id: Uuid,
        attempts: i32,
        error: &str,
        retry_at: Option<DateTime<Utc>>,
    ) -> Result<(), MarketplaceError> {
        let mut update = outbox_events::Entity::update_many()
            .col_expr(outbox_events::Column::Attempts, Expr::value(attempts))
            .col_expr(outbox_events::Column::LastError, Expr::value(error))
            .filter(outbox_events::Column::Id.eq(id));
        update = match retry_at {
            Some(at) => update.col_expr(outbox_events::Column::NextAttemptAt, Expr::value(at)),
            None => update.col_expr(outbox_events::Column::FailedAt, Expr::value(Utc::now())),
        };
        update
            .exec(&self.db)
            .await
            .context("record outbox failure")?;
        Ok(())
    }
}
