use sea_orm::entity::prelude::*;

/// Payment ledger entry written once when a booking is confirmed. Never updated.
///
/// No foreign keys: ledger rows outlive deleted bookings and accounts.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub agent_id: Uuid,
    pub amount: f64,
    pub transaction_id: String,
    pub payment_method: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
