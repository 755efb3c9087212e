use uuid::Uuid;

use croscout_domain::user::UserRole;

use crate::domain::repository::{
    BookingRepository, PropertyRepository, TransactionRepository, UserRepository,
};
use crate::domain::types::{DashboardStats, LATEST_BOOKINGS_LIMIT};
use crate::error::MarketplaceError;
use crate::usecase::booking::summarize;

pub struct DashboardStatsUseCase<
    U: UserRepository,
    P: PropertyRepository,
    B: BookingRepository,
    T: TransactionRepository,
> {
    pub users: U,
    pub properties: P,
    pub bookings: B,
    pub transactions: T,
}

impl<U, P, B, T> DashboardStatsUseCase<U, P, B, T>
where
    U: UserRepository,
    P: PropertyRepository,
    B: BookingRepository,
    T: TransactionRepository,
{
    /// Global rollups for admins, rollups over their own listings for agents.
    pub async fn execute(&self, user_id: Uuid) -> Result<DashboardStats, MarketplaceError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(MarketplaceError::UserIdNotFound)?;

        match user.role {
            UserRole::User => Err(MarketplaceError::DashboardForbidden),
            UserRole::Admin => {
                let latest = self.bookings.latest(None, LATEST_BOOKINGS_LIMIT).await?;
                Ok(DashboardStats::Admin {
                    user_count: self.users.count().await?,
                    property_count: self.properties.count(None).await?,
                    total_revenue: self.transactions.revenue(None).await?,
                    latest_bookings: summarize(&self.users, latest).await?,
                })
            }
            UserRole::Agent => {
                let latest = self
                    .bookings
                    .latest(Some(user.id), LATEST_BOOKINGS_LIMIT)
                    .await?;
                Ok(DashboardStats::Agent {
                    agent_properties: self.properties.count(Some(user.id)).await?,
                    agent_revenue: self.transactions.revenue(Some(user.id)).await?,
                    agent_bookings: self.bookings.count_by_owner(user.id).await?,
                    latest_agent_bookings: summarize(&self.users, latest).await?,
                })
            }
        }
    }
}
