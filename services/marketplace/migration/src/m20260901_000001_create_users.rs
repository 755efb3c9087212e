use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::GoogleId).string().unique_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string())
                    .col(
                        ColumnDef::new(Users::Role)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Users::TaxNumber).string())
                    .col(
                        ColumnDef::new(Users::IsCompletedProfile)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::IsEmailVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::TelephoneOrPhone).string())
                    .col(ColumnDef::new(Users::Street).string())
                    .col(ColumnDef::new(Users::HouseOrBuildingNum).string())
                    .col(ColumnDef::new(Users::Postcode).string())
                    .col(ColumnDef::new(Users::City).string())
                    .col(ColumnDef::new(Users::State).string())
                    .col(ColumnDef::new(Users::Image).string())
                    .col(ColumnDef::new(Users::ResetPasswordToken).string())
                    .col(ColumnDef::new(Users::ResetPasswordExpires).timestamp_with_time_zone())
                    .col(ColumnDef::new(Users::VerifyEmailToken).string())
                    .col(ColumnDef::new(Users::VerifyEmailExpires).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Users::Table)
                    .col(Users::ResetPasswordToken)
                    .name("idx_users_reset_password_token")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Users::Table)
                    .col(Users::VerifyEmailToken)
                    .name("idx_users_verify_email_token")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    GoogleId,
    Name,
    Email,
    PasswordHash,
    Role,
    TaxNumber,
    IsCompletedProfile,
    IsEmailVerified,
    TelephoneOrPhone,
    Street,
    HouseOrBuildingNum,
    Postcode,
    City,
    State,
    Image,
    ResetPasswordToken,
    ResetPasswordExpires,
    VerifyEmailToken,
    VerifyEmailExpires,
    CreatedAt,
    UpdatedAt,
}
