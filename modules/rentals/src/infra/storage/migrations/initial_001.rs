use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    BirthDate,
    PasswordHash,
    Role,
    PasswordChangedAt,
    PasswordResetHash,
    PasswordResetExpiresAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Flats {
    Table,
    Id,
    OwnerId,
    Title,
    City,
    StreetName,
    TitleSearch,
    CityKey,
    StreetNameSearch,
    StreetNumber,
    AreaSize,
    HasAc,
    YearBuilt,
    RentPrice,
    DateAvailable,
    ImageUrl,
    ImageHandle,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Messages {
    Table,
    Id,
    FlatId,
    SenderId,
    Content,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Favorites {
    Table,
    UserId,
    FlatId,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::FirstName).string().not_null())
                    .col(ColumnDef::new(Users::LastName).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::BirthDate).date().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null().default("user"))
                    .col(ColumnDef::new(Users::PasswordChangedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Users::PasswordResetHash).string().null())
                    .col(ColumnDef::new(Users::PasswordResetExpiresAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Flats::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Flats::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Flats::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Flats::Title).string().not_null())
                    .col(ColumnDef::new(Flats::City).string().not_null())
                    .col(ColumnDef::new(Flats::StreetName).string().not_null())
                    .col(ColumnDef::new(Flats::TitleSearch).string().not_null())
                    .col(ColumnDef::new(Flats::CityKey).string().not_null())
                    .col(ColumnDef::new(Flats::StreetNameSearch).string().not_null())
                    .col(ColumnDef::new(Flats::StreetNumber).integer().not_null())
                    .col(ColumnDef::new(Flats::AreaSize).double().not_null())
                    .col(ColumnDef::new(Flats::HasAc).boolean().not_null().default(false))
                    .col(ColumnDef::new(Flats::YearBuilt).integer().not_null())
                    .col(ColumnDef::new(Flats::RentPrice).double().not_null())
                    .col(ColumnDef::new(Flats::DateAvailable).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Flats::ImageUrl).string().not_null())
                    .col(ColumnDef::new(Flats::ImageHandle).string().null())
                    .col(ColumnDef::new(Flats::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Flats::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_flats_owner")
                            .from(Flats::Table, Flats::OwnerId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Messages::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Messages::FlatId).uuid().not_null())
                    .col(ColumnDef::new(Messages::SenderId).uuid().not_null())
                    .col(ColumnDef::new(Messages::Content).text().not_null())
                    .col(ColumnDef::new(Messages::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_messages_flat")
                            .from(Messages::Table, Messages::FlatId)
                            .to(Flats::Table, Flats::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_messages_sender")
                            .from(Messages::Table, Messages::SenderId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Favorites::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Favorites::UserId).uuid().not_null())
                    .col(ColumnDef::new(Favorites::FlatId).uuid().not_null())
                    .col(ColumnDef::new(Favorites::CreatedAt).timestamp_with_time_zone().not_null())
                    .primary_key(Index::create().col(Favorites::UserId).col(Favorites::FlatId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorites_user")
                            .from(Favorites::Table, Favorites::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorites_flat")
                            .from(Favorites::Table, Favorites::FlatId)
                            .to(Flats::Table, Flats::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_flats_owner_id")
                    .table(Flats::Table)
                    .col(Flats::OwnerId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_flats_created_at")
                    .table(Flats::Table)
                    .col(Flats::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_messages_flat_id")
                    .table(Messages::Table)
                    .col(Messages::FlatId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_favorites_flat_id")
                    .table(Favorites::Table)
                    .col(Favorites::FlatId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Favorites::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Messages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Flats::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}
