use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InvestorFirms::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(InvestorFirms::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(InvestorFirms::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(InvestorFirms::Website).string())
                    .col(ColumnDef::new(InvestorFirms::Location).string())
                    .col(ColumnDef::new(InvestorFirms::FirmType).string())
                    .col(ColumnDef::new(InvestorFirms::Source).string().not_null())
                    .col(
                        ColumnDef::new(InvestorFirms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(InvestorFirms::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InvestorContacts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(InvestorContacts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(InvestorContacts::FirmId).uuid())
                    .col(ColumnDef::new(InvestorContacts::FullName).string().not_null())
                    // Unique so that an import re-run upserts instead of duplicating
                    .col(ColumnDef::new(InvestorContacts::Email).string().unique_key())
                    .col(ColumnDef::new(InvestorContacts::Title).string())
                    .col(ColumnDef::new(InvestorContacts::LinkedinUrl).string())
                    .col(ColumnDef::new(InvestorContacts::Source).string().not_null())
                    .col(
                        ColumnDef::new(InvestorContacts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_investor_contacts_firm")
                            .from(InvestorContacts::Table, InvestorContacts::FirmId)
                            .to(InvestorFirms::Table, InvestorFirms::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InvestorProfiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(InvestorProfiles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(InvestorProfiles::FullName).string().not_null())
                    .col(ColumnDef::new(InvestorProfiles::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(InvestorProfiles::Phone).string())
                    .col(ColumnDef::new(InvestorProfiles::LinkedinUrl).string())
                    .col(ColumnDef::new(InvestorProfiles::Bio).text())
                    .col(ColumnDef::new(InvestorProfiles::FirmName).string())
                    .col(ColumnDef::new(InvestorProfiles::Title).string())
                    .col(ColumnDef::new(InvestorProfiles::BusinessType).string())
                    .col(ColumnDef::new(InvestorProfiles::Location).string())
                    // admin_upload | founder_added | self_registered | ai_discovery
                    .col(ColumnDef::new(InvestorProfiles::Source).string().not_null())
                    .col(
                        ColumnDef::new(InvestorProfiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(InvestorProfiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InvestorPreferences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InvestorPreferences::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InvestorPreferences::InvestorId).uuid().not_null())
                    // sector | region | stage | model | sales_type | range
                    .col(ColumnDef::new(InvestorPreferences::Kind).string().not_null())
                    .col(ColumnDef::new(InvestorPreferences::Value).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_investor_preferences_investor")
                            .from(InvestorPreferences::Table, InvestorPreferences::InvestorId)
                            .to(InvestorProfiles::Table, InvestorProfiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_investor_preferences_investor_kind")
                    .table(InvestorPreferences::Table)
                    .col(InvestorPreferences::InvestorId)
                    .col(InvestorPreferences::Kind)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InvestorMetrics::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(InvestorMetrics::InvestorId).uuid().not_null().primary_key())
                    .col(ColumnDef::new(InvestorMetrics::CheckSizeMin).big_integer())
                    .col(ColumnDef::new(InvestorMetrics::CheckSizeMax).big_integer())
                    .col(ColumnDef::new(InvestorMetrics::PortfolioCount).integer())
                    .col(
                        ColumnDef::new(InvestorMetrics::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_investor_metrics_investor")
                            .from(InvestorMetrics::Table, InvestorMetrics::InvestorId)
                            .to(InvestorProfiles::Table, InvestorProfiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InvestorMetrics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InvestorPreferences::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InvestorProfiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InvestorContacts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InvestorFirms::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum InvestorFirms {
    Table,
    Id,
    Name,
    Website,
    Location,
    FirmType,
    Source,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum InvestorContacts {
    Table,
    Id,
    FirmId,
    FullName,
    Email,
    Title,
    LinkedinUrl,
    Source,
    CreatedAt,
}

#[derive(DeriveIden)]
enum InvestorProfiles {
    Table,
    Id,
    FullName,
    Email,
    Phone,
    LinkedinUrl,
    Bio,
    FirmName,
    Title,
    BusinessType,
    Location,
    Source,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum InvestorPreferences {
    Table,
    Id,
    InvestorId,
    Kind,
    Value,
}

#[derive(DeriveIden)]
enum InvestorMetrics {
    Table,
    InvestorId,
    CheckSizeMin,
    CheckSizeMax,
    PortfolioCount,
    UpdatedAt,
}
