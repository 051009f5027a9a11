use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Companies::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Companies::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Companies::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Companies::Name).string().not_null())
                    .col(ColumnDef::new(Companies::Tagline).string())
                    .col(ColumnDef::new(Companies::Description).text())
                    .col(ColumnDef::new(Companies::LogoUrl).string())
                    .col(ColumnDef::new(Companies::CoverUrl).string())
                    .col(ColumnDef::new(Companies::Website).string())
                    .col(
                        ColumnDef::new(Companies::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Companies::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_companies_owner")
                            .from(Companies::Table, Companies::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CompanyIndustries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CompanyIndustries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CompanyIndustries::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(CompanyIndustries::Category).string().not_null())
                    .col(ColumnDef::new(CompanyIndustries::Subcategory).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_company_industries_company")
                            .from(CompanyIndustries::Table, CompanyIndustries::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_company_industries_company")
                    .table(CompanyIndustries::Table)
                    .col(CompanyIndustries::CompanyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FundingRounds::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(FundingRounds::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(FundingRounds::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(FundingRounds::Stage).string().not_null())
                    .col(ColumnDef::new(FundingRounds::Valuation).big_integer().not_null())
                    .col(ColumnDef::new(FundingRounds::Allocation).big_integer().not_null())
                    .col(
                        ColumnDef::new(FundingRounds::IsCurrent)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(FundingRounds::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_funding_rounds_company")
                            .from(FundingRounds::Table, FundingRounds::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CapTableEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CapTableEntries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CapTableEntries::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(CapTableEntries::InvestorName).string().not_null())
                    .col(ColumnDef::new(CapTableEntries::Email).string())
                    .col(ColumnDef::new(CapTableEntries::Amount).big_integer().not_null())
                    .col(ColumnDef::new(CapTableEntries::RoundStage).string().not_null())
                    // equity | debt
                    .col(ColumnDef::new(CapTableEntries::InvestmentType).string().not_null())
                    .col(ColumnDef::new(CapTableEntries::SharePrice).double())
                    .col(ColumnDef::new(CapTableEntries::ShareCount).big_integer())
                    .col(
                        ColumnDef::new(CapTableEntries::IsInvestment)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(CapTableEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cap_table_entries_company")
                            .from(CapTableEntries::Table, CapTableEntries::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cap_table_entries_company")
                    .table(CapTableEntries::Table)
                    .col(CapTableEntries::CompanyId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CapTableEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FundingRounds::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CompanyIndustries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Companies::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
    OwnerId,
    Name,
    Tagline,
    Description,
    LogoUrl,
    CoverUrl,
    Website,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CompanyIndustries {
    Table,
    Id,
    CompanyId,
    Category,
    Subcategory,
}

#[derive(DeriveIden)]
enum FundingRounds {
    Table,
    Id,
    CompanyId,
    Stage,
    Valuation,
    Allocation,
    IsCurrent,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CapTableEntries {
    Table,
    Id,
    CompanyId,
    InvestorName,
    Email,
    Amount,
    RoundStage,
    InvestmentType,
    SharePrice,
    ShareCount,
    IsInvestment,
    CreatedAt,
}
