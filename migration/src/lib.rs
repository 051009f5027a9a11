pub use sea_orm_migration::prelude::*;

mod m20260115_100000_create_auth_tables;
mod m20260115_110000_create_company_tables;
mod m20260115_120000_create_investor_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260115_100000_create_auth_tables::Migration),
            Box::new(m20260115_110000_create_company_tables::Migration),
            Box::new(m20260115_120000_create_investor_tables::Migration),
        ]
    }
}
