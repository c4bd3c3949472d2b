use sea_orm_migration::prelude::*;

mod initial_001;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(initial_001::Migration)]
    }

    // Each module tracks its own applied migrations.
    fn migration_table_name() -> sea_orm::DynIden {
        Alias::new("inventory_migrations").into_iden()
    }
}
