use sea_orm::EntityTrait;
use sea_orm_migration::{prelude::*, sea_orm::Schema};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_database_backend();
        let schema = Schema::new(db);

        create_entity_table(manager, &schema, entity::users::Entity).await?;
        create_entity_table(manager, &schema, entity::clans::Entity).await?;
        create_entity_table(manager, &schema, entity::clan_members::Entity).await?;
        create_entity_table(manager, &schema, entity::relationships::Entity).await?;
        create_entity_table(manager, &schema, entity::moderation_items::Entity).await?;
        create_entity_table(manager, &schema, entity::compendium_entries::Entity).await?;
        create_entity_table(manager, &schema, entity::wiki_revisions::Entity).await?;
        create_entity_table(manager, &schema, entity::map_updates::Entity).await?;

        // One active request per (kind, requester, target); concurrent duplicate
        // requests are serialized here.
        manager
            .create_index(
                Index::create()
                    .name("idx_relationships_kind_pair")
                    .table(Relationships::Table)
                    .col(Relationships::Kind)
                    .col(Relationships::RequesterId)
                    .col(Relationships::TargetId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_entity_table(manager, entity::map_updates::Entity).await?;
        drop_entity_table(manager, entity::wiki_revisions::Entity).await?;
        drop_entity_table(manager, entity::compendium_entries::Entity).await?;
        drop_entity_table(manager, entity::moderation_items::Entity).await?;
        drop_entity_table(manager, entity::relationships::Entity).await?;
        drop_entity_table(manager, entity::clan_members::Entity).await?;
        drop_entity_table(manager, entity::clans::Entity).await?;
        drop_entity_table(manager, entity::users::Entity).await?;

        Ok(())
    }
}

async fn create_entity_table<'a, E: EntityTrait>(
    manager: &'a SchemaManager<'a>,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    manager
        .create_table(schema.create_table_from_entity(entity))
        .await
}

async fn drop_entity_table<'a, E: EntityTrait>(
    manager: &'a SchemaManager<'a>,
    entity: E,
) -> Result<(), DbErr> {
    manager
        .drop_table(Table::drop().table(entity.table_ref()).to_owned())
        .await
}

#[derive(DeriveIden)]
enum Relationships {
    Table,
    Kind,
    RequesterId,
    TargetId,
}
