use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Jogos {
    Table,
    Id,
    Titulo,
    Descricao,
    #[iden = "ano_lancamento"]
    AnoLancamento,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Jogos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Jogos::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Jogos::Titulo).string_len(100).not_null())
                    .col(ColumnDef::new(Jogos::Descricao).string_len(500).null())
                    .col(ColumnDef::new(Jogos::AnoLancamento).integer().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Jogos::Table).to_owned())
            .await
    }
}
