use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Desenvolvedoras {
    Table,
    Id,
    Nome,
    #[iden = "data_de_fundacao"]
    DataDeFundacao,
    #[iden = "pais_de_origem"]
    PaisDeOrigem,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Desenvolvedoras::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Desenvolvedoras::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Desenvolvedoras::Nome).string().not_null())
                    .col(ColumnDef::new(Desenvolvedoras::DataDeFundacao).date().null())
                    .col(
                        ColumnDef::new(Desenvolvedoras::PaisDeOrigem)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Desenvolvedoras::Table).to_owned())
            .await
    }
}
