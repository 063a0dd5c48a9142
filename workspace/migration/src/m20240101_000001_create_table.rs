use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Name))
                    .col(string(Users::Email).unique_key())
                    .to_owned(),
            )
            .await?;

        // Create budgets table
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(pk_auto(Budgets::Id))
                    .col(string(Budgets::Name))
                    .col(string(Budgets::BudgetType))
                    .col(integer(Budgets::OwnerId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budget_owner")
                            .from(Budgets::Table, Budgets::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create budget_members table (join table with share percentage)
        manager
            .create_table(
                Table::create()
                    .table(BudgetMembers::Table)
                    .if_not_exists()
                    .col(integer(BudgetMembers::BudgetId))
                    .col(integer(BudgetMembers::UserId))
                    .col(decimal(BudgetMembers::Share).decimal_len(5, 2))
                    .primary_key(
                        Index::create()
                            .name("pk_budget_members")
                            .col(BudgetMembers::BudgetId)
                            .col(BudgetMembers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budget_members_budget")
                            .from(BudgetMembers::Table, BudgetMembers::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budget_members_user")
                            .from(BudgetMembers::Table, BudgetMembers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create categories table
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(pk_auto(Categories::Id))
                    .col(integer(Categories::BudgetId))
                    .col(string(Categories::Name))
                    .col(decimal(Categories::Amount).decimal_len(16, 4))
                    .col(integer_null(Categories::ParentId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_category_budget")
                            .from(Categories::Table, Categories::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_category_parent")
                            .from(Categories::Table, Categories::ParentId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create transactions table
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(pk_auto(Transactions::Id))
                    .col(integer(Transactions::BudgetId))
                    .col(integer(Transactions::CategoryId))
                    .col(string(Transactions::Title))
                    .col(decimal(Transactions::Amount).decimal_len(16, 4))
                    .col(string(Transactions::TransactionType))
                    .col(date(Transactions::Date))
                    .col(string_null(Transactions::Comment))
                    .col(boolean(Transactions::IsRecurring).default(false))
                    .col(integer_null(Transactions::PaidByUserId))
                    .col(date(Transactions::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transaction_budget")
                            .from(Transactions::Table, Transactions::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transaction_category")
                            .from(Transactions::Table, Transactions::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transaction_paid_by")
                            .from(Transactions::Table, Transactions::PaidByUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create recurring_transactions table
        manager
            .create_table(
                Table::create()
                    .table(RecurringTransactions::Table)
                    .if_not_exists()
                    .col(pk_auto(RecurringTransactions::Id))
                    .col(integer(RecurringTransactions::BudgetId))
                    .col(integer(RecurringTransactions::CategoryId))
                    .col(string(RecurringTransactions::Title))
                    .col(decimal(RecurringTransactions::Amount).decimal_len(16, 4))
                    .col(string(RecurringTransactions::TransactionType))
                    .col(string(RecurringTransactions::Frequency))
                    .col(integer_null(RecurringTransactions::Day))
                    .col(boolean(RecurringTransactions::Active).default(true))
                    .col(date(RecurringTransactions::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recurring_budget")
                            .from(RecurringTransactions::Table, RecurringTransactions::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recurring_category")
                            .from(RecurringTransactions::Table, RecurringTransactions::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create recurring_transaction_versions table
        manager
            .create_table(
                Table::create()
                    .table(RecurringTransactionVersions::Table)
                    .if_not_exists()
                    .col(pk_auto(RecurringTransactionVersions::Id))
                    .col(integer(RecurringTransactionVersions::RecurringTransactionId))
                    .col(string(RecurringTransactionVersions::Title))
                    .col(decimal(RecurringTransactionVersions::Amount).decimal_len(16, 4))
                    .col(integer(RecurringTransactionVersions::CategoryId))
                    .col(string(RecurringTransactionVersions::Frequency))
                    .col(integer_null(RecurringTransactionVersions::Day))
                    .col(date(RecurringTransactionVersions::EffectiveFrom))
                    .col(date_null(RecurringTransactionVersions::EffectiveUntil))
                    .col(date(RecurringTransactionVersions::CreatedAt))
                    .col(string_null(RecurringTransactionVersions::ChangeReason))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_version_recurring_transaction")
                            .from(
                                RecurringTransactionVersions::Table,
                                RecurringTransactionVersions::RecurringTransactionId,
                            )
                            .to(RecurringTransactions::Table, RecurringTransactions::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Versions are resolved per rule ordered by effective_from.
        manager
            .create_index(
                Index::create()
                    .name("idx_versions_rule_effective_from")
                    .table(RecurringTransactionVersions::Table)
                    .col(RecurringTransactionVersions::RecurringTransactionId)
                    .col(RecurringTransactionVersions::EffectiveFrom)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RecurringTransactionVersions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecurringTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BudgetMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
}

#[derive(DeriveIden)]
enum Budgets {
    Table,
    Id,
    Name,
    BudgetType,
    OwnerId,
}

#[derive(DeriveIden)]
enum BudgetMembers {
    Table,
    BudgetId,
    UserId,
    Share,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    BudgetId,
    Name,
    Amount,
    ParentId,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    BudgetId,
    CategoryId,
    Title,
    Amount,
    TransactionType,
    Date,
    Comment,
    IsRecurring,
    PaidByUserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum RecurringTransactions {
    Table,
    Id,
    BudgetId,
    CategoryId,
    Title,
    Amount,
    TransactionType,
    Frequency,
    Day,
    Active,
    CreatedAt,
}

#[derive(DeriveIden)]
enum RecurringTransactionVersions {
    Table,
    Id,
    RecurringTransactionId,
    Title,
    Amount,
    CategoryId,
    Frequency,
    Day,
    EffectiveFrom,
    EffectiveUntil,
    CreatedAt,
    ChangeReason,
}
