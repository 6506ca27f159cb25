use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

// ----- Iden enums for tables & columns -----
#[derive(Iden)]
enum PokerTables {
    Table,
    Id,
    Name,
    SeatCapacity,
    SmallBlind,
    BigBlind,
    Ante,
    DealerSeat,
    TurnTimeoutSecs,
    Status,
    WinnerSeat,
    RngSeed,
    CreatedAt,
    UpdatedAt,
    Version,
}

#[derive(Iden)]
enum Hands {
    Table,
    Id,
    TableId,
    HandNo,
    Phase,
    DealerSeat,
    SmallBlindSeat,
    BigBlindSeat,
    CurrentActorSeat,
    CurrentBet,
    MinRaiseIncrement,
    Pot,
    CommunityCards,
    Deck,
    ActionDeadline,
    ShowdownStartedAt,
    LastRunoutAt,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
    Version,
}

#[derive(Iden)]
enum TableSeats {
    Table,
    Id,
    TableId,
    SeatIndex,
    PlayerId,
    Stack,
    Status,
    CurrentBet,
    TotalContributed,
    HoleCards,
    CreatedAt,
    UpdatedAt,
    Version,
}

#[derive(Iden)]
enum HandActions {
    Table,
    Id,
    HandId,
    Seq,
    SeatIndex,
    Kind,
    Amount,
    ChipsAdded,
    Phase,
    CreatedAt,
}

#[derive(Iden)]
enum HandPots {
    Table,
    Id,
    HandId,
    LayerIndex,
    Amount,
    EligibleSeats,
    CreatedAt,
}

#[derive(Iden)]
enum ShowdownResults {
    Table,
    Id,
    HandId,
    SeatIndex,
    RankCategory,
    Description,
    BestFive,
    AmountWon,
    CreatedAt,
}

#[derive(Iden)]
enum Events {
    Table,
    Id,
    EntityType,
    EntityId,
    EventType,
    Payload,
    EntityVersion,
    CreatedAt,
}

fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .primary_key()
        .auto_increment()
        .to_owned()
}

fn ts_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

fn ts_null_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).timestamp_with_time_zone().null().to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // poker_tables
        manager
            .create_table(
                Table::create()
                    .table(PokerTables::Table)
                    .if_not_exists()
                    .col(id_col(PokerTables::Id))
                    .col(ColumnDef::new(PokerTables::Name).string().not_null())
                    .col(
                        ColumnDef::new(PokerTables::SeatCapacity)
                            .small_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PokerTables::SmallBlind).big_integer().not_null())
                    .col(ColumnDef::new(PokerTables::BigBlind).big_integer().not_null())
                    .col(
                        ColumnDef::new(PokerTables::Ante)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(PokerTables::DealerSeat).small_integer().null())
                    .col(ColumnDef::new(PokerTables::TurnTimeoutSecs).integer().null())
                    .col(
                        ColumnDef::new(PokerTables::Status)
                            .string_len(16)
                            .not_null()
                            .default("WAITING"),
                    )
                    .col(ColumnDef::new(PokerTables::WinnerSeat).small_integer().null())
                    .col(ColumnDef::new(PokerTables::RngSeed).big_integer().not_null())
                    .col(ts_col(PokerTables::CreatedAt))
                    .col(ts_col(PokerTables::UpdatedAt))
                    .col(
                        ColumnDef::new(PokerTables::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .to_owned(),
            )
            .await?;

        // hands
        manager
            .create_table(
                Table::create()
                    .table(Hands::Table)
                    .if_not_exists()
                    .col(id_col(Hands::Id))
                    .col(ColumnDef::new(Hands::TableId).big_integer().not_null())
                    .col(ColumnDef::new(Hands::HandNo).integer().not_null())
                    .col(ColumnDef::new(Hands::Phase).string_len(16).not_null())
                    .col(ColumnDef::new(Hands::DealerSeat).small_integer().not_null())
                    .col(ColumnDef::new(Hands::SmallBlindSeat).small_integer().not_null())
                    .col(ColumnDef::new(Hands::BigBlindSeat).small_integer().not_null())
                    .col(ColumnDef::new(Hands::CurrentActorSeat).small_integer().null())
                    .col(ColumnDef::new(Hands::CurrentBet).big_integer().not_null())
                    .col(
                        ColumnDef::new(Hands::MinRaiseIncrement)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Hands::Pot).big_integer().not_null())
                    .col(ColumnDef::new(Hands::CommunityCards).json().not_null())
                    .col(ColumnDef::new(Hands::Deck).json().not_null())
                    .col(ts_null_col(Hands::ActionDeadline))
                    .col(ts_null_col(Hands::ShowdownStartedAt))
                    .col(ts_null_col(Hands::LastRunoutAt))
                    .col(ts_null_col(Hands::CompletedAt))
                    .col(ts_col(Hands::CreatedAt))
                    .col(ts_col(Hands::UpdatedAt))
                    .col(
                        ColumnDef::new(Hands::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hands_table_id")
                            .from(Hands::Table, Hands::TableId)
                            .to(PokerTables::Table, PokerTables::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One hand number per table: the second of two racing hand starts fails here.
        manager
            .create_index(
                Index::create()
                    .name("ux_hands_table_hand_no")
                    .table(Hands::Table)
                    .col(Hands::TableId)
                    .col(Hands::HandNo)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_hands_table_phase")
                    .table(Hands::Table)
                    .col(Hands::TableId)
                    .col(Hands::Phase)
                    .to_owned(),
            )
            .await?;

        // table_seats
        manager
            .create_table(
                Table::create()
                    .table(TableSeats::Table)
                    .if_not_exists()
                    .col(id_col(TableSeats::Id))
                    .col(ColumnDef::new(TableSeats::TableId).big_integer().not_null())
                    .col(ColumnDef::new(TableSeats::SeatIndex).small_integer().not_null())
                    .col(ColumnDef::new(TableSeats::PlayerId).big_integer().not_null())
                    .col(ColumnDef::new(TableSeats::Stack).big_integer().not_null())
                    .col(ColumnDef::new(TableSeats::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(TableSeats::CurrentBet)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TableSeats::TotalContributed)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(TableSeats::HoleCards).json().null())
                    .col(ts_col(TableSeats::CreatedAt))
                    .col(ts_col(TableSeats::UpdatedAt))
                    .col(
                        ColumnDef::new(TableSeats::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_table_seats_table_id")
                            .from(TableSeats::Table, TableSeats::TableId)
                            .to(PokerTables::Table, PokerTables::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_table_seats_table_seat")
                    .table(TableSeats::Table)
                    .col(TableSeats::TableId)
                    .col(TableSeats::SeatIndex)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_table_seats_table_player")
                    .table(TableSeats::Table)
                    .col(TableSeats::TableId)
                    .col(TableSeats::PlayerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // hand_actions
        manager
            .create_table(
                Table::create()
                    .table(HandActions::Table)
                    .if_not_exists()
                    .col(id_col(HandActions::Id))
                    .col(ColumnDef::new(HandActions::HandId).big_integer().not_null())
                    .col(ColumnDef::new(HandActions::Seq).integer().not_null())
                    .col(ColumnDef::new(HandActions::SeatIndex).small_integer().not_null())
                    .col(ColumnDef::new(HandActions::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(HandActions::Amount).big_integer().not_null())
                    .col(ColumnDef::new(HandActions::ChipsAdded).big_integer().not_null())
                    .col(ColumnDef::new(HandActions::Phase).string_len(16).not_null())
                    .col(ts_col(HandActions::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hand_actions_hand_id")
                            .from(HandActions::Table, HandActions::HandId)
                            .to(Hands::Table, Hands::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_hand_actions_hand_seq")
                    .table(HandActions::Table)
                    .col(HandActions::HandId)
                    .col(HandActions::Seq)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // hand_pots
        manager
            .create_table(
                Table::create()
                    .table(HandPots::Table)
                    .if_not_exists()
                    .col(id_col(HandPots::Id))
                    .col(ColumnDef::new(HandPots::HandId).big_integer().not_null())
                    .col(ColumnDef::new(HandPots::LayerIndex).small_integer().not_null())
                    .col(ColumnDef::new(HandPots::Amount).big_integer().not_null())
                    .col(ColumnDef::new(HandPots::EligibleSeats).json().not_null())
                    .col(ts_col(HandPots::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hand_pots_hand_id")
                            .from(HandPots::Table, HandPots::HandId)
                            .to(Hands::Table, Hands::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_hand_pots_hand_layer")
                    .table(HandPots::Table)
                    .col(HandPots::HandId)
                    .col(HandPots::LayerIndex)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // showdown_results
        manager
            .create_table(
                Table::create()
                    .table(ShowdownResults::Table)
                    .if_not_exists()
                    .col(id_col(ShowdownResults::Id))
                    .col(ColumnDef::new(ShowdownResults::HandId).big_integer().not_null())
                    .col(
                        ColumnDef::new(ShowdownResults::SeatIndex)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShowdownResults::RankCategory)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ShowdownResults::Description).string().not_null())
                    .col(ColumnDef::new(ShowdownResults::BestFive).json().not_null())
                    .col(
                        ColumnDef::new(ShowdownResults::AmountWon)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ts_col(ShowdownResults::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_showdown_results_hand_id")
                            .from(ShowdownResults::Table, ShowdownResults::HandId)
                            .to(Hands::Table, Hands::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_showdown_results_hand_seat")
                    .table(ShowdownResults::Table)
                    .col(ShowdownResults::HandId)
                    .col(ShowdownResults::SeatIndex)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // events
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(id_col(Events::Id))
                    .col(ColumnDef::new(Events::EntityType).string_len(32).not_null())
                    .col(ColumnDef::new(Events::EntityId).big_integer().not_null())
                    .col(ColumnDef::new(Events::EventType).string_len(64).not_null())
                    .col(ColumnDef::new(Events::Payload).json().not_null())
                    .col(ColumnDef::new(Events::EntityVersion).integer().not_null())
                    .col(ts_col(Events::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // A version is emitted at most once per entity, which keeps the log gapless and unique.
        manager
            .create_index(
                Index::create()
                    .name("ux_events_entity_version")
                    .table(Events::Table)
                    .col(Events::EntityType)
                    .col(Events::EntityId)
                    .col(Events::EntityVersion)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Events::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(ShowdownResults::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(HandPots::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HandActions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TableSeats::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Hands::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PokerTables::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
