//! Auction schema - creates every table from scratch.
//!
//! - `seasons`: auction years and their caps
//! - `teams`: franchises
//! - `team_seasons`: a team inside a season, with running totals
//! - `player_levels`: player tiers (`l1`, `l2`, ...)
//! - `players`: the auction pool
//! - `roster_entries`: players bought by a team-season
//! - `level_aggregates`: per-tier totals and next-bid ceilings
//! - `rules`: budget rules evaluated on every roster change

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Seasons {
    Table,
    Id,
    Code,
    Year,
    MinPlayerAmount,
    BudgetLimit,
    MaxPlayersAllowed,
    MaxRtmAllowed,
    MaxFreeAllowed,
    IsAuctionCompleted,
}

#[derive(Iden)]
enum Teams {
    Table,
    Id,
    Code,
    Name,
}

#[derive(Iden)]
enum TeamSeasons {
    Table,
    Id,
    Code,
    TeamId,
    SeasonId,
    TotalAmountSpent,
    TotalRtmUsed,
    TotalFreeUsed,
    TotalPlayer,
    IsRtmEligible,
}

#[derive(Iden)]
enum PlayerLevels {
    Table,
    Id,
    Code,
    Name,
}

#[derive(Iden)]
enum Players {
    Table,
    Id,
    Code,
    Name,
    PlayerLevelId,
    IsActive,
}

#[derive(Iden)]
enum RosterEntries {
    Table,
    Id,
    Code,
    PlayerId,
    TeamSeasonId,
    SoldAmount,
    IsFree,
    IsRtmUsed,
}

#[derive(Iden)]
enum LevelAggregates {
    Table,
    Id,
    TeamSeasonId,
    PlayerLevelId,
    TotalAmountSpent,
    TotalPlayerCount,
    NextPlayerBudget,
    UpdatedAt,
}

#[derive(Iden)]
enum Rules {
    Table,
    Id,
    SeasonId,
    Context,
    RuleCategory,
    RuleName,
    RuleStatement,
    NotationMap,
    MapNames,
    IsActive,
    Priority,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Seasons
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Seasons::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Seasons::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Seasons::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Seasons::Year).integer().not_null())
                    .col(
                        ColumnDef::new(Seasons::MinPlayerAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Seasons::BudgetLimit).big_integer().not_null())
                    .col(
                        ColumnDef::new(Seasons::MaxPlayersAllowed)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Seasons::MaxRtmAllowed).integer().not_null())
                    .col(ColumnDef::new(Seasons::MaxFreeAllowed).integer().not_null())
                    .col(
                        ColumnDef::new(Seasons::IsAuctionCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Teams
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Teams::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Teams::Code).string().not_null().unique_key())
                    .col(ColumnDef::new(Teams::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Team seasons
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(TeamSeasons::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TeamSeasons::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TeamSeasons::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(TeamSeasons::TeamId).uuid().not_null())
                    .col(ColumnDef::new(TeamSeasons::SeasonId).uuid().not_null())
                    .col(
                        ColumnDef::new(TeamSeasons::TotalAmountSpent)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TeamSeasons::TotalRtmUsed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TeamSeasons::TotalFreeUsed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TeamSeasons::TotalPlayer)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TeamSeasons::IsRtmEligible)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-team_seasons-team_id")
                            .from(TeamSeasons::Table, TeamSeasons::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-team_seasons-season_id")
                            .from(TeamSeasons::Table, TeamSeasons::SeasonId)
                            .to(Seasons::Table, Seasons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-team_seasons-team_id-season_id-unique")
                    .table(TeamSeasons::Table)
                    .col(TeamSeasons::TeamId)
                    .col(TeamSeasons::SeasonId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Player levels
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PlayerLevels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlayerLevels::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PlayerLevels::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(PlayerLevels::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Players
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Players::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Players::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Players::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Players::Name).string().not_null())
                    .col(ColumnDef::new(Players::PlayerLevelId).uuid().not_null())
                    .col(
                        ColumnDef::new(Players::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-players-player_level_id")
                            .from(Players::Table, Players::PlayerLevelId)
                            .to(PlayerLevels::Table, PlayerLevels::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Roster entries
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(RosterEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RosterEntries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RosterEntries::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(RosterEntries::PlayerId).uuid().not_null())
                    .col(
                        ColumnDef::new(RosterEntries::TeamSeasonId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RosterEntries::SoldAmount).big_integer())
                    .col(
                        ColumnDef::new(RosterEntries::IsFree)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RosterEntries::IsRtmUsed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-roster_entries-player_id")
                            .from(RosterEntries::Table, RosterEntries::PlayerId)
                            .to(Players::Table, Players::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-roster_entries-team_season_id")
                            .from(RosterEntries::Table, RosterEntries::TeamSeasonId)
                            .to(TeamSeasons::Table, TeamSeasons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-roster_entries-team_season_id")
                    .table(RosterEntries::Table)
                    .col(RosterEntries::TeamSeasonId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Level aggregates
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LevelAggregates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LevelAggregates::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LevelAggregates::TeamSeasonId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LevelAggregates::PlayerLevelId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LevelAggregates::TotalAmountSpent)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LevelAggregates::TotalPlayerCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(LevelAggregates::NextPlayerBudget).big_integer())
                    .col(
                        ColumnDef::new(LevelAggregates::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-level_aggregates-team_season_id")
                            .from(LevelAggregates::Table, LevelAggregates::TeamSeasonId)
                            .to(TeamSeasons::Table, TeamSeasons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-level_aggregates-player_level_id")
                            .from(LevelAggregates::Table, LevelAggregates::PlayerLevelId)
                            .to(PlayerLevels::Table, PlayerLevels::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-level_aggregates-team_season_id-player_level_id-unique")
                    .table(LevelAggregates::Table)
                    .col(LevelAggregates::TeamSeasonId)
                    .col(LevelAggregates::PlayerLevelId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Rules
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Rules::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rules::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Rules::SeasonId).uuid().not_null())
                    .col(ColumnDef::new(Rules::Context).string().not_null())
                    .col(ColumnDef::new(Rules::RuleCategory).string())
                    .col(ColumnDef::new(Rules::RuleName).string())
                    .col(ColumnDef::new(Rules::RuleStatement).text().not_null())
                    .col(ColumnDef::new(Rules::NotationMap).text())
                    .col(ColumnDef::new(Rules::MapNames).text())
                    .col(
                        ColumnDef::new(Rules::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Rules::Priority)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Rules::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-rules-season_id")
                            .from(Rules::Table, Rules::SeasonId)
                            .to(Seasons::Table, Seasons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-rules-season_id-context")
                    .table(Rules::Table)
                    .col(Rules::SeasonId)
                    .col(Rules::Context)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Rules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LevelAggregates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RosterEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Players::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlayerLevels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TeamSeasons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Seasons::Table).to_owned())
            .await?;
        Ok(())
    }
}
