use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, RosterRequest, roster, seasons, team_seasons};

use super::{Engine, normalize_required_code, with_tx};

impl Engine {
    /// Assign a player to a team-season, edit an existing assignment or move
    /// the player to another team-season.
    ///
    /// The affected team-seasons are recomputed in the same transaction.
    pub async fn save_roster_entry(&self, request: RosterRequest) -> ResultEngine<roster::Model> {
        let team_season_code =
            normalize_required_code(&request.team_season_code, "team season code")?;
        let player_code = normalize_required_code(&request.player_code, "player code")?;
        let sold_amount = request.sold_amount.map(|amount| amount.cents());

        with_tx!(self, |db_tx| {
            let team_season = self
                .require_team_season_by_code(&db_tx, &team_season_code)
                .await?;
            let season = self.require_season(&db_tx, team_season.season_id).await?;
            let player = self.require_player_by_code(&db_tx, &player_code).await?;
            let code = roster::entry_code(&player.code, &team_season.code);

            let previous = match request.code.as_deref().map(str::trim) {
                Some(existing) if !existing.is_empty() => {
                    Some(self.require_roster_entry_by_code(&db_tx, existing).await?)
                }
                _ => None,
            };
            let replaced = previous
                .as_ref()
                .filter(|entry| entry.team_season_id == team_season.id);
            check_limits(&season, &team_season, &request, replaced)?;

            let mut affected = vec![team_season.id];
            let entry = match previous {
                Some(entry) if entry.code == code => {
                    let model = roster::ActiveModel {
                        id: ActiveValue::Set(entry.id),
                        sold_amount: ActiveValue::Set(sold_amount),
                        is_free: ActiveValue::Set(request.is_free),
                        is_rtm_used: ActiveValue::Set(request.is_rtm_used),
                        ..Default::default()
                    };
                    model.update(&db_tx).await?
                }
                previous => {
                    if let Some(entry) = previous {
                        if entry.team_season_id != team_season.id {
                            affected.push(entry.team_season_id);
                        }
                        roster::Entity::delete_by_id(entry.id).exec(&db_tx).await?;
                    }
                    if self.find_roster_entry_by_code(&db_tx, &code).await?.is_some() {
                        return Err(EngineError::ExistingKey(code));
                    }
                    let model = roster::ActiveModel {
                        id: ActiveValue::Set(Uuid::new_v4()),
                        code: ActiveValue::Set(code.clone()),
                        player_id: ActiveValue::Set(player.id),
                        team_season_id: ActiveValue::Set(team_season.id),
                        sold_amount: ActiveValue::Set(sold_amount),
                        is_free: ActiveValue::Set(request.is_free),
                        is_rtm_used: ActiveValue::Set(request.is_rtm_used),
                    };
                    model.insert(&db_tx).await?
                }
            };

            for team_season_id in affected {
                self.recompute_in_tx(&db_tx, team_season_id).await?;
            }
            tracing::debug!(
                entry = %entry.code,
                team_season = %team_season.code,
                "roster entry saved"
            );
            Ok(entry)
        })
    }

    /// Delete a roster entry and recompute its team-season.
    pub async fn remove_roster_entry(&self, code: &str) -> ResultEngine<()> {
        let code = normalize_required_code(code, "roster entry code")?;
        with_tx!(self, |db_tx| {
            let entry = self.require_roster_entry_by_code(&db_tx, &code).await?;
            roster::Entity::delete_by_id(entry.id).exec(&db_tx).await?;
            self.recompute_in_tx(&db_tx, entry.team_season_id).await?;
            tracing::debug!(entry = %entry.code, "roster entry removed");
            Ok(())
        })
    }
}

/// Season caps a save must respect.
///
/// `replaced` is the entry of the same team-season that the save edits or
/// swaps out. It is already counted in the team-season totals, so it frees
/// its roster slot and its RTM and free flags.
fn check_limits(
    season: &seasons::Model,
    team_season: &team_seasons::Model,
    request: &RosterRequest,
    replaced: Option<&roster::Model>,
) -> ResultEngine<()> {
    let already_rtm = replaced.is_some_and(|entry| entry.is_rtm_used);
    if request.is_rtm_used && !already_rtm {
        at_most("RTM", team_season.total_rtm_used, season.max_rtm_allowed)?;
    }
    let already_free = replaced.is_some_and(|entry| entry.is_free);
    if request.is_free && !already_free {
        at_most("free", team_season.total_free_used, season.max_free_allowed)?;
    }
    if replaced.is_none() {
        at_most("players", team_season.total_player, season.max_players_allowed)?;
    }
    Ok(())
}

fn at_most(limit: &str, current: i32, max: i32) -> ResultEngine<()> {
    if current >= max {
        return Err(EngineError::LimitExceeded {
            limit: limit.to_string(),
            current,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn season() -> seasons::Model {
        seasons::Model {
            id: Uuid::nil(),
            code: "ipl-2025".to_string(),
            year: 2025,
            min_player_amount: 2_000,
            budget_limit: 100_000,
            max_players_allowed: 3,
            max_rtm_allowed: 1,
            max_free_allowed: 1,
            is_auction_completed: false,
        }
    }

    fn team_season(players: i32, rtm: i32, free: i32) -> team_seasons::Model {
        team_seasons::Model {
            id: Uuid::nil(),
            code: "csk-2025".to_string(),
            team_id: Uuid::nil(),
            season_id: Uuid::nil(),
            total_amount_spent: 0,
            total_rtm_used: rtm,
            total_free_used: free,
            total_player: players,
            is_rtm_eligible: true,
        }
    }

    fn entry(is_free: bool, is_rtm_used: bool) -> roster::Model {
        roster::Model {
            id: Uuid::nil(),
            code: "p1csk-2025".to_string(),
            player_id: Uuid::nil(),
            team_season_id: Uuid::nil(),
            sold_amount: Some(500),
            is_free,
            is_rtm_used,
        }
    }

    #[test]
    fn rtm_cap_is_enforced() {
        let request = RosterRequest::default().rtm();
        let err = check_limits(&season(), &team_season(1, 1, 0), &request, None).unwrap_err();
        assert_eq!(
            err,
            EngineError::LimitExceeded {
                limit: "RTM".to_string(),
                current: 1,
                max: 1,
            }
        );
    }

    #[test]
    fn editing_an_rtm_entry_does_not_count_it_twice() {
        let request = RosterRequest::default().rtm();
        let kept = entry(false, true);
        check_limits(&season(), &team_season(3, 1, 0), &request, Some(&kept)).unwrap();
    }

    #[test]
    fn free_cap_is_enforced() {
        let request = RosterRequest::default().free();
        let err = check_limits(&season(), &team_season(0, 0, 1), &request, None).unwrap_err();
        assert!(matches!(err, EngineError::LimitExceeded { ref limit, .. } if limit == "free"));
    }

    #[test]
    fn full_roster_rejects_new_players_only() {
        let request = RosterRequest::default();
        let err = check_limits(&season(), &team_season(3, 0, 0), &request, None).unwrap_err();
        assert!(matches!(err, EngineError::LimitExceeded { ref limit, .. } if limit == "players"));

        let kept = entry(false, false);
        check_limits(&season(), &team_season(3, 0, 0), &request, Some(&kept)).unwrap();
    }

    #[test]
    fn swapping_within_a_full_team_season_frees_the_old_flags() {
        let request = RosterRequest::default().free();
        let replaced = entry(true, false);
        check_limits(&season(), &team_season(3, 0, 1), &request, Some(&replaced)).unwrap();
    }
}
