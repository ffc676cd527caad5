use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Engine, MoneyCents, NEXT_BID_BUDGET, RosterRequest, Rule};
use migration::{Migrator, MigratorTrait};
use uuid::Uuid;

mod settings;

#[derive(Parser, Debug)]
#[command(name = "auction")]
#[command(about = "Auction rosters, budget rules and next-bid ceilings")]
struct Cli {
    /// Settings file, without extension.
    #[arg(long, default_value = "settings")]
    settings: String,

    /// Database connection string (also read from `DATABASE_URL`).
    /// Overrides the settings file.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Rules(Rules),
    Roster(Roster),
    /// Rebuild aggregates and ceilings of a team-season.
    Recompute(TeamSeasonArgs),
    /// Print the cached per-tier aggregates of a team-season.
    Aggregates(TeamSeasonArgs),
}

#[derive(Args, Debug)]
struct TeamSeasonArgs {
    #[arg(long)]
    team_season: Uuid,
}

#[derive(Args, Debug)]
struct Rules {
    #[command(subcommand)]
    command: RulesCommand,
}

#[derive(Subcommand, Debug)]
enum RulesCommand {
    List,
    Add(RuleAddArgs),
    /// Evaluate a season's rules against a team-season.
    Evaluate(RuleEvaluateArgs),
}

#[derive(Args, Debug)]
struct RuleAddArgs {
    #[arg(long)]
    season: Uuid,
    #[arg(long)]
    statement: String,
    #[arg(long, default_value = NEXT_BID_BUDGET)]
    context: String,
    /// `pattern=replacement`, e.g. `l=playerLevels.l`. Repeatable.
    #[arg(long, value_parser = parse_notation)]
    notation: Vec<(String, String)>,
    /// Map root rewritten to indexed access. Repeatable.
    #[arg(long)]
    map_name: Vec<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long, default_value_t = 0)]
    priority: i32,
}

#[derive(Args, Debug)]
struct RuleEvaluateArgs {
    #[arg(long)]
    season: Uuid,
    #[arg(long)]
    team_season: Uuid,
    #[arg(long, default_value = NEXT_BID_BUDGET)]
    context: String,
}

#[derive(Args, Debug)]
struct Roster {
    #[command(subcommand)]
    command: RosterCommand,
}

#[derive(Subcommand, Debug)]
enum RosterCommand {
    /// Assign a player, or edit/move the entry given with `--entry`.
    Assign(RosterAssignArgs),
    Remove {
        #[arg(long)]
        entry: String,
    },
}

#[derive(Args, Debug)]
struct RosterAssignArgs {
    #[arg(long)]
    team_season: String,
    #[arg(long)]
    player: String,
    /// Sold amount, e.g. `12.50`.
    #[arg(long)]
    amount: Option<MoneyCents>,
    #[arg(long)]
    entry: Option<String>,
    #[arg(long)]
    free: bool,
    #[arg(long)]
    rtm: bool,
}

fn parse_notation(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((pattern, replacement)) if !pattern.trim().is_empty() => {
            Ok((pattern.trim().to_string(), replacement.trim().to_string()))
        }
        _ => Err(format!("expected `pattern=replacement`, got `{raw}`")),
    }
}

async fn connect_db(
    database_url: &str,
) -> Result<sea_orm::DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let database = sea_orm::Database::connect(database_url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(&cli.settings)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "auction={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let database_url = match (&cli.database_url, &settings.database) {
        (Some(url), _) => url.clone(),
        (None, Some(database)) => database.url(),
        (None, None) => settings::Database::Sqlite("auction.db".to_string()).url(),
    };
    tracing::debug!("connecting to {database_url}");
    let db = connect_db(&database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Rules(Rules { command }) => match command {
            RulesCommand::List => {
                for rule in engine.all_rules().await? {
                    println!(
                        "{} [{}] p{} {}{}: {}",
                        rule.id,
                        rule.context,
                        rule.priority,
                        if rule.is_active { "" } else { "(inactive) " },
                        rule.rule_name.as_deref().unwrap_or("-"),
                        rule.rule_statement
                    );
                }
            }
            RulesCommand::Add(args) => {
                let mut rule = Rule::new(args.season, &args.context, &args.statement)
                    .with_priority(args.priority);
                for (pattern, replacement) in &args.notation {
                    rule = rule.with_notation(pattern, replacement);
                }
                for map_name in &args.map_name {
                    rule = rule.with_map_name(map_name);
                }
                if let Some(category) = &args.category {
                    rule = rule.with_category(category);
                }
                if let Some(name) = &args.name {
                    rule = rule.with_name(name);
                }
                let id = engine.save_rule(rule).await?;
                println!("created rule: {id}");
            }
            RulesCommand::Evaluate(args) => {
                let context = engine.evaluation_context(args.team_season).await?;
                let rules = engine
                    .rules_by_season_and_context(args.season, &args.context)
                    .await?;
                for rule in rules {
                    match engine::evaluate_rule(&context, &rule) {
                        Ok(remaining) => {
                            println!("{} {remaining:.2}  {}", rule.id, rule.rule_statement)
                        }
                        Err(err) => println!("{} error: {err}  {}", rule.id, rule.rule_statement),
                    }
                }
            }
        },
        Command::Roster(Roster { command }) => match command {
            RosterCommand::Assign(args) => {
                let mut request = RosterRequest {
                    team_season_code: args.team_season,
                    player_code: args.player,
                    sold_amount: args.amount,
                    is_free: args.free,
                    is_rtm_used: args.rtm,
                    ..Default::default()
                };
                if let Some(entry) = &args.entry {
                    request = request.editing(entry);
                }
                let entry = engine.save_roster_entry(request).await?;
                println!("saved roster entry: {}", entry.code);
            }
            RosterCommand::Remove { entry } => {
                engine.remove_roster_entry(&entry).await?;
                println!("removed roster entry: {entry}");
            }
        },
        Command::Recompute(args) => {
            print_aggregates(&engine.recompute_team_season(args.team_season).await?);
        }
        Command::Aggregates(args) => {
            print_aggregates(&engine.level_aggregates(args.team_season).await?);
        }
    }

    Ok(())
}

fn print_aggregates(aggregates: &[engine::LevelAggregate]) {
    for aggregate in aggregates {
        let ceiling = aggregate
            .next_player_budget
            .map(|budget| budget.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} spent {:>10} players {:>3} next bid {:>10}",
            aggregate.level_code,
            aggregate.total_amount_spent,
            aggregate.total_player_count,
            ceiling
        );
    }
}
