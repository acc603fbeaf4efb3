//! Lifequest - Entry Point
//!
//! A small terminal driver for the discovery and scoring engine: answer
//! questions, manage skills and feed journal entries from stdin.

use clap::Parser;
use lifequest::core::config::{load_config, EngineConfig};
use lifequest::core::error::Result;
use lifequest::core::types::{SkillCategory, SkillId};
use lifequest::discovery::SuppliedQuestion;
use lifequest::host::{JsonFileStore, RewardLedger};
use lifequest::llm::LlmCollaborator;
use lifequest::skills::{DiscoveryAction, EvolutionTable};
use lifequest::Engine;

use chrono::{Local, NaiveDate};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

type AppEngine = Engine<JsonFileStore, RewardLedger>;

#[derive(Parser, Debug)]
#[command(name = "lifequest")]
#[command(about = "Discover your life domains and level up your skills")]
struct Args {
    /// Settings file (created on first save)
    #[arg(long, default_value = "lifequest.json")]
    settings: PathBuf,

    /// Engine config (TOML); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for question targeting
    #[arg(long)]
    seed: Option<u64>,

    /// Skill evolution table (TOML); built-in table when omitted
    #[arg(long)]
    evolutions: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lifequest=info")),
        )
        .init();

    let args = Args::parse();

    // Create the async runtime for AI calls
    let rt = Runtime::new()?;

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    let evolutions = match &args.evolutions {
        Some(path) => EvolutionTable::load_from_toml(path, config.skills.evolution_min_level)?,
        None => EvolutionTable::builtin(config.skills.evolution_min_level),
    };

    // Works without a key; generation falls back to template questions
    let collaborator = LlmCollaborator::from_env(&config.llm);
    let ai_available = collaborator.is_available();

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut engine = Engine::new(
        config,
        JsonFileStore::new(&args.settings),
        RewardLedger::new(),
        Arc::new(collaborator),
        seed,
    )?
    .with_evolutions(evolutions);

    println!("\n=== LIFEQUEST ===");
    println!("Answer 1 (strongly disagree) to 5 (strongly agree).");
    println!();
    println!("Commands:");
    println!("  next / n                  - Show the next question");
    println!("  1-5                       - Answer the current question");
    println!("  skip                      - Skip the current question");
    println!("  status / s                - Show discovered domains");
    println!("  skills                    - List skills");
    println!("  add <category> <name>     - Add a skill (vocation, mind, body, spirit)");
    println!("  practice <xp> <name>      - Grant practice XP");
    println!("  points <n>                - Grant skill points");
    println!("  spend <name>              - Spend a skill point");
    println!("  evolve <name>             - Evolve a skill if eligible");
    println!("  merge <source> into <target>");
    println!("  delete <name>             - Remove a skill");
    println!("  quit / q                  - Exit");
    if ai_available {
        println!("  journal <text>            - Find skills in a journal entry");
    }
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let today = Local::now().date_naive();
        let (command, rest) = input.split_once(' ').unwrap_or((input, ""));
        let rest = rest.trim();

        let result = match command {
            "quit" | "q" => break,
            "next" | "n" => show_next(&rt, &mut engine, today),
            "1" | "2" | "3" | "4" | "5" => answer(&mut engine, command, today),
            "skip" => skip(&mut engine, today),
            "status" | "s" => {
                display_status(&mut engine, today);
                Ok(())
            }
            "skills" => {
                display_skills(&engine);
                Ok(())
            }
            "add" => add_skill(&mut engine, rest),
            "practice" => practice(&mut engine, rest),
            "points" => match rest.parse::<u32>() {
                Ok(n) => engine
                    .grant_skill_points(n)
                    .map(|total| println!("{} skill point(s) available.", total)),
                Err(_) => {
                    println!("Usage: points <number>");
                    Ok(())
                }
            },
            "spend" => with_skill(&engine, rest).map_or(Ok(()), |id| {
                engine
                    .spend_skill_point(&id)
                    .map(|s| println!("{} is now level {}.", s.name, s.level))
            }),
            "evolve" => with_skill(&engine, rest).map_or(Ok(()), |id| {
                engine.evolve_skill(&id).map(|evolved| match evolved {
                    Some(from) => println!("{} evolved!", from),
                    None => println!("Not ready to evolve yet."),
                })
            }),
            "delete" => with_skill(&engine, rest).map_or(Ok(()), |id| {
                engine
                    .delete_skill(&id)
                    .map(|s| println!("Removed {}.", s.name))
            }),
            "merge" => merge(&mut engine, rest),
            "journal" if ai_available => journal(&rt, &mut engine, rest),
            _ => {
                println!("Unknown command.");
                Ok(())
            }
        };

        if let Err(e) = result {
            if !e.is_recoverable() {
                return Err(e);
            }
            println!("{}", e);
        }
    }

    println!(
        "\nGoodbye! Earned {} XP and {} gold this session.",
        engine.rewards().total_xp,
        engine.rewards().total_gold
    );
    Ok(())
}

fn show_next(rt: &Runtime, engine: &mut AppEngine, today: NaiveDate) -> Result<()> {
    match rt.block_on(engine.next_question(today))? {
        Some(supplied) => print_question(&supplied),
        None => println!("No questions available."),
    }
    Ok(())
}

fn print_question(supplied: &SuppliedQuestion) {
    let question = &supplied.question;
    if supplied.used_fallback() {
        println!("(Could not reach the AI provider, using a default question.)");
    }
    println!();
    println!("{} {}", question.domain.icon(), question.domain.display_name());
    println!("  {}", question.text);
    if let Some(hint) = &question.hint {
        println!("  ({})", hint);
    }
}

fn answer(engine: &mut AppEngine, value: &str, today: NaiveDate) -> Result<()> {
    let Some(id) = engine.current_question().map(|q| q.id.clone()) else {
        println!("No current question. Type 'next' first.");
        return Ok(());
    };
    let value: u8 = value.parse().unwrap_or(0);
    let outcome = engine.answer(&id, value, today)?;
    let record = &outcome.record;

    if record.domain_discovered {
        println!(
            "New domain discovered: {} {}!",
            record.domain.icon(),
            record.domain.display_name()
        );
    }
    if record.score_visible {
        println!("{} score: {}", record.domain.display_name(), record.domain_score);
    }
    println!("+{} XP, +{} gold", outcome.xp_awarded, outcome.gold_awarded);
    Ok(())
}

fn skip(engine: &mut AppEngine, today: NaiveDate) -> Result<()> {
    match engine.current_question().map(|q| q.id.clone()) {
        Some(id) => {
            engine.skip(&id, today)?;
            println!("Skipped.");
        }
        None => println!("No current question."),
    }
    Ok(())
}

fn add_skill(engine: &mut AppEngine, rest: &str) -> Result<()> {
    let Some((category, name)) = rest.split_once(' ') else {
        println!("Usage: add <category> <name>");
        return Ok(());
    };
    let Ok(category) = category.parse::<SkillCategory>() else {
        println!("Unknown category '{}'.", category);
        return Ok(());
    };
    let skill = engine.add_skill(name, category, None)?;
    println!("{} ({}) is level {}.", skill.name, skill.category, skill.level);
    Ok(())
}

fn practice(engine: &mut AppEngine, rest: &str) -> Result<()> {
    let parsed = rest
        .split_once(' ')
        .and_then(|(xp, name)| xp.parse::<f64>().ok().map(|xp| (xp, name)));
    let Some((xp, name)) = parsed else {
        println!("Usage: practice <xp> <name>");
        return Ok(());
    };
    let Some(id) = with_skill(engine, name) else {
        return Ok(());
    };
    let outcome = engine.practice_skill(&id, xp)?;
    if outcome.levels_gained > 0 {
        println!("{} reached level {}!", outcome.skill.name, outcome.skill.level);
    } else {
        println!(
            "{}: {:.0}/{:.0} XP",
            outcome.skill.name, outcome.skill.xp, outcome.skill.xp_to_next_level
        );
    }
    Ok(())
}

fn merge(engine: &mut AppEngine, rest: &str) -> Result<()> {
    let Some((source, target)) = rest.split_once(" into ") else {
        println!("Usage: merge <source> into <target>");
        return Ok(());
    };
    let (Some(source), Some(target)) = (with_skill(engine, source), with_skill(engine, target)) else {
        return Ok(());
    };
    let outcome = engine.merge_skills(&source, &target)?;
    println!(
        "Merged {} into {} (level {}).",
        outcome.absorbed_name, outcome.merged.name, outcome.merged.level
    );
    Ok(())
}

fn journal(rt: &Runtime, engine: &mut AppEngine, text: &str) -> Result<()> {
    let outcome = rt.block_on(engine.analyze_journal(text))?;
    if outcome.used_fallback() {
        println!("Could not reach the AI provider. No skills were updated.");
        return Ok(());
    }
    if outcome.outcomes.is_empty() {
        println!("No skills found.");
    }
    for update in &outcome.outcomes {
        match &update.action {
            DiscoveryAction::Discovered => println!("New skill: {}", update.skill_name),
            DiscoveryAction::XpAdded { .. } => {
                println!("{} +{} XP", update.skill_name, update.xp_awarded)
            }
            DiscoveryAction::Evolved { from, .. } => {
                println!("{} evolved into {}!", from, update.skill_name)
            }
        }
    }
    Ok(())
}

/// Look a skill up by name, printing a message when it is missing
fn with_skill(engine: &AppEngine, name: &str) -> Option<SkillId> {
    let found = engine.skills().find_by_name(name.trim()).map(|s| s.id.clone());
    if found.is_none() {
        println!("No skill named '{}'.", name.trim());
    }
    found
}

fn display_status(engine: &mut AppEngine, today: NaiveDate) {
    let progress = engine.progress(today);
    println!();
    println!(
        "--- {}/{} core questions | {} today | {} AI questions ---",
        progress.answered_core, progress.total_core, progress.questions_today, progress.ai_questions_answered
    );
    for domain in progress.domains.iter().filter(|d| d.discovered) {
        let score = domain
            .score
            .map(|s| format!("{}/100", s))
            .unwrap_or_else(|| "?".to_string());
        println!("  {} {:<24} {}", domain.icon, domain.name, score);
    }
    let hidden = progress.domains.iter().filter(|d| !d.discovered).count();
    if hidden > 0 {
        println!("  ... {} domain(s) still hidden", hidden);
    }
    println!();
}

fn display_skills(engine: &AppEngine) {
    let ledger = engine.skills();
    println!();
    println!(
        "--- {} skill(s) | {} point(s) available ---",
        ledger.len(),
        ledger.available_skill_points
    );
    for skill in ledger.ranked() {
        println!(
            "  {:<24} {:<9} Lv {:>2}  {:>4.0}/{:.0} XP",
            skill.name, skill.category, skill.level, skill.xp, skill.xp_to_next_level
        );
    }
    println!();
}
