//! Progress commands: resolve, expire, show, reset, export, import

use std::path::Path;

use anyhow::{bail, Context, Result};

use illusion_progress::progress::{Badge, SnapshotRecord};
use illusion_progress::sink::PresentationSink;

use super::{default_reward, open_session, SessionOptions};

/// Prints notifications to stdout
pub struct ConsoleSink;

impl PresentationSink for ConsoleSink {
    fn show_xp_gain(&mut self, amount: u64, combo: u32) {
        if combo > 1 {
            println!("  +{} XP (combo x{})", amount, combo);
        } else {
            println!("  +{} XP", amount);
        }
    }

    fn show_level_up(&mut self, level: u32) {
        println!("  Level up! You reached level {}", level);
    }

    fn show_badge(&mut self, badge: &Badge) {
        println!("  {} {} - {}", badge.icon, badge.name, badge.description);
    }
}

/// Resolve one or more items, in order, at the same instant
pub fn resolve_command(opts: &SessionOptions, items: &[String], reward: Option<i64>) -> Result<()> {
    let reward = match reward {
        Some(reward) => reward,
        None => default_reward(opts)?,
    };
    let mut session = open_session(opts)?;

    for item in items {
        println!("{}:", item);
        let resolution = session.resolve(item, reward)?;
        if !resolution.qualified {
            println!("  already destroyed");
        }
    }

    session.flush()?;
    Ok(())
}

/// Apply combo expiry at the current time
pub fn expire_command(opts: &SessionOptions) -> Result<()> {
    let mut session = open_session(opts)?;
    let before = session.snapshot().combo();
    session.tick()?;
    session.flush()?;

    let after = session.snapshot().combo();
    if after < before {
        println!("Combo of {} expired.", before);
    } else {
        println!("Combo still active ({}).", after);
    }
    Ok(())
}

pub fn show_command(opts: &SessionOptions, json: bool) -> Result<()> {
    let session = open_session(opts)?;
    let summary = session.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Progress for {}:\n", session.user());
    println!(
        "  Level {} - {} XP ({}/{} to next, {:.0}%)",
        summary.level.level,
        summary.level.total_xp,
        summary.level.xp_into_level(),
        summary.level.next_level_xp - summary.level.current_level_xp,
        summary.level.progress_to_next() * 100.0
    );
    println!("  Combo: {} (best {})", summary.combo, summary.best_combo);
    println!("  Streak: {}", summary.streak);
    println!(
        "  Destroyed: {}/{}",
        summary.items_destroyed, summary.total_items
    );

    let badges = session.snapshot().earned_badges();
    if badges.is_empty() {
        println!("  Badges: none yet");
    } else {
        println!("  Badges:");
        for id in badges {
            let badge = id.badge();
            println!("    {} {}", badge.icon, badge.name);
        }
    }
    Ok(())
}

pub fn reset_command(opts: &SessionOptions, yes: bool) -> Result<()> {
    if !yes {
        bail!("Refusing to reset progress without --yes");
    }
    let mut session = open_session(opts)?;
    session.reset();
    session.flush()?;
    println!("Progress reset for {}.", session.user());
    Ok(())
}

pub fn export_command(opts: &SessionOptions, output: Option<&Path>) -> Result<()> {
    let session = open_session(opts)?;
    let json = session.export().to_json()?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write export: {}", path.display()))?;
            println!("Exported: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

pub fn import_command(opts: &SessionOptions, input: &Path) -> Result<()> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read import: {}", input.display()))?;
    let record = SnapshotRecord::from_json(&json)?;

    let mut session = open_session(opts)?;
    session.import(&record)?;
    session.flush()?;
    println!("Imported progress for {}.", session.user());
    Ok(())
}
