//! Presentation sinks for gamification notifications
//!
//! The engine returns events as data; a sink decides how to surface them.

use crate::progress::{Badge, GamificationEvent};

/// A single notification shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    XpGain { amount: u64, combo: u32 },
    LevelUp { level: u32 },
    Badge(Badge),
}

/// Output-only receiver of notifications
pub trait PresentationSink {
    fn show_xp_gain(&mut self, amount: u64, combo: u32);
    fn show_level_up(&mut self, level: u32);
    fn show_badge(&mut self, badge: &Badge);
}

/// Forward engine events to a sink, in event order
pub fn dispatch(events: &[GamificationEvent], sink: &mut dyn PresentationSink) {
    let combo = events
        .iter()
        .find_map(|event| match event {
            GamificationEvent::ComboExtended { count } => Some(*count),
            _ => None,
        })
        .unwrap_or(0);

    for event in events {
        match event {
            GamificationEvent::XpAwarded { amount, .. } => sink.show_xp_gain(*amount, combo),
            GamificationEvent::ComboExtended { .. } => {}
            GamificationEvent::LevelUp(up) => sink.show_level_up(up.new_level),
            GamificationEvent::BadgeEarned(id) => sink.show_badge(&id.badge()),
        }
    }
}

/// Logs notifications through `tracing`
#[derive(Debug, Default)]
pub struct TracingSink;

impl PresentationSink for TracingSink {
    fn show_xp_gain(&mut self, amount: u64, combo: u32) {
        tracing::info!("+{} XP (combo x{})", amount, combo);
    }

    fn show_level_up(&mut self, level: u32) {
        tracing::info!("Reached level {}", level);
    }

    fn show_badge(&mut self, badge: &Badge) {
        tracing::info!("{} Badge unlocked: {} - {}", badge.icon, badge.name, badge.description);
    }
}

/// Collects notifications in order
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub notifications: Vec<Notification>,
}

impl RecordingSink {
    pub fn badges(&self) -> Vec<String> {
        self.notifications
            .iter()
            .filter_map(|n| match n {
                Notification::Badge(badge) => Some(badge.id.to_string()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.notifications.clear();
    }
}

impl PresentationSink for RecordingSink {
    fn show_xp_gain(&mut self, amount: u64, combo: u32) {
        self.notifications.push(Notification::XpGain { amount, combo });
    }

    fn show_level_up(&mut self, level: u32) {
        self.notifications.push(Notification::LevelUp { level });
    }

    fn show_badge(&mut self, badge: &Badge) {
        self.notifications.push(Notification::Badge(badge.clone()));
    }
}
