// SPDX-License-Identifier: MIT
//! Streak rewards — the milestone ladder and badge logic.
//!
//! A milestone fires a one-time celebratory notification when a streak lands
//! exactly on a ladder value (exact match, not ≥, so a 31-day streak does not
//! renotify the 30-day milestone every subsequent day). Badges are the
//! cumulative display variant: every ladder value at or below the streak.

use serde::Serialize;

/// Streak lengths that trigger a celebratory notification.
pub const MILESTONES: [u32; 8] = [1, 7, 14, 30, 60, 90, 180, 365];

/// Ladder values shown as earned badges. Day 1 is a notification-only
/// milestone; the badge strip starts at a week.
pub const BADGE_MILESTONES: [u32; 7] = [7, 14, 30, 60, 90, 180, 365];

// ─── Policy ───────────────────────────────────────────────────────────────────

/// Reward policy. Stateless apart from configuration: whether completing the
/// first day of a habit counts as its own milestone is a product choice
/// (`[rewards] first_day_milestone` in config.toml, default on).
#[derive(Debug, Clone, Copy)]
pub struct RewardPolicy {
    pub first_day_milestone: bool,
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            first_day_milestone: true,
        }
    }
}

impl RewardPolicy {
    /// True iff `streak` is exactly a milestone value under this policy.
    pub fn should_notify(&self, streak: u32) -> bool {
        if streak == 1 {
            return self.first_day_milestone;
        }
        MILESTONES.contains(&streak)
    }

    /// All badge milestones earned at `streak`, ascending. Monotone in
    /// `streak`: a longer streak never earns fewer badges.
    pub fn earned_badges(&self, streak: u32) -> Vec<u32> {
        BADGE_MILESTONES
            .iter()
            .copied()
            .filter(|m| *m <= streak)
            .collect()
    }

    /// Build the milestone notification for a habit, or `None` when `streak`
    /// is not a milestone. Dispatched at most once per completion event by
    /// the caller; never persisted as a recurring reminder.
    pub fn milestone_for(&self, habit_name: &str, streak: u32) -> Option<MilestoneNotice> {
        if !self.should_notify(streak) {
            return None;
        }
        let message = if streak == 1 {
            format!("Great start! You've completed the first day of \"{habit_name}\", keep it going!")
        } else {
            format!(
                "Congratulations! You've maintained \"{habit_name}\" for {streak} days straight!"
            )
        };
        Some(MilestoneNotice { streak, message })
    }
}

/// A milestone crossing, returned to the HTTP layer alongside the fresh streak
/// so the client can show the celebration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneNotice {
    pub streak: u32,
    pub message: String,
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifies_only_exact_ladder_values() {
        let policy = RewardPolicy::default();
        for streak in 0..400 {
            let expected = MILESTONES.contains(&streak);
            assert_eq!(policy.should_notify(streak), expected, "streak {streak}");
        }
    }

    #[test]
    fn zero_streak_never_notifies() {
        assert!(!RewardPolicy::default().should_notify(0));
    }

    #[test]
    fn first_day_milestone_is_configurable() {
        let off = RewardPolicy {
            first_day_milestone: false,
        };
        assert!(!off.should_notify(1));
        assert!(off.should_notify(7));
        assert!(RewardPolicy::default().should_notify(1));
    }

    #[test]
    fn badges_never_exceed_streak() {
        let policy = RewardPolicy::default();
        for streak in 0..400 {
            for badge in policy.earned_badges(streak) {
                assert!(badge <= streak);
            }
        }
    }

    #[test]
    fn badges_are_monotone_in_streak() {
        let policy = RewardPolicy::default();
        let mut prev_len = 0;
        for streak in 0..400 {
            let len = policy.earned_badges(streak).len();
            assert!(len >= prev_len, "badge count regressed at streak {streak}");
            prev_len = len;
        }
    }

    #[test]
    fn badges_exclude_first_day() {
        assert!(RewardPolicy::default().earned_badges(365).first() == Some(&7));
    }

    #[test]
    fn first_day_message_differs_from_streak_message() {
        let policy = RewardPolicy::default();
        let first = policy.milestone_for("Meditate", 1).unwrap();
        let week = policy.milestone_for("Meditate", 7).unwrap();
        assert!(first.message.contains("first day"));
        assert!(week.message.contains("7 days straight"));
        assert!(policy.milestone_for("Meditate", 8).is_none());
    }
}
