//! Daily RP XP cap policy and per-message accrual planning.
//!
//! Two concerns live here:
//!
//! - **Reset**: whether a character's daily allowance rolls over, judged by
//!   calendar day in one fixed reference zone ([`DayBoundary`]).
//! - **Accrual**: how many XP a message yields given the character's typed
//!   buffer, today's earnings, and the guild's `char_per_rp` /
//!   `daily_rp_cap` ([`plan_accrual`]).
//!
//! Message length is measured in Unicode scalar values ([`rp_length`]);
//! `char_per_rp` is configured in the same unit.

use chrono::{FixedOffset, NaiveDate, Offset, Utc};

use crate::error::CoreError;
use crate::guild_config::GuildConfig;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Day boundary
// ---------------------------------------------------------------------------

/// Fixed UTC offset in which "today" is evaluated for the daily cap.
///
/// One value is chosen per deployment; every reset decision uses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBoundary {
    offset: FixedOffset,
}

impl DayBoundary {
    /// Days roll over at 00:00 UTC.
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Days roll over at local midnight of a zone `minutes` east of UTC.
    pub fn from_offset_minutes(minutes: i32) -> Result<Self, CoreError> {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "UTC offset of {minutes} minutes is out of range (must be within +/-24h)"
                ))
            })?;
        Ok(Self { offset })
    }

    /// The offset in minutes east of UTC.
    pub fn offset_minutes(&self) -> i32 {
        self.offset.local_minus_utc() / 60
    }

    /// Calendar date of `at` in the reference zone.
    pub fn day_of(&self, at: Timestamp) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// True iff `now` falls on a later calendar day than `last_reset_at`.
    ///
    /// A `now` on an earlier day never resets, so a late-arriving message
    /// cannot roll the allowance back to a day that has already passed.
    pub fn should_reset(&self, last_reset_at: Timestamp, now: Timestamp) -> bool {
        self.day_of(now) > self.day_of(last_reset_at)
    }
}

impl Default for DayBoundary {
    fn default() -> Self {
        Self::utc()
    }
}

// ---------------------------------------------------------------------------
// Daily state
// ---------------------------------------------------------------------------

/// The slice of a character record the cap policy reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyState {
    pub daily_xp: i64,
    pub char_buffer: i64,
    pub last_reset_at: Timestamp,
}

impl DailyState {
    /// Values an atomic ledger write is conditioned on.
    pub fn guard(&self) -> LedgerGuard {
        LedgerGuard {
            daily_xp: self.daily_xp,
            char_buffer: self.char_buffer,
        }
    }
}

/// Zero today's earnings and stamp the reset time.
///
/// `char_buffer` carries over untouched; `total_xp` is not part of the
/// daily state at all.
pub fn perform_reset(state: DailyState, now: Timestamp) -> DailyState {
    DailyState {
        daily_xp: 0,
        last_reset_at: now,
        ..state
    }
}

// ---------------------------------------------------------------------------
// Accrual
// ---------------------------------------------------------------------------

/// Length of a message in the unit `char_per_rp` is configured in.
pub fn rp_length(content: &str) -> i64 {
    i64::try_from(content.chars().count()).unwrap_or(i64::MAX)
}

/// Deltas applied to a character row in one atomic write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpDelta {
    pub xp: i64,
    pub daily_xp: i64,
    /// May be negative: the buffer shrinks when characters convert to XP.
    pub char_buffer: i64,
}

/// The row values a write was computed against (compare-and-swap).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerGuard {
    pub daily_xp: i64,
    pub char_buffer: i64,
}

/// What the ledger must persist for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerWrite {
    /// XP crossed a threshold; apply all three deltas atomically.
    Award(XpDelta),
    /// Buffer advanced without earning XP.
    BufferOnly { new_buffer: i64 },
    /// Nothing changed.
    Nothing,
}

/// Result of running one message through the cap policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccrualPlan {
    pub previous_buffer: i64,
    /// `char_buffer + message length`.
    pub buffered: i64,
    pub potential_xp: i64,
    pub remaining_today: i64,
    pub gained_xp: i64,
    /// Always `buffered % char_per_rp`, whether or not the cap bit.
    pub new_buffer: i64,
}

impl AccrualPlan {
    pub fn write(&self) -> LedgerWrite {
        if self.gained_xp > 0 {
            LedgerWrite::Award(XpDelta {
                xp: self.gained_xp,
                daily_xp: self.gained_xp,
                char_buffer: self.new_buffer - self.previous_buffer,
            })
        } else if self.new_buffer != self.previous_buffer {
            LedgerWrite::BufferOnly {
                new_buffer: self.new_buffer,
            }
        } else {
            LedgerWrite::Nothing
        }
    }

    /// Typed characters consumed without producing XP because of the cap.
    pub fn forfeited_xp(&self) -> i64 {
        self.potential_xp - self.gained_xp
    }
}

/// Compute the XP a message of `message_len` characters earns.
///
/// Characters past the daily cap are consumed from the buffer rather than
/// banked: `new_buffer` is the remainder of the full buffered count.
///
/// Fails with [`CoreError::Configuration`] when `char_per_rp` is not
/// positive.
pub fn plan_accrual(
    state: &DailyState,
    message_len: i64,
    config: &GuildConfig,
) -> Result<AccrualPlan, CoreError> {
    config.ensure_accruable()?;

    let buffered = state.char_buffer.saturating_add(message_len.max(0));
    let potential_xp = buffered / config.char_per_rp;
    let remaining_today = config.daily_rp_cap.saturating_sub(state.daily_xp).max(0);
    let gained_xp = potential_xp.min(remaining_today);
    let new_buffer = buffered % config.char_per_rp;

    Ok(AccrualPlan {
        previous_buffer: state.char_buffer,
        buffered,
        potential_xp,
        remaining_today,
        gained_xp,
        new_buffer,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn config(char_per_rp: i64, daily_rp_cap: i64) -> GuildConfig {
        GuildConfig {
            rp_channels: vec![1],
            char_per_rp,
            daily_rp_cap,
            log_channel_id: None,
        }
    }

    fn state(daily_xp: i64, char_buffer: i64) -> DailyState {
        DailyState {
            daily_xp,
            char_buffer,
            last_reset_at: at(2025, 3, 1, 12, 0),
        }
    }

    // -- DayBoundary ----------------------------------------------------------

    #[test]
    fn same_day_does_not_reset() {
        let day = DayBoundary::utc();
        assert!(!day.should_reset(at(2025, 3, 1, 0, 0), at(2025, 3, 1, 23, 59)));
    }

    #[test]
    fn next_day_resets() {
        let day = DayBoundary::utc();
        assert!(day.should_reset(at(2025, 3, 1, 23, 59), at(2025, 3, 2, 0, 0)));
    }

    #[test]
    fn earlier_day_never_resets() {
        let day = DayBoundary::utc();
        assert!(!day.should_reset(at(2025, 3, 2, 0, 0), at(2025, 3, 1, 23, 59)));
        assert!(!day.should_reset(at(2025, 3, 5, 12, 0), at(2025, 3, 1, 12, 0)));
    }

    #[test]
    fn offset_moves_the_boundary() {
        // 22:30 UTC and 01:30 UTC are the same day at UTC-5.
        let eastern = DayBoundary::from_offset_minutes(-300).unwrap();
        assert!(!eastern.should_reset(at(2025, 3, 1, 22, 30), at(2025, 3, 2, 1, 30)));
        assert!(DayBoundary::utc().should_reset(at(2025, 3, 1, 22, 30), at(2025, 3, 2, 1, 30)));
        assert_eq!(eastern.offset_minutes(), -300);
    }

    #[test]
    fn out_of_range_offset_is_rejected() {
        assert_matches!(
            DayBoundary::from_offset_minutes(24 * 60),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            DayBoundary::from_offset_minutes(i32::MAX),
            Err(CoreError::Validation(_))
        );
    }

    // -- perform_reset --------------------------------------------------------

    #[test]
    fn reset_clears_daily_xp_and_keeps_buffer() {
        let now = at(2025, 3, 2, 9, 0);
        let reset = perform_reset(state(5, 77), now);
        assert_eq!(reset.daily_xp, 0);
        assert_eq!(reset.char_buffer, 77);
        assert_eq!(reset.last_reset_at, now);
    }

    #[test]
    fn reset_is_idempotent_within_a_day() {
        let day = DayBoundary::utc();
        let now = at(2025, 3, 2, 9, 0);
        let s = state(5, 0);

        assert!(day.should_reset(s.last_reset_at, now));
        let once = perform_reset(s, now);

        let later = at(2025, 3, 2, 18, 0);
        assert!(!day.should_reset(once.last_reset_at, later));
    }

    // -- rp_length ------------------------------------------------------------

    #[test]
    fn length_counts_scalar_values_not_bytes() {
        assert_eq!(rp_length("abc"), 3);
        assert_eq!(rp_length("héllo"), 5);
        assert_eq!(rp_length("⚔️"), 2);
        assert_eq!(rp_length(""), 0);
    }

    // -- plan_accrual ---------------------------------------------------------

    #[test]
    fn first_award_from_an_empty_buffer() {
        let plan = plan_accrual(&state(0, 0), 250, &config(240, 5)).unwrap();
        assert_eq!(plan.potential_xp, 1);
        assert_eq!(plan.gained_xp, 1);
        assert_eq!(plan.new_buffer, 10);
        assert_eq!(
            plan.write(),
            LedgerWrite::Award(XpDelta {
                xp: 1,
                daily_xp: 1,
                char_buffer: 10,
            })
        );
    }

    #[test]
    fn cap_limits_gain_but_buffer_is_still_consumed() {
        let plan = plan_accrual(&state(4, 0), 500, &config(240, 5)).unwrap();
        assert_eq!(plan.potential_xp, 2);
        assert_eq!(plan.remaining_today, 1);
        assert_eq!(plan.gained_xp, 1);
        assert_eq!(plan.new_buffer, 20);
        assert_eq!(plan.forfeited_xp(), 1);
    }

    #[test]
    fn at_cap_only_moves_the_buffer() {
        let plan = plan_accrual(&state(5, 100), 300, &config(240, 5)).unwrap();
        assert_eq!(plan.gained_xp, 0);
        assert_eq!(plan.new_buffer, 160);
        assert_eq!(plan.write(), LedgerWrite::BufferOnly { new_buffer: 160 });
    }

    #[test]
    fn below_threshold_accumulates() {
        let plan = plan_accrual(&state(0, 100), 50, &config(240, 5)).unwrap();
        assert_eq!(plan.gained_xp, 0);
        assert_eq!(plan.write(), LedgerWrite::BufferOnly { new_buffer: 150 });
    }

    #[test]
    fn empty_message_writes_nothing() {
        let plan = plan_accrual(&state(0, 100), 0, &config(240, 5)).unwrap();
        assert_eq!(plan.write(), LedgerWrite::Nothing);
    }

    #[test]
    fn exact_multiple_empties_the_buffer() {
        let plan = plan_accrual(&state(0, 40), 200, &config(240, 5)).unwrap();
        assert_eq!(plan.gained_xp, 1);
        assert_eq!(plan.new_buffer, 0);
        assert_eq!(
            plan.write(),
            LedgerWrite::Award(XpDelta {
                xp: 1,
                daily_xp: 1,
                char_buffer: -40,
            })
        );
    }

    #[test]
    fn daily_xp_above_a_lowered_cap_yields_nothing() {
        let plan = plan_accrual(&state(9, 0), 1000, &config(240, 5)).unwrap();
        assert_eq!(plan.remaining_today, 0);
        assert_eq!(plan.gained_xp, 0);
    }

    #[test]
    fn zero_char_per_rp_is_a_configuration_error() {
        assert_matches!(
            plan_accrual(&state(0, 0), 10, &config(0, 5)),
            Err(CoreError::Configuration(_))
        );
        assert_matches!(
            plan_accrual(&state(0, 0), 10, &config(-3, 5)),
            Err(CoreError::Configuration(_))
        );
    }

    #[test]
    fn invariants_hold_over_a_long_day() {
        let cfg = config(240, 5);
        let mut s = state(0, 0);
        let mut total = 0;

        for len in [13, 999, 240, 1, 0, 4800, 239, 77, 10_000, 5] {
            let plan = plan_accrual(&s, len, &cfg).unwrap();
            match plan.write() {
                LedgerWrite::Award(delta) => {
                    total += delta.xp;
                    s.daily_xp += delta.daily_xp;
                    s.char_buffer += delta.char_buffer;
                }
                LedgerWrite::BufferOnly { new_buffer } => s.char_buffer = new_buffer,
                LedgerWrite::Nothing => {}
            }
            assert!(s.char_buffer >= 0 && s.char_buffer < cfg.char_per_rp);
            assert!(s.daily_xp <= cfg.daily_rp_cap);
        }

        assert_eq!(total, 5);
    }

    #[test]
    fn surplus_past_the_cap_is_not_banked_for_tomorrow() {
        let cfg = config(240, 5);
        // 10 XP worth of typing on a day with 1 XP left.
        let plan = plan_accrual(&state(4, 0), 2400, &cfg).unwrap();
        assert_eq!(plan.gained_xp, 1);
        assert_eq!(plan.new_buffer, 0);

        // Next day a short message cannot cash in yesterday's surplus.
        let tomorrow = perform_reset(
            DailyState {
                daily_xp: 5,
                char_buffer: plan.new_buffer,
                last_reset_at: at(2025, 3, 1, 12, 0),
            },
            at(2025, 3, 2, 8, 0),
        );
        let next = plan_accrual(&tomorrow, 10, &cfg).unwrap();
        assert_eq!(next.gained_xp, 0);
        assert_eq!(next.new_buffer, 10);
    }
}
