//! Report generation for simulation results

use serde::Serialize;

use ps_machine::{Flag, OddsTable, SessionStats};

use crate::player::{SessionOutcome, StopOrder};

/// Expected vs observed frequency of one flag
#[derive(Debug, Clone, Serialize)]
pub struct FlagRow {
    pub flag: Flag,
    pub expected: f64,
    pub observed: f64,
    pub count: u64,
}

/// Aggregated result of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub setting: u8,
    pub profile: String,
    pub stop_order: StopOrder,
    pub sessions: usize,
    pub games_per_session: u64,
    /// Sessions that ran out of credit early
    pub short_sessions: usize,
    /// All sessions merged
    pub stats: SessionStats,
    pub flags: Vec<FlagRow>,
    pub expected_miss: f64,
    pub observed_miss: f64,
    /// Credit left per session, by session index
    pub final_credits: Vec<u32>,
    pub duration_ms: u64,
}

impl SimReport {
    /// Merge session outcomes
    pub fn new(
        setting: u8,
        profile: impl Into<String>,
        stop_order: StopOrder,
        games_per_session: u64,
        table: &OddsTable,
        mut outcomes: Vec<SessionOutcome>,
        duration_ms: u64,
    ) -> Self {
        outcomes.sort_by_key(|o| o.index);

        let mut stats = SessionStats::default();
        for outcome in &outcomes {
            stats.merge(&outcome.stats);
        }

        let flags = Flag::PRIORITY
            .iter()
            .map(|&flag| FlagRow {
                flag,
                expected: table.probability(flag),
                observed: stats.flag_frequency(flag),
                count: stats.flag_count(flag),
            })
            .collect();

        let observed_miss = if stats.games > 0 {
            stats.misses as f64 / stats.games as f64
        } else {
            0.0
        };

        Self {
            setting,
            profile: profile.into(),
            stop_order,
            sessions: outcomes.len(),
            games_per_session,
            short_sessions: outcomes
                .iter()
                .filter(|o| o.rounds < games_per_session)
                .count(),
            flags,
            expected_miss: table.miss_probability(),
            observed_miss,
            final_credits: outcomes.iter().map(|o| o.ledger.credit).collect(),
            stats,
            duration_ms,
        }
    }

    /// Generate text report
    pub fn to_text(&self) -> String {
        let mut output = String::new();
        let title = format!("Pachislot simulation: setting {}", self.setting);
        output.push_str(&format!("{}\n", title));
        output.push_str(&format!("{}\n\n", "=".repeat(title.len())));

        output.push_str(&format!(
            "  Sessions: {} x {} games ({} short)\n",
            self.sessions, self.games_per_session, self.short_sessions
        ));
        output.push_str(&format!(
            "  Pacing: {}, stops {:?}\n",
            self.profile, self.stop_order
        ));
        output.push_str(&format!("  Duration: {} ms\n\n", self.duration_ms));

        let stats = &self.stats;
        output.push_str(&format!("  Games played: {}\n", stats.games));
        output.push_str(&format!(
            "  Bet / paid: {} / {} ({:.2}%)\n",
            stats.total_bet,
            stats.total_paid,
            stats.payout_rate()
        ));
        output.push_str(&format!("  Hit rate: {:.2}%\n", stats.hit_rate()));
        output.push_str(&format!(
            "  BIG: {}  top-ups: {}\n\n",
            stats.big_bonuses, stats.top_ups
        ));

        output.push_str("  Flag         expected   observed      count\n");
        for row in &self.flags {
            output.push_str(&format!(
                "  {:<10} {:>9.4}% {:>9.4}% {:>10}\n",
                row.flag.name(),
                row.expected * 100.0,
                row.observed * 100.0,
                row.count
            ));
        }
        output.push_str(&format!(
            "  {:<10} {:>9.4}% {:>9.4}% {:>10}\n",
            "MISS",
            self.expected_miss * 100.0,
            self.observed_miss * 100.0,
            stats.misses
        ));

        output
    }

    /// Generate JSON report
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
