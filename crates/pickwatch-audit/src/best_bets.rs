//! Best-bets suite — the most frequently probed surface.
//!
//! Per sport, fetches `/live/best-bets/{sport}` and asserts pick shape,
//! composite-score bounds, tier consistency, the Titanium 3-of-4 rule,
//! and ET-window scoping of game times.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::info;

use pickwatch_core::config::SuitesConfig;
use pickwatch_core::etwindow::{EtWindow, et_window_today};
use pickwatch_core::jsonpath;
use pickwatch_core::types::{CheckOutcome, SuiteReport, Tier};
use pickwatch_probe::Auth;

use crate::context::AuditContext;

const REQUIRED_PICK_FIELDS: [&str; 8] = [
    "player",
    "market",
    "line",
    "side",
    "tier",
    "composite_score",
    "engine_scores",
    "game_time_utc",
];

pub fn endpoint_for(sport: &str) -> String {
    format!("/live/best-bets/{sport}")
}

pub async fn run(ctx: &AuditContext) -> SuiteReport {
    let mut report = SuiteReport::new("best_bets");
    let window = et_window_today();

    for sport in &ctx.config.suites.sports {
        let endpoint = endpoint_for(sport);

        let Some(prober) = ctx.prober() else {
            report.push(AuditContext::network_skip(&endpoint));
            continue;
        };

        match prober.get_json(&endpoint, Auth::ApiKey).await {
            Ok(body) => {
                report.extend(assess_best_bets(sport, &body, &ctx.config.suites, &window));
            }
            Err(e) => {
                report.push(
                    CheckOutcome::fail(format!("{sport}.fetch"), e.to_string())
                        .with_endpoint(&endpoint),
                );
            }
        }
    }

    report.finish();
    info!(passed = report.passed(), failed = report.failed(), "best-bets suite done");
    report
}

/// All best-bets assertions for one sport's response body.
pub fn assess_best_bets(
    sport: &str,
    body: &Value,
    config: &SuitesConfig,
    window: &EtWindow,
) -> Vec<CheckOutcome> {
    let mut outcomes = Vec::new();
    let name = |check: &str| format!("{sport}.{check}");

    let picks = match jsonpath::extract(body, "picks").and_then(Value::as_array) {
        Some(picks) => picks,
        None => {
            outcomes.push(CheckOutcome::fail(
                name("picks_present"),
                "missing or non-array field: picks",
            ));
            return outcomes;
        }
    };

    match jsonpath::require_nonempty_array(body, "picks") {
        Ok(len) => outcomes.push(CheckOutcome::pass(
            name("picks_nonempty"),
            format!("{len} picks"),
        )),
        Err(detail) => {
            outcomes.push(if config.allow_empty {
                CheckOutcome::warn(name("picks_nonempty"), format!("{detail} (ALLOW_EMPTY)"))
            } else {
                CheckOutcome::fail(name("picks_nonempty"), detail)
            });
            return outcomes;
        }
    }

    outcomes.push(check_pick_fields(&name("pick_fields"), picks));
    outcomes.push(check_composite_bounds(&name("composite_bounds"), picks));
    outcomes.push(check_tier_consistency(&name("tier_consistency"), picks));
    outcomes.push(check_titanium_rule(&name("titanium_rule"), picks, config));
    outcomes.push(check_et_window(&name("et_window"), picks, window));

    outcomes
}

fn pick_label(pick: &Value, index: usize) -> String {
    pick.get("player")
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| format!("pick[{index}]"))
}

/// Every pick carries the full required field set with a valid side.
fn check_pick_fields(name: &str, picks: &[Value]) -> CheckOutcome {
    let mut problems = Vec::new();
    for (i, pick) in picks.iter().enumerate() {
        for field in REQUIRED_PICK_FIELDS {
            if jsonpath::require_field(pick, field).is_err() {
                problems.push(format!("{}: missing {field}", pick_label(pick, i)));
            }
        }
        // Only shape-check side when present; absence is reported above.
        if pick.get("side").is_some() {
            if let Err(e) = jsonpath::require_string_in(pick, "side", &["over", "under"]) {
                problems.push(format!("{}: {e}", pick_label(pick, i)));
            }
        }
    }

    if problems.is_empty() {
        CheckOutcome::pass(name, "all picks carry required fields")
    } else {
        CheckOutcome::fail(name, problems.join("; "))
    }
}

/// Composite scores sit inside [0, 10].
fn check_composite_bounds(name: &str, picks: &[Value]) -> CheckOutcome {
    let mut problems = Vec::new();
    for (i, pick) in picks.iter().enumerate() {
        if let Err(e) = jsonpath::require_number_in(pick, "composite_score", 0.0, 10.0) {
            problems.push(format!("{}: {e}", pick_label(pick, i)));
        }
    }

    if problems.is_empty() {
        CheckOutcome::pass(name, "composite scores within [0, 10]")
    } else {
        CheckOutcome::fail(name, problems.join("; "))
    }
}

/// Tier strings are known and no pick outscores a pick of a higher tier.
///
/// Compared across tier boundaries: the weakest composite in a higher
/// tier must be at least the strongest composite in every lower tier.
fn check_tier_consistency(name: &str, picks: &[Value]) -> CheckOutcome {
    let mut problems = Vec::new();
    let mut tiered: Vec<(Tier, f64, String)> = Vec::new();

    for (i, pick) in picks.iter().enumerate() {
        let label = pick_label(pick, i);
        let tier_str = pick.get("tier").and_then(Value::as_str).unwrap_or("");
        let Some(tier) = Tier::parse(tier_str) else {
            problems.push(format!("{label}: unknown tier {tier_str:?}"));
            continue;
        };
        if let Some(score) = pick.get("composite_score").and_then(Value::as_f64) {
            tiered.push((tier, score, label));
        }
    }

    for (hi_tier, hi_score, hi_label) in &tiered {
        for (lo_tier, lo_score, lo_label) in &tiered {
            // Tier ordering is highest-first: Titanium < Gold < ...
            if lo_tier > hi_tier && lo_score > hi_score {
                problems.push(format!(
                    "{lo_label} ({}, {lo_score}) outscores {hi_label} ({}, {hi_score})",
                    lo_tier.label(),
                    hi_tier.label(),
                ));
            }
        }
    }

    if problems.is_empty() {
        CheckOutcome::pass(name, "tiers consistent with composite scores")
    } else {
        CheckOutcome::fail(name, problems.join("; "))
    }
}

/// Engine scores as (label, value) pairs. The API has shipped both an
/// array and a name-keyed object here; accept either.
fn engine_scores(pick: &Value) -> Option<Vec<(String, f64)>> {
    match pick.get("engine_scores")? {
        Value::Array(scores) => scores
            .iter()
            .enumerate()
            .map(|(i, v)| v.as_f64().map(|n| (format!("engine[{i}]"), n)))
            .collect(),
        Value::Object(scores) => scores
            .iter()
            .map(|(k, v)| v.as_f64().map(|n| (k.clone(), n)))
            .collect(),
        _ => None,
    }
}

/// Titanium 3-of-4: a Titanium pick needs at least N of its engine
/// scores at or above the floor.
fn check_titanium_rule(name: &str, picks: &[Value], config: &SuitesConfig) -> CheckOutcome {
    let mut problems = Vec::new();
    let mut titanium_seen = 0;

    for (i, pick) in picks.iter().enumerate() {
        let tier = pick
            .get("tier")
            .and_then(Value::as_str)
            .and_then(Tier::parse);
        if tier != Some(Tier::Titanium) {
            continue;
        }
        titanium_seen += 1;
        let label = pick_label(pick, i);

        let Some(scores) = engine_scores(pick) else {
            problems.push(format!("{label}: engine_scores missing or non-numeric"));
            continue;
        };
        if scores.len() != config.engine_count {
            problems.push(format!(
                "{label}: {} engines, expected {}",
                scores.len(),
                config.engine_count
            ));
        }

        let cleared = scores
            .iter()
            .filter(|(_, s)| *s >= config.titanium_score_floor)
            .count();
        if cleared < config.titanium_engines_required {
            let failing: Vec<String> = scores
                .iter()
                .filter(|(_, s)| *s < config.titanium_score_floor)
                .map(|(k, s)| format!("{k}={s}"))
                .collect();
            problems.push(format!(
                "{label}: {cleared} of {} engines >= {} ({})",
                scores.len(),
                config.titanium_score_floor,
                failing.join(", "),
            ));
        }
    }

    if !problems.is_empty() {
        CheckOutcome::fail(name, problems.join("; "))
    } else if titanium_seen == 0 {
        CheckOutcome::pass(name, "no titanium picks to check")
    } else {
        CheckOutcome::pass(
            name,
            format!("{titanium_seen} titanium picks satisfy the rule"),
        )
    }
}

/// Every game time falls inside today's ET window.
fn check_et_window(name: &str, picks: &[Value], window: &EtWindow) -> CheckOutcome {
    let mut problems = Vec::new();

    for (i, pick) in picks.iter().enumerate() {
        let label = pick_label(pick, i);
        let raw = pick.get("game_time_utc").and_then(Value::as_str);
        let Some(raw) = raw else {
            problems.push(format!("{label}: game_time_utc missing"));
            continue;
        };
        match DateTime::parse_from_rfc3339(raw) {
            Ok(ts) => {
                let ts = ts.with_timezone(&Utc);
                if !window.contains(ts) {
                    problems.push(format!("{label}: {raw} outside ET window"));
                }
            }
            Err(e) => problems.push(format!("{label}: bad game_time_utc {raw:?} ({e})")),
        }
    }

    if problems.is_empty() {
        CheckOutcome::pass(name, "all game times inside today's ET window")
    } else {
        CheckOutcome::fail(name, problems.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pickwatch_core::types::CheckStatus;
    use serde_json::json;

    fn window() -> EtWindow {
        // Jan 15 2025, EST: 05:00 UTC to 05:00 UTC next day.
        EtWindow {
            start: Utc.with_ymd_and_hms(2025, 1, 15, 5, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 1, 16, 5, 0, 0).unwrap(),
        }
    }

    fn config() -> SuitesConfig {
        SuitesConfig::default()
    }

    fn pick(player: &str, tier: &str, composite: f64, engines: [f64; 4]) -> Value {
        json!({
            "player": player,
            "market": "points",
            "line": 25.5,
            "side": "over",
            "tier": tier,
            "composite_score": composite,
            "engine_scores": engines,
            "game_time_utc": "2025-01-15T23:30:00Z",
        })
    }

    fn statuses(outcomes: &[CheckOutcome]) -> Vec<(String, CheckStatus)> {
        outcomes
            .iter()
            .map(|o| (o.name.clone(), o.status))
            .collect()
    }

    fn status_of(outcomes: &[CheckOutcome], suffix: &str) -> CheckStatus {
        outcomes
            .iter()
            .find(|o| o.name.ends_with(suffix))
            .unwrap_or_else(|| panic!("no outcome {suffix} in {:?}", statuses(outcomes)))
            .status
    }

    #[test]
    fn clean_slate_all_passes() {
        let body = json!({"picks": [
            pick("LeBron James", "titanium", 9.2, [8.5, 8.3, 9.0, 7.5]),
            pick("Nikola Jokic", "gold", 7.9, [7.2, 8.0, 6.9, 7.8]),
        ]});
        let outcomes = assess_best_bets("nba", &body, &config(), &window());
        assert!(
            outcomes.iter().all(|o| o.status == CheckStatus::Pass),
            "{:?}",
            statuses(&outcomes)
        );
    }

    #[test]
    fn missing_picks_array_fails() {
        let body = json!({"error": "no data"});
        let outcomes = assess_best_bets("nba", &body, &config(), &window());
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].status, CheckStatus::Fail);
    }

    #[test]
    fn empty_picks_fails_by_default() {
        let body = json!({"picks": []});
        let outcomes = assess_best_bets("nba", &body, &config(), &window());
        assert_eq!(status_of(&outcomes, "picks_nonempty"), CheckStatus::Fail);
    }

    #[test]
    fn empty_picks_warns_with_allow_empty() {
        let body = json!({"picks": []});
        let mut cfg = config();
        cfg.allow_empty = true;
        let outcomes = assess_best_bets("nba", &body, &cfg, &window());
        assert_eq!(status_of(&outcomes, "picks_nonempty"), CheckStatus::Warn);
    }

    #[test]
    fn missing_field_named_in_detail() {
        let mut p = pick("Jayson Tatum", "gold", 7.0, [7.0, 7.0, 7.0, 7.0]);
        p.as_object_mut().unwrap().remove("market");
        let body = json!({"picks": [p]});
        let outcomes = assess_best_bets("nba", &body, &config(), &window());
        assert_eq!(status_of(&outcomes, "pick_fields"), CheckStatus::Fail);
        let detail = &outcomes
            .iter()
            .find(|o| o.name.ends_with("pick_fields"))
            .unwrap()
            .detail;
        assert!(detail.contains("Jayson Tatum: missing market"), "{detail}");
    }

    #[test]
    fn unknown_side_value_fails() {
        let mut p = pick("Anthony Edwards", "gold", 7.5, [7.0, 7.5, 7.2, 7.8]);
        p["side"] = json!("push");
        let body = json!({"picks": [p]});
        let outcomes = assess_best_bets("nba", &body, &config(), &window());
        assert_eq!(status_of(&outcomes, "pick_fields"), CheckStatus::Fail);
        let detail = &outcomes
            .iter()
            .find(|o| o.name.ends_with("pick_fields"))
            .unwrap()
            .detail;
        assert!(detail.contains("push"), "{detail}");
    }

    #[test]
    fn composite_out_of_bounds_fails() {
        let body = json!({"picks": [pick("A", "gold", 11.5, [7.0, 7.0, 7.0, 7.0])]});
        let outcomes = assess_best_bets("nba", &body, &config(), &window());
        assert_eq!(status_of(&outcomes, "composite_bounds"), CheckStatus::Fail);
    }

    #[test]
    fn lower_tier_outscoring_higher_fails() {
        let body = json!({"picks": [
            pick("Weak Titanium", "titanium", 7.0, [8.5, 8.5, 8.5, 8.5]),
            pick("Strong Silver", "silver", 8.4, [7.0, 7.0, 7.0, 7.0]),
        ]});
        let outcomes = assess_best_bets("nba", &body, &config(), &window());
        assert_eq!(status_of(&outcomes, "tier_consistency"), CheckStatus::Fail);
        let detail = &outcomes
            .iter()
            .find(|o| o.name.ends_with("tier_consistency"))
            .unwrap()
            .detail;
        assert!(detail.contains("Strong Silver"), "{detail}");
    }

    #[test]
    fn unknown_tier_fails_consistency() {
        let body = json!({"picks": [pick("A", "platinum", 9.0, [9.0, 9.0, 9.0, 9.0])]});
        let outcomes = assess_best_bets("nba", &body, &config(), &window());
        assert_eq!(status_of(&outcomes, "tier_consistency"), CheckStatus::Fail);
    }

    #[test]
    fn titanium_two_of_four_fails() {
        let body = json!({"picks": [
            pick("Borderline", "titanium", 9.0, [8.5, 8.1, 7.9, 6.0]),
        ]});
        let outcomes = assess_best_bets("nba", &body, &config(), &window());
        assert_eq!(status_of(&outcomes, "titanium_rule"), CheckStatus::Fail);
        let detail = &outcomes
            .iter()
            .find(|o| o.name.ends_with("titanium_rule"))
            .unwrap()
            .detail;
        assert!(detail.contains("Borderline"), "{detail}");
        assert!(detail.contains("2 of 4"), "{detail}");
    }

    #[test]
    fn titanium_exactly_three_of_four_passes() {
        let body = json!({"picks": [
            pick("Solid", "titanium", 9.0, [8.0, 8.0, 8.0, 7.9]),
        ]});
        let outcomes = assess_best_bets("nba", &body, &config(), &window());
        assert_eq!(status_of(&outcomes, "titanium_rule"), CheckStatus::Pass);
    }

    #[test]
    fn titanium_rule_accepts_object_engine_scores() {
        let body = json!({"picks": [{
            "player": "Objecty",
            "market": "points", "line": 20.5, "side": "over",
            "tier": "titanium", "composite_score": 9.0,
            "engine_scores": {"research": 8.5, "esoteric": 8.2, "jarvis": 9.1, "sharp": 6.0},
            "game_time_utc": "2025-01-15T23:30:00Z",
        }]});
        let outcomes = assess_best_bets("nba", &body, &config(), &window());
        assert_eq!(status_of(&outcomes, "titanium_rule"), CheckStatus::Pass);
    }

    #[test]
    fn titanium_rule_ignores_gold_picks() {
        let body = json!({"picks": [
            pick("Low Gold", "gold", 6.0, [5.0, 5.0, 5.0, 5.0]),
        ]});
        let outcomes = assess_best_bets("nba", &body, &config(), &window());
        assert_eq!(status_of(&outcomes, "titanium_rule"), CheckStatus::Pass);
    }

    #[test]
    fn game_outside_et_window_fails() {
        let mut p = pick("Tomorrow", "gold", 7.0, [7.0, 7.0, 7.0, 7.0]);
        p["game_time_utc"] = json!("2025-01-16T23:30:00Z");
        let body = json!({"picks": [p]});
        let outcomes = assess_best_bets("nba", &body, &config(), &window());
        assert_eq!(status_of(&outcomes, "et_window"), CheckStatus::Fail);
    }

    #[test]
    fn unparseable_game_time_fails() {
        let mut p = pick("Bad Time", "gold", 7.0, [7.0, 7.0, 7.0, 7.0]);
        p["game_time_utc"] = json!("yesterday-ish");
        let body = json!({"picks": [p]});
        let outcomes = assess_best_bets("nba", &body, &config(), &window());
        assert_eq!(status_of(&outcomes, "et_window"), CheckStatus::Fail);
    }

    #[test]
    fn late_night_et_game_passes() {
        // 04:30 UTC Jan 16 is 23:30 EST Jan 15 — inside the window.
        let mut p = pick("Late Game", "gold", 7.0, [7.0, 7.0, 7.0, 7.0]);
        p["game_time_utc"] = json!("2025-01-16T04:30:00Z");
        let body = json!({"picks": [p]});
        let outcomes = assess_best_bets("nba", &body, &config(), &window());
        assert_eq!(status_of(&outcomes, "et_window"), CheckStatus::Pass);
    }
}
