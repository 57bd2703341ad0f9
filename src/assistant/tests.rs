use super::*;
use chrono::Utc;
use rand::rngs::StdRng;

fn gate(name: &str, capacity: u32, count: u32) -> Gate {
    Gate {
        id: format!("id-{}", name),
        name: name.to_string(),
        capacity,
        current_count: count,
        status: GateStatus::from_occupancy(count, capacity),
        last_updated: Utc::now(),
    }
}

fn ask(message: &str, gates: &[Gate]) -> ChatReply {
    let mut rng = StdRng::seed_from_u64(1);
    let time = NaiveTime::from_hms_opt(19, 30, 0).unwrap();
    respond(message, gates, time, &mut rng)
}

fn stadium() -> Vec<Gate> {
    vec![
        gate("Gate A", 1200, 1247),
        gate("Gate B", 1200, 892),
        gate("Gate C", 1200, 456),
        gate("Gate D", 1200, 234),
        gate("Gate E", 1200, 678),
        gate("Gate F", 1200, 345),
    ]
}

#[test]
fn test_named_gate_over_capacity() {
    let gates = vec![gate("Gate A", 1200, 1247)];
    let reply = ask("Gate A status?", &gates);

    assert_eq!(reply.intent, QueryIntent::NamedGate);
    assert!(reply.response.contains("1,247"), "{}", reply.response);
    assert!(reply.response.contains("104%"), "{}", reply.response);
    assert!(reply.response.contains("IMMEDIATE ATTENTION REQUIRED"));
    assert!(reply.action_required);
    assert_eq!(reply.gate_data.unwrap()["name"], "Gate A");
}

#[test]
fn test_named_gate_under_capacity_every_phrasing() {
    let gates = stadium();
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let time = NaiveTime::from_hms_opt(9, 5, 0).unwrap();
        let reply = respond("how is gate c doing", &gates, time, &mut rng);

        assert_eq!(reply.intent, QueryIntent::NamedGate);
        assert!(reply.response.contains("Gate C"));
        assert!(reply.response.contains("456"));
        assert!(reply.response.contains("38%"));
        assert!(!reply.response.contains("IMMEDIATE ATTENTION"));
        assert!(!reply.action_required);
    }
}

#[test]
fn test_gate_letter_must_stand_alone() {
    let gates = stadium();
    // "gate changes" is not a reference to Gate C
    assert_eq!(classify("any gate changes?", &gates), QueryIntent::Help);
    assert_eq!(classify("GATE   d please", &gates), QueryIntent::NamedGate);
}

#[test]
fn test_unknown_gate_falls_through_to_keywords() {
    let gates = vec![gate("Gate A", 1200, 100)];
    let reply = ask("gate f status", &gates);
    assert_eq!(reply.intent, QueryIntent::Status);
}

#[test]
fn test_busiest_selects_highest_count() {
    let gates = vec![gate("Gate A", 1200, 1247), gate("Gate B", 1200, 892)];
    let reply = ask("Which gate is busiest?", &gates);

    assert_eq!(reply.intent, QueryIntent::Busiest);
    assert!(reply.response.starts_with("Gate A"));
    assert!(reply.response.contains("OVER CAPACITY"));
    assert!(reply.action_required);
}

#[test]
fn test_busiest_tie_goes_to_first_gate() {
    let gates = vec![gate("Gate B", 1200, 500), gate("Gate C", 1200, 500)];
    let reply = ask("most crowded entrance", &gates);
    assert!(reply.response.starts_with("Gate B"));
    assert!(!reply.action_required);
    assert!(reply.response.contains("manageable"));
}

#[test]
fn test_busiest_with_no_gates() {
    let reply = ask("highest gate?", &[]);
    assert_eq!(reply.intent, QueryIntent::Busiest);
    assert!(!reply.action_required);
    assert!(reply.gate_data.is_none());
}

#[test]
fn test_totals_utilization() {
    let gates = vec![gate("Gate A", 1200, 600), gate("Gate B", 1200, 400)];
    let reply = ask("total attendance", &gates);

    assert_eq!(reply.intent, QueryIntent::Totals);
    let data = reply.gate_data.unwrap();
    assert_eq!(data["totalPeople"], 1000);
    assert_eq!(data["totalCapacity"], 2400);
    assert_eq!(data["utilizationRate"], 42);
    assert!(reply.response.contains("42%"));
    assert!(reply.response.contains("Plenty of space"));
    assert!(!reply.action_required);
}

#[test]
fn test_totals_action_above_ninety_percent() {
    let gates = vec![gate("Gate A", 100, 95), gate("Gate B", 100, 92)];
    let reply = ask("overall numbers", &gates);
    assert!(reply.action_required);
    assert!(reply.response.contains("Peak attendance"));
}

#[test]
fn test_totals_zero_capacity_is_zero() {
    let reply = ask("total", &[]);
    let data = reply.gate_data.unwrap();
    assert_eq!(data["utilizationRate"], 0);
    assert!(!reply.action_required);

    let gates = vec![gate("Gate A", 0, 0)];
    assert_eq!(ask("total", &gates).gate_data.unwrap()["utilizationRate"], 0);
}

#[test]
fn test_status_lists_every_gate() {
    let gates = stadium();
    let reply = ask("How many people are here?", &gates);

    assert_eq!(reply.intent, QueryIntent::Status);
    for g in &gates {
        assert!(reply.response.contains(&g.name));
    }
    assert!(reply.response.contains("Gate A: 1,247 people (104% full, critical)"));
    assert!(reply.response.contains("1 gate(s) require immediate attention"));
    assert!(reply.action_required);
    assert_eq!(reply.gate_data.unwrap().as_array().unwrap().len(), 6);
}

#[test]
fn test_status_without_critical_gates() {
    let gates = vec![gate("Gate A", 1200, 100)];
    let reply = ask("status report", &gates);
    assert!(!reply.action_required);
    assert!(reply.response.contains("All gates operating normally"));
}

#[test]
fn test_alert_branches() {
    let critical = vec![gate("Gate A", 100, 150), gate("Gate B", 100, 101)];
    let reply = ask("any emergency?", &critical);
    assert_eq!(reply.intent, QueryIntent::Alerts);
    assert!(reply.response.contains("Gate A, Gate B are over capacity"));
    assert!(reply.action_required);

    let moderate = vec![gate("Gate A", 100, 80), gate("Gate B", 100, 10)];
    let reply = ask("any warning?", &moderate);
    assert!(reply.response.contains("1 gate(s)"));
    assert!(!reply.action_required);

    let calm = vec![gate("Gate A", 100, 10)];
    let reply = ask("alerts?", &calm);
    assert!(reply.response.contains("No active alerts"));
    assert!(!reply.action_required);
}

#[test]
fn test_recommendation_branches() {
    let mixed = vec![gate("Gate A", 100, 150), gate("Gate B", 100, 10)];
    let reply = ask("what do you recommend?", &mixed);
    assert_eq!(reply.intent, QueryIntent::Recommendation);
    assert!(reply.response.contains("(Gate A)"));
    assert!(reply.response.contains("(Gate B)"));
    assert!(reply.action_required);

    let no_normal = vec![gate("Gate A", 100, 150), gate("Gate B", 100, 80)];
    let reply = ask("any advice", &no_normal);
    assert!(reply.response.contains("additional entry points"));
    assert!(reply.action_required);

    let balanced = vec![gate("Gate A", 100, 80), gate("Gate B", 100, 10)];
    let reply = ask("suggest something", &balanced);
    assert!(reply.response.contains("well balanced"));
    assert!(!reply.action_required);
}

#[test]
fn test_precedence_first_match_wins() {
    let gates = stadium();
    // busiest beats status
    assert_eq!(classify("status of the busiest", &gates), QueryIntent::Busiest);
    // totals beats alerts
    assert_eq!(classify("total alerts", &gates), QueryIntent::Totals);
    // named gate beats everything
    assert_eq!(classify("gate b busiest total", &gates), QueryIntent::NamedGate);
}

#[test]
fn test_fallback_help() {
    let reply = ask("hello there", &stadium());
    assert_eq!(reply.intent, QueryIntent::Help);
    assert!(HELP_MESSAGES.contains(&reply.response.as_str()));
    assert!(!reply.action_required);
    assert!(reply.gate_data.is_none());
}

#[test]
fn test_classification_independent_of_phrasing_seed() {
    let gates = stadium();
    let time = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
    let messages = ["Gate A?", "busiest", "total", "status", "alert", "advice", "hi"];

    for message in messages {
        let expected = classify(message, &gates);
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(respond(message, &gates, time, &mut rng).intent, expected);
        }
    }
}

#[test]
fn test_same_seed_same_reply() {
    let gates = stadium();
    let a = ChatResponder::new(Some(5));
    let b = ChatResponder::new(Some(5));
    let time = NaiveTime::from_hms_opt(12, 0, 0).unwrap();

    let mut rng_a = StdRng::seed_from_u64(5);
    let mut rng_b = StdRng::seed_from_u64(5);
    assert_eq!(
        respond("total", &gates, time, &mut rng_a).response,
        respond("total", &gates, time, &mut rng_b).response
    );

    assert_eq!(
        a.reply("busiest", &gates).response,
        b.reply("busiest", &gates).response
    );
}
