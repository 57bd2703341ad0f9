//! Rule-based crowd assistant.
//!
//! Classifies a free-text question with keyword and pattern rules, then answers from a
//! snapshot of the gates. Classification is deterministic; randomness only picks
//! between equivalent phrasings.

mod format;

pub use format::{format_count, percentage};

use crate::state::{Gate, GateStatus};
use chrono::{Local, NaiveTime};
use format::join_names;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::{Mutex, OnceLock};

#[cfg(test)]
mod tests;

/// Category a chat message falls into, in precedence order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    /// "gate c" style question about one existing gate
    NamedGate,
    Busiest,
    Totals,
    Status,
    Alerts,
    Recommendation,
    Help,
}

/// Assistant answer
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate_data: Option<Value>,
    pub action_required: bool,
    pub intent: QueryIntent,
}

impl ChatReply {
    fn new(intent: QueryIntent, response: String, gate_data: Option<Value>, action: bool) -> Self {
        Self {
            response,
            gate_data,
            action_required: action,
            intent,
        }
    }
}

const BUSIEST_KEYWORDS: &[&str] = &["busiest", "highest", "most crowded"];
const TOTALS_KEYWORDS: &[&str] = &["total", "all", "overall"];
const STATUS_KEYWORDS: &[&str] = &["status", "how many"];
const ALERT_KEYWORDS: &[&str] = &["alert", "warning", "emergency"];
const RECOMMEND_KEYWORDS: &[&str] = &["recommend", "suggest", "advice"];

const HELP_MESSAGES: &[&str] = &[
    "I can help you monitor crowd levels! Ask me about specific gates (A-F), total attendance, or which gate is busiest.",
    "Try asking me 'Gate A status?' or 'Which gate is busiest?' for real-time crowd information.",
    "I'm here to help with crowd monitoring. You can ask about gate status, total capacity, or get recommendations for crowd control.",
];

fn gate_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\bgate\s+([a-f])\b").expect("gate pattern is valid"))
}

/// Gate name referenced by the message, e.g. "Gate C"
fn referenced_gate_name(message: &str) -> Option<String> {
    let letter = gate_pattern().captures(message)?.get(1)?.as_str();
    Some(format!("Gate {}", letter.to_ascii_uppercase()))
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn keyword_intent(lower: &str) -> QueryIntent {
    if contains_any(lower, BUSIEST_KEYWORDS) {
        QueryIntent::Busiest
    } else if contains_any(lower, TOTALS_KEYWORDS) {
        QueryIntent::Totals
    } else if contains_any(lower, STATUS_KEYWORDS) {
        QueryIntent::Status
    } else if contains_any(lower, ALERT_KEYWORDS) {
        QueryIntent::Alerts
    } else if contains_any(lower, RECOMMEND_KEYWORDS) {
        QueryIntent::Recommendation
    } else {
        QueryIntent::Help
    }
}

/// Classify a message against the current gates.
///
/// A gate reference only wins when that gate exists; otherwise the keyword rules apply.
pub fn classify(message: &str, gates: &[Gate]) -> QueryIntent {
    if let Some(name) = referenced_gate_name(message) {
        if gates.iter().any(|g| g.name == name) {
            return QueryIntent::NamedGate;
        }
    }
    keyword_intent(&message.to_lowercase())
}

/// Answer `message` from the `gates` snapshot.
///
/// `local_time` is the venue wall-clock time shown in some phrasings; `rng` only
/// selects phrasing.
pub fn respond<R: Rng + ?Sized>(
    message: &str,
    gates: &[Gate],
    local_time: NaiveTime,
    rng: &mut R,
) -> ChatReply {
    let stamp = local_time.format("%-I:%M:%S %p").to_string();

    if let Some(name) = referenced_gate_name(message) {
        if let Some(gate) = gates.iter().find(|g| g.name == name) {
            return named_gate_reply(gate, &stamp, rng);
        }
    }

    match keyword_intent(&message.to_lowercase()) {
        QueryIntent::Busiest => busiest_reply(gates),
        QueryIntent::Totals => totals_reply(gates, &stamp, rng),
        QueryIntent::Status => status_reply(gates),
        QueryIntent::Alerts => alerts_reply(gates),
        QueryIntent::Recommendation => recommendation_reply(gates),
        _ => {
            let text = HELP_MESSAGES.choose(rng).copied().unwrap_or(HELP_MESSAGES[0]);
            ChatReply::new(QueryIntent::Help, text.to_string(), None, false)
        }
    }
}

fn status_marker(status: GateStatus) -> &'static str {
    match status {
        GateStatus::Critical => "🚨",
        GateStatus::Moderate => "⚡",
        GateStatus::Normal => "✅",
    }
}

fn named_gate_reply<R: Rng + ?Sized>(gate: &Gate, stamp: &str, rng: &mut R) -> ChatReply {
    let count = format_count(u64::from(gate.current_count));
    let capacity = format_count(u64::from(gate.capacity));
    let pct = percentage(u64::from(gate.current_count), u64::from(gate.capacity));
    let marker = status_marker(gate.status);
    let over = gate.is_over_capacity();

    let text = match rng.gen_range(0..3) {
        0 => format!(
            "{} status update ({}): **{} people** ({}% capacity). {} {}",
            gate.name,
            stamp,
            count,
            pct,
            gate.status.as_str().to_uppercase(),
            marker
        ),
        1 => format!(
            "Current crowd at {}: **{}** out of {} max capacity ({}%). Status: {} {}",
            gate.name, count, capacity, pct, gate.status, marker
        ),
        _ => format!(
            "{} real-time data: **{} attendees** - {}% full. Condition: {} {}",
            gate.name, count, pct, gate.status, marker
        ),
    };

    let text = if over {
        format!("{} - **IMMEDIATE ATTENTION REQUIRED!**", text)
    } else {
        text
    };

    ChatReply::new(QueryIntent::NamedGate, text, Some(json!(gate)), over)
}

/// Gate with the highest count; ties go to the earliest gate
pub fn busiest_gate(gates: &[Gate]) -> Option<&Gate> {
    gates.iter().fold(None, |best: Option<&Gate>, gate| match best {
        Some(b) if b.current_count >= gate.current_count => Some(b),
        _ => Some(gate),
    })
}

fn busiest_reply(gates: &[Gate]) -> ChatReply {
    let Some(gate) = busiest_gate(gates) else {
        return ChatReply::new(
            QueryIntent::Busiest,
            "No gates are currently being monitored.".to_string(),
            None,
            false,
        );
    };

    let over = gate.is_over_capacity();
    let verdict = if over {
        "This gate is **OVER CAPACITY** and requires immediate attention!"
    } else {
        "Crowd levels are manageable."
    };

    ChatReply::new(
        QueryIntent::Busiest,
        format!(
            "{} is currently the busiest with **{} people**. {}",
            gate.name,
            format_count(u64::from(gate.current_count)),
            verdict
        ),
        Some(json!(gate)),
        over,
    )
}

/// Stadium-wide totals
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_people: u64,
    pub total_capacity: u64,
    /// Rounded percentage; 0 when there is no capacity
    pub utilization_rate: u32,
}

impl Totals {
    pub fn of(gates: &[Gate]) -> Self {
        let total_people: u64 = gates.iter().map(|g| u64::from(g.current_count)).sum();
        let total_capacity: u64 = gates.iter().map(|g| u64::from(g.capacity)).sum();
        Self {
            total_people,
            total_capacity,
            utilization_rate: percentage(total_people, total_capacity),
        }
    }
}

fn utilization_tag(rate: u32) -> &'static str {
    if rate > 85 {
        "🔥 Peak attendance levels!"
    } else if rate > 70 {
        "⚡ High activity period."
    } else if rate < 50 {
        "✅ Plenty of space available."
    } else {
        "📊 Normal operations."
    }
}

fn totals_reply<R: Rng + ?Sized>(gates: &[Gate], stamp: &str, rng: &mut R) -> ChatReply {
    let totals = Totals::of(gates);
    let people = format_count(totals.total_people);
    let capacity = format_count(totals.total_capacity);
    let rate = totals.utilization_rate;

    let text = match rng.gen_range(0..3) {
        0 => format!(
            "Stadium overview ({}): **{} attendees** across all gates. Total capacity utilization: {}% ({} max).",
            stamp, people, rate, capacity
        ),
        1 => format!(
            "Real-time totals: **{} people** currently in venue. Overall capacity: {}% of {} maximum.",
            people, rate, capacity
        ),
        _ => format!(
            "Current stadium status: **{} total attendees**. Facility running at {}% capacity out of {} total.",
            people, rate, capacity
        ),
    };

    ChatReply::new(
        QueryIntent::Totals,
        format!("{} {}", text, utilization_tag(rate)),
        Some(json!(totals)),
        rate > 90,
    )
}

fn status_reply(gates: &[Gate]) -> ChatReply {
    let lines: Vec<String> = gates
        .iter()
        .map(|g| {
            format!(
                "{}: {} people ({}% full, {})",
                g.name,
                format_count(u64::from(g.current_count)),
                g.percent_of_capacity(),
                g.status
            )
        })
        .collect();

    let critical = gates
        .iter()
        .filter(|g| g.status == GateStatus::Critical)
        .count();
    let summary = if critical > 0 {
        format!("⚠️ {} gate(s) require immediate attention!", critical)
    } else {
        "✅ All gates operating normally.".to_string()
    };

    let data: Vec<Value> = gates
        .iter()
        .map(|g| json!({ "name": g.name, "count": g.current_count, "status": g.status }))
        .collect();

    ChatReply::new(
        QueryIntent::Status,
        format!("Current gate status:\n{}\n\n{}", lines.join("\n"), summary),
        Some(Value::Array(data)),
        critical > 0,
    )
}

fn gates_with_status(gates: &[Gate], status: GateStatus) -> Vec<&Gate> {
    gates.iter().filter(|g| g.status == status).collect()
}

fn alerts_reply(gates: &[Gate]) -> ChatReply {
    let critical = gates_with_status(gates, GateStatus::Critical);
    let moderate = gates_with_status(gates, GateStatus::Moderate);

    if !critical.is_empty() {
        let verb = if critical.len() == 1 { "is" } else { "are" };
        return ChatReply::new(
            QueryIntent::Alerts,
            format!(
                "🚨 **CRITICAL ALERT:** {} {} over capacity! Immediate crowd control measures needed. Consider redirecting attendees to other gates.",
                join_names(critical.iter().map(|g| g.name.as_str())),
                verb
            ),
            Some(json!(critical)),
            true,
        );
    }

    if !moderate.is_empty() {
        return ChatReply::new(
            QueryIntent::Alerts,
            format!(
                "⚡ Moderate crowd levels detected at {} gate(s). Monitor closely but no immediate action required.",
                moderate.len()
            ),
            Some(json!(moderate)),
            false,
        );
    }

    ChatReply::new(
        QueryIntent::Alerts,
        "✅ No active alerts. All gates are operating within normal capacity limits.".to_string(),
        None,
        false,
    )
}

fn recommendation_reply(gates: &[Gate]) -> ChatReply {
    let critical = gates_with_status(gates, GateStatus::Critical);
    let normal = gates_with_status(gates, GateStatus::Normal);

    if !critical.is_empty() && !normal.is_empty() {
        return ChatReply::new(
            QueryIntent::Recommendation,
            format!(
                "💡 **Recommendation:** Redirect traffic from overcrowded gates ({}) to available gates ({}). This will help balance crowd distribution.",
                join_names(critical.iter().map(|g| g.name.as_str())),
                join_names(normal.iter().map(|g| g.name.as_str()))
            ),
            Some(json!({ "criticalGates": critical, "normalGates": normal })),
            true,
        );
    }

    if normal.is_empty() {
        return ChatReply::new(
            QueryIntent::Recommendation,
            "⚠️ All gates are experiencing high traffic. Consider opening additional entry points or implementing crowd control measures.".to_string(),
            None,
            true,
        );
    }

    ChatReply::new(
        QueryIntent::Recommendation,
        "✅ Crowd distribution is well balanced. Continue monitoring for optimal flow management."
            .to_string(),
        None,
        false,
    )
}

/// Stateful front for `respond`: owns the phrasing random source and reads the clock
pub struct ChatResponder {
    rng: Mutex<StdRng>,
}

impl ChatResponder {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    pub fn reply(&self, message: &str, gates: &[Gate]) -> ChatReply {
        let mut rng = self.rng.lock().expect("responder rng lock poisoned");
        respond(message, gates, Local::now().time(), &mut *rng)
    }
}

impl Default for ChatResponder {
    fn default() -> Self {
        Self::new(None)
    }
}
