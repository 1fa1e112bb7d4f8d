//! Tallies a respondent's selections into per-party percentages and picks the
//! best matching party.

use std::collections::{BTreeMap, HashMap};

use super::{QuizOption, QuizWithQuestions};

/// Party tags every submission is scored against. Tags discovered in the quiz
/// data extend this enumeration at scoring time, in encounter order.
pub const PARTIES: [&str; 12] = [
    "CDU",
    "GRÜNE",
    "SPD",
    "FDP",
    "AfD",
    "DIE LINKE",
    "Freie Wähler",
    "ÖDP",
    "Die PARTEI",
    "Volt",
    "Tierschutzpartei",
    "Klimaliste BW",
];

/// Sentinel for options that lean towards no party, and the matched party of
/// a submission where nothing scored.
pub const NEUTRAL: &str = "Neutral";

const AGREE_LABEL: &str = "Stimme zu";
const NEUTRAL_LABEL: &str = "Neutral";

/// Question id (stringly keyed, as submitted) to selected option id.
pub type AnswerSet = HashMap<String, i64>;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, serde::Serialize, serde::Deserialize,
)]
pub enum WeightPolicy {
    /// Two points for an agreement label, one for neutral, zero otherwise.
    AgreementLabel,
    /// Whatever the option row stores in its points column.
    StoredPoints,
}

impl WeightPolicy {
    fn weight(&self, option: &QuizOption) -> i64 {
        match self {
            WeightPolicy::AgreementLabel => match option.text.as_str() {
                AGREE_LABEL => 2,
                NEUTRAL_LABEL => 1,
                _ => 0,
            },
            WeightPolicy::StoredPoints => option.points.unwrap_or(1),
        }
    }
}

// clap needs this to render the default value
impl std::fmt::Display for WeightPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeightPolicy::AgreementLabel => write!(f, "agreement-label"),
            WeightPolicy::StoredPoints => write!(f, "stored-points"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreOutcome {
    pub matched_party: String,
    pub party_scores: BTreeMap<String, i64>,
}

/// Scores a submission against a fully loaded quiz.
///
/// Answers pointing at options that do not belong to their question are a
/// caller error and are dropped silently. Percentages are independent
/// affinity scores normalized against the maximum of two points per question;
/// they do not have to sum to 100. The matched party is the first strictly
/// highest one in enumeration order, `Neutral` when every score is zero.
pub fn score(quiz: &QuizWithQuestions, answers: &AnswerSet, policy: WeightPolicy) -> ScoreOutcome {
    let mut party_order: Vec<String> = PARTIES.iter().map(|party| (*party).to_owned()).collect();
    let mut raw_scores: HashMap<String, i64> = party_order
        .iter()
        .map(|party| (party.to_owned(), 0))
        .collect();

    for entry in &quiz.questions {
        let option = answers
            .get(&entry.question.id.to_string())
            .and_then(|selected| entry.options.iter().find(|option| option.id == *selected));
        let option = match option {
            Some(option) => option,
            None => continue,
        };
        if option.party_affiliation == NEUTRAL {
            continue;
        }
        if !raw_scores.contains_key(&option.party_affiliation) {
            party_order.push(option.party_affiliation.to_owned());
        }
        *raw_scores
            .entry(option.party_affiliation.to_owned())
            .or_insert(0) += policy.weight(option);
    }

    let total_possible = quiz.questions.len() as i64 * 2;
    let mut party_scores = BTreeMap::new();
    let mut matched_party = NEUTRAL.to_owned();
    let mut max_score = 0;
    for party in &party_order {
        let raw = raw_scores.get(party).copied().unwrap_or(0);
        let percentage = if total_possible == 0 {
            0
        } else {
            (((raw as f64 / total_possible as f64) * 100.0).round() as i64).clamp(0, 100)
        };
        if percentage > max_score {
            max_score = percentage;
            matched_party = party.to_owned();
        }
        party_scores.insert(party.to_owned(), percentage);
    }

    ScoreOutcome {
        matched_party,
        party_scores,
    }
}
