//! Heuristic classifier: deterministic keyword routing.
//!
//! Rules are an ordered list; the first rule whose trigger fires decides the
//! action. Specific compounds ("furnace lining", "maintenance cost") sit
//! ahead of the broad words they contain ("price", "cost", "maintenance").

use sahayak_core::action::{Action, ActionCandidate};
use sahayak_core::keywords::Words;
use sahayak_core::turn::Turn;
use sahayak_tools::known_asset;

/// News topic used when the query names no asset or sector.
pub const DEFAULT_NEWS_TOPIC: &str = "foundry industry";

/// What makes a rule fire.
#[derive(Debug, Clone, Copy)]
pub enum Trigger {
    /// The whole query is small talk (or empty).
    SmallTalk,
    /// "what about X" / "and X" right after a market or news turn.
    FollowUp,
    /// Any of these phrases appears as whole words.
    AnyPhrase(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub trigger: Trigger,
    pub action: Action,
}

const SMALL_TALK: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "hi there",
    "hello there",
    "good morning",
    "good afternoon",
    "good evening",
    "namaste",
    "thanks",
    "thank you",
    "thank you so much",
    "ok",
    "okay",
    "bye",
    "help",
    "what can you do",
    "who are you",
    "what are you",
    "how can you help",
    "how can you help me",
];

const FOLLOW_UP_LEADS: &[&str] = &["what about", "how about", "and", "also", "now"];

const SOP_COMPOUNDS: &[&str] = &[
    "furnace lining",
    "ladle preheat",
    "ladle preheating",
    "refractory",
    "lockout",
    "tagout",
    "ppe",
    "personal protective",
    "emergency",
    "spill",
    "burn injury",
];

const DATABASE_COMPOUNDS: &[&str] = &[
    "maintenance cost",
    "maintenance costs",
    "repair cost",
    "repair costs",
    "downtime",
    "inventory value",
    "stock value",
    "scrap rate",
    "rejection rate",
    "defect rate",
    "production cost",
];

const MARKET_WORDS: &[&str] = &[
    "price",
    "prices",
    "pricing",
    "cost",
    "costs",
    "quote",
    "exchange rate",
    "share price",
    "stock price",
    "trading at",
];

const NEWS_WORDS: &[&str] = &[
    "news",
    "headline",
    "headlines",
    "announcement",
    "announcements",
    "trend",
    "trends",
    "what s happening",
];

const SOP_WORDS: &[&str] = &[
    "procedure",
    "procedures",
    "sop",
    "sops",
    "standard operating",
    "safety",
    "guideline",
    "guidelines",
    "protocol",
    "checklist",
    "instructions",
    "how to",
    "how do i",
    "how should",
];

const DATABASE_NOUNS: &[&str] = &[
    "production",
    "production orders",
    "work orders",
    "orders",
    "inventory",
    "stock movements",
    "maintenance",
    "inspection",
    "inspections",
    "quality",
    "defect",
    "defects",
    "scrap",
    "heats",
    "heat records",
    "castings",
    "casting records",
    "molding",
    "moulding",
    "machining",
    "heat treatment",
    "heat treatments",
    "bom",
    "bill of materials",
    "material master",
    "materials",
    "yield",
];

/// The rule list, in priority order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "small_talk",
        trigger: Trigger::SmallTalk,
        action: Action::Conversational,
    },
    Rule {
        name: "follow_up",
        trigger: Trigger::FollowUp,
        // Placeholder; a follow-up inherits the previous turn's action.
        action: Action::MarketData,
    },
    Rule {
        name: "sop_compound",
        trigger: Trigger::AnyPhrase(SOP_COMPOUNDS),
        action: Action::ProcedureSearch,
    },
    Rule {
        name: "database_compound",
        trigger: Trigger::AnyPhrase(DATABASE_COMPOUNDS),
        action: Action::DatabaseQuery,
    },
    Rule {
        name: "market",
        trigger: Trigger::AnyPhrase(MARKET_WORDS),
        action: Action::MarketData,
    },
    Rule {
        name: "news",
        trigger: Trigger::AnyPhrase(NEWS_WORDS),
        action: Action::News,
    },
    Rule {
        name: "procedure",
        trigger: Trigger::AnyPhrase(SOP_WORDS),
        action: Action::ProcedureSearch,
    },
    Rule {
        name: "database_noun",
        trigger: Trigger::AnyPhrase(DATABASE_NOUNS),
        action: Action::DatabaseQuery,
    },
];

/// Sectors recognized as news topics.
const NEWS_TOPICS: &[&str] = &[
    "automotive",
    "auto",
    "renewable",
    "energy",
    "manufacturing",
    "mining",
    "construction",
    "aerospace",
    "railway",
    "foundry",
    "casting",
    "metals",
];

/// A rule hit: which rule fired and the candidate it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeuristicMatch {
    pub rule: &'static str,
    pub candidate: ActionCandidate,
}

#[derive(Debug, Clone, Copy)]
pub struct HeuristicClassifier {
    rules: &'static [Rule],
}

impl Default for HeuristicClassifier {
    fn default() -> Self {
        Self { rules: RULES }
    }
}

impl HeuristicClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifier over a custom rule list (same first-match-wins walk).
    pub fn with_rules(rules: &'static [Rule]) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        self.rules
    }

    /// First matching rule's candidate, or `None` (no match).
    ///
    /// `recent` is the session's recent turns, oldest first.
    pub fn classify(&self, query: &str, recent: &[Turn]) -> Option<HeuristicMatch> {
        let words = Words::new(query);

        for rule in self.rules {
            let action = match rule.trigger {
                Trigger::SmallTalk => {
                    (words.is_empty() || SMALL_TALK.iter().any(|p| words.is_exactly(p)))
                        .then_some(rule.action)
                }
                Trigger::FollowUp => follow_up_action(&words, query, recent),
                Trigger::AnyPhrase(phrases) => words.contains_any(phrases).then_some(rule.action),
            };

            if let Some(action) = action {
                return Some(HeuristicMatch {
                    rule: rule.name,
                    candidate: ActionCandidate::heuristic(action, argument_for(action, query)),
                });
            }
        }
        None
    }
}

fn follow_up_action(words: &Words, query: &str, recent: &[Turn]) -> Option<Action> {
    let previous = recent.last()?.chosen_action;
    if !matches!(previous, Action::MarketData | Action::News) {
        return None;
    }
    let starts_with_lead = FOLLOW_UP_LEADS
        .iter()
        .any(|lead| words.find_phrase(lead) == Some(0));
    // Short elliptical questions only; longer ones go through the normal rules.
    if starts_with_lead && words.len() <= 5 && known_asset(query).is_some() {
        Some(previous)
    } else {
        None
    }
}

/// The argument handed to the action for a heuristic match.
pub fn argument_for(action: Action, query: &str) -> String {
    match action {
        Action::MarketData => known_asset(query)
            .map(str::to_string)
            .unwrap_or_else(|| query.trim().to_string()),
        Action::News => news_topic(query),
        Action::ProcedureSearch | Action::DatabaseQuery | Action::Conversational => {
            query.trim().to_string()
        }
    }
}

/// First known asset or sector in `query`, else [`DEFAULT_NEWS_TOPIC`].
pub fn news_topic(query: &str) -> String {
    if let Some(asset) = known_asset(query) {
        return asset.to_string();
    }
    let words = Words::new(query);
    words
        .first_of(NEWS_TOPICS)
        .map(|topic| match topic {
            "foundry" | "casting" => DEFAULT_NEWS_TOPIC.to_string(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| DEFAULT_NEWS_TOPIC.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sahayak_core::action::CandidateSource;

    fn classify(query: &str) -> Option<HeuristicMatch> {
        HeuristicClassifier::new().classify(query, &[])
    }

    fn action_of(query: &str) -> Option<Action> {
        classify(query).map(|m| m.candidate.action)
    }

    fn turn(action: Action, argument: &str) -> Turn {
        Turn {
            query: format!("{argument} {action}"),
            chosen_action: action,
            action_argument: argument.into(),
            raw_result: None,
            final_response: "ok".into(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn price_keyword_routes_to_market_data() {
        let hit = classify("Copper price today").unwrap();
        assert_eq!(hit.rule, "market");
        assert_eq!(hit.candidate.action, Action::MarketData);
        assert_eq!(hit.candidate.argument, "copper");
        assert_eq!(hit.candidate.source, CandidateSource::Heuristic);
    }

    #[test]
    fn average_tap_temperature_is_no_match() {
        assert!(classify("What is the average tap temperature?").is_none());
    }

    #[test]
    fn first_match_wins_across_rules() {
        // Both "price" (market) and "news" (news) fire; market is earlier.
        assert_eq!(action_of("steel price and news"), Some(Action::MarketData));
        // "news" and "safety" both fire; news is earlier than procedures.
        assert_eq!(action_of("news about foundry safety"), Some(Action::News));
    }

    #[test]
    fn specific_compounds_beat_broad_words() {
        assert_eq!(
            action_of("furnace lining cost guideline"),
            Some(Action::ProcedureSearch)
        );
        assert_eq!(
            action_of("total maintenance cost by equipment"),
            Some(Action::DatabaseQuery)
        );
        assert_eq!(action_of("current scrap rate"), Some(Action::DatabaseQuery));
    }

    #[test]
    fn word_boundaries_are_respected() {
        // "costly" and "newsletter" are not "cost" / "news".
        assert_eq!(action_of("costly newsletter"), None);
        assert_eq!(action_of("sopwith camel"), None);
    }

    #[test]
    fn procedures_and_database_nouns() {
        assert_eq!(
            action_of("What is the SOP for ladle handling?"),
            Some(Action::ProcedureSearch)
        );
        assert_eq!(
            action_of("Show recent maintenance orders"),
            Some(Action::DatabaseQuery)
        );
        assert_eq!(action_of("how many castings"), Some(Action::DatabaseQuery));
    }

    #[test]
    fn small_talk_and_empty_are_conversational() {
        assert_eq!(action_of("Hello!"), Some(Action::Conversational));
        assert_eq!(action_of("   "), Some(Action::Conversational));
        assert_eq!(action_of("What can you do?"), Some(Action::Conversational));
        // A greeting followed by a real question is not small talk.
        assert_eq!(action_of("hello, copper price?"), Some(Action::MarketData));
    }

    #[test]
    fn news_topic_extraction() {
        assert_eq!(classify("latest steel news").unwrap().candidate.argument, "steel");
        assert_eq!(
            classify("any mining news?").unwrap().candidate.argument,
            "mining"
        );
        assert_eq!(
            classify("news please").unwrap().candidate.argument,
            DEFAULT_NEWS_TOPIC
        );
    }

    #[test]
    fn follow_up_inherits_previous_market_turn() {
        let recent = vec![turn(Action::MarketData, "copper")];
        let hit = HeuristicClassifier::new()
            .classify("What about aluminium?", &recent)
            .unwrap();
        assert_eq!(hit.rule, "follow_up");
        assert_eq!(hit.candidate.action, Action::MarketData);
        assert_eq!(hit.candidate.argument, "aluminum");
    }

    #[test]
    fn follow_up_inherits_previous_news_turn() {
        let recent = vec![turn(Action::News, "steel")];
        let hit = HeuristicClassifier::new()
            .classify("and gold?", &recent)
            .unwrap();
        assert_eq!(hit.candidate.action, Action::News);
        assert_eq!(hit.candidate.argument, "gold");
    }

    #[test]
    fn follow_up_needs_market_or_news_context() {
        let recent = vec![turn(Action::DatabaseQuery, "heats")];
        assert!(
            HeuristicClassifier::new()
                .classify("what about copper", &recent)
                .is_none()
        );
        assert!(classify("what about copper").is_none());
    }

    #[test]
    fn generic_records_question_is_left_to_the_classifier() {
        let recent = vec![turn(Action::DatabaseQuery, "heats poured yesterday")];
        assert!(
            HeuristicClassifier::new()
                .classify("show me the last 5 records", &recent)
                .is_none()
        );
        assert_eq!(action_of("show me the last 5 heat records"), Some(Action::DatabaseQuery));
    }

    #[test]
    fn custom_rule_order_is_honored() {
        static NEWS_FIRST: &[Rule] = &[
            Rule {
                name: "news",
                trigger: Trigger::AnyPhrase(&["news"]),
                action: Action::News,
            },
            Rule {
                name: "market",
                trigger: Trigger::AnyPhrase(&["price"]),
                action: Action::MarketData,
            },
        ];
        let hit = HeuristicClassifier::with_rules(NEWS_FIRST)
            .classify("steel price and news", &[])
            .unwrap();
        assert_eq!(hit.rule, "news");
    }
}
