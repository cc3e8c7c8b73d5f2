use crate::types::{Confidence, Intent};
use regex::Regex;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Classification (output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    pub confidence: Confidence,
}

// ---------------------------------------------------------------------------
// IntentRule
// ---------------------------------------------------------------------------

/// One scored intent category: its score is how many of its patterns match
/// the normalized message. Table order is the stable tie-break order.
struct IntentRule {
    intent: Intent,
    patterns: Vec<Regex>,
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("intent pattern must compile"))
        .collect()
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

pub struct Classifier {
    confirm: Regex,
    reject: Regex,
    rules: Vec<IntentRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    pub fn new() -> Self {
        // Exact-phrase groups, optionally followed by punctuation. These must
        // short-circuit: a bare "yes" carries no other signal to score.
        let confirm = Regex::new(
            r"^(yes|yeah|yep|y|ok|okay|sure|confirm|confirmed|go ahead|do it|haan|ha)[\s.!]*$",
        )
        .expect("confirm pattern must compile");
        let reject = Regex::new(
            r"^(no|nope|nah|n|cancel|cancel it|stop|reject|don't|dont|nahi)[\s.!]*$",
        )
        .expect("reject pattern must compile");

        let rules = vec![
            IntentRule {
                intent: Intent::AddLot,
                patterns: compile(&[
                    r"\badd\b.*\b(lot|stock|bags?)\b",
                    r"\badd \d",
                    r"\bstore\b.*\b(quintal|qtl|kg|ton|of)\b",
                    r"\bnew (lot|stock|arrival)\b",
                    r"\bquintals? of\b",
                    r"\bstock in\b",
                ]),
            },
            IntentRule {
                intent: Intent::AddWarehouse,
                patterns: compile(&[
                    r"\b(add|create|register|new|build)\b.*\b(warehouse|godown|facility)\b",
                    r"\b(warehouse|godown)\b.*\b(called|named)\b",
                    r"\bcold storage\b",
                ]),
            },
            IntentRule {
                intent: Intent::UpdateLotStatus,
                patterns: compile(&[
                    r"\bmark\b",
                    r"\b(sold|dispatched?|shipped)\b",
                    r"\bupdate\b.*\b(status|condition|lot)\b",
                    r"\bchange\b.*\b(status|condition)\b",
                    r"\b(spoiled|rotten|at risk)\b",
                ]),
            },
            IntentRule {
                intent: Intent::DeleteLot,
                patterns: compile(&[
                    r"\b(delete|remove|discard|scrap)\b.*\b(lot|stock|entry)\b",
                    r"\bthrow (away|out)\b",
                    r"\bget rid of\b",
                ]),
            },
            IntentRule {
                intent: Intent::ViewLots,
                patterns: compile(&[
                    r"\b(show|list|view|see|check)\b.*\b(lots?|stocks?|inventory)\b",
                    r"\bmy (lots?|stock|inventory)\b",
                    r"\bwhat\b.*\b(stored|stock)\b",
                ]),
            },
            IntentRule {
                intent: Intent::ViewWarehouses,
                patterns: compile(&[
                    r"\b(show|list|view|see)\b.*\b(warehouses?|godowns?|facilities)\b",
                    r"\bmy (warehouses?|godowns?|facilities)\b",
                    r"\bcapacity\b",
                ]),
            },
            IntentRule {
                intent: Intent::ViewAlerts,
                patterns: compile(&[
                    r"\balerts?\b",
                    r"\bwarnings?\b",
                    r"\bany (problems?|issues?)\b",
                ]),
            },
            IntentRule {
                intent: Intent::ViewSummary,
                patterns: compile(&[
                    r"\bsummary\b",
                    r"\boverview\b",
                    r"\breport\b",
                    r"\bhow much\b.*\b(stock|stored|space)\b",
                ]),
            },
            IntentRule {
                intent: Intent::ViewConditions,
                patterns: compile(&[
                    r"\bconditions?\b",
                    r"\btemperature\b",
                    r"\bhumidity\b",
                    r"\bweather\b",
                    r"\b(spoilage )?risk\b",
                ]),
            },
        ];

        Self {
            confirm,
            reject,
            rules,
        }
    }

    /// Classify one message. Never fails: an unmatched message is `general`
    /// at low confidence.
    pub fn classify(&self, message: &str) -> Classification {
        let text = message.trim().to_lowercase();

        // Consent replies first, so a short "yes" is never shadowed by the
        // scored categories.
        if self.confirm.is_match(&text) {
            return Classification {
                intent: Intent::ConfirmAction,
                confidence: Confidence::High,
            };
        }
        if self.reject.is_match(&text) {
            return Classification {
                intent: Intent::RejectAction,
                confidence: Confidence::High,
            };
        }

        let scores: Vec<usize> = self
            .rules
            .iter()
            .map(|rule| rule.patterns.iter().filter(|p| p.is_match(&text)).count())
            .collect();

        let max = scores.iter().copied().max().unwrap_or(0);
        if max == 0 {
            return Classification {
                intent: Intent::General,
                confidence: Confidence::Low,
            };
        }

        // Among the categories tied at the max, a mutation beats a view:
        // a prompted-and-cancelled mutation is recoverable, a silently
        // ignored one is not.
        let tied = || {
            self.rules
                .iter()
                .zip(&scores)
                .filter(move |(_, s)| **s == max)
        };
        let intent = tied()
            .find(|(rule, _)| rule.intent.is_mutation())
            .or_else(|| tied().next())
            .map(|(rule, _)| rule.intent)
            .unwrap_or(Intent::General);

        let confidence = if max >= 2 {
            Confidence::High
        } else {
            Confidence::Medium
        };
        Classification { intent, confidence }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
