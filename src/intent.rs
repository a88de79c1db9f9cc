// 🏷️ Intent Rules - Keyword rules as data
// Ordered (intent, keywords) pairs; the first rule with a keyword hit wins

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

// ============================================================================
// INTENT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CheckBalance,
    GetPricing,
    ContactSupport,
    GetHours,
    GetPaymentMethods,
    ResetPassword,
    /// Fallback when no rule fires; answered from the FAQ table
    GeneralQuery,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::CheckBalance => "check_balance",
            Intent::GetPricing => "get_pricing",
            Intent::ContactSupport => "contact_support",
            Intent::GetHours => "get_hours",
            Intent::GetPaymentMethods => "get_payment_methods",
            Intent::ResetPassword => "reset_password",
            Intent::GeneralQuery => "general_query",
        }
    }

    pub fn all() -> [Intent; 7] {
        [
            Intent::CheckBalance,
            Intent::GetPricing,
            Intent::ContactSupport,
            Intent::GetHours,
            Intent::GetPaymentMethods,
            Intent::ResetPassword,
            Intent::GeneralQuery,
        ]
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone)]
pub struct IntentRule {
    pub intent: Intent,

    /// Lowercase substrings; any one of them triggers the rule
    pub keywords: &'static [&'static str],
}

impl IntentRule {
    /// First keyword of this rule contained in `text_lower`, if any
    pub fn matched_keyword(&self, text_lower: &str) -> Option<&'static str> {
        self.keywords
            .iter()
            .copied()
            .find(|keyword| text_lower.contains(keyword))
    }

    pub fn matches(&self, text_lower: &str) -> bool {
        self.matched_keyword(text_lower).is_some()
    }
}

/// Built-in rules in evaluation order.
///
/// "how much" sits in both the balance and the pricing rule. Balance is
/// listed first, so it takes every query containing that phrase.
pub const DEFAULT_RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::CheckBalance,
        keywords: &["balance", "account balance", "how much", "money", "funds"],
    },
    IntentRule {
        intent: Intent::GetPricing,
        keywords: &["price", "pricing", "cost", "how much", "plan", "subscription"],
    },
    IntentRule {
        intent: Intent::ContactSupport,
        keywords: &["contact", "support", "help", "speak", "talk", "customer service"],
    },
    IntentRule {
        intent: Intent::GetHours,
        keywords: &["hours", "open", "when", "time", "available"],
    },
    IntentRule {
        intent: Intent::GetPaymentMethods,
        keywords: &["payment", "pay", "method", "card", "credit", "debit"],
    },
    IntentRule {
        intent: Intent::ResetPassword,
        keywords: &["password", "reset", "forgot", "change password"],
    },
];

// ============================================================================
// DETECTOR
// ============================================================================

pub struct IntentDetector {
    rules: Vec<IntentRule>,
}

impl IntentDetector {
    pub fn new() -> Self {
        Self::from_rules(DEFAULT_RULES.to_vec())
    }

    /// Rules are evaluated in the order given; there is no priority field.
    pub fn from_rules(rules: Vec<IntentRule>) -> Self {
        IntentDetector { rules }
    }

    /// Winning rule's intent together with the keyword that fired it.
    pub fn matched_keyword(&self, text: &str) -> Option<(Intent, &'static str)> {
        let text_lower = text.to_lowercase();

        self.rules.iter().find_map(|rule| {
            rule.matched_keyword(&text_lower)
                .map(|keyword| (rule.intent, keyword))
        })
    }

    pub fn detect(&self, text: &str) -> Intent {
        match self.matched_keyword(text) {
            Some((intent, keyword)) => {
                debug!(%intent, keyword, "intent rule matched");
                intent
            }
            None => {
                debug!("no intent rule matched, falling back to general_query");
                Intent::GeneralQuery
            }
        }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl Default for IntentDetector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
