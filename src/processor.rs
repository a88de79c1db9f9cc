// 🎙️ Query Processor - text in, response out
// Detects the intent, then answers from a canned string, the account table or the FAQ table

use crate::error::{BotError, Result};
use crate::faq;
use crate::intent::{Intent, IntentDetector};
use crate::store::KnowledgeStore;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};

// ============================================================================
// ENVELOPES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response_text: String,
    pub intent: Intent,
    /// Audit string describing how the response was produced
    pub action_taken: String,
}

impl QueryResponse {
    fn new(response_text: impl Into<String>, intent: Intent, action_taken: &str) -> Self {
        Self {
            response_text: response_text.into(),
            intent,
            action_taken: action_taken.to_string(),
        }
    }
}

// ============================================================================
// CANNED RESPONSES
// ============================================================================

pub const PRICING_RESPONSE: &str = "Our basic plan starts at $29 per month. Premium plans are available at $79 per month and Enterprise at $199 per month. Would you like more details about any specific plan?";
pub const SUPPORT_RESPONSE: &str = "You can contact our support team via email at support@company.com or call us at 1-800-123-4567. Our support hours are Monday to Friday, 9 AM to 6 PM EST.";
pub const HOURS_RESPONSE: &str =
    "We are open Monday to Friday from 9 AM to 6 PM Eastern Standard Time.";
pub const PAYMENT_METHODS_RESPONSE: &str =
    "We accept all major credit cards, PayPal, and bank transfers.";
pub const PASSWORD_RESET_RESPONSE: &str = "You can reset your password by clicking 'Forgot Password' on the login page or visiting our password reset page. I can send you a reset link if you provide your email address.";
pub const ACCOUNT_NOT_FOUND_RESPONSE: &str =
    "I couldn't find your account. Please provide your username or account number.";
pub const FALLBACK_RESPONSE: &str = "I'm sorry, I didn't quite understand that. Could you please rephrase your question? I can help you with account balances, pricing, support contact, business hours, payment methods, and password resets.";

pub const ACTION_BALANCE_FOUND: &str = "Retrieved account balance from database";
pub const ACTION_BALANCE_MISSING: &str = "Account lookup failed";
pub const ACTION_FAQ_MATCHED: &str = "Matched FAQ from database";
pub const ACTION_NO_MATCH: &str = "No match found, provided general help";

pub const ACTION_PRICING: &str = "Retrieved pricing information";
pub const ACTION_SUPPORT: &str = "Provided contact information";
pub const ACTION_HOURS: &str = "Retrieved business hours";
pub const ACTION_PAYMENT_METHODS: &str = "Retrieved payment methods";
pub const ACTION_PASSWORD_RESET: &str = "Provided password reset instructions";

// ============================================================================
// USERNAME EXTRACTION
// ============================================================================

static USERNAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:account|user|username)\s+(\w+)").expect("Invalid regex")
});

/// Word following "account", "user" or "username" in the lowercased text.
///
/// Note that "my account balance" yields "balance"; the lookup then misses.
pub fn extract_username(text: &str) -> Option<String> {
    let text_lower = text.to_lowercase();
    USERNAME_PATTERN
        .captures(&text_lower)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

// ============================================================================
// PROCESSOR
// ============================================================================

pub struct QueryProcessor {
    store: Arc<dyn KnowledgeStore>,
    detector: IntentDetector,
    default_username: String,
}

impl QueryProcessor {
    pub fn new(store: Arc<dyn KnowledgeStore>) -> Self {
        Self {
            store,
            detector: IntentDetector::new(),
            default_username: "demo_user".to_string(),
        }
    }

    /// Account looked up when a balance query names no user.
    pub fn with_default_username(mut self, username: impl Into<String>) -> Self {
        self.default_username = username.into();
        self
    }

    pub fn with_detector(mut self, detector: IntentDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn store(&self) -> &dyn KnowledgeStore {
        self.store.as_ref()
    }

    pub fn detect_intent(&self, text: &str) -> Intent {
        self.detector.detect(text)
    }

    /// Answer a raw user query.
    ///
    /// Empty or whitespace-only text is rejected with `BotError::EmptyQuery`.
    /// Store failures surface as `BotError::Store`.
    pub fn process(&self, text: &str) -> Result<QueryResponse> {
        if text.trim().is_empty() {
            return Err(BotError::EmptyQuery);
        }

        let intent = self.detector.detect(text);

        let response = match intent {
            Intent::CheckBalance => self.lookup_balance(text)?,
            Intent::GetPricing => QueryResponse::new(PRICING_RESPONSE, intent, ACTION_PRICING),
            Intent::ContactSupport => QueryResponse::new(SUPPORT_RESPONSE, intent, ACTION_SUPPORT),
            Intent::GetHours => QueryResponse::new(HOURS_RESPONSE, intent, ACTION_HOURS),
            Intent::GetPaymentMethods => {
                QueryResponse::new(PAYMENT_METHODS_RESPONSE, intent, ACTION_PAYMENT_METHODS)
            }
            Intent::ResetPassword => {
                QueryResponse::new(PASSWORD_RESET_RESPONSE, intent, ACTION_PASSWORD_RESET)
            }
            Intent::GeneralQuery => self.search_faqs(text)?,
        };

        debug!(%intent, action = %response.action_taken, "query processed");
        Ok(response)
    }

    fn lookup_balance(&self, text: &str) -> Result<QueryResponse> {
        let username = extract_username(text).unwrap_or_else(|| self.default_username.clone());

        match self.store.find_account(&username)? {
            Some(account) => Ok(QueryResponse::new(
                format!(
                    "Your account balance for {} (Account: {}) is ${:.2}.",
                    account.username, account.account_number, account.balance
                ),
                Intent::CheckBalance,
                ACTION_BALANCE_FOUND,
            )),
            None => {
                warn!(username = %username, "balance requested for unknown account");
                Ok(QueryResponse::new(
                    ACCOUNT_NOT_FOUND_RESPONSE,
                    Intent::CheckBalance,
                    ACTION_BALANCE_MISSING,
                ))
            }
        }
    }

    fn search_faqs(&self, text: &str) -> Result<QueryResponse> {
        let faqs = self.store.list_faqs()?;

        let response = match faq::best_match(text, &faqs) {
            Some(found) => QueryResponse::new(
                found.faq.answer.clone(),
                Intent::GeneralQuery,
                ACTION_FAQ_MATCHED,
            ),
            None => QueryResponse::new(FALLBACK_RESPONSE, Intent::GeneralQuery, ACTION_NO_MATCH),
        };

        Ok(response)
    }
}

// ============================================================================
// TESTS
// ============================================================================
