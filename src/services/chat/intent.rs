use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;

/// What a message is asking for. A single message can carry several of
/// these at once ("show me more hoodies" is both a follow-up and a search).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Intent {
    ProductSearch,
    PurchaseIntent,
    PurchaseHistoryQuery,
    SpecificProductHistoryQuery,
    CartManagement,
    FollowUp,
    PlainChat,
}

/// Intents that require authoritative state (cart, purchase history) to be
/// fetched before the AI is consulted, in precedence order for context
/// assembly.
const SYSTEM_ACTION_PRIORITY: [Intent; 4] = [
    Intent::PurchaseIntent,
    Intent::PurchaseHistoryQuery,
    Intent::SpecificProductHistoryQuery,
    Intent::CartManagement,
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntentSet(BTreeSet<Intent>);

impl IntentSet {
    pub fn contains(&self, intent: Intent) -> bool {
        self.0.contains(&intent)
    }

    /// Inserting a real intent displaces the PlainChat default.
    pub fn insert(&mut self, intent: Intent) {
        if intent != Intent::PlainChat {
            self.0.remove(&Intent::PlainChat);
        }
        self.0.insert(intent);
    }

    pub fn is_plain_chat(&self) -> bool {
        self.0.contains(&Intent::PlainChat)
    }

    /// The highest-priority system-action intent present, if any.
    pub fn system_action(&self) -> Option<Intent> {
        SYSTEM_ACTION_PRIORITY
            .iter()
            .copied()
            .find(|intent| self.0.contains(intent))
    }
}

const PURCHASE_PHRASES: &[&str] = &[
    "i want to buy",
    "i'd like to buy",
    "i will buy",
    "i'll buy",
    "buy it",
    "buy this",
    "buy that",
    "i'll take",
    "i will take",
    "take this one",
    "add to cart",
    "add it to my cart",
    "add this to my cart",
    "add to my cart",
    "yes add",
    "yes, add",
    "purchase this",
    "purchase it",
    "i want to purchase",
    "order it",
    "order this",
    "i want this",
    "i want it",
];

const HISTORY_PHRASES: &[&str] = &[
    "what did i buy",
    "what have i bought",
    "what did i order",
    "what did i purchase",
    "purchase history",
    "order history",
    "my orders",
    "my purchases",
    "previous orders",
    "previous purchases",
    "past purchases",
    "bought before",
    "purchased before",
];

const SPECIFIC_HISTORY_PHRASES: &[&str] = &[
    "have i bought this",
    "have i bought it",
    "have i bought that",
    "did i buy this",
    "did i buy it",
    "did i buy that",
    "have i purchased this",
    "have i purchased it",
    "did i already buy",
    "have i already bought",
    "how many times have i bought",
    "how many of these have i bought",
    "when did i last buy",
    "when did i buy",
];

const CART_PHRASES: &[&str] = &[
    "my cart",
    "my basket",
    "the cart",
    "in my cart",
    "show cart",
    "view cart",
    "open cart",
    "remove from cart",
    "remove it from",
    "take it out",
    "take that out",
    "empty my cart",
    "clear my cart",
    "update my cart",
    "change the quantity",
];

const FOLLOW_UP_PHRASES: &[&str] = &[
    "show me more",
    "more options",
    "more like",
    "what else",
    "anything else",
    "any other",
    "something else",
    "other options",
    "similar",
    "alternatives",
];

const SPECIFIC_SEARCH_PHRASES: &[&str] = &[
    "do you have",
    "do you sell",
    "do you carry",
    "show me",
    "find me",
    "search for",
    "looking for",
    "i'm searching",
];

const DETAILED_REQUIREMENT_PHRASES: &[&str] = &[
    "i need",
    "i want a",
    "i want an",
    "i want some",
    "recommend",
    "suggest",
    "advice",
    "help me choose",
    "help me find",
    "help me pick",
    "which one",
    "best for",
];

lazy_static! {
    static ref QUANTITY_RE: Regex = Regex::new(r"\b(\d{1,3})\b").unwrap();
    static ref LINK_RE: Regex = Regex::new(r"https?://[^\s]+").unwrap();
}

fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| text.contains(phrase))
}

/// Pure keyword classification over the message alone. Non-exclusive:
/// every matching intent is recorded; nothing matching defaults to
/// PlainChat.
pub fn classify(message: &str) -> IntentSet {
    let text = message.to_lowercase();
    let mut intents = IntentSet::default();

    if contains_any(&text, PURCHASE_PHRASES) {
        intents.insert(Intent::PurchaseIntent);
    }
    if contains_any(&text, SPECIFIC_HISTORY_PHRASES) {
        intents.insert(Intent::SpecificProductHistoryQuery);
    }
    if contains_any(&text, HISTORY_PHRASES) {
        intents.insert(Intent::PurchaseHistoryQuery);
    }
    if contains_any(&text, CART_PHRASES) {
        intents.insert(Intent::CartManagement);
    }
    if contains_any(&text, FOLLOW_UP_PHRASES) {
        intents.insert(Intent::FollowUp);
        intents.insert(Intent::ProductSearch);
    }
    if contains_any(&text, SPECIFIC_SEARCH_PHRASES)
        || contains_any(&text, DETAILED_REQUIREMENT_PHRASES)
    {
        intents.insert(Intent::ProductSearch);
    }

    if intents.0.is_empty() {
        intents.insert(Intent::PlainChat);
    }
    intents
}

/// A short message right after an assistant question is treated as the
/// answer to a consultation ("What color do you prefer?" -> "blue"), which
/// makes it a product search.
pub fn is_consultation_answer(message: &str, last_assistant: Option<&str>) -> bool {
    let Some(previous) = last_assistant else {
        return false;
    };
    previous.trim_end().ends_with('?') && message.split_whitespace().count() <= 8
}

/// First small integer in the message, default 1.
pub fn extract_quantity(message: &str) -> i32 {
    QUANTITY_RE
        .captures(message)
        .and_then(|caps| caps[1].parse::<i32>().ok())
        .filter(|quantity| *quantity >= 1)
        .unwrap_or(1)
}

pub fn detect_link(message: &str) -> Option<String> {
    LINK_RE.find(message).map(|m| m.as_str().to_string())
}
