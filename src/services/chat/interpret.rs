use super::intent::Intent;

/// What the orchestrator should do to the cart after reading the AI's
/// reply. The focus product and parsed quantity are supplied by the
/// orchestrator when applying AddToCart; removal always targets the most
/// recently added row, a deliberate simplification. Swapping in a
/// named-item variant is a policy change local to this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddToCart,
    RemoveMostRecentCartItem,
    NoOp,
}

/// Decides whether the AI's free-text reply committed to a cart mutation.
/// The lexical implementation below is the fallback signal extractor; a
/// structured action field from the upstream service would slot in behind
/// this same trait without touching the orchestrator.
pub trait ReplyInterpreter: Send + Sync {
    fn interpret(&self, intent: Option<Intent>, reply: &str) -> Action;
}

const ADD_SIGNALS: &[&str] = &[
    "added it",
    "added that",
    "i've added",
    "i have added",
    "it's in your cart",
    "is in your cart",
    "great choice",
    "excellent choice",
];

const CHECKMARKS: &[&str] = &["\u{2713}", "\u{2705}", "\u{2611}"];

const REMOVE_SIGNALS: &[&str] = &[
    "removed",
    "deleted",
    "reduced",
    "taken out",
    "took out",
    "cleared",
    "eliminado",
    "borrado",
];

/// Keyword matching over the reply text. False positives and negatives are
/// accepted operating policy; the AI's natural-language confirmation is the
/// source of truth for whether a mutation happens.
pub struct LexicalInterpreter;

impl ReplyInterpreter for LexicalInterpreter {
    fn interpret(&self, intent: Option<Intent>, reply: &str) -> Action {
        let text = reply.to_lowercase();
        match intent {
            Some(Intent::PurchaseIntent) => {
                let add_and_cart = text.contains("add") && text.contains("cart");
                let checkmark = CHECKMARKS.iter().any(|mark| reply.contains(mark));
                let affirmative = ADD_SIGNALS.iter().any(|signal| text.contains(signal));
                if add_and_cart || checkmark || affirmative {
                    Action::AddToCart
                } else {
                    Action::NoOp
                }
            }
            Some(Intent::CartManagement) => {
                if REMOVE_SIGNALS.iter().any(|signal| text.contains(signal)) {
                    Action::RemoveMostRecentCartItem
                } else {
                    Action::NoOp
                }
            }
            _ => Action::NoOp,
        }
    }
}
