pub mod blaze_css;
pub mod owned_css;
pub mod pruner;
pub mod selector;
pub mod whitelist;

pub use blaze_css::parse_stylesheet;
pub use owned_css::{OwnedRule, OwnedStyleRule, OwnedStylesheet};
pub use pruner::{PruneDecision, PruneOptions, PruneOutcome, SelectorPruner};
pub use whitelist::Whitelist;
