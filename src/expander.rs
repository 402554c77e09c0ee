//! Parallel rewriting of a symbol string over a fixed number of generations.

use crate::error::{LSystemError, Result};
use crate::grammar::{Grammar, Rule};
use crate::symbol::{self, Module};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration for symbol expansion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExpanderConfig {
    /// Maximum length in bytes of any generation before expansion aborts.
    pub max_length: usize,
}

impl Default for ExpanderConfig {
    fn default() -> Self {
        Self {
            max_length: 4 * 1024 * 1024,
        }
    }
}

/// Rewrites strings with a [`Grammar`]'s productions.
#[derive(Clone, Debug, Default)]
pub struct Expander {
    config: ExpanderConfig,
}

impl Expander {
    pub fn new(config: ExpanderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExpanderConfig {
        &self.config
    }

    /// Expands the grammar's axiom for `iterations` generations.
    pub fn expand<R: Rng + ?Sized>(
        &self,
        grammar: &Grammar,
        iterations: usize,
        rng: &mut R,
    ) -> Result<String> {
        self.expand_from(grammar, grammar.axiom(), iterations, rng)
    }

    /// Expands an arbitrary start string for `iterations` generations.
    ///
    /// Every module of the current generation is rewritten simultaneously:
    /// a module with a matching rule is replaced by that rule's successor,
    /// anything else is copied verbatim (parameters included). With several
    /// candidates the choice is rolled independently for each occurrence.
    /// `start` is returned with whitespace stripped when `iterations` is 0.
    pub fn expand_from<R: Rng + ?Sized>(
        &self,
        grammar: &Grammar,
        start: &str,
        iterations: usize,
        rng: &mut R,
    ) -> Result<String> {
        let limit = self.config.max_length;
        let mut current = symbol::normalize(start, 0)?;

        for generation in 1..=iterations {
            let modules: Vec<Module<'_>> = symbol::modules(&current).collect::<Result<_>>()?;
            let mut next = String::with_capacity(current.len().saturating_mul(2).min(limit));

            for (i, module) in modules.iter().enumerate() {
                let left = i.checked_sub(1).map(|j| modules[j].symbol);
                let right = modules.get(i + 1).map(|m| m.symbol);

                match select_rule(grammar.rules_for(module.symbol), left, right, rng) {
                    Some(rule) => next.push_str(&rule.successor),
                    None => next.push_str(module.text),
                }

                if next.len() > limit {
                    return Err(LSystemError::IterationBudgetExceeded {
                        generation,
                        length: next.len(),
                        limit,
                    });
                }
            }

            tracing::trace!(generation, length = next.len(), "expanded generation");
            current = next;
        }

        tracing::debug!(iterations, length = current.len(), "expansion complete");
        Ok(current)
    }
}

/// Picks the rule to apply for one occurrence, or `None` to pass it through.
///
/// Context-sensitive rules whose context matches take precedence over
/// context-free ones. Weights are scaled by `max(1, total)`, so a shortfall
/// below one is the pass-through probability.
fn select_rule<'g, R: Rng + ?Sized>(
    rules: &'g [Rule],
    left: Option<char>,
    right: Option<char>,
    rng: &mut R,
) -> Option<&'g Rule> {
    if rules.is_empty() {
        return None;
    }

    let contextual = rules
        .iter()
        .any(|r| r.is_contextual() && r.matches_context(left, right));
    let is_candidate =
        move |r: &&Rule| r.is_contextual() == contextual && r.matches_context(left, right);

    let mut candidates = rules.iter().filter(is_candidate);
    let first = candidates.next()?;
    if candidates.next().is_none() {
        // A lone candidate with full weight never consumes randomness.
        if first.weight >= 1.0 {
            return Some(first);
        }
        return (rng.random::<f32>() < first.weight).then_some(first);
    }

    let total: f32 = rules.iter().filter(is_candidate).map(|r| r.weight).sum();
    let roll = rng.random::<f32>() * total.max(1.0);
    let mut acc = 0.0;
    let mut last = first;
    for rule in rules.iter().filter(is_candidate) {
        acc += rule.weight;
        if roll < acc {
            return Some(rule);
        }
        last = rule;
    }
    // Rounding can leave `roll` a hair above the final bound.
    (total >= 1.0).then_some(last)
}
