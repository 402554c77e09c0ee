//! Grammar loading and the production rule table.
//!
//! Grammars are plain, line-oriented text:
//!
//! ```text
//! # Bracketed plant
//! axiom F
//! angle 25
//! step 1.0
//! F -> F[+F]F[-F]F
//! 0.6 X -> F[+X]F[-X]+X
//! 0.4 X -> F[-X]+X
//! A < B > C -> BB
//! ```
//!
//! A leading number on a production is its selection weight in `(0, 1]`.
//! The effective probability of a candidate is `weight / max(1, total)`:
//! when the candidates for a symbol sum to less than one, the remainder is
//! the chance that the symbol passes through unchanged; when they sum to
//! more than one they are normalized.

use crate::error::{LSystemError, Result};
use crate::symbol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Default turn angle in degrees when a grammar declares none.
pub const DEFAULT_ANGLE: f32 = 25.0;
/// Default step length when a grammar declares none.
pub const DEFAULT_STEP: f32 = 1.0;

/// A single production `predecessor -> successor`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub predecessor: char,
    /// Replacement text, already validated and stripped of whitespace.
    pub successor: String,
    /// Selection weight in `(0, 1]`.
    pub weight: f32,
    /// Symbol that must immediately precede the predecessor.
    pub left_context: Option<char>,
    /// Symbol that must immediately follow the predecessor.
    pub right_context: Option<char>,
}

impl Rule {
    /// A deterministic, context-free rule.
    pub fn new(predecessor: char, successor: impl Into<String>) -> Self {
        Self {
            predecessor,
            successor: successor.into(),
            weight: 1.0,
            left_context: None,
            right_context: None,
        }
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_context(mut self, left: Option<char>, right: Option<char>) -> Self {
        self.left_context = left;
        self.right_context = right;
        self
    }

    pub fn is_contextual(&self) -> bool {
        self.left_context.is_some() || self.right_context.is_some()
    }

    /// Returns true if the neighboring symbols satisfy this rule's context.
    pub fn matches_context(&self, left: Option<char>, right: Option<char>) -> bool {
        let ok = |want: Option<char>, got: Option<char>| want.is_none() || want == got;
        ok(self.left_context, left) && ok(self.right_context, right)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.weight != 1.0 {
            write!(f, "{} ", self.weight)?;
        }
        if let Some(l) = self.left_context {
            write!(f, "{l} < ")?;
        }
        write!(f, "{}", self.predecessor)?;
        if let Some(r) = self.right_context {
            write!(f, " > {r}")?;
        }
        if self.successor.is_empty() {
            write!(f, " ->")
        } else {
            write!(f, " -> {}", self.successor)
        }
    }
}

/// An immutable L-System grammar: axiom, defaults and rule table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grammar {
    axiom: String,
    default_angle: f32,
    default_step: f32,
    rules: BTreeMap<char, Vec<Rule>>,
}

impl Grammar {
    /// Creates a grammar with the given axiom, default angle/step and no rules.
    pub fn new(axiom: &str) -> Result<Self> {
        Ok(Self {
            axiom: symbol::normalize(axiom, 0)?,
            default_angle: DEFAULT_ANGLE,
            default_step: DEFAULT_STEP,
            rules: BTreeMap::new(),
        })
    }

    pub fn with_angle(mut self, degrees: f32) -> Self {
        self.default_angle = degrees;
        self
    }

    pub fn with_step(mut self, step: f32) -> Self {
        self.default_step = step;
        self
    }

    /// Adds a production after validating its symbols, successor and weight.
    pub fn with_rule(mut self, mut rule: Rule) -> Result<Self> {
        check_symbol(rule.predecessor, "predecessor", 0)?;
        if let Some(l) = rule.left_context {
            check_symbol(l, "left context", 0)?;
        }
        if let Some(r) = rule.right_context {
            check_symbol(r, "right context", 0)?;
        }
        rule.successor = symbol::normalize(&rule.successor, 0)?;
        check_weight(rule.weight, 0)?;
        self.rules.entry(rule.predecessor).or_default().push(rule);
        Ok(self)
    }

    /// Loads a grammar from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(LSystemError::GrammarNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path)?;
        let grammar = Self::parse(&text)?;
        tracing::debug!(
            path = %path.display(),
            rules = grammar.rule_count(),
            axiom = %grammar.axiom,
            "loaded grammar"
        );
        Ok(grammar)
    }

    /// Parses grammar text.
    pub fn parse(text: &str) -> Result<Self> {
        let mut axiom: Option<String> = None;
        let mut default_angle = DEFAULT_ANGLE;
        let mut default_step = DEFAULT_STEP;
        let mut rules: BTreeMap<char, Vec<Rule>> = BTreeMap::new();
        let mut last_line = 1;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            last_line = line_no;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
                continue;
            }

            if let Some((lhs, rhs)) = line.split_once("->") {
                let rule = parse_rule(lhs, rhs, line_no)?;
                rules.entry(rule.predecessor).or_default().push(rule);
                continue;
            }

            let (key, value) = match line.split_once(|c: char| c.is_whitespace() || c == ':') {
                Some((k, v)) => (k, v.trim().trim_start_matches(':').trim()),
                None => (line, ""),
            };
            match key.to_ascii_lowercase().as_str() {
                "axiom" | "start" => {
                    if axiom.is_some() {
                        return Err(LSystemError::parse(line_no, "duplicate axiom declaration"));
                    }
                    let value = symbol::normalize(value, line_no)?;
                    if value.is_empty() {
                        return Err(LSystemError::parse(line_no, "axiom is empty"));
                    }
                    axiom = Some(value);
                }
                "angle" => default_angle = parse_number(value, "angle", line_no)?,
                "step" => {
                    default_step = parse_number(value, "step", line_no)?;
                    if default_step <= 0.0 {
                        return Err(LSystemError::parse(line_no, "step must be positive"));
                    }
                }
                _ => {
                    return Err(LSystemError::parse(
                        line_no,
                        format!("expected '->' in production: '{line}'"),
                    ));
                }
            }
        }

        let axiom = axiom.ok_or_else(|| LSystemError::parse(last_line, "missing axiom"))?;
        Ok(Self {
            axiom,
            default_angle,
            default_step,
            rules,
        })
    }

    pub fn axiom(&self) -> &str {
        &self.axiom
    }

    /// Default turn angle in degrees.
    pub fn default_angle(&self) -> f32 {
        self.default_angle
    }

    pub fn default_step(&self) -> f32 {
        self.default_step
    }

    /// Rules for `predecessor` in declaration order; empty if none.
    pub fn rules_for(&self, predecessor: char) -> &[Rule] {
        self.rules
            .get(&predecessor)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All rules, grouped by predecessor in symbol order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values().flatten()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }
}

impl FromStr for Grammar {
    type Err = LSystemError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "axiom {}", self.axiom)?;
        writeln!(f, "angle {}", self.default_angle)?;
        writeln!(f, "step {}", self.default_step)?;
        for rule in self.rules() {
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}

fn parse_number(value: &str, what: &str, line: usize) -> Result<f32> {
    match value.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(LSystemError::parse(
            line,
            format!("invalid {what} value '{value}'"),
        )),
    }
}

fn check_weight(weight: f32, line: usize) -> Result<()> {
    if weight > 0.0 && weight <= 1.0 {
        Ok(())
    } else {
        Err(LSystemError::parse(
            line,
            format!("rule weight {weight} is outside (0, 1]"),
        ))
    }
}

/// Symbols the rule syntax reserves: they cannot be written back unambiguously.
fn is_reserved(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '<' | '>' | '#')
}

fn check_symbol(c: char, what: &str, line: usize) -> Result<char> {
    if is_reserved(c) {
        return Err(LSystemError::parse(
            line,
            format!("'{c}' cannot be used as a {what}"),
        ));
    }
    Ok(c)
}

fn parse_symbol(token: &str, what: &str, line: usize) -> Result<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => check_symbol(c, what, line),
        _ => Err(LSystemError::parse(
            line,
            format!("{what} must be a single symbol, found '{token}'"),
        )),
    }
}

fn parse_rule(lhs: &str, rhs: &str, line: usize) -> Result<Rule> {
    let lhs = lhs.replace('<', " < ").replace('>', " > ");
    let mut tokens: Vec<&str> = lhs.split_whitespace().collect();

    let mut weight = 1.0;
    // A leading number is a weight unless it is itself the left context or
    // the predecessor of a context rule.
    if tokens.len() > 1
        && tokens[1] != "<"
        && tokens[1] != ">"
        && let Ok(w) = tokens[0].parse::<f32>()
    {
        check_weight(w, line)?;
        weight = w;
        tokens.remove(0);
    }

    let (left, rest) = match tokens.as_slice() {
        [l, "<", rest @ ..] => (Some(parse_symbol(l, "left context", line)?), rest),
        rest => (None, rest),
    };
    let (predecessor, right) = match rest {
        [p] => (parse_symbol(p, "predecessor", line)?, None),
        [p, ">", r] => (
            parse_symbol(p, "predecessor", line)?,
            Some(parse_symbol(r, "right context", line)?),
        ),
        [] => return Err(LSystemError::parse(line, "missing predecessor")),
        _ => {
            return Err(LSystemError::parse(
                line,
                format!("malformed predecessor '{}'", tokens.join(" ")),
            ));
        }
    };

    Ok(Rule {
        predecessor,
        successor: symbol::normalize(rhs.trim(), line)?,
        weight,
        left_context: left,
        right_context: right,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLANT: &str = "\
# simple bracketed plant
axiom F
angle 25
step 1

F -> F[+F]F[-F]F
";

    #[test]
    fn parses_axiom_defaults_and_rules() {
        let g = Grammar::parse(PLANT).unwrap();
        assert_eq!(g.axiom(), "F");
        assert_eq!(g.default_angle(), 25.0);
        assert_eq!(g.default_step(), 1.0);
        assert_eq!(g.rules_for('F'), &[Rule::new('F', "F[+F]F[-F]F")]);
        assert!(g.rules_for('X').is_empty());
    }

    #[test]
    fn defaults_apply_when_not_declared() {
        let g = Grammar::parse("axiom: X\nX -> F").unwrap();
        assert_eq!(g.default_angle(), DEFAULT_ANGLE);
        assert_eq!(g.default_step(), DEFAULT_STEP);
    }

    #[test]
    fn missing_arrow_reports_line_number() {
        let text = "axiom F\n# comment\nF F[+F]F\n";
        match Grammar::parse(text) {
            Err(LSystemError::GrammarParse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn weighted_and_contextual_rules() {
        let text = "axiom ABC\n0.25 B -> X\n0.75 B -> Y\nA < B > C -> Z\nB>C -> W\n";
        let g = Grammar::parse(text).unwrap();
        let rules = g.rules_for('B');
        assert_eq!(rules.len(), 4);
        assert_eq!(rules[0].weight, 0.25);
        assert_eq!(rules[2].left_context, Some('A'));
        assert_eq!(rules[2].right_context, Some('C'));
        assert_eq!(rules[3].left_context, None);
        assert_eq!(rules[3].right_context, Some('C'));
    }

    #[test]
    fn weight_out_of_range_is_rejected() {
        assert!(Grammar::parse("axiom F\n1.5 F -> FF").is_err());
        assert!(Grammar::parse("axiom F\n0 F -> FF").is_err());
    }

    #[test]
    fn multi_char_predecessor_is_rejected() {
        let err = Grammar::parse("axiom F\nFF -> F").unwrap_err();
        assert!(matches!(err, LSystemError::GrammarParse { line: 2, .. }));
    }

    #[test]
    fn missing_axiom_is_rejected() {
        assert!(matches!(
            Grammar::parse("F -> FF\n"),
            Err(LSystemError::GrammarParse { line: 1, .. })
        ));
    }

    #[test]
    fn empty_successor_deletes() {
        let g = Grammar::parse("axiom AB\nB ->\n").unwrap();
        assert_eq!(g.rules_for('B')[0].successor, "");
    }

    #[test]
    fn display_round_trips() {
        let text = "axiom F(2)X\nangle 22.5\nstep 0.5\nF -> FF\n0.5 X -> F[+X]F\n0.3 X -> F[-X]\nA < X > F -> \n";
        let g = Grammar::parse(text).unwrap();
        let written = g.to_string();
        let reloaded: Grammar = written.parse().unwrap();
        assert_eq!(g, reloaded);
    }

    #[test]
    fn digit_predecessors_round_trip() {
        let g = Grammar::parse("axiom 1C\n1 > C -> F\n2 < 1 -> G\n0.5 1 -> H").unwrap();
        let rules = g.rules_for('1');
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].right_context, Some('C'));
        assert_eq!(rules[1].left_context, Some('2'));
        assert_eq!(rules[2].weight, 0.5);

        let g = Grammar::new("2C")
            .unwrap()
            .with_rule(Rule::new('2', "F").with_context(None, Some('C')))
            .unwrap();
        let reloaded: Grammar = g.to_string().parse().unwrap();
        assert_eq!(g, reloaded);
    }

    #[test]
    fn reserved_symbols_are_rejected_by_builder() {
        let g = Grammar::new("F").unwrap();
        for c in ['#', '<', '>', '(', ' '] {
            assert!(g.clone().with_rule(Rule::new(c, "F")).is_err(), "{c:?}");
        }
        let contextual = Rule::new('F', "F").with_context(Some('#'), None);
        assert!(g.clone().with_rule(contextual).is_err());
        assert!(Grammar::parse("axiom F\nA < # -> F").is_err());
    }

    #[test]
    fn load_missing_file() {
        let err = Grammar::load("/definitely/not/here/plant.txt").unwrap_err();
        assert!(matches!(err, LSystemError::GrammarNotFound { .. }));
    }

    #[test]
    fn builder_validates_successor() {
        let g = Grammar::new("F").unwrap();
        assert!(g.clone().with_rule(Rule::new('F', "F(")).is_err());
        let g = g.with_rule(Rule::new('F', "F [+F]")).unwrap();
        assert_eq!(g.rules_for('F')[0].successor, "F[+F]");
    }
}
