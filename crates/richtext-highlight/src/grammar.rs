use crate::definition::{GrammarDefinition, RuleDefinition};
use crate::error::GrammarError;
use regex::Regex;
use richtext_core::Token;
use std::collections::HashMap;

/// A compiled classification rule.
#[derive(Debug, Clone)]
pub struct Rule {
    kind: String,
    regex: Regex,
    /// Classified capture group (0 = whole match).
    capture: usize,
    inside: Vec<Rule>,
}

impl Rule {
    /// Token classification.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Nested rules.
    pub fn inside(&self) -> &[Rule] {
        &self.inside
    }

    /// First non-empty match starting at or after `from`.
    fn find_from(&self, text: &str, from: usize) -> Option<Found> {
        let mut at = from;
        loop {
            let (match_start, start, end) = if self.capture == 0 {
                let m = self.regex.find_at(text, at)?;
                (m.start(), m.start(), m.end())
            } else {
                let caps = self.regex.captures_at(text, at)?;
                let whole = caps.get(0)?;
                match caps.get(self.capture) {
                    Some(group) => (whole.start(), group.start(), group.end()),
                    None => (whole.start(), whole.end(), whole.end()),
                }
            };
            if start < end {
                return Some(Found {
                    match_start,
                    start,
                    end,
                });
            }
            // Empty matches never produce tokens.
            at = next_boundary(text, match_start)?;
        }
    }
}

/// A compiled grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
    name: String,
    aliases: Vec<String>,
    rules: Vec<Rule>,
}

impl Grammar {
    /// Parse and compile a YAML grammar definition.
    pub fn from_yaml(yaml: &str) -> Result<Self, GrammarError> {
        let definition: GrammarDefinition = serde_yaml::from_str(yaml)?;
        Self::compile(definition)
    }

    /// Compile a parsed definition.
    pub fn compile(definition: GrammarDefinition) -> Result<Self, GrammarError> {
        let rules = definition
            .rules
            .iter()
            .map(|rule| compile_rule(rule, &definition.variables))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: definition.name,
            aliases: definition.aliases,
            rules,
        })
    }

    /// Language identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alternative identifiers.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Top-level rules in priority order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Tokenize `code`. Concatenating the token sources reproduces `code` exactly.
    pub fn tokenize(&self, code: &str) -> Vec<Token> {
        tokenize_rules(&self.rules, code)
    }
}

fn compile_rule(
    definition: &RuleDefinition,
    variables: &HashMap<String, String>,
) -> Result<Rule, GrammarError> {
    if definition.pattern.is_empty() {
        return Err(GrammarError::EmptyPattern(definition.kind.clone()));
    }
    let pattern = expand_variables(&definition.pattern, variables)?;
    let regex = Regex::new(&pattern).map_err(|err| GrammarError::RegexCompile {
        pattern: pattern.clone(),
        message: err.to_string(),
    })?;
    let capture = definition.capture.unwrap_or(0);
    if capture >= regex.captures_len() {
        return Err(GrammarError::MissingGroup {
            kind: definition.kind.clone(),
            group: capture,
        });
    }
    let inside = definition
        .inside
        .iter()
        .map(|rule| compile_rule(rule, variables))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Rule {
        kind: definition.kind.clone(),
        regex,
        capture,
        inside,
    })
}

/// Substitute `{{name}}` references. Values are inserted verbatim (no recursive expansion).
fn expand_variables(
    pattern: &str,
    variables: &HashMap<String, String>,
) -> Result<String, GrammarError> {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(open) = rest.find("{{") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            break;
        };
        let name = after[..close].trim();
        let value = variables
            .get(name)
            .ok_or_else(|| GrammarError::UnknownVariable(name.to_string()))?;
        out.push_str(&rest[..open]);
        out.push_str(value);
        rest = &after[close + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

#[derive(Debug, Clone, Copy)]
struct Found {
    /// Start of the whole match; the cached result stays valid while the scan is not past it.
    match_start: usize,
    start: usize,
    end: usize,
}

fn next_boundary(text: &str, index: usize) -> Option<usize> {
    text.get(index..)?
        .chars()
        .next()
        .map(|ch| index + ch.len_utf8())
}

/// Scan left to right; at each step the rule whose token starts first wins, ties going to the
/// earlier rule. Unclaimed text becomes plain tokens.
pub(crate) fn tokenize_rules(rules: &[Rule], text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut cache: Vec<Option<Option<Found>>> = vec![None; rules.len()];
    let mut pos = 0;

    while pos < text.len() {
        let mut best: Option<(usize, Found)> = None;
        for (index, rule) in rules.iter().enumerate() {
            let found = match cache[index] {
                Some(Some(found)) if found.match_start >= pos => Some(found),
                Some(None) => None,
                _ => {
                    let found = rule.find_from(text, pos);
                    cache[index] = Some(found);
                    found
                }
            };
            if let Some(found) = found
                && best.is_none_or(|(_, current)| found.start < current.start)
            {
                best = Some((index, found));
            }
        }

        let Some((index, found)) = best else {
            break;
        };
        if found.start > pos {
            tokens.push(Token::text(&text[pos..found.start]));
        }
        let rule = &rules[index];
        let matched = &text[found.start..found.end];
        tokens.push(if rule.inside.is_empty() {
            Token::typed(rule.kind.as_str(), matched)
        } else {
            Token::nested(rule.kind.as_str(), tokenize_rules(&rule.inside, matched))
        });
        pos = found.end;
    }

    if pos < text.len() {
        tokens.push(Token::text(&text[pos..]));
    }
    tokens
}
