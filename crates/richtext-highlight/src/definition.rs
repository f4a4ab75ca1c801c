use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
/// Raw YAML grammar definition.
///
/// ```yaml
/// name: toy
/// aliases: [t]
/// variables:
///   ident: '[A-Za-z_]\w*'
/// rules:
///   - type: comment
///     pattern: '#.*'
///   - type: function
///     pattern: '({{ident}})\('
///     capture: 1
/// ```
pub struct GrammarDefinition {
    /// Language identifier (e.g. `rust`).
    pub name: String,

    #[serde(default)]
    /// Other identifiers that resolve to this grammar.
    pub aliases: Vec<String>,

    #[serde(default)]
    /// Pattern fragments substituted for `{{name}}` references.
    pub variables: HashMap<String, String>,

    /// Rules in priority order.
    pub rules: Vec<RuleDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
/// One classification rule.
pub struct RuleDefinition {
    #[serde(rename = "type")]
    /// Token classification (e.g. `keyword`).
    pub kind: String,

    /// Regular expression (`regex` crate syntax, `{{variables}}` allowed).
    pub pattern: String,

    #[serde(default)]
    /// Classify only this capture group. Text before the group inside the match stays plain and
    /// text after it is scanned again.
    pub capture: Option<usize>,

    #[serde(default)]
    /// Rules applied to the matched text; the token then holds the nested result.
    pub inside: Vec<RuleDefinition>,
}
