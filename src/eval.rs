//! Compound switch/variable condition evaluation for event scripting.
//!
//! Conditions arrive as comma-separated token lists (`"1,!2,3=ON"` /
//! `"10>=5, 11==3"`) and are combined with AND. Malformed tokens make the
//! whole evaluation false rather than erroring — an event page with a typo
//! must never crash the running session.

use std::collections::HashMap;

use crate::host::{SwitchStore, VariableStore};

// ── Condition nodes ──────────────────────────────────────────────────────────

/// Expected state of one switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchCond {
    pub id: u32,
    pub expect: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarOp {
    Eq,
    Ne,
    Ge,
    Le,
}

/// One variable comparison. Strict `>` / `<` are unsupported by design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarCond {
    pub id: u32,
    pub op: VarOp,
    pub rhs: i64,
}

// ── Token parsing ────────────────────────────────────────────────────────────

/// Positive-integer id, digits only.
fn parse_id(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let id: u32 = text.parse().ok()?;
    (id > 0).then_some(id)
}

/// Integer literal with an optional leading minus, nothing else.
fn parse_int(text: &str) -> Option<i64> {
    let body = text.strip_prefix('-').unwrap_or(text);
    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Parse a switch token: `N`, `!N`, `N=ON`, `N=OFF`, or `switchN=on`
/// (case-insensitive). A bare id expects ON.
pub fn parse_switch_token(token: &str) -> Option<SwitchCond> {
    let token = token.trim();
    if let Some(rest) = token.strip_prefix('!') {
        let id = parse_id(rest.trim())?;
        return Some(SwitchCond { id, expect: false });
    }

    let lower = token.to_ascii_lowercase();
    let body = lower.strip_prefix("switch").unwrap_or(&lower).trim();
    match body.split_once('=') {
        None => Some(SwitchCond { id: parse_id(body)?, expect: true }),
        Some((id_part, state)) => {
            let id = parse_id(id_part.trim())?;
            match state.trim() {
                "on" => Some(SwitchCond { id, expect: true }),
                "off" => Some(SwitchCond { id, expect: false }),
                _ => None,
            }
        }
    }
}

/// Parse a variable token: `N==k`, `N!=k`, `N>=k`, or `N<=k`.
pub fn parse_variable_token(token: &str) -> Option<VarCond> {
    let token = token.trim();
    for (pattern, op) in [("==", VarOp::Eq), ("!=", VarOp::Ne), (">=", VarOp::Ge), ("<=", VarOp::Le)] {
        if let Some((lhs, rhs)) = token.split_once(pattern) {
            let id = parse_id(lhs.trim())?;
            let rhs = parse_int(rhs.trim())?;
            return Some(VarCond { id, op, rhs });
        }
    }
    None
}

/// Split a comma-separated condition list, dropping empty entries.
pub fn split_csv(input: &str) -> Vec<&str> {
    input.split(',').map(str::trim).filter(|tok| !tok.is_empty()).collect()
}

// ── Evaluation ───────────────────────────────────────────────────────────────

fn eval_switches(tokens: &[&str], switches: &dyn SwitchStore) -> bool {
    tokens.iter().all(|token| match parse_switch_token(token) {
        Some(cond) => switches.value(cond.id) == cond.expect,
        None => false,
    })
}

fn eval_variables(tokens: &[&str], variables: &dyn VariableStore) -> bool {
    tokens.iter().all(|token| match parse_variable_token(token) {
        Some(cond) => {
            let current = variables.value(cond.id);
            match cond.op {
                VarOp::Eq => current == cond.rhs,
                VarOp::Ne => current != cond.rhs,
                VarOp::Ge => current >= cond.rhs,
                VarOp::Le => current <= cond.rhs,
            }
        }
        None => false,
    })
}

/// Evaluate both condition groups, ANDed.
///
/// An empty group is neutral (does not fail the other group), but two empty
/// groups yield false — "no conditions" is not a satisfied condition.
pub fn evaluate_basic(
    switches_input: &str,
    variables_input: &str,
    switches: &dyn SwitchStore,
    variables: &dyn VariableStore,
) -> bool {
    let switch_tokens = split_csv(switches_input);
    let variable_tokens = split_csv(variables_input);
    if switch_tokens.is_empty() && variable_tokens.is_empty() {
        return false;
    }
    let switches_ok = switch_tokens.is_empty() || eval_switches(&switch_tokens, switches);
    let variables_ok = variable_tokens.is_empty() || eval_variables(&variable_tokens, variables);
    switches_ok && variables_ok
}

// ── Result store ─────────────────────────────────────────────────────────────

/// Per-session store of evaluation results.
///
/// Keeps the most recent result plus any results saved under a key, so
/// parallel event pages can name their results instead of racing over the
/// shared "last" value.
#[derive(Debug, Default)]
pub struct EvalResults {
    last: bool,
    named: HashMap<String, bool>,
}

impl EvalResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate and record in one step. An empty key records only `last`.
    pub fn run(
        &mut self,
        key: Option<&str>,
        switches_input: &str,
        variables_input: &str,
        switches: &dyn SwitchStore,
        variables: &dyn VariableStore,
    ) -> bool {
        let result = evaluate_basic(switches_input, variables_input, switches, variables);
        self.record(key, result);
        result
    }

    pub fn record(&mut self, key: Option<&str>, value: bool) {
        self.last = value;
        if let Some(key) = key.filter(|k| !k.is_empty()) {
            self.named.insert(key.to_string(), value);
        }
    }

    /// Look up a named result, or the most recent one when `key` is `None`
    /// or empty. Unknown keys read as false.
    pub fn get(&self, key: Option<&str>) -> bool {
        match key.filter(|k| !k.is_empty()) {
            Some(key) => self.named.get(key).copied().unwrap_or(false),
            None => self.last,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
