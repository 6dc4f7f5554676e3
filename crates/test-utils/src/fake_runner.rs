use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use runtest::errors::{AbortReason, ExecError};
use runtest::exec::{AttemptFuture, CommandInvocation, CommandRunner};

/// Outcome a [`ScriptedRunner`] replays for a matching command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedOutcome {
    Output(String),
    Timeout,
    Abort(AbortReason),
}

impl ScriptedOutcome {
    fn into_result(self, invocation: &CommandInvocation) -> Result<String, ExecError> {
        match self {
            ScriptedOutcome::Output(out) => Ok(out),
            ScriptedOutcome::Timeout => Err(ExecError::Timeout {
                command: invocation.command.clone(),
                timeout: invocation.timeout.unwrap_or(Duration::ZERO),
            }),
            ScriptedOutcome::Abort(reason) => Err(ExecError::Abort {
                command: invocation.command.clone(),
                reason,
            }),
        }
    }
}

#[derive(Debug)]
struct Rule {
    pattern: String,
    outcomes: VecDeque<ScriptedOutcome>,
}

#[derive(Debug, Default)]
struct State {
    rules: Vec<Rule>,
    invocations: Vec<CommandInvocation>,
}

/// A fake runner that:
/// - records every attempted invocation
/// - answers with the outcomes scripted for the first rule whose pattern is
///   a substring of the command (the last outcome of a rule repeats)
/// - answers `Ok("")` when no rule matches.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    state: Arc<Mutex<State>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `outcome` for commands containing `pattern`.
    pub fn on(self, pattern: &str, outcome: ScriptedOutcome) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            match state.rules.iter_mut().find(|r| r.pattern == pattern) {
                Some(rule) => rule.outcomes.push_back(outcome),
                None => state.rules.push(Rule {
                    pattern: pattern.to_string(),
                    outcomes: VecDeque::from([outcome]),
                }),
            }
        }
        self
    }

    pub fn output(self, pattern: &str, output: &str) -> Self {
        self.on(pattern, ScriptedOutcome::Output(output.to_string()))
    }

    /// Every invocation attempted so far, in order.
    pub fn invocations(&self) -> Vec<CommandInvocation> {
        self.state.lock().unwrap().invocations.clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.invocations().into_iter().map(|i| i.command).collect()
    }

    /// Number of attempts whose command contains `pattern`.
    pub fn attempts_matching(&self, pattern: &str) -> usize {
        self.commands().iter().filter(|c| c.contains(pattern)).count()
    }

    fn next_outcome(&self, invocation: &CommandInvocation) -> ScriptedOutcome {
        let mut state = self.state.lock().unwrap();
        state.invocations.push(invocation.clone());

        let Some(rule) = state
            .rules
            .iter_mut()
            .find(|r| invocation.command.contains(&r.pattern))
        else {
            return ScriptedOutcome::Output(String::new());
        };

        if rule.outcomes.len() > 1 {
            rule.outcomes.pop_front().unwrap()
        } else {
            rule.outcomes.front().cloned().unwrap()
        }
    }
}

impl CommandRunner for ScriptedRunner {
    fn run_once<'a>(&'a self, invocation: &'a CommandInvocation) -> AttemptFuture<'a> {
        let result = self.next_outcome(invocation).into_result(invocation);
        Box::pin(async move { result })
    }
}
