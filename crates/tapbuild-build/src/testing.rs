//! Scripted command executor for exercising the builder without a toolchain

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::CommandError;
use crate::executor::CommandExecutor;

/// Which executor operation a command was issued through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    Run,
    RunAndPrint,
}

/// A command observed by [`ScriptedExecutor`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommand {
    pub invocation: Invocation,
    pub command: String,
}

#[derive(Debug, Default)]
struct Script {
    commands: Vec<RecordedCommand>,
    run_results: VecDeque<String>,
    fail_on_call: Option<usize>,
    fail_when_contains: Vec<String>,
}

/// Executor double that records commands and replays queued `run` output.
///
/// Clones share the same script, so a test can hand one clone to the builder
/// and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct ScriptedExecutor {
    script: Arc<Mutex<Script>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue outputs returned by successive `run` calls
    pub fn with_run_results<I, S>(self, results: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().run_results.extend(results.into_iter().map(Into::into));
        self
    }

    /// Fail the Nth command (1-based) regardless of which operation issues it
    pub fn fail_on_call(self, call: usize) -> Self {
        self.lock().fail_on_call = Some(call);
        self
    }

    /// Fail every command containing `pattern`
    pub fn fail_when_contains(self, pattern: impl Into<String>) -> Self {
        self.lock().fail_when_contains.push(pattern.into());
        self
    }

    /// All commands issued so far, in order
    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.lock().commands.clone()
    }

    /// Command text only, in order
    pub fn command_lines(&self) -> Vec<String> {
        self.lock().commands.iter().map(|c| c.command.clone()).collect()
    }

    /// Number of issued commands containing `pattern`
    pub fn count_matching(&self, pattern: &str) -> usize {
        self.lock().commands.iter().filter(|c| c.command.contains(pattern)).count()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, invocation: Invocation, command: &str) -> Result<(), CommandError> {
        let mut script = self.lock();
        script.commands.push(RecordedCommand { invocation, command: command.to_string() });

        let call = script.commands.len();
        let fail = script.fail_on_call == Some(call)
            || script.fail_when_contains.iter().any(|pattern| command.contains(pattern.as_str()));

        if fail {
            Err(CommandError::failed(command, Some(1), "scripted failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn run(&self, command: &str) -> Result<String, CommandError> {
        self.record(Invocation::Run, command)?;
        Ok(self.lock().run_results.pop_front().unwrap_or_default())
    }

    async fn run_and_print(&self, command: &str) -> Result<(), CommandError> {
        self.record(Invocation::RunAndPrint, command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_and_replays() {
        let executor = ScriptedExecutor::new().with_run_results(["first", "second"]);

        executor.run_and_print("echo a").await.unwrap();
        assert_eq!(executor.run("echo b").await.unwrap(), "first");
        assert_eq!(executor.run("echo c").await.unwrap(), "second");
        assert_eq!(executor.run("echo d").await.unwrap(), "");

        let commands = executor.commands();
        assert_eq!(commands.len(), 4);
        assert_eq!(commands[0].invocation, Invocation::RunAndPrint);
        assert_eq!(commands[1].invocation, Invocation::Run);
        assert_eq!(executor.count_matching("echo"), 4);
    }

    #[tokio::test]
    async fn test_scripted_failures() {
        let executor = ScriptedExecutor::new().fail_on_call(2).fail_when_contains("lipo");

        assert!(executor.run_and_print("one").await.is_ok());
        assert!(executor.run_and_print("two").await.is_err());
        assert!(executor.run_and_print("three").await.is_ok());
        assert!(executor.run("lipo -create").await.is_err());
        assert_eq!(executor.command_lines(), vec!["one", "two", "three", "lipo -create"]);
    }

    #[tokio::test]
    async fn test_clones_share_script() {
        let executor = ScriptedExecutor::new();
        let clone = executor.clone();

        clone.run_and_print("mkdir -p x").await.unwrap();
        assert_eq!(executor.command_lines(), vec!["mkdir -p x"]);
    }
}
