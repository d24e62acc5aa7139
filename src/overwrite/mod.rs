//! Decides whether an existing destination may be overwritten.
//!
//! The decision is made once per destination, before anything is written:
//!
//! | destination | `--nooverwrite` | `--overwrite` | outcome |
//! |---|---|---|---|
//! | missing | any | any | `Proceed` |
//! | exists | set | any | `Abort` |
//! | exists | unset | set | `Proceed` |
//! | exists | unset | unset | `NeedsPrompt`, resolved by asking |
//!
//! A prompted answer defaults to yes: anything not starting with `n`/`N`
//! proceeds. Resolved answers are cached per path, so asking twice about
//! the same destination prompts only once.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::StackError;

/// Outcome of an overwrite check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverwriteDecision {
    Proceed,
    Abort,
    /// The destination exists and no flag settles it; ask the user.
    NeedsPrompt,
}

/// The two independent overwrite flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OverwritePolicy {
    /// Always overwrite an existing destination.
    pub overwrite: bool,
    /// Never overwrite an existing destination. Wins over `overwrite`.
    pub no_overwrite: bool,
}

impl OverwritePolicy {
    /// Decision from the flags alone.
    pub fn decide(&self, exists: bool) -> OverwriteDecision {
        if !exists {
            OverwriteDecision::Proceed
        } else if self.no_overwrite {
            OverwriteDecision::Abort
        } else if self.overwrite {
            OverwriteDecision::Proceed
        } else {
            OverwriteDecision::NeedsPrompt
        }
    }
}

/// Answers "does this destination already exist?".
pub trait ExistenceProbe {
    fn exists(&self, path: &Path) -> io::Result<bool>;
}

/// Probe backed by the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsProbe;

impl ExistenceProbe for FsProbe {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        path.try_exists()
    }
}

/// Line-based yes/no confirmation channel.
pub trait Confirm {
    /// Ask `question`; an empty answer (or end of input) yields `default`.
    fn confirm(&mut self, question: &str, default: bool) -> io::Result<bool>;
}

/// Confirmation read from any line source, with the prompt written to
/// `prompt`.
pub struct LineConfirm<R, W> {
    input: R,
    prompt: W,
}

impl<R: BufRead, W: Write> LineConfirm<R, W> {
    pub fn new(input: R, prompt: W) -> Self {
        Self { input, prompt }
    }
}

impl<R: BufRead, W: Write> Confirm for LineConfirm<R, W> {
    fn confirm(&mut self, question: &str, default: bool) -> io::Result<bool> {
        let hint = if default { "([y]/n)" } else { "(y/[n])" };
        writeln!(self.prompt, "{} {}", question, hint)?;
        self.prompt.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        let answer = line.trim().to_lowercase();
        Ok(if answer.is_empty() {
            default
        } else if default {
            !answer.starts_with('n')
        } else {
            answer.starts_with('y')
        })
    }
}

/// Confirmation on the controlling terminal: reads stdin, prompts on stderr.
pub fn terminal_confirm() -> LineConfirm<io::StdinLock<'static>, io::Stderr> {
    LineConfirm::new(io::stdin().lock(), io::stderr())
}

/// Caching overwrite gate for one invocation.
pub struct OverwriteGuard<P, C> {
    policy: OverwritePolicy,
    probe: P,
    confirm: C,
    resolved: HashMap<PathBuf, OverwriteDecision>,
}

impl<P: ExistenceProbe, C: Confirm> OverwriteGuard<P, C> {
    pub fn new(policy: OverwritePolicy, probe: P, confirm: C) -> Self {
        Self {
            policy,
            probe,
            confirm,
            resolved: HashMap::new(),
        }
    }

    /// Flag-level decision for `path`, without prompting.
    ///
    /// A previously resolved prompt answer for the same path is returned as
    /// is.
    ///
    /// # Errors
    /// Returns [`StackError::QueryDestination`] if existence cannot be
    /// determined.
    pub fn evaluate(&self, path: &Path) -> Result<OverwriteDecision, StackError> {
        if let Some(&decision) = self.resolved.get(path) {
            return Ok(decision);
        }
        let exists = self
            .probe
            .exists(path)
            .map_err(|source| StackError::QueryDestination {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(self.policy.decide(exists))
    }

    /// Final decision for `path`, prompting if the flags leave it open.
    ///
    /// Always returns `Proceed` or `Abort`.
    pub fn resolve(&mut self, path: &Path) -> Result<OverwriteDecision, StackError> {
        let decision = match self.evaluate(path)? {
            OverwriteDecision::NeedsPrompt => {
                warn!("Destination {} exists.", path.display());
                let yes = self
                    .confirm
                    .confirm("Do you want to overwrite it?", true)
                    .map_err(|e| StackError::io_at(path, e))?;
                if yes {
                    OverwriteDecision::Proceed
                } else {
                    OverwriteDecision::Abort
                }
            }
            settled => settled,
        };
        self.resolved.insert(path.to_path_buf(), decision);
        Ok(decision)
    }

    /// Gate a write to `path`.
    ///
    /// # Errors
    /// Returns [`StackError::OverwriteAborted`] when overwriting is declined.
    pub fn check(&mut self, path: &Path) -> Result<(), StackError> {
        match self.resolve(path)? {
            OverwriteDecision::Proceed => Ok(()),
            _ => Err(StackError::OverwriteAborted {
                path: path.to_path_buf(),
            }),
        }
    }
}
