//! Interactive driver.
//!
//! Reads user and role names, feeds them to the session, then simulates
//! read, modify and delete for every known user.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use access_engine::{AccessError, Session};
use access_provider::ResourceGroupStatus;
use access_rbac::Action;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DriverConfig;

/// Driver errors. Only startup and console failures end a run.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Console read or write failed
    #[error("Console I/O failed: {0}")]
    Io(#[from] io::Error),

    /// Session could not be started
    #[error("Startup failed: {0}")]
    Startup(#[from] AccessError),
}

/// Normalize a role name to title case.
///
/// Every letter that follows a non-letter is upper-cased and every other
/// letter lower-cased.
///
/// # Examples
///
/// ```
/// use access_cli::title_case;
///
/// assert_eq!(title_case("contributor"), "Contributor");
/// assert_eq!(title_case("OWNER"), "Owner");
/// assert_eq!(title_case("key vault reader"), "Key Vault Reader");
/// ```
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut previous_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

/// Interactive driver over any line-based console.
pub struct Driver<R, W> {
    session: Session,
    input: R,
    output: W,
    resource_group: String,
    action_delay: Duration,
}

impl<R: BufRead, W: Write> Driver<R, W> {
    /// Create a driver for `session`.
    pub fn new(session: Session, input: R, output: W, config: &DriverConfig) -> Self {
        Self {
            session,
            input,
            output,
            resource_group: config.resource_group.clone(),
            action_delay: config.action_delay,
        }
    }

    /// Consume the driver, returning the session and console output.
    pub fn into_parts(self) -> (Session, W) {
        (self.session, self.output)
    }

    /// Run the whole workflow: start, assignment loop, simulation.
    pub async fn run(&mut self) -> Result<(), DriverError> {
        self.start().await?;
        self.assignment_loop().await?;
        self.simulate_all().await?;
        Ok(())
    }

    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    async fn start(&mut self) -> Result<(), DriverError> {
        writeln!(self.output, "Checking if the resource group exists...")?;
        let report = self.session.start().await?;

        match report.resource_group {
            ResourceGroupStatus::Existing => writeln!(
                self.output,
                "Resource group '{}' already exists, using the existing one.",
                self.resource_group
            )?,
            ResourceGroupStatus::Created => writeln!(
                self.output,
                "Resource group '{}' created successfully.",
                self.resource_group
            )?,
        }

        writeln!(self.output, "Existing roles synchronized:")?;
        let lines: Vec<String> = self
            .session
            .store()
            .snapshot()
            .into_iter()
            .map(|(user, roles)| {
                let names: Vec<&str> = roles.iter().map(|role| role.name.as_str()).collect();
                format!("- {} [{}]", user, names.join(", "))
            })
            .collect();
        for line in lines {
            writeln!(self.output, "{}", line)?;
        }
        Ok(())
    }

    async fn assignment_loop(&mut self) -> Result<(), DriverError> {
        loop {
            let user = match self.prompt("\nEnter the user to assign a role (or 'exit' to stop): ")? {
                Some(user) => user,
                None => break,
            };
            if user.eq_ignore_ascii_case("exit") {
                break;
            }
            if self.session.user(&user).is_none() {
                writeln!(self.output, "User not found. Try again.")?;
                continue;
            }

            let role = match self.prompt("\nEnter the role to assign: ")? {
                Some(role) => title_case(&role),
                None => break,
            };

            match self.session.assign_role(&user, &role).await {
                Ok(outcome) => {
                    for failure in &outcome.failed_removals {
                        writeln!(
                            self.output,
                            "Failed to remove {} role: {}",
                            failure.role.name, failure.error
                        )?;
                    }
                    if let Some(previous) = outcome.upgraded_from() {
                        writeln!(
                            self.output,
                            "{} has been upgraded from {} to {}.",
                            outcome.user, previous.name, outcome.role.name
                        )?;
                    }
                    writeln!(
                        self.output,
                        "{} role assigned to {} successfully.",
                        outcome.role.name, outcome.user
                    )?;
                }
                Err(e) => {
                    if e.is_rejection() {
                        info!(code = e.error_code(), user = %user, role = %role, "Assignment rejected");
                    } else {
                        warn!(code = e.error_code(), user = %user, role = %role, error = %e, "Assignment failed");
                    }
                    writeln!(self.output, "{}", e)?;
                }
            }
        }

        writeln!(self.output, "\nRole assignments completed.")?;
        Ok(())
    }

    async fn pause(&self) {
        if !self.action_delay.is_zero() {
            tokio::time::sleep(self.action_delay).await;
        }
    }

    async fn simulate_all(&mut self) -> Result<(), DriverError> {
        let users: Vec<String> = self.session.users().map(|user| user.name.clone()).collect();

        for user in users {
            let simulation = self.session.simulate(&user);
            let roles = if simulation.roles.is_empty() {
                "No Role".to_string()
            } else {
                simulation
                    .roles
                    .iter()
                    .map(|role| role.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            writeln!(self.output, "\nSimulating actions for {} ({})...", user, roles)?;

            for (action, allowed) in simulation.decisions {
                self.pause().await;
                match action {
                    Action::Read | Action::Modify => self.report(&user, action, allowed)?,
                    Action::Delete => self.attempt_delete(&user, allowed).await?,
                }
            }
        }
        Ok(())
    }

    fn report(&mut self, user: &str, action: Action, allowed: bool) -> io::Result<()> {
        writeln!(
            self.output,
            "{} is attempting to {} resource group '{}'...",
            user, action, self.resource_group
        )?;
        if allowed {
            writeln!(
                self.output,
                "{} successfully {} the resource group.",
                user,
                past_tense(action)
            )
        } else {
            writeln!(
                self.output,
                "{} doesn't have permission to {} the resource group.",
                user, action
            )
        }
    }

    async fn attempt_delete(&mut self, user: &str, allowed: bool) -> io::Result<()> {
        writeln!(
            self.output,
            "{} is attempting to delete resource group '{}'...",
            user, self.resource_group
        )?;
        if !allowed {
            return writeln!(self.output, "{} isn't allowed to delete resources.", user);
        }

        let question = format!(
            "{}, are you sure you want to delete '{}'? (yes/no): ",
            user, self.resource_group
        );
        let confirmed = self
            .prompt(&question)?
            .map(|answer| answer.to_lowercase().starts_with('y'))
            .unwrap_or(false);
        if !confirmed {
            return writeln!(self.output, "Deletion cancelled.");
        }

        match self.session.delete_resource(user).await {
            Ok(()) => writeln!(
                self.output,
                "{} deleted the resource group '{}' successfully.",
                user, self.resource_group
            ),
            Err(e) => writeln!(self.output, "Failed to delete resource group: {}", e),
        }
    }
}

fn past_tense(action: Action) -> &'static str {
    match action {
        Action::Read => "read",
        Action::Modify => "modified",
        Action::Delete => "deleted",
    }
}
