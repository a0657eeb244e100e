//! Interactive console over a directory.
//!
//! Reads one command per line, keeps at most one logged-in session and
//! prints results to the output. Directory errors are printed and the
//! console keeps going; only I/O failures end it.
//!
//! # Commands
//!
//! ```text
//! login <email> <password> [--as owner|staff|super_admin]
//! logout | whoami
//! salon | salons | staff | profile | stats
//! add <full name> <email> <specialty>
//! update <staff-id> specialty|status <value>
//! delete <staff-id> [--yes]
//! dump | help | exit
//! ```
//!
//! Arguments containing spaces are quoted: `add "Jane Roe" jane@shop.com "Hot Towel"`.

use std::io::{BufRead, Write};

use barberdesk_core::directory::{Session, StaffUpdate};
use barberdesk_core::{DirectoryError, ParseRoleError, Role, StaffId, TenantDirectory};
use clap::{Parser, Subcommand};
use tracing::debug;

use super::inspect::{write_snapshot, write_statistics};
use super::write_json;
use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(multicall = true)]
struct ConsoleLine {
    #[command(subcommand)]
    command: ConsoleCommand,
}

#[derive(Debug, Subcommand)]
enum ConsoleCommand {
    /// Log in, replacing any current session
    Login {
        email: String,
        password: String,
        /// Account role to log in as
        #[arg(long = "as", default_value = "owner", value_parser = parse_role)]
        role: Role,
    },
    /// End the current session
    Logout,
    /// Show the current session
    Whoami,
    /// Show your salon
    Salon,
    /// List the salons you can see
    Salons,
    /// List staff in your salon
    Staff,
    /// Show your staff profile (staff only)
    Profile,
    /// Show statistics for your salon
    Stats,
    /// Add a staff member (owner only)
    Add {
        full_name: String,
        email: String,
        specialty: String,
    },
    /// Update a staff member's specialty or status (owner only)
    Update {
        staff_id: String,
        field: String,
        value: String,
    },
    /// Delete a staff member (owner only)
    Delete {
        staff_id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Print the whole directory
    Dump,
    /// Leave the console
    #[command(alias = "quit")]
    Exit,
}

fn parse_role(s: &str) -> Result<Role, ParseRoleError> {
    s.parse()
}

enum Control {
    Continue,
    Exit,
}

/// Run a console session until `exit` or end of input.
///
/// # Errors
///
/// Returns an error only if reading input or writing output fails.
pub fn run(
    dir: &mut TenantDirectory,
    input: impl BufRead,
    output: impl Write,
) -> Result<(), CliError> {
    Console::new(dir, input, output).run()
}

/// A console bound to one directory and one pair of streams.
pub struct Console<'d, R, W> {
    dir: &'d mut TenantDirectory,
    session: Option<Session>,
    input: R,
    output: W,
}

impl<'d, R: BufRead, W: Write> Console<'d, R, W> {
    pub fn new(dir: &'d mut TenantDirectory, input: R, output: W) -> Self {
        Self {
            dir,
            session: None,
            input,
            output,
        }
    }

    /// Read and execute commands until `exit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub fn run(mut self) -> Result<(), CliError> {
        writeln!(self.output, "Barberdesk console. Type `help` for commands.")?;
        loop {
            self.prompt()?;
            let Some(line) = self.read_line()? else {
                writeln!(self.output)?;
                break;
            };
            if matches!(self.execute(&line)?, Control::Exit) {
                break;
            }
        }
        writeln!(self.output, "Bye.")?;
        Ok(())
    }

    fn prompt(&mut self) -> Result<(), CliError> {
        match &self.session {
            Some(session) => write!(self.output, "barberdesk ({})> ", session.email)?,
            None => write!(self.output, "barberdesk> ")?,
        }
        self.output.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>, CliError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }

    fn execute(&mut self, line: &str) -> Result<Control, CliError> {
        let args = match split_args(line) {
            Ok(args) if args.is_empty() => return Ok(Control::Continue),
            Ok(args) => args,
            Err(e) => {
                writeln!(self.output, "Error: {e}")?;
                return Ok(Control::Continue);
            }
        };

        let command = match ConsoleLine::try_parse_from(&args) {
            Ok(line) => line.command,
            Err(e) => {
                write!(self.output, "{}", e.render())?;
                return Ok(Control::Continue);
            }
        };
        debug!(command = args.first().map(String::as_str), "Console command");

        match self.dispatch(command) {
            Err(CliError::Directory(e)) => {
                writeln!(self.output, "Error: {e}")?;
                Ok(Control::Continue)
            }
            other => other,
        }
    }

    fn dispatch(&mut self, command: ConsoleCommand) -> Result<Control, CliError> {
        match command {
            ConsoleCommand::Login {
                email,
                password,
                role,
            } => {
                self.session = None;
                let session = self.dir.authenticate_as(&email, &password, role)?;
                writeln!(
                    self.output,
                    "Logged in as {} ({})",
                    session.email, session.role
                )?;
                self.session = Some(session);
            }
            ConsoleCommand::Logout => match self.session.take() {
                Some(session) => writeln!(self.output, "Logged out {}", session.email)?,
                None => writeln!(self.output, "Not logged in.")?,
            },
            ConsoleCommand::Whoami => match &self.session {
                Some(session) => writeln!(self.output, "{} ({})", session.email, session.role)?,
                None => writeln!(self.output, "Not logged in.")?,
            },
            ConsoleCommand::Salon => {
                if let Some(session) = self.require_session()? {
                    let salon = self.dir.my_salon(&session)?;
                    write_json(&mut self.output, salon)?;
                }
            }
            ConsoleCommand::Salons => {
                if let Some(session) = self.require_session()? {
                    let salons = self.dir.visible_salons(&session)?;
                    for salon in salons {
                        writeln!(
                            self.output,
                            "{}  {}  owner {}",
                            salon.id, salon.name, salon.owner_email
                        )?;
                    }
                }
            }
            ConsoleCommand::Staff => {
                if let Some(session) = self.require_session()? {
                    let staff = self.dir.my_staff(&session)?;
                    if staff.is_empty() {
                        writeln!(self.output, "No staff yet.")?;
                    }
                    for member in staff {
                        writeln!(
                            self.output,
                            "{}  {} <{}>  {}  {}",
                            member.id,
                            member.full_name,
                            member.email,
                            member.specialty,
                            member.status
                        )?;
                    }
                }
            }
            ConsoleCommand::Profile => {
                if let Some(session) = self.require_session()? {
                    let profile = self.dir.my_profile(&session)?;
                    write_json(&mut self.output, profile)?;
                }
            }
            ConsoleCommand::Stats => {
                if let Some(session) = self.require_session()? {
                    let stats = self.dir.my_statistics(&session)?;
                    write_statistics(&stats, &mut self.output)?;
                }
            }
            ConsoleCommand::Add {
                full_name,
                email,
                specialty,
            } => {
                if let Some(session) = self.require_session()? {
                    let member = self
                        .dir
                        .create_staff_for(&session, &full_name, &email, &specialty)?;
                    writeln!(self.output, "Created {} ({})", member.full_name, member.id)?;
                    writeln!(
                        self.output,
                        "Login: {} / {}",
                        member.email,
                        member.password.expose()
                    )?;
                }
            }
            ConsoleCommand::Update {
                staff_id,
                field,
                value,
            } => {
                if let Some(session) = self.require_session()? {
                    let update =
                        StaffUpdate::parse(&field, &value).map_err(DirectoryError::from)?;
                    let member = self
                        .dir
                        .update_staff_for(&session, &StaffId::new(staff_id), update)?;
                    writeln!(
                        self.output,
                        "Updated {}: specialty {:?}, status {}",
                        member.id, member.specialty, member.status
                    )?;
                }
            }
            ConsoleCommand::Delete { staff_id, yes } => {
                if let Some(session) = self.require_session()? {
                    self.delete(&session, &StaffId::new(staff_id), yes)?;
                }
            }
            ConsoleCommand::Dump => write_snapshot(&self.dir.snapshot(), &mut self.output)?,
            ConsoleCommand::Exit => return Ok(Control::Exit),
        }
        Ok(Control::Continue)
    }

    fn require_session(&mut self) -> Result<Option<Session>, CliError> {
        if self.session.is_none() {
            writeln!(self.output, "Not logged in. Use `login <email> <password>`.")?;
        }
        Ok(self.session.clone())
    }

    fn delete(
        &mut self,
        session: &Session,
        staff_id: &StaffId,
        yes: bool,
    ) -> Result<(), CliError> {
        // Only owners are prompted, and only for staff in their own salon.
        let name = if session.role == Role::Owner {
            self.dir
                .my_staff(session)
                .ok()
                .into_iter()
                .flatten()
                .find(|member| &member.id == staff_id)
                .map(|member| member.full_name.clone())
        } else {
            None
        };
        if let (false, Some(name)) = (yes, name) {
            write!(self.output, "Delete {name} ({staff_id})? (y/n): ")?;
            self.output.flush()?;
            let answer = self.read_line()?.unwrap_or_default();
            if !matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes") {
                writeln!(self.output, "Cancelled.")?;
                return Ok(());
            }
        }
        let member = self.dir.delete_staff_for(session, staff_id)?;
        writeln!(self.output, "Deleted {} ({})", member.full_name, member.id)?;
        Ok(())
    }
}

/// Split a line into arguments, honoring single and double quotes.
fn split_args(line: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote = None;
    let mut in_arg = false;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_arg = true;
            }
            None if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            None => {
                current.push(c);
                in_arg = true;
            }
        }
    }

    if quote.is_some() {
        return Err("unterminated quote".to_owned());
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn session(dir: &mut TenantDirectory, script: &str) -> String {
        let mut out = Vec::new();
        run(dir, Cursor::new(script.to_owned()), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_split_args() {
        assert_eq!(split_args("  ").unwrap(), Vec::<String>::new());
        assert_eq!(
            split_args(r#"add "Jane Roe" jane@shop.com 'Hot Towel'"#).unwrap(),
            ["add", "Jane Roe", "jane@shop.com", "Hot Towel"]
        );
        assert_eq!(
            split_args(r#"update x specialty """#).unwrap(),
            ["update", "x", "specialty", ""]
        );
        assert!(split_args(r#"add "Jane"#).is_err());
    }

    #[test]
    fn test_owner_session() {
        let mut dir = TenantDirectory::with_fixture();
        let out = session(
            &mut dir,
            "login owner@barbershop.com password123\n\
             salon\n\
             add \"Jane Roe\" jane@barbershop.com Coloring\n\
             staff\n\
             stats\n\
             exit\n",
        );

        assert!(out.contains("Logged in as owner@barbershop.com (owner)"));
        assert!(out.contains("\"name\": \"Main Barber Shop\""));
        assert!(out.contains("Created Jane Roe"));
        assert!(out.contains("Jane Roe <jane@barbershop.com>  Coloring  active"));
        assert!(out.contains("Total staff:    2"));
        assert!(out.ends_with("Bye.\n"));
        assert_eq!(dir.counts().staff_members, 2);
    }

    #[test]
    fn test_staff_session_is_read_only() {
        let mut dir = TenantDirectory::with_fixture();
        let out = session(
            &mut dir,
            "login john@barbershop.com john123456 --as staff\n\
             profile\n\
             add Intruder intruder@barbershop.com Shave\n\
             whoami\n",
        );

        assert!(out.contains("\"full_name\": \"John Doe\""));
        assert!(out.contains("Error: staff accounts cannot create staff"));
        assert!(out.contains("john@barbershop.com (staff)"));
        assert_eq!(dir.counts().staff_members, 1);
    }

    #[test]
    fn test_requires_login() {
        let mut dir = TenantDirectory::with_fixture();
        let out = session(&mut dir, "staff\nlogin owner@barbershop.com wrong\nwhoami\n");

        assert!(out.contains("Not logged in. Use `login <email> <password>`."));
        assert!(out.contains("Error: invalid credentials"));
        assert!(out.contains("Not logged in."));
    }

    #[test]
    fn test_delete_confirmation() {
        let mut dir = TenantDirectory::with_fixture();
        let out = session(
            &mut dir,
            "login owner@barbershop.com password123\n\
             delete staff-001\n\
             n\n\
             delete staff-001\n\
             y\n",
        );

        assert!(out.contains("Delete John Doe (staff-001)? (y/n): Cancelled."));
        assert!(out.contains("Deleted John Doe (staff-001)"));
        assert_eq!(dir.counts().staff_members, 0);
    }

    #[test]
    fn test_delete_by_non_owner_is_forbidden_without_prompt() {
        use barberdesk_core::AccountId;
        use barberdesk_core::directory::{SeedAccount, SeedData};

        let mut seed = SeedData::fixture();
        let created_at = seed.accounts.first().unwrap().created_at;
        seed.accounts.push(SeedAccount {
            id: AccountId::new("root-001"),
            email: "root@platform.io".parse().unwrap(),
            password: "root-pass".to_owned(),
            role: Role::SuperAdmin,
            created_at,
        });
        let mut dir = TenantDirectory::from_seed(seed).unwrap();

        let out = session(
            &mut dir,
            "login john@barbershop.com john123456
             delete staff-001
             logout
             login root@platform.io root-pass
             delete staff-001 --yes
             delete staff-001
",
        );

        assert!(!out.contains("(y/n)"));
        assert!(out.contains("Error: staff accounts cannot delete staff"));
        assert!(out.contains("Error: super_admin accounts cannot delete staff"));
        assert!(!out.contains("not found"));
        assert_eq!(dir.counts().staff_members, 1);
    }

    #[test]
    fn test_update_and_validation_errors() {
        let mut dir = TenantDirectory::with_fixture();
        let out = session(
            &mut dir,
            "login owner@barbershop.com password123\n\
             update staff-001 status inactive\n\
             update staff-001 status retired\n\
             update staff-001 salary 100\n\
             delete staff-999 --yes\n",
        );

        assert!(out.contains("Updated staff-001: specialty \"Haircut\", status inactive"));
        assert!(out.contains("Error: invalid status: \"retired\""));
        assert!(out.contains("Error: unknown staff field: \"salary\""));
        assert!(out.contains("Error: staff member not found: staff-999"));
    }

    #[test]
    fn test_unknown_command_keeps_running() {
        let mut dir = TenantDirectory::with_fixture();
        let out = session(&mut dir, "fly\ndump\nquit\n");

        assert!(out.contains("error:"));
        assert!(out.contains("Staff (1):"));
        assert!(out.ends_with("Bye.\n"));
    }
}
