use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;

use reviewbox_core::Session;

use crate::cli::AdminCommands;
use crate::commands::common::{load_config, normalize_content, open_service};
use crate::error::CliError;

pub async fn run_admin(
    command: AdminCommands,
    db_path: &Path,
    config_path: &Path,
) -> Result<Session, CliError> {
    let config = load_config(config_path)?;
    let reviews = open_service(db_path, &config)?;
    let mut session = reviews.open_session().await?;

    match command {
        AdminCommands::Login { password } => {
            let gate = config.admin_gate()?.ok_or(CliError::AdminNotConfigured)?;
            let password = match password {
                Some(password) => password,
                None => prompt_password()?,
            };
            if password.is_empty() {
                return Err(CliError::EmptyPassword);
            }
            reviews.unlock_admin(&gate, &mut session, &password).await?;
            println!("Admin mode enabled");
        }
        AdminCommands::Logout => {
            reviews.lock_admin(&mut session).await?;
            println!("Admin mode disabled");
        }
        AdminCommands::Status => {
            let role = if session.is_privileged() {
                "admin"
            } else {
                "standard"
            };
            println!("Role: {role}");
            println!("Device token: {}", session.device_token());
        }
    }

    Ok(session)
}

fn prompt_password() -> Result<String, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprint!("Admin password: ");
        io::stderr().flush()?;
    }

    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    Ok(normalize_content(&line).unwrap_or_default())
}
