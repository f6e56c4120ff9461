//! User CLI commands

use clap::Subcommand;

use crate::display::format_user_list;
use crate::error::SpendResult;
use crate::services::UserService;
use crate::storage::Storage;

/// User subcommands
#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a user and print their API token
    Add {
        /// Display name
        name: String,
        /// Email address (unique)
        email: String,
    },

    /// List users
    List,

    /// Issue a new API token, invalidating the old one
    Token {
        /// Email address
        email: String,
    },

    /// Show a user's recent changes from the audit log
    History {
        /// Email address
        email: String,
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

/// Handle a user command
pub fn handle_user_command(storage: &Storage, cmd: UserCommands) -> SpendResult<()> {
    let service = UserService::new(storage);

    match cmd {
        UserCommands::Add { name, email } => {
            let user = service.create(&name, &email)?;
            println!("Created user: {} <{}>", user.name, user.email);
            println!("  ID:        {}", user.id);
            println!("  API token: {}", user.api_token);
            println!();
            println!("Send it as 'Authorization: Bearer <token>' when calling the API.");
        }

        UserCommands::List => {
            let users = service.list()?;
            print!("{}", format_user_list(&users));
        }

        UserCommands::Token { email } => {
            let user = service.find_by_email(&email)?;
            let user = service.rotate_token(user.id)?;
            println!("New API token for {}: {}", user.email, user.api_token);
        }

        UserCommands::History { email, limit } => {
            let user = service.find_by_email(&email)?;
            let entries = storage.audit().read_recent_for(user.id, limit)?;
            if entries.is_empty() {
                println!("No recorded changes for {}.", user.email);
            }
            for entry in entries {
                println!("{}", entry);
            }
        }
    }

    Ok(())
}
