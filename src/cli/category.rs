//! Category CLI commands
//!
//! Lists the global and custom categories visible to a user and manages the
//! user's custom ones.

use clap::Subcommand;

use crate::display::{format_category_details, format_category_list};
use crate::error::SpendResult;
use crate::models::User;
use crate::services::{CategoryChanges, CategoryService, NewCategory};
use crate::storage::Storage;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List global and custom categories
    List,

    /// Create a custom category
    Create {
        /// Category name
        name: String,
        /// Display color (#RRGGBB)
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Show category details
    Show {
        /// Category name or ID
        category: String,
    },

    /// Edit a custom category
    Edit {
        /// Category name or ID
        category: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New color (#RRGGBB)
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Delete a custom category (its expenses become uncategorized)
    Delete {
        /// Category name or ID
        category: String,
    },
}

/// Handle a category command
pub fn handle_category_command(
    storage: &Storage,
    user: &User,
    cmd: CategoryCommands,
) -> SpendResult<()> {
    let service = CategoryService::new(storage);

    match cmd {
        CategoryCommands::List => {
            let categories = service.list(user.id)?;
            print!("{}", format_category_list(&categories));
        }

        CategoryCommands::Create { name, color } => {
            let category = service.create(user.id, NewCategory { name, color })?;
            println!("Created category: {}", category.name);
            println!("  ID: {}", category.id);
        }

        CategoryCommands::Show { category } => {
            let category = service.find(user.id, &category)?;
            print!("{}", format_category_details(&category));
        }

        CategoryCommands::Edit {
            category,
            name,
            color,
        } => {
            let category = service.find(user.id, &category)?;

            if name.is_none() && color.is_none() {
                println!("No changes specified. Use --name or --color.");
                return Ok(());
            }

            let updated = service.update(user.id, category.id, CategoryChanges { name, color })?;
            println!("Updated category: {}", updated.name);
        }

        CategoryCommands::Delete { category } => {
            let category = service.find(user.id, &category)?;
            let deletion = service.delete(user.id, category.id)?;
            println!("Deleted category: {}", deletion.category.name);
            if deletion.expenses_reassigned > 0 {
                println!(
                    "  {} expense(s) moved to Uncategorized",
                    deletion.expenses_reassigned
                );
            }
            if deletion.budgets_removed > 0 {
                println!("  {} budget(s) removed", deletion.budgets_removed);
            }
        }
    }

    Ok(())
}
