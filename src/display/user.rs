use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::User;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Created")]
    created: String,
}

/// Format users as a table; tokens are never shown here
pub fn format_user_list(users: &[User]) -> String {
    if users.is_empty() {
        return "No users found. Add one with 'spendwise user add'.\n".to_string();
    }

    let rows = users.iter().map(|u| UserRow {
        id: u.id.to_string(),
        name: u.name.clone(),
        email: u.email.clone(),
        created: u.created_at.format("%Y-%m-%d").to_string(),
    });

    let mut output = Table::new(rows).with(Style::psql()).to_string();
    output.push('\n');
    output
}
