//! Fixed tables and the demo accounts they start with.

use campusdb_core::{Record, Result};
use campusdb_storage::TableStore;

/// Portal accounts
pub const USERS: &str = "users";
/// Admission applications
pub const APPLICATIONS: &str = "applications";
/// Uploaded documents
pub const DOCUMENTS: &str = "documents";
/// Fee payments
pub const PAYMENTS: &str = "payments";

/// Every table keys its records by this field.
pub const PRIMARY_KEY: &str = "id";

/// Demo password shared by the seeded accounts.
pub const DEMO_PASSWORD: &str = "password";

fn demo_user(id: &str, name: &str, role: &str, background: &str, created_at: &str) -> Record {
    Record::new()
        .with("id", id)
        .with("name", name)
        .with("email", format!("{}@example.com", role))
        .with("password", DEMO_PASSWORD)
        .with("role", role)
        .with(
            "avatar",
            format!(
                "https://ui-avatars.com/api/?name={}&background={}&color=fff",
                name.replace(' ', "+"),
                background
            ),
        )
        .with("created_at", created_at)
}

/// The admin, accountant and student demo accounts.
pub fn demo_users(created_at: &str) -> Vec<Record> {
    vec![
        demo_user("admin-1", "Admin User", "admin", "0D8ABC", created_at),
        demo_user("accountant-1", "Accountant User", "accountant", "27AE60", created_at),
        demo_user("student-1", "John Doe", "student", "F39C12", created_at),
    ]
}

/// Registers the four portal tables.
pub(crate) fn create_tables(store: &mut TableStore, created_at: &str) -> Result<()> {
    store.create_table(USERS, PRIMARY_KEY, demo_users(created_at))?;
    store.create_table(APPLICATIONS, PRIMARY_KEY, Vec::new())?;
    store.create_table(DOCUMENTS, PRIMARY_KEY, Vec::new())?;
    store.create_table(PAYMENTS, PRIMARY_KEY, Vec::new())?;
    Ok(())
}
