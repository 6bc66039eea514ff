//! Typed operations used by the portal's pages and sign-in flow.
//!
//! Every "save"/"record" operation follows the same steps: generate an id
//! of the form `<prefix>-<epoch millis>` when the record has none, stamp its
//! timestamp fields, insert it through an `INSERT ... VALUES (?, ...)`
//! statement and hand the stored record back. Every "by user id" getter is a
//! SELECT on `user_id = ?`.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::info;

use crate::seed::{APPLICATIONS, DOCUMENTS, PAYMENTS, USERS};
use crate::{execute, Database, Error, Record, Result, Value};

/// RFC 3339 UTC timestamp with millisecond precision, e.g.
/// `2026-10-19T05:08:00.123Z`.
pub(crate) fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Sets `id` to `<prefix>-<millis>` unless the record already has a usable one.
fn ensure_id(record: &mut Record, prefix: &str, now: DateTime<Utc>) {
    if record.get("id").map_or(true, Value::is_falsy) {
        record.insert("id", format!("{}-{}", prefix, now.timestamp_millis()));
    }
}

impl Database {
    /// Looks up a user by email, ignoring case.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<Record>> {
        let rows = self.select_where(USERS, "email", email)?;
        Ok(rows.into_iter().next())
    }

    /// Registers a user.
    ///
    /// The id defaults to `<role>-<millis>` (`user-<millis>` without a role)
    /// and `created_at` is always stamped.
    ///
    /// # Errors
    ///
    /// `Error::DuplicateEmail` when the email is taken, `Error::InvalidInput`
    /// when the record has no email.
    pub fn create_user(&self, mut user: Record) -> Result<Record> {
        let email = user
            .get("email")
            .map(Value::to_string)
            .ok_or_else(|| Error::InvalidInput("user record requires an email".to_string()))?;

        // Lookup and insert run under one write lock.
        let mut tables = self.write_tables()?;
        let taken = execute(
            &mut tables,
            &format!("SELECT * FROM {} WHERE email = ?", USERS),
            &[Value::from(email.as_str())],
        )?
        .into_rows()
        .map_or(false, |rows| !rows.is_empty());
        if taken {
            return Err(Error::DuplicateEmail(email));
        }

        let now = Utc::now();
        let prefix = match user.get("role") {
            Some(role) if !role.is_falsy() => role.to_string(),
            _ => "user".to_string(),
        };
        ensure_id(&mut user, &prefix, now);
        user.insert("created_at", timestamp(now));

        let (sql, params) = insert_statement(USERS, &user);
        execute(&mut tables, &sql, &params)?;
        drop(tables);

        info!(id = ?user.get("id"), "Created user");
        Ok(user)
    }

    /// Every user, in insertion order.
    pub fn get_all_users(&self) -> Result<Vec<Record>> {
        self.select_all(USERS)
    }

    /// Stores an admission application, stamping `created_at` and
    /// `updated_at`.
    pub fn save_application(&self, mut application: Record) -> Result<Record> {
        let now = Utc::now();
        ensure_id(&mut application, "app", now);
        application.insert("created_at", timestamp(now));
        application.insert("updated_at", timestamp(now));

        self.insert_record(APPLICATIONS, &application)?;
        Ok(application)
    }

    /// Applications submitted by a user.
    pub fn get_applications_by_user_id(&self, user_id: &str) -> Result<Vec<Record>> {
        self.select_where(APPLICATIONS, "user_id", user_id)
    }

    /// Stores an uploaded document, stamping `uploaded_at`.
    pub fn save_document(&self, mut document: Record) -> Result<Record> {
        let now = Utc::now();
        ensure_id(&mut document, "doc", now);
        document.insert("uploaded_at", timestamp(now));

        self.insert_record(DOCUMENTS, &document)?;
        Ok(document)
    }

    /// Documents uploaded by a user.
    pub fn get_documents_by_user_id(&self, user_id: &str) -> Result<Vec<Record>> {
        self.select_where(DOCUMENTS, "user_id", user_id)
    }

    /// Stores a fee payment, stamping `payment_date`.
    pub fn record_payment(&self, mut payment: Record) -> Result<Record> {
        let now = Utc::now();
        ensure_id(&mut payment, "pay", now);
        payment.insert("payment_date", timestamp(now));

        self.insert_record(PAYMENTS, &payment)?;
        Ok(payment)
    }

    /// Payments made by a user.
    pub fn get_payments_by_user_id(&self, user_id: &str) -> Result<Vec<Record>> {
        self.select_where(PAYMENTS, "user_id", user_id)
    }

    fn select_all(&self, table: &str) -> Result<Vec<Record>> {
        let sql = format!("SELECT * FROM {}", table);
        Ok(self.query(&sql, &[])?.into_rows().unwrap_or_default())
    }

    fn select_where(&self, table: &str, field: &str, value: &str) -> Result<Vec<Record>> {
        let sql = format!("SELECT * FROM {} WHERE {} = ?", table, field);
        Ok(self
            .query(&sql, &[Value::from(value)])?
            .into_rows()
            .unwrap_or_default())
    }

    fn insert_record(&self, table: &str, record: &Record) -> Result<()> {
        let (sql, params) = insert_statement(table, record);
        self.query(&sql, &params)?;
        Ok(())
    }
}

/// `INSERT INTO table (fields...) VALUES (?, ...)` and its parameters.
fn insert_statement(table: &str, record: &Record) -> (String, Vec<Value>) {
    let fields: Vec<&str> = record.fields().collect();
    let slots = vec!["?"; fields.len()];
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        fields.join(", "),
        slots.join(", ")
    );
    let params = record.iter().map(|(_, v)| v.clone()).collect();
    (sql, params)
}
