//! Admissions portal integration tests
//!
//! Drives the typed portal operations and raw statements the way the
//! portal's pages do: sign-in lookups, registration, application and
//! document submission, fee payment and account administration.

mod common;

use std::sync::{Arc, Barrier};

use campusdb::{Database, Error, QueryResult, Record, Result, Value};

fn student_payment() -> Record {
    Record::new()
        .with("user_id", "student-1")
        .with("amount", 5000)
        .with("payment_type", "admission")
}

fn is_generated(id: &str, prefix: &str) -> bool {
    id.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .map_or(false, |millis| {
            !millis.is_empty() && millis.chars().all(|c| c.is_ascii_digit())
        })
}

#[test]
fn test_fresh_database_has_demo_accounts() -> Result<()> {
    let db = Database::in_memory()?;

    let users = db.get_all_users()?;
    let ids: Vec<&str> = users.iter().filter_map(|u| u.get_str("id")).collect();
    assert_eq!(ids, vec!["admin-1", "accountant-1", "student-1"]);

    for user in &users {
        assert_eq!(user.get_str("password"), Some("password"));
        assert!(user.contains("created_at"));
    }
    assert!(db.get_payments_by_user_id("student-1")?.is_empty());
    Ok(())
}

#[test]
fn test_sign_in_lookup_ignores_case() -> Result<()> {
    let db = Database::in_memory()?;

    let admin = db.find_user_by_email("ADMIN@Example.COM")?.unwrap();
    assert_eq!(admin.get_str("role"), Some("admin"));
    assert!(db.find_user_by_email("nobody@example.com")?.is_none());
    Ok(())
}

#[test]
fn test_registered_email_found_in_lower_case() -> Result<()> {
    let db = Database::in_memory()?;
    db.create_user(
        Record::new()
            .with("name", "Bob Smith")
            .with("email", "Bob@Example.com")
            .with("role", "student"),
    )?;

    let bob = db.find_user_by_email("bob@example.com")?.unwrap();
    assert_eq!(bob.get_str("email"), Some("Bob@Example.com"));
    Ok(())
}

#[test]
fn test_duplicate_email_rejected() -> Result<()> {
    let db = Database::in_memory()?;
    let registration = Record::new()
        .with("name", "Jane Roe")
        .with("email", "jane@example.com")
        .with("role", "student");

    db.create_user(registration.clone())?;
    let err = db
        .create_user(registration.with("email", "JANE@example.com"))
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateEmail(ref email) if email == "JANE@example.com"));
    assert_eq!(err.to_string(), "Email already registered: JANE@example.com");

    let janes = db.query(
        "SELECT * FROM users WHERE email = ?",
        &[Value::from("jane@example.com")],
    )?;
    assert_eq!(janes.into_rows().map(|rows| rows.len()), Some(1));
    Ok(())
}

#[test]
fn test_concurrent_registrations_keep_one_account() -> Result<()> {
    let db = Database::in_memory()?;
    let start = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let db = db.clone();
            let start = Arc::clone(&start);
            std::thread::spawn(move || {
                start.wait();
                db.create_user(
                    Record::new()
                        .with("id", format!("student-race-{}", n))
                        .with("email", "race@example.com")
                        .with("role", "student"),
                )
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.join().expect("registration thread panicked") {
            Ok(_) => created += 1,
            Err(Error::DuplicateEmail(_)) => {}
            Err(e) => return Err(e),
        }
    }
    assert_eq!(created, 1);

    let matches = db
        .query(
            "SELECT * FROM users WHERE email = ?",
            &[Value::from("race@example.com")],
        )?
        .into_rows()
        .unwrap_or_default();
    assert_eq!(matches.len(), 1);
    Ok(())
}

#[test]
fn test_fields_named_like_keywords_are_saved() -> Result<()> {
    let db = Database::in_memory()?;
    let application = db.save_application(
        Record::new()
            .with("user_id", "student-1")
            .with("group", "science")
            .with("limit", 3)
            .with("set", "A")
            .with("from", "high school")
            .with("not", false),
    )?;
    assert_eq!(db.get_applications_by_user_id("student-1")?, vec![application]);

    let result = db.query(
        "UPDATE applications SET group = ? WHERE from = ?",
        &[Value::from("arts"), Value::from("High School")],
    )?;
    assert_eq!(result.affected_rows(), Some(1));

    let rows = db
        .query("SELECT * FROM applications WHERE group = 'arts'", &[])?
        .into_rows()
        .unwrap_or_default();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("limit"), Some(&Value::Integer(3)));
    Ok(())
}

#[test]
fn test_quoted_placeholder_is_bound() -> Result<()> {
    let db = Database::in_memory()?;
    let rows = db
        .query(
            "SELECT * FROM users WHERE email = '?'",
            &[Value::from("admin@example.com")],
        )?
        .into_rows()
        .unwrap_or_default();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_str("id"), Some("admin-1"));
    Ok(())
}

#[test]
fn test_record_payment_scenario() -> Result<()> {
    let db = Database::in_memory()?;

    let payment = db.record_payment(student_payment())?;
    assert!(is_generated(payment.get_str("id").unwrap(), "pay"));
    assert!(payment.contains("payment_date"));
    assert_eq!(payment.get("amount"), Some(&Value::Integer(5000)));

    assert_eq!(db.get_payments_by_user_id("student-1")?, vec![payment]);
    assert!(db.get_payments_by_user_id("student-2")?.is_empty());
    Ok(())
}

#[test]
fn test_explicit_id_is_kept() -> Result<()> {
    let db = Database::in_memory()?;
    let payment = db.record_payment(student_payment().with("id", "receipt-42"))?;
    assert_eq!(payment.get_str("id"), Some("receipt-42"));
    Ok(())
}

#[test]
fn test_update_changes_only_matching_user() -> Result<()> {
    let db = Database::in_memory()?;
    let before = db.get_all_users()?;

    let result = db.query(
        "UPDATE users SET role = ? WHERE id = ?",
        &[Value::from("accountant"), Value::from("student-1")],
    )?;
    assert_eq!(result, QueryResult::Affected { affected_rows: 1 });

    let after = db.get_all_users()?;
    assert_eq!(after[0], before[0]);
    assert_eq!(after[1], before[1]);

    let mut expected = before[2].clone();
    expected.insert("role", "accountant");
    assert_eq!(after[2], expected);
    Ok(())
}

#[test]
fn test_document_review_flow() -> Result<()> {
    let db = Database::in_memory()?;
    let document = db.save_document(
        Record::new()
            .with("user_id", "student-1")
            .with("document_type", "transcript")
            .with("status", "pending"),
    )?;
    let id = document.get_str("id").unwrap().to_string();
    assert!(is_generated(&id, "doc"));

    let result = db.query(
        "UPDATE documents SET status = 'verified', reviewed_by = ? WHERE id = ?",
        &[Value::from("admin-1"), Value::from(id.as_str())],
    )?;
    assert_eq!(result.affected_rows(), Some(1));

    let stored = db.get_documents_by_user_id("student-1")?;
    assert_eq!(stored[0].get_str("status"), Some("verified"));
    assert_eq!(stored[0].get_str("reviewed_by"), Some("admin-1"));
    assert_eq!(stored[0].get("uploaded_at"), document.get("uploaded_at"));
    Ok(())
}

#[test]
fn test_application_lookup_by_user() -> Result<()> {
    let db = Database::in_memory()?;
    db.save_application(
        Record::new()
            .with("user_id", "student-1")
            .with("program", "Computer Science")
            .with("status", "submitted"),
    )?;
    db.save_application(
        Record::new()
            .with("user_id", "student-2")
            .with("program", "Mathematics"),
    )?;

    let mine = db.get_applications_by_user_id("student-1")?;
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].get_str("program"), Some("Computer Science"));
    assert!(is_generated(mine[0].get_str("id").unwrap(), "app"));
    Ok(())
}

#[test]
fn test_delete_without_match_changes_nothing() -> Result<()> {
    let db = Database::in_memory()?;
    let before = db.get_all_users()?;

    let result = db.query(
        "DELETE FROM users WHERE id = ?",
        &[Value::from("student-99")],
    )?;
    assert_eq!(result, QueryResult::Affected { affected_rows: 0 });
    assert_eq!(db.get_all_users()?, before);
    Ok(())
}

#[test]
fn test_statement_errors() -> Result<()> {
    let db = Database::in_memory()?;

    assert!(matches!(
        db.query("DELETE FROM users", &[]),
        Err(Error::MissingWhereClause(_))
    ));
    assert!(matches!(
        db.query("INSERT INTO users (id) VALUES ('x')", &[]),
        Err(Error::InvalidInsertStatement(_))
    ));
    assert!(matches!(
        db.query("INSERT INTO payments (id) VALUES (?)", &[]),
        Err(Error::InvalidInsertStatement(_))
    ));
    assert!(matches!(
        db.query("UPDATE users WHERE id = 'x'", &[]),
        Err(Error::InvalidUpdateStatement(_))
    ));
    assert!(matches!(
        db.query("SELECT * FROM users WHERE role = 'admin' AND id = 'admin-1'", &[]),
        Err(Error::Parse(_))
    ));
    assert!(matches!(
        db.query("TRUNCATE users", &[]),
        Err(Error::UnsupportedOperation(_))
    ));

    // Nothing above touched the data.
    assert_eq!(db.get_all_users()?.len(), 3);
    Ok(())
}

#[test]
fn test_handles_share_data_across_threads() -> Result<()> {
    let db = Database::in_memory()?;

    let handles: Vec<_> = (0..4)
        .map(|n| {
            let db = db.clone();
            std::thread::spawn(move || {
                db.record_payment(
                    student_payment().with("id", format!("pay-thread-{}", n)),
                )
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("payment thread panicked")?;
    }

    assert_eq!(db.get_payments_by_user_id("student-1")?.len(), 4);
    Ok(())
}
