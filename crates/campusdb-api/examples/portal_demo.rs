use campusdb::logging::LogConfig;
use campusdb::{Database, Record, Value};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Debug level shows every executed statement
    let _guard = LogConfig::debug().init();

    println!("=== campusdb Portal Demo ===\n");

    let db = Database::in_memory()?;
    println!("Connection: {}", db.connection_id());

    println!("\n1. Signing in...");
    if let Some(user) = db.find_user_by_email("STUDENT@example.com")? {
        println!(
            "Welcome, {} ({})",
            user.get_str("name").unwrap_or("?"),
            user.get_str("role").unwrap_or("?")
        );
    }

    println!("\n2. Registering a new student...");
    let jane = db.create_user(
        Record::new()
            .with("name", "Jane Roe")
            .with("email", "jane@example.com")
            .with("password", "secret")
            .with("role", "student"),
    )?;
    let jane_id = jane.get_str("id").unwrap_or_default().to_string();
    println!("Created {}", jane_id);

    match db.create_user(Record::new().with("email", "jane@example.com")) {
        Err(e) => println!("Second registration rejected: {}", e),
        Ok(_) => println!("Second registration unexpectedly accepted"),
    }

    println!("\n3. Submitting an application and a document...");
    db.save_application(
        Record::new()
            .with("user_id", jane_id.as_str())
            .with("program", "Computer Science")
            .with("status", "submitted"),
    )?;
    let document = db.save_document(
        Record::new()
            .with("user_id", jane_id.as_str())
            .with("document_type", "transcript")
            .with("status", "pending"),
    )?;

    println!("\n4. Reviewing the document...");
    let reviewed = db.query(
        "UPDATE documents SET status = 'verified' WHERE id = ?",
        &[document.get("id").cloned().unwrap_or(Value::Null)],
    )?;
    println!("Documents verified: {:?}", reviewed.affected_rows());

    println!("\n5. Paying the admission fee...");
    let payment = db.record_payment(
        Record::new()
            .with("user_id", jane_id.as_str())
            .with("amount", 5000)
            .with("payment_type", "admission"),
    )?;
    println!(
        "Receipt {} at {}",
        payment.get_str("id").unwrap_or("?"),
        payment.get_str("payment_date").unwrap_or("?")
    );

    println!("\n6. Summary for {}:", jane_id);
    println!("  applications: {}", db.get_applications_by_user_id(&jane_id)?.len());
    println!("  documents:    {}", db.get_documents_by_user_id(&jane_id)?.len());
    println!("  payments:     {}", db.get_payments_by_user_id(&jane_id)?.len());
    println!("  users total:  {}", db.get_all_users()?.len());

    println!("\n=== Demo Complete ===");
    Ok(())
}
