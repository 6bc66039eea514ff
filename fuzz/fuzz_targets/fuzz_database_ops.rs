#![no_main]

use arbitrary::Arbitrary;
use campusdb::{Database, Value};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Param {
    Null,
    Boolean(bool),
    Integer(i64),
    Text(String),
}

impl From<&Param> for Value {
    fn from(param: &Param) -> Self {
        match param {
            Param::Null => Value::Null,
            Param::Boolean(b) => Value::Boolean(*b),
            Param::Integer(i) => Value::Integer(*i),
            Param::Text(s) => Value::String(s.clone()),
        }
    }
}

#[derive(Arbitrary, Debug)]
struct Statement {
    sql: String,
    params: Vec<Param>,
}

fuzz_target!(|statements: Vec<Statement>| {
    if let Ok(db) = Database::in_memory() {
        for statement in statements.iter().take(50) {
            if statement.sql.len() > 4096 || statement.params.len() > 16 {
                continue;
            }
            let params: Vec<Value> = statement.params.iter().map(Value::from).collect();
            let _ = db.query(&statement.sql, &params);
        }

        // Whatever ran, the fixed tables are still there
        assert_eq!(db.table_names().map(|names| names.len()).ok(), Some(4));
    }
});
