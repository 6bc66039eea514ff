/// Statement executor
///
/// Binds positional parameters to a parsed statement and runs it against
/// the table store. Predicates compare the lower-cased text form of the
/// field with the lower-cased text form of the operand, whatever the types.
use campusdb_core::query::{Delete, Insert, Operand, Predicate, Select, Statement, Update};
use campusdb_core::{Error, Record, Result, Value};
use campusdb_storage::TableStore;

/// Result of one statement
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// SELECT: copies of the matching records
    Rows(Vec<Record>),
    /// INSERT: the new record's primary-key value, if it had one
    Inserted { inserted_id: Option<Value> },
    /// UPDATE / DELETE: number of records changed or removed
    Affected { affected_rows: usize },
}

impl QueryResult {
    /// The rows of a SELECT, `None` for a mutation summary.
    pub fn into_rows(self) -> Option<Vec<Record>> {
        match self {
            QueryResult::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    /// The affected row count of an UPDATE or DELETE.
    pub fn affected_rows(&self) -> Option<usize> {
        match self {
            QueryResult::Affected { affected_rows } => Some(*affected_rows),
            _ => None,
        }
    }

    /// The inserted primary key of an INSERT.
    pub fn inserted_id(&self) -> Option<&Value> {
        match self {
            QueryResult::Inserted { inserted_id } => inserted_id.as_ref(),
            _ => None,
        }
    }
}

/// Text bound to a `?` that has no parameter left.
const UNBOUND: &str = "?";

/// Query executor
pub struct Executor<'a> {
    params: &'a [Value],
}

impl<'a> Executor<'a> {
    /// Create new executor over positional parameters
    pub fn new(params: &'a [Value]) -> Self {
        Self { params }
    }

    /// Execute a SELECT. Never writes.
    pub fn select(&self, store: &TableStore, select: &Select) -> Result<QueryResult> {
        let mut rows = store.scan(&select.table)?;

        if let Some(predicate) = &select.predicate {
            let wanted = self.bind(&predicate.value, self.params.first());
            rows.retain(|record| matches(record, predicate, &wanted));
        }

        Ok(QueryResult::Rows(rows))
    }

    /// Execute INSERT, UPDATE or DELETE.
    pub fn execute_mutation(
        &self,
        store: &mut TableStore,
        statement: &Statement,
    ) -> Result<QueryResult> {
        match statement {
            Statement::Select(select) => self.select(store, select),
            Statement::Insert(insert) => self.execute_insert(store, insert),
            Statement::Update(update) => self.execute_update(store, update),
            Statement::Delete(delete) => self.execute_delete(store, delete),
        }
    }

    fn execute_insert(&self, store: &mut TableStore, insert: &Insert) -> Result<QueryResult> {
        let primary_key = store.primary_key(&insert.table)?.to_string();

        if self.params.is_empty() {
            return Err(Error::InvalidInsertStatement(
                "No values provided for INSERT statement".to_string(),
            ));
        }

        // Columns beyond the parameter list stay absent; extra parameters
        // are ignored.
        let record: Record = insert
            .columns
            .iter()
            .zip(self.params.iter())
            .map(|(column, value)| (column.clone(), value.clone()))
            .collect();

        let inserted_id = record.get(&primary_key).cloned();
        store.append(&insert.table, record)?;

        Ok(QueryResult::Inserted { inserted_id })
    }

    fn execute_update(&self, store: &mut TableStore, update: &Update) -> Result<QueryResult> {
        store.table(&update.table)?;
        let predicate = update
            .predicate
            .as_ref()
            .ok_or(Error::MissingWhereClause("UPDATE"))?;

        // SET placeholders bind left to right from the first parameter; the
        // WHERE placeholder binds the last one.
        let mut next = self.params.iter();
        let changes: Record = update
            .assignments
            .iter()
            .map(|assignment| {
                let bound = match assignment.value {
                    Operand::Placeholder => next.next(),
                    Operand::Literal(_) => None,
                };
                (assignment.column.clone(), self.bind(&assignment.value, bound))
            })
            .collect();
        let wanted = self.bind(&predicate.value, self.params.last());

        let affected_rows = store.update_where(&update.table, |record| {
            if matches(record, predicate, &wanted) {
                record.merge(&changes);
                true
            } else {
                false
            }
        })?;

        Ok(QueryResult::Affected { affected_rows })
    }

    fn execute_delete(&self, store: &mut TableStore, delete: &Delete) -> Result<QueryResult> {
        store.table(&delete.table)?;
        let predicate = delete
            .predicate
            .as_ref()
            .ok_or(Error::MissingWhereClause("DELETE"))?;

        let wanted = self.bind(&predicate.value, self.params.first());
        let affected_rows =
            store.remove_where(&delete.table, |record| matches(record, predicate, &wanted))?;

        Ok(QueryResult::Affected { affected_rows })
    }

    fn bind(&self, operand: &Operand, param: Option<&Value>) -> Value {
        match operand {
            Operand::Literal(value) => value.clone(),
            Operand::Placeholder => param
                .cloned()
                .unwrap_or_else(|| Value::String(UNBOUND.to_string())),
        }
    }
}

fn matches(record: &Record, predicate: &Predicate, wanted: &Value) -> bool {
    record.match_key(&predicate.column) == wanted.match_key()
}
