//! Database configuration.

use campusdb_core::security::validate_slot_key;
use campusdb_core::Result;

/// Connection settings.
///
/// Only `database` affects behavior: it namespaces every durable key as
/// `mysql_<database>_<table>`. The rest is reported when the database opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Server host shown in the connect log line
    pub host: String,
    /// Server port shown in the connect log line
    pub port: u16,
    /// User name
    pub user: String,
    /// Password
    pub password: String,
    /// Logical database name
    pub database: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: "password".to_string(),
            database: "erp_system".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Set the logical database name
    pub fn with_database<S: Into<String>>(mut self, database: S) -> Self {
        self.database = database.into();
        self
    }

    /// Set host and port
    pub fn with_server<S: Into<String>>(mut self, host: S, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Set user credentials
    pub fn with_credentials<U: Into<String>, P: Into<String>>(mut self, user: U, password: P) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    /// Checks that the database name yields valid durable keys.
    pub fn validate(&self) -> Result<()> {
        validate_slot_key(&format!("mysql_{}", self.database))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DatabaseConfig::default();
        assert_eq!(config.database, "erp_system");
        assert_eq!(config.port, 3306);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = DatabaseConfig::default()
            .with_database("admissions")
            .with_server("db.internal", 3307)
            .with_credentials("portal", "secret");
        assert_eq!(config.database, "admissions");
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 3307);
        assert_eq!(config.user, "portal");
    }

    #[test]
    fn test_rejects_path_like_database_name() {
        let config = DatabaseConfig::default().with_database("../elsewhere");
        assert!(config.validate().is_err());
    }
}
