mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    fn list_users(&self) -> Result<Vec<User>>;
    fn update_user_password(&self, id: &str, password_hash: &str) -> Result<()>;
    fn count_users(&self) -> Result<i64>;

    // Specification operations
    fn create_specification(&self, spec: &Specification) -> Result<()>;
    fn get_specification(&self, id: &str) -> Result<Option<Specification>>;
    fn get_specification_by_name(&self, name: &str) -> Result<Option<Specification>>;
    fn list_specifications(&self) -> Result<Vec<Specification>>;

    // Client operations
    //
    // `create_client` derives the certificate number from the
    // specification's counter and advances the counter in the same
    // transaction as the insert. The returned record carries the
    // assigned number.
    fn create_client(&self, new: &NewClient) -> Result<Client>;
    fn get_client(&self, id: &str) -> Result<Option<Client>>;
    fn list_clients(&self) -> Result<Vec<Client>>;
    fn list_clients_with_specifications(&self) -> Result<Vec<ClientDetails>>;
    fn count_clients(&self) -> Result<i64>;

    // Session operations
    fn create_session(&self, session: &Session) -> Result<()>;
    fn get_session_by_lookup(&self, lookup: &str) -> Result<Option<Session>>;
    fn delete_session(&self, id: &str) -> Result<bool>;
    fn delete_expired_sessions(&self) -> Result<usize>;
    fn update_session_last_used(&self, id: &str) -> Result<()>;

    fn close(&self) -> Result<()>;
}
