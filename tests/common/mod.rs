mod test_server;

pub use test_server::{ADMIN_PASSWORD, ADMIN_USERNAME, TestServer};
