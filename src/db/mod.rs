pub mod mysql;
pub mod source;

pub use mysql::{create_pool, MySqlDataSource};
pub use source::DataSource;
