pub mod authz;
pub mod db;
pub mod jwt;
pub mod scope_sql;
pub mod upload;
