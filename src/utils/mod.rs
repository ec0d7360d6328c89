pub mod database;
pub mod mail;
pub mod pagination;
pub mod storage;
pub mod validation;
