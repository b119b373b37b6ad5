pub mod db;
pub mod env;
pub mod init;
pub mod prepare;
pub mod reset;
pub mod status;
pub mod web;
