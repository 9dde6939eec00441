pub mod booking;
pub mod catalog;
pub mod config;
pub mod crm;
pub mod dataset;
pub mod models;
pub mod output;
pub mod search;
pub mod voice;
