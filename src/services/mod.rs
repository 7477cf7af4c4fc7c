pub mod builder;
pub mod configuration;
pub mod os_configuration;
pub mod prototype;
pub mod storage;
pub mod submission;
