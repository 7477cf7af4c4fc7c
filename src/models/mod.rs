pub mod os_configuration;
pub mod prototype;
