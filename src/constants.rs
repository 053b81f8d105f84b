use std::sync::LazyLock;

pub mod version;

pub static WELCOME_MESSAGE: &str = "Welcome to the Quote API!";
pub static STARTUP_TIME: LazyLock<std::time::SystemTime> =
    LazyLock::new(std::time::SystemTime::now);
