pub mod listen_addr;
pub mod logging;
pub mod max_concurrency;
pub mod settings;
