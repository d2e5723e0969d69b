pub mod commands;
pub mod doctor;
pub mod error;
pub mod fs_utils;
pub mod journal;
pub mod lock;
pub mod paths;
pub mod pointer;
pub mod profiles;
pub mod switch;
pub mod ui;

#[cfg(test)]
pub mod test_utils;
