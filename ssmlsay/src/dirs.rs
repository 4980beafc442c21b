use std::{
    env,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use speaker::logger::log_file_name;

/// Directory holding the executable; session logs are written next to it.
pub fn get_program_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn get_log_file(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(log_file_name(date))
}
