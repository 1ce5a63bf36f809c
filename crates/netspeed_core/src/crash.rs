//! Log de falhas fatais (`crash.log` ao lado do executável).

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const CRASH_LOG_NAME: &str = "crash.log";

/// Caminho padrão do crash log.
pub fn default_path() -> PathBuf {
    crate::config::exe_dir().join(CRASH_LOG_NAME)
}

/// Acrescenta uma linha com timestamp local ao crash log.
pub fn append(path: &Path, message: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    writeln!(file, "[{stamp}] {}", message.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CRASH_LOG_NAME);

        append(&path, "primeira falha\n").unwrap();
        append(&path, "segunda falha").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] primeira falha"));
        assert!(lines[1].ends_with("] segunda falha"));
    }
}
