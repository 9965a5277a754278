use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write as _},
    path::Path,
};

use anyhow::Context as _;

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;

    let reader = BufReader::new(file);
    let value = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse {file_kind} JSON file: {}", path.display()))?;

    Ok(value)
}

pub fn write_json_file<T, P>(file_kind: &str, path: P, value: &T) -> anyhow::Result<()>
where
    T: serde::Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create {file_kind} file: {}", path.display()))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
    writeln!(writer)
        .and_then(|()| writer.flush())
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}

/// Prints to stdout, ignoring a closed pipe.
pub fn print_board(board: &impl std::fmt::Display) {
    let mut stdout = io::stdout().lock();
    let _ = write!(stdout, "{board}").and_then(|()| stdout.flush());
}
