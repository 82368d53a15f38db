use std::{
    fs::File,
    io::{self, BufWriter, Write as _},
    path::Path,
};

use anyhow::Context;

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Writes `value` as pretty-printed JSON, replacing the file at `path`.
pub fn write_json<T>(path: &Path, value: &T) -> io::Result<()>
where
    T: serde::Serialize,
{
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()
}

/// Reads a JSON document; parse failures are reported as [`io::ErrorKind::InvalidData`].
pub fn read_json<T>(path: &Path) -> io::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let reader = io::BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
