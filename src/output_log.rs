use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Persistent record of every line produced by `write`. The file is opened
/// in append mode so successive runs accumulate.
pub enum OutputLog {
    File(BufWriter<File>),
    Disabled,
}

impl OutputLog {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(OutputLog::File(BufWriter::new(file)))
    }

    pub fn disabled() -> Self {
        OutputLog::Disabled
    }
}

impl Write for OutputLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputLog::File(writer) => writer.write(buf),
            OutputLog::Disabled => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputLog::File(writer) => writer.flush(),
            OutputLog::Disabled => Ok(()),
        }
    }
}
