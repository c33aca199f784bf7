
use std::fs::File;
use std::io::{self, Read, Result, Write};
use std::path::Path;

/// An open input or output file. Closed when dropped.
#[derive(Debug)]
pub struct Port {
    rw_type: PortRWType,
    file: File,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortRWType {
    Read,
    Write,
}

impl Port {
    pub fn open_input_file(path: &Path) -> Result<Self> {
        Ok(Port {
            rw_type: PortRWType::Read,
            file: File::open(path)?,
        })
    }

    /// Creates the file, truncating anything already there.
    pub fn open_output_file(path: &Path) -> Result<Self> {
        Ok(Port {
            rw_type: PortRWType::Write,
            file: File::create(path)?,
        })
    }

    pub fn rw_type(&self) -> PortRWType {
        self.rw_type
    }

    /// Reads the whole file. Bytes that are not valid UTF-8 become U+FFFD,
    /// which the reader rejects wherever it has to look at them.
    pub fn read_to_string(&mut self) -> Result<String> {
        self.require(PortRWType::Read)?;
        let mut buf = Vec::new();
        self.file.read_to_end(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.require(PortRWType::Write)?;
        self.file.write_all(s.as_bytes())?;
        self.file.flush()
    }

    fn require(&self, rw_type: PortRWType) -> Result<()> {
        if self.rw_type() == rw_type {
            Ok(())
        } else {
            Err(io::Error::new(io::ErrorKind::Other,
                format!("port is open for {:?}, not {:?}", self.rw_type, rw_type)))
        }
    }
}
