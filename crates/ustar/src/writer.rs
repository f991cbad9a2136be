//! Streaming archive writer.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use oxtar_fsio::meta;
use oxtar_stream::OutputBuf;

use crate::error::TarError;
use crate::header::{HeaderEncoder, BLOCK_SIZE};
use crate::member::{TypeFlag, UstarMember};

const ZERO_BLOCK: [u8; BLOCK_SIZE] = [0; BLOCK_SIZE];
const COPY_BUFFER: usize = 64 * 1024;

/// Writes ustar members sequentially into any byte sink.
///
/// Between members the writer carries a single counter: the payload bytes
/// written since the last header. [`finish_member`](Self::finish_member)
/// pads that count to a record boundary, and [`finish`](Self::finish)
/// appends the two all-zero terminator records.
#[derive(Debug)]
pub struct UstarWriter<W> {
    output: W,
    encoder: HeaderEncoder,
    member_data_written: u64,
}

impl<W: Write> UstarWriter<W> {
    /// Creates a writer emitting into `output`.
    #[must_use]
    pub fn new(output: W) -> Self {
        Self {
            output,
            encoder: HeaderEncoder::new(),
            member_data_written: 0,
        }
    }

    /// Provides immutable access to the underlying sink.
    #[must_use]
    pub fn get_ref(&self) -> &W {
        &self.output
    }

    /// Consumes the writer and returns the underlying sink.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.output
    }

    /// Encodes the member's 512-byte header record into the sink.
    ///
    /// # Errors
    ///
    /// Returns encoding failures for fields that do not fit and I/O errors
    /// from the sink.
    pub fn write_member_header(&mut self, member: &UstarMember) -> Result<(), TarError> {
        let mut block = [0u8; BLOCK_SIZE];
        let mut out = OutputBuf::new(&mut block);
        let done = self.encoder.encode(&mut out, member)?;
        debug_assert!(done, "a full block always completes the record");
        self.output.write_all(&block)?;
        Ok(())
    }

    /// Forwards payload bytes for the current member.
    ///
    /// # Errors
    ///
    /// Returns I/O errors from the sink.
    pub fn write_member_data(&mut self, data: &[u8]) -> Result<u64, TarError> {
        self.output.write_all(data)?;
        self.member_data_written += data.len() as u64;
        Ok(data.len() as u64)
    }

    /// Streams payload bytes for the current member from a reader.
    ///
    /// # Errors
    ///
    /// Returns I/O errors from the source or the sink.
    pub fn copy_member_data(&mut self, mut source: impl Read) -> Result<u64, TarError> {
        let mut buffer = [0u8; COPY_BUFFER];
        let mut copied = 0u64;
        loop {
            let got = source.read(&mut buffer)?;
            if got == 0 {
                return Ok(copied);
            }
            self.output.write_all(&buffer[..got])?;
            self.member_data_written += got as u64;
            copied += got as u64;
        }
    }

    /// Pads the current member's payload with zeros up to the next record
    /// boundary and resets the payload counter.
    ///
    /// # Errors
    ///
    /// Returns I/O errors from the sink.
    pub fn finish_member(&mut self) -> Result<(), TarError> {
        let shortfall = self.member_data_written % BLOCK_SIZE as u64;
        let padding = (BLOCK_SIZE as u64 - shortfall) % BLOCK_SIZE as u64;
        self.output.write_all(&ZERO_BLOCK[..padding as usize])?;
        self.member_data_written = 0;
        Ok(())
    }

    /// Writes one complete member: header, payload, and padding.
    ///
    /// # Errors
    ///
    /// Returns [`TarError::SizeMismatch`] when `data` disagrees with the
    /// size declared in `member`, plus any header or I/O failure.
    pub fn write_member(&mut self, member: &UstarMember, data: &[u8]) -> Result<(), TarError> {
        self.write_member_header(member)?;
        let written = self.write_member_data(data)?;
        if written != member.size {
            return Err(TarError::SizeMismatch {
                declared: member.size,
                written,
            });
        }
        self.finish_member()
    }

    /// Terminates the archive with two all-zero records.
    ///
    /// Any unfinished member is padded first.
    ///
    /// # Errors
    ///
    /// Returns I/O errors from the sink.
    pub fn finish(&mut self) -> Result<(), TarError> {
        self.finish_member()?;
        self.output.write_all(&ZERO_BLOCK)?;
        self.output.write_all(&ZERO_BLOCK)?;
        Ok(())
    }

    /// Archives the filesystem entry at `path` under the member name
    /// `dest`.
    ///
    /// Directories, symbolic links, and regular files are supported. Names
    /// longer than the filename field are split into the prefix field at the
    /// last `/`; names that still do not fit are rejected rather than
    /// truncated.
    ///
    /// # Errors
    ///
    /// Returns [`TarError::Unsupported`] for special files,
    /// [`TarError::FieldTooLong`] for unrepresentable names or link
    /// targets, and filesystem or I/O failures from reading the entry.
    pub fn add_file(&mut self, dest: &str, path: &Path) -> Result<(), TarError> {
        let metadata = fs::symlink_metadata(path)?;
        let mut member = UstarMember::default();
        member.mtime = meta::mtime_unix(path)?;
        set_member_name(&mut member, dest)?;

        let file_type = metadata.file_type();
        if file_type.is_dir() {
            member.mode = 0o755;
            member.typeflag = TypeFlag::Directory;
            self.write_member_header(&member)?;
            return self.finish_member();
        }

        if file_type.is_symlink() {
            let target = fs::read_link(path)?;
            member.set_linkname(&target.to_string_lossy())?;
            member.typeflag = TypeFlag::Symlink;
            self.write_member_header(&member)?;
            return self.finish_member();
        }

        if !file_type.is_file() {
            return Err(TarError::Unsupported(format!(
                "cannot archive special file '{}'",
                path.display()
            )));
        }

        member.size = metadata.len();
        member.mode = file_mode(&metadata);
        member.typeflag = TypeFlag::Regular;
        self.write_member_header(&member)?;
        let written = self.copy_member_data(File::open(path)?)?;
        if written != member.size {
            return Err(TarError::SizeMismatch {
                declared: member.size,
                written,
            });
        }
        self.finish_member()
    }
}

/// Stores `dest` into the filename field, spilling the leading directories
/// into the prefix field when the name alone does not fit.
fn set_member_name(member: &mut UstarMember, dest: &str) -> Result<(), TarError> {
    if dest.len() <= 100 {
        return member.set_filename(dest);
    }
    let Some((prefix, filename)) = dest.rsplit_once('/') else {
        return Err(TarError::FieldTooLong {
            field: "filename",
            len: dest.len(),
            capacity: 100,
        });
    };
    member.set_prefix(prefix)?;
    member.set_filename(filename)
}

#[cfg(unix)]
fn file_mode(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;

    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn file_mode(_metadata: &fs::Metadata) -> u32 {
    0o644
}
