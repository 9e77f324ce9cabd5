//! MML source files: one line per channel

use crate::error::{Error, Result};
use crate::synth::channel::MmlText;
use crate::synth::{CHANNEL_COUNT, MAX_MML_LEN};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::Path;

/// Up to four MML programs, in channel order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MmlSource {
    lines: Vec<MmlText>,
}

impl MmlSource {
    /// Read programs from text, one line per channel
    ///
    /// Lines past the fourth are ignored; long lines are cut to `MAX_MML_LEN`
    /// and the rest of the line is discarded unread. Bytes that are not valid
    /// UTF-8 are replaced, so they play as unknown commands.
    pub fn from_reader<R: Read>(input: R) -> Result<Self> {
        let mut reader = BufReader::new(input);
        let mut lines = Vec::with_capacity(CHANNEL_COUNT);
        let mut buf = Vec::with_capacity(MAX_MML_LEN + 1);

        while lines.len() < CHANNEL_COUNT {
            buf.clear();
            let read = (&mut reader)
                .take(MAX_MML_LEN as u64 + 1)
                .read_until(b'\n', &mut buf)?;
            if read == 0 {
                break;
            }

            let mut dropped = 0;
            if buf.last() != Some(&b'\n') && read > MAX_MML_LEN {
                dropped = skip_line(&mut reader)?;
            }
            while matches!(buf.last(), Some(b'\n') | Some(b'\r')) {
                buf.pop();
            }

            if dropped > 0 || buf.len() > MAX_MML_LEN {
                tracing::warn!(
                    "MML line {} is {} bytes, truncated to {}",
                    lines.len() + 1,
                    buf.len() + dropped,
                    MAX_MML_LEN
                );
            }
            lines.push(MmlText::new(&String::from_utf8_lossy(&buf)));
        }

        Ok(Self { lines })
    }

    /// Load a program file, inflating gzip data if necessary
    pub fn load(path: &Path) -> Result<Self> {
        let data = read_mml_file(path).map_err(|e| {
            Error::Io(io::Error::new(
                e.kind(),
                format!("Failed to open '{}': {}", path.display(), e),
            ))
        })?;
        Self::from_reader(Cursor::new(data))
    }

    pub fn from_lines<'a, I: IntoIterator<Item = &'a str>>(lines: I) -> Self {
        Self {
            lines: lines
                .into_iter()
                .take(CHANNEL_COUNT)
                .map(MmlText::new)
                .collect(),
        }
    }

    /// Programs in channel order
    pub fn programs(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.as_str())
    }

    pub fn get(&self, channel: usize) -> Option<&str> {
        self.lines.get(channel).map(|l| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Discard input up to and including the next newline
///
/// Returns the number of bytes dropped before the newline.
fn skip_line<R: BufRead>(reader: &mut R) -> io::Result<usize> {
    let mut dropped = 0;
    loop {
        let (used, done) = {
            let available = reader.fill_buf()?;
            if available.is_empty() {
                return Ok(dropped);
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (available.len(), false),
            }
        };
        reader.consume(used);
        if done {
            return Ok(dropped + used - 1);
        }
        dropped += used;
    }
}

/// Read a file, decompressing if it is gzip by extension or magic
fn read_mml_file(path: &Path) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;

    let is_gzip = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);

    let mut data = Vec::new();
    if is_gzip {
        GzDecoder::new(file).read_to_end(&mut data)?;
        return Ok(data);
    }

    file.read_to_end(&mut data)?;
    if data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b {
        let mut decompressed = Vec::new();
        GzDecoder::new(Cursor::new(data)).read_to_end(&mut decompressed)?;
        Ok(decompressed)
    } else {
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_per_channel() {
        let src = MmlSource::from_reader("cde\r\nt60r\n\nfga\nextra\n".as_bytes()).unwrap();
        assert_eq!(src.len(), 4);
        assert_eq!(src.get(0), Some("cde"));
        assert_eq!(src.get(1), Some("t60r"));
        assert_eq!(src.get(2), Some(""));
        assert_eq!(src.get(3), Some("fga"));
    }

    #[test]
    fn test_long_line_truncated() {
        let long = "c".repeat(MAX_MML_LEN + 100);
        let src = MmlSource::from_reader(long.as_bytes()).unwrap();
        assert_eq!(src.get(0).map(str::len), Some(MAX_MML_LEN));
    }

    #[test]
    fn test_long_line_does_not_spill() {
        let input = format!(
            "{}\r\nd\n{}e\n",
            "c".repeat(MAX_MML_LEN * 4),
            "c".repeat(MAX_MML_LEN)
        );
        let src = MmlSource::from_reader(input.as_bytes()).unwrap();
        assert_eq!(src.len(), 3);
        assert_eq!(src.get(1), Some("d"));
        assert_eq!(src.get(2).map(str::len), Some(MAX_MML_LEN));
    }

    #[test]
    fn test_line_at_limit_with_crlf() {
        let line = "c".repeat(MAX_MML_LEN);
        let input = format!("{}\r\nd", line);
        let src = MmlSource::from_reader(input.as_bytes()).unwrap();
        assert_eq!(src.get(0), Some(line.as_str()));
        assert_eq!(src.get(1), Some("d"));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let src = MmlSource::from_reader(&b"t120cde\nv10g\x82\xa0ab\n"[..]).unwrap();
        assert_eq!(src.len(), 2);
        assert_eq!(src.get(0), Some("t120cde"));
        let line = src.get(1).unwrap();
        assert!(line.starts_with("v10g"));
        assert!(line.ends_with("ab"));
    }

    #[test]
    fn test_from_lines_caps_channels() {
        let src = MmlSource::from_lines(["a", "b", "c", "d", "e"]);
        assert_eq!(src.len(), CHANNEL_COUNT);
    }
}
