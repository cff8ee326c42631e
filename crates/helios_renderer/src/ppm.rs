//! Binary PPM (P6) export.
//!
//! The film origin is bottom-left while PPM rows run top-to-bottom, so rows
//! are written in reverse. Channels are the clamped linear pixel scaled by
//! 255 and truncated.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use helios_math::Vec3;

use crate::film::{DirectFilm, Film};

/// Write a film as binary PPM.
pub fn write<W: Write>(film: &dyn Film, writer: &mut W) -> io::Result<()> {
    write!(writer, "P6\n{} {}\n255\n", film.width(), film.height())?;

    for y in (0..film.height()).rev() {
        for x in 0..film.width() {
            let pixel = film.get(x, y).clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
            writer.write_all(&[pixel.x as u8, pixel.y as u8, pixel.z as u8])?;
        }
    }

    Ok(())
}

/// Write a film as binary PPM to a file.
pub fn write_file<P: AsRef<Path>>(film: &dyn Film, path: P) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write(film, &mut writer)?;
    writer.flush()
}

/// Read a binary PPM back into a film. Counterpart of [`write`]; only
/// 8-bit `P6` data is accepted.
pub fn read<R: Read>(reader: &mut R) -> io::Result<DirectFilm> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let mut pos = 0;
    let mut token = |bytes: &[u8]| -> io::Result<String> {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let start = pos;
        while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if start == pos {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "truncated PPM header",
            ));
        }
        Ok(String::from_utf8_lossy(&bytes[start..pos]).into_owned())
    };

    let invalid = |message: &str| io::Error::new(io::ErrorKind::InvalidData, message.to_string());

    if token(&bytes)? != "P6" {
        return Err(invalid("not a binary PPM (expected P6)"));
    }
    let width: u32 = token(&bytes)?.parse().map_err(|_| invalid("bad width"))?;
    let height: u32 = token(&bytes)?.parse().map_err(|_| invalid("bad height"))?;
    if token(&bytes)? != "255" {
        return Err(invalid("unsupported maximum channel value"));
    }

    // A single whitespace byte separates the header from the pixel data
    pos += 1;
    let data = &bytes[pos.min(bytes.len())..];
    if data.len() < (width * height * 3) as usize {
        return Err(invalid("truncated pixel data"));
    }

    let mut film = DirectFilm::new(width, height);
    let mut channels = data.iter();
    for y in (0..height).rev() {
        for x in 0..width {
            let mut next =
                || *channels.next().expect("length checked above") as f32 / 255.0;
            let pixel = Vec3::new(next(), next(), next());
            film.set(x, y, pixel);
        }
    }

    Ok(film)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_format() {
        let film = DirectFilm::new(2, 1);
        let mut bytes = Vec::new();
        write(&film, &mut bytes).unwrap();

        assert!(bytes.starts_with(b"P6\n2 1\n255\n"));
        assert_eq!(bytes.len(), "P6\n2 1\n255\n".len() + 2 * 3);
    }

    #[test]
    fn test_rows_are_flipped() {
        let mut film = DirectFilm::new(1, 2);
        film.set(0, 1, Vec3::ONE); // top row of the film

        let mut bytes = Vec::new();
        write(&film, &mut bytes).unwrap();

        let data = &bytes["P6\n1 2\n255\n".len()..];
        // The film's top row comes first in the PPM stream
        assert_eq!(data, &[255, 255, 255, 0, 0, 0]);
    }

    #[test]
    fn test_channels_are_scaled_and_truncated() {
        let mut film = DirectFilm::new(1, 1);
        film.set(0, 0, Vec3::new(0.5, 1.0, 2.0)); // over-range blue is clamped

        let mut bytes = Vec::new();
        write(&film, &mut bytes).unwrap();

        let data = &bytes[bytes.len() - 3..];
        assert_eq!(data, &[127, 255, 255]);
    }

    #[test]
    fn test_roundtrip_within_quantisation() {
        let mut film = DirectFilm::new(3, 2);
        let mut value = 0.05;
        for y in 0..2 {
            for x in 0..3 {
                film.set(x, y, Vec3::new(value, 1.0 - value, value * 0.5));
                value += 0.13;
            }
        }

        let mut bytes = Vec::new();
        write(&film, &mut bytes).unwrap();
        let restored = read(&mut bytes.as_slice()).unwrap();

        assert_eq!(restored.width(), 3);
        assert_eq!(restored.height(), 2);
        for y in 0..2 {
            for x in 0..3 {
                let difference = (restored.get(x, y) - film.get(x, y)).abs();
                assert!(difference.max_element() <= 1.0 / 255.0 + 1e-6);
            }
        }
    }

    #[test]
    fn test_read_rejects_garbage() {
        assert!(read(&mut &b"P3\n1 1\n255\n000"[..]).is_err());
        assert!(read(&mut &b"P6\n2 2\n255\nxx"[..]).is_err());
        assert!(read(&mut &b""[..]).is_err());
    }
}
