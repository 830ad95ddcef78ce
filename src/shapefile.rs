//! Interaction with `.shapes` files.
//!
//! A `.shapes` file stores a batch of generated puzzle shapes:
//!
//! - 4 magic bytes,
//! - 1 flags byte (bit 0 set when every stored shape passed the full
//!   generation checks, i.e. none came from the fallback path),
//! - 1 compression byte,
//! - the shape count as leb128 (0 for an unknown-length stream),
//! - then per shape: board dimensions as 3 bytes, the point count as
//!   leb128, and 3 bytes `(x, y, z)` per point.
//!
//! Generated shapes are sparse, so a point list beats a bitmap here.

use std::{
    fs::File,
    io::{BufReader, ErrorKind, Read, Write},
    path::Path,
};

use flate2::{read::GzDecoder, write::GzEncoder};

use crate::shape::{Board, Point, Shape};

const MAGIC: [u8; 4] = *b"SHPS";

/// Compression types supported for `.shapes` files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
}

impl From<Compression> for u8 {
    fn from(value: Compression) -> Self {
        match value {
            Compression::None => 0,
            Compression::Gzip => 1,
        }
    }
}

impl TryFrom<u8> for Compression {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Gzip),
            _ => Err(()),
        }
    }
}

#[derive(Debug)]
enum Reader<T>
where
    T: Read,
{
    Plain(BufReader<T>),
    Gzip(GzDecoder<T>),
}

impl<T> Read for Reader<T>
where
    T: Read,
{
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Reader::Plain(t) => t.read(buf),
            Reader::Gzip(t) => t.read(buf),
        }
    }
}

enum Writer<T>
where
    T: Write,
{
    Plain(T),
    Gzip(GzEncoder<T>),
}

impl<T> Write for Writer<T>
where
    T: Write,
{
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Writer::Plain(t) => t.write(buf),
            Writer::Gzip(t) => t.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Writer::Plain(t) => t.flush(),
            Writer::Gzip(t) => t.flush(),
        }
    }
}

fn read_leb128(mut reader: impl Read) -> std::io::Result<u64> {
    let mut value: u64 = 0;
    let mut shift = 0;

    loop {
        let mut next_byte = [0u8; 1];
        reader.read_exact(&mut next_byte)?;

        let [next_byte] = next_byte;
        let is_last_byte = (next_byte & 0x80) == 0x00;
        let bits = (next_byte & 0x7F) as u64;

        if shift > 63 && bits != 0 || shift > 56 && bits > 1 {
            return Err(std::io::Error::new(
                ErrorKind::InvalidData,
                "leb128 length does not fit in a u64",
            ));
        }

        value |= bits.overflowing_shl(shift).0;
        shift += 7;

        if is_last_byte {
            return Ok(value);
        }
    }
}

fn write_leb128(mut number: u64, mut writer: impl Write) -> std::io::Result<()> {
    loop {
        let mut next_byte = (number as u8) & 0x7F;
        number >>= 7;

        if number > 0 {
            next_byte |= 0x80;
        }

        writer.write_all(&[next_byte])?;

        if number == 0 {
            return Ok(());
        }
    }
}

fn pack_shape(shape: &Shape, mut write: impl Write) -> std::io::Result<()> {
    let board = shape.board();

    if board.x > 0xFF || board.y > 0xFF || board.z > 0xFF {
        return Err(std::io::Error::new(
            ErrorKind::InvalidInput,
            "board does not fit in a .shapes record",
        ));
    }

    write.write_all(&[board.x as u8, board.y as u8, board.z as u8])?;
    write_leb128(shape.len() as u64, &mut write)?;

    for p in shape.points_sorted() {
        write.write_all(&[p.x as u8, p.y as u8, p.z as u8])?;
    }

    Ok(())
}

fn unpack_shape(mut read: impl Read) -> std::io::Result<Shape> {
    let mut dims = [0u8; 3];
    read.read_exact(&mut dims)?;

    let [bx, by, bz] = dims;
    let board = Board::new(bx as usize, by as usize, bz as usize);
    let count = read_leb128(&mut read)?;

    let mut shape = Shape::new(board);
    for _ in 0..count {
        let mut xyz = [0u8; 3];
        read.read_exact(&mut xyz)?;

        let [x, y, z] = xyz;
        let p = Point::new(x as i32, y as i32, z as i32);
        if !shape.insert(p) {
            return Err(std::io::Error::new(
                ErrorKind::InvalidData,
                format!("out-of-board or duplicate point ({x}, {y}, {z})"),
            ));
        }
    }

    Ok(shape)
}

/// A `.shapes` file.
///
/// Use this file as an iterator to get all of the [`Shape`]s it contains.
#[derive(Debug)]
pub struct ShapeFile<T = File>
where
    T: Read,
{
    input: Reader<T>,
    len: Option<usize>,
    shapes_read: usize,
    all_valid: bool,
}

impl<T> Iterator for ShapeFile<T>
where
    T: Read,
{
    type Item = std::io::Result<Shape>;

    fn size_hint(&self) -> (usize, Option<usize>) {
        if let Some(len) = self.len {
            (len, Some(len))
        } else {
            (0, None)
        }
    }

    fn next(&mut self) -> Option<Self::Item> {
        self.next()
    }
}

impl<T> ShapeFile<T>
where
    T: Read,
{
    /// The compression used by this file.
    pub fn compression(&self) -> Compression {
        match self.input {
            Reader::Plain(_) => Compression::None,
            Reader::Gzip(_) => Compression::Gzip,
        }
    }

    /// The amount of shapes in this file, if known.
    pub fn len(&self) -> Option<usize> {
        self.len
    }

    /// `true` if the file indicates that every stored shape passed the
    /// full generation checks.
    pub fn all_valid(&self) -> bool {
        self.all_valid
    }

    /// Try to create a new [`ShapeFile`] from the provided byte source.
    pub fn new(mut input: T) -> std::io::Result<Self> {
        let mut magic = [0u8; 4];
        input.read_exact(&mut magic)?;

        if magic != MAGIC {
            return Err(std::io::Error::new(
                ErrorKind::InvalidData,
                "File magic was incorrect.",
            ));
        }

        let mut header = [0u8; 2];
        input.read_exact(&mut header)?;

        let [flags, compression] = header;
        let all_valid = (flags & 0x01) != 0;

        let shape_count = read_leb128(&mut input)?;
        let len = if shape_count == 0 {
            None
        } else {
            Some(shape_count as usize)
        };

        let input = match Compression::try_from(compression) {
            Ok(Compression::None) => Reader::Plain(BufReader::new(input)),
            Ok(Compression::Gzip) => Reader::Gzip(GzDecoder::new(input)),
            Err(_) => {
                return Err(std::io::Error::new(
                    ErrorKind::InvalidData,
                    format!("Unsupported compression type {compression}"),
                ))
            }
        };

        Ok(Self {
            input,
            len,
            shapes_read: 0,
            all_valid,
        })
    }

    pub fn next(&mut self) -> Option<std::io::Result<Shape>> {
        match (unpack_shape(&mut self.input), self.len) {
            (Ok(shape), _) => {
                self.shapes_read += 1;
                Some(Ok(shape))
            }
            (Err(_), None) => None,
            (Err(e), Some(expected)) => {
                if expected == self.shapes_read {
                    None
                } else {
                    let msg = format!(
                        "Expected {expected} shapes, but failed to read after {} shapes. Error: {e}",
                        self.shapes_read
                    );
                    Some(Err(std::io::Error::new(ErrorKind::InvalidData, msg)))
                }
            }
        }
    }
}

impl ShapeFile {
    /// Try to create a new [`ShapeFile`] from the given path.
    pub fn new_file(p: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = std::fs::File::open(p.as_ref())?;
        Self::new(file)
    }

    /// Write the [`Shape`]s produced by `I` into `W`.
    ///
    /// `all_valid` should only be set to `true` if every shape in `I`
    /// came from the success path of the generator.
    pub fn write<'a, I, W>(
        all_valid: bool,
        compression: Compression,
        shapes: I,
        mut write: W,
    ) -> std::io::Result<usize>
    where
        I: Iterator<Item = &'a Shape>,
        W: Write,
    {
        let len = shapes.size_hint().1.map(|v| v as u64).unwrap_or(0);
        let flags = if all_valid { 0x01 } else { 0x00 };

        write.write_all(&MAGIC)?;
        write.write_all(&[flags, compression.into()])?;
        write_leb128(len, &mut write)?;

        let mut writer = match compression {
            Compression::None => Writer::Plain(write),
            Compression::Gzip => Writer::Gzip(GzEncoder::new(write, flate2::Compression::default())),
        };

        let mut shape_count = 0;
        for shape in shapes {
            pack_shape(shape, &mut writer)?;
            shape_count += 1;
        }

        writer.flush()?;

        Ok(shape_count)
    }

    /// Write the [`Shape`]s produced by `I` to the file at `path`.
    ///
    /// This will create a new file, or _will_ overwrite the contents of
    /// the file at `path`. It will not create the parent directories of
    /// `path`.
    pub fn write_file<'a, I>(
        all_valid: bool,
        compression: Compression,
        shapes: I,
        path: impl AsRef<Path>,
    ) -> std::io::Result<usize>
    where
        I: Iterator<Item = &'a Shape>,
    {
        let file = std::fs::File::create(path.as_ref())?;
        Self::write(all_valid, compression, shapes, file)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_shapes() -> Vec<Shape> {
        let board = Board::new(5, 4, 5);
        vec![
            Shape::from_points(
                board,
                [Point::new(0, 0, 0), Point::new(1, 0, 0), Point::new(1, 1, 0)],
            ),
            Shape::from_points(board, [Point::new(4, 3, 4)]),
            Shape::from_points(
                board,
                (0..5).map(|x| Point::new(x, 2, 2)).collect::<Vec<_>>(),
            ),
        ]
    }

    #[test]
    fn round_trip() {
        for compression in [Compression::None, Compression::Gzip] {
            let shapes = sample_shapes();

            let mut bytes = Vec::new();
            let written =
                ShapeFile::write(true, compression, shapes.iter(), &mut bytes).unwrap();
            assert_eq!(written, shapes.len());

            let file = ShapeFile::new(&bytes[..]).unwrap();
            assert_eq!(file.len(), Some(shapes.len()));
            assert_eq!(file.compression(), compression);
            assert!(file.all_valid());

            let read: Vec<Shape> = file.map(|s| s.unwrap()).collect();
            assert_eq!(read, shapes);
        }
    }

    #[test]
    fn rejects_bad_magic() {
        let bytes = b"NOPE\x00\x00\x00";
        let err = ShapeFile::new(&bytes[..]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn rejects_duplicate_points() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&[0x00, 0x00]); // flags, no compression
        bytes.push(1); // one shape
        bytes.extend_from_slice(&[2, 2, 2]); // board
        bytes.push(2); // two points
        bytes.extend_from_slice(&[1, 1, 1, 1, 1, 1]);

        let mut file = ShapeFile::new(&bytes[..]).unwrap();
        let err = Iterator::next(&mut file).unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }
}
