use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use crate::{
    util::{read_f32s, write_f32s},
    Error, Network, Result,
};

/// Little-endian `u32` hidden size, then `W1`, `b1`, `W2`, `b2` as `f32`.
pub fn write_bin(nnue: &Network, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_network(nnue, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn read_bin(path: &Path) -> Result<Box<Network>> {
    read_network(&mut BufReader::new(File::open(path)?))
}

fn write_network(nnue: &Network, writer: &mut impl Write) -> Result<()> {
    let hidden = u32::try_from(nnue.hidden()).map_err(|_| Error::Checkpoint("hidden size exceeds u32".into()))?;
    writer.write_all(&hidden.to_le_bytes())?;
    write_f32s(writer, nnue)?;
    Ok(())
}

fn read_network(reader: &mut impl Read) -> Result<Box<Network>> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    let hidden = u32::from_le_bytes(buf) as usize;

    if hidden == 0 {
        return Err(Error::Checkpoint("hidden size of zero".into()));
    }

    let mut nnue = Network::new(hidden);
    read_f32s(reader, &mut nnue)?;

    let mut rest = Vec::new();
    reader.read_to_end(&mut rest)?;
    if !rest.is_empty() {
        return Err(Error::Checkpoint(format!("{} trailing bytes after network", rest.len())));
    }

    Ok(nnue)
}
