use std::io::{self, Read, Write};

/// Logistic function with its input divided by `scale`.
pub fn sigmoid(x: f32, scale: f32) -> f32 {
    1. / (1. + (-x / scale).exp())
}

pub fn write_f32s(writer: &mut impl Write, values: &[f32]) -> io::Result<()> {
    for value in values {
        writer.write_all(&value.to_le_bytes())?;
    }

    Ok(())
}

pub fn read_f32s(reader: &mut impl Read, values: &mut [f32]) -> io::Result<()> {
    let mut buf = [0u8; 4];

    for value in values.iter_mut() {
        reader.read_exact(&mut buf)?;
        *value = f32::from_le_bytes(buf);
    }

    Ok(())
}
