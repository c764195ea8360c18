//! Script-style text artifact: one `const` assignment per metadata field,
//! then the weights grouped by layer.
//!
//! ```text
//! const net_h1_size     = 75;
//! ...
//! const net_h1_w = Array(768);
//! net_h1_w[0]  = new Float32Array([...]);
//! const net_h1_b = new Float32Array([...]);
//! const net_o_w = new Float32Array([...]);
//! const net_o_b = 0.01;
//! ```

use std::{collections::HashMap, fmt::Display, io, io::Write, str::FromStr};

use super::{Checkpoint, CheckpointMeta};
use crate::{Error, Network, Result, INPUT_SIZE};

const EOL: &str = "\r\n";
const ARRAY_START: &str = "new Float32Array([";
const ARRAY_END: &str = "])";

impl Checkpoint {
    pub fn write_text(&self, writer: &mut impl Write) -> io::Result<()> {
        let meta = &self.meta;
        let nnue = &self.network;

        write!(writer, "//{{{{{{  weights{EOL}")?;

        let mut assign = |name: &str, value: &dyn Display| write!(writer, "const {name:<15} = {value};{EOL}");
        assign("net_h1_size", &meta.hidden_size)?;
        assign("net_lr", &meta.learning_rate)?;
        assign("net_activation", &quoted(meta.activation))?;
        assign("net_stretch", &meta.eval_scale)?;
        assign("net_interp", &meta.interp)?;
        assign("net_batch_size", &meta.batch_size)?;
        assign("net_num_batches", &meta.num_batches)?;
        assign("net_positions", &meta.positions())?;
        assign("net_opt", &quoted(meta.optimiser))?;
        assign("net_shuffle", &meta.shuffle)?;
        assign("net_l2_reg", &meta.l2_reg)?;
        assign("net_epochs", &meta.epoch)?;
        assign("net_loss", &meta.loss)?;

        write!(writer, "//{{{{{{  weights{EOL}")?;

        write!(writer, "const net_h1_w = Array({INPUT_SIZE});{EOL}")?;
        for feat in 0..INPUT_SIZE {
            write!(writer, "net_h1_w[{feat}]  = {};{EOL}", array(nnue.feature_weights_row(feat)))?;
        }

        write!(writer, "const net_h1_b = {};{EOL}", array(nnue.feature_biases()))?;
        write!(writer, "const net_o_w = {};{EOL}", array(nnue.output_weights_slice()))?;
        write!(writer, "const net_o_b = {};{EOL}", nnue.output_bias())?;

        write!(writer, "{EOL}//}}}}}}{EOL}")?;
        write!(writer, "{EOL}//}}}}}}{EOL}{EOL}")
    }

    pub fn to_text(&self) -> String {
        let mut buf = Vec::new();
        self.write_text(&mut buf).expect("writing to a Vec cannot fail");
        String::from_utf8(buf).expect("checkpoint text is always utf-8")
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut fields = HashMap::new();
        let mut rows = vec![None; INPUT_SIZE];
        let mut biases = None;
        let mut output_weights = None;

        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            let (lhs, rhs) = line
                .trim_end_matches(';')
                .split_once('=')
                .ok_or_else(|| invalid(format!("expected an assignment, found [{line}]")))?;

            let name = lhs.trim().trim_start_matches("const ").trim();
            let value = rhs.trim();

            match name {
                "net_h1_w" => {
                    if value != format!("Array({INPUT_SIZE})") {
                        return Err(invalid(format!("expected {INPUT_SIZE} weight rows, found {value}")));
                    }
                }
                "net_h1_b" => biases = Some(parse_array(value)?),
                "net_o_w" => output_weights = Some(parse_array(value)?),
                _ if name.starts_with("net_h1_w[") => {
                    let idx = name["net_h1_w[".len()..]
                        .trim_end_matches(']')
                        .parse::<usize>()
                        .ok()
                        .filter(|&idx| idx < INPUT_SIZE)
                        .ok_or_else(|| invalid(format!("bad weight row [{name}]")))?;
                    rows[idx] = Some(parse_array(value)?);
                }
                _ => {
                    fields.insert(name.to_string(), value.trim_matches('"').to_string());
                }
            }
        }

        let meta = CheckpointMeta {
            hidden_size: field(&fields, "net_h1_size")?,
            learning_rate: field(&fields, "net_lr")?,
            activation: field(&fields, "net_activation")?,
            eval_scale: field(&fields, "net_stretch")?,
            interp: field(&fields, "net_interp")?,
            batch_size: field(&fields, "net_batch_size")?,
            num_batches: field(&fields, "net_num_batches")?,
            optimiser: field(&fields, "net_opt")?,
            shuffle: field(&fields, "net_shuffle")?,
            l2_reg: field(&fields, "net_l2_reg")?,
            epoch: field(&fields, "net_epochs")?,
            loss: field(&fields, "net_loss")?,
        };

        let hidden = meta.hidden_size;
        let mut network = Network::new(hidden);

        for (feat, row) in rows.into_iter().enumerate() {
            let row = row.ok_or_else(|| invalid(format!("missing weight row {feat}")))?;
            copy_exact(network.feature_weights_row_mut(feat), &row, "net_h1_w")?;
        }

        copy_exact(network.feature_biases_mut(), &biases.ok_or_else(|| invalid("missing net_h1_b"))?, "net_h1_b")?;
        copy_exact(
            network.output_weights_mut(),
            &output_weights.ok_or_else(|| invalid("missing net_o_w"))?,
            "net_o_w",
        )?;
        *network.output_bias_mut() = field(&fields, "net_o_b")?;

        Ok(Self { meta, network })
    }
}

fn quoted(value: impl Display) -> String {
    format!("\"{value}\"")
}

fn array(values: &[f32]) -> String {
    let values = values.iter().map(f32::to_string).collect::<Vec<_>>();
    format!("{ARRAY_START}{}{ARRAY_END}", values.join(","))
}

fn parse_array(value: &str) -> Result<Vec<f32>> {
    let inner = value
        .strip_prefix(ARRAY_START)
        .and_then(|v| v.strip_suffix(ARRAY_END))
        .ok_or_else(|| invalid(format!("expected a float array, found [{value}]")))?;

    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .map(|x| x.trim().parse::<f32>().map_err(|_| invalid(format!("bad float [{x}]"))))
        .collect()
}

fn field<T: FromStr>(fields: &HashMap<String, String>, name: &str) -> Result<T> {
    let value = fields.get(name).ok_or_else(|| invalid(format!("missing {name}")))?;
    value.parse().map_err(|_| invalid(format!("bad value for {name}: [{value}]")))
}

fn copy_exact(dst: &mut [f32], src: &[f32], name: &str) -> Result<()> {
    if dst.len() != src.len() {
        return Err(invalid(format!("{name} has {} values, expected {}", src.len(), dst.len())));
    }

    dst.copy_from_slice(src);
    Ok(())
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::Checkpoint(msg.into())
}
