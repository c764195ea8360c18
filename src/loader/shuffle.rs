use std::{
    ffi::OsString,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    process::{Command, Stdio},
    thread,
};

use crate::{rng::Rand, Error, Result};

/// How dataset files are permuted between epochs. Either way the permuted
/// lines go to `<file>.tmp`, which is then renamed over `<file>`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Shuffler {
    /// Shuffle the lines in memory.
    #[default]
    InProcess,
    /// Run `<command> <file>` and capture its stdout, e.g. `shuf`.
    External(String),
}

impl Shuffler {
    /// Permutes the lines of `path` in place. `seed` fixes the permutation
    /// for the in-process shuffler and is ignored by external commands.
    pub fn shuffle_file(&self, path: &Path, seed: Option<u64>) -> Result<()> {
        let tmp = tmp_path(path);

        let written = match self {
            Self::InProcess => {
                let mut rand = seed.map_or_else(Rand::from_entropy, Rand::new);
                shuffle_in_memory(path, &tmp, &mut rand)
            }
            Self::External(command) => run_external(command, path, &tmp),
        };

        if let Err(err) = written {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }

        fs::rename(&tmp, path).map_err(|err| shuffle_error(path, format!("failed to move temporary file: {err}")))
    }
}

/// Shuffles every file concurrently, returning once all have finished.
/// Fails if any single file failed. With a `seed`, every file gets its own
/// fixed permutation.
pub fn shuffle_files<P: AsRef<Path> + Sync>(paths: &[P], shuffler: &Shuffler, seed: Option<u64>) -> Result<()> {
    thread::scope(|s| {
        let handles = paths
            .iter()
            .enumerate()
            .map(|(i, path)| {
                let seed = seed.map(|seed| file_seed(seed, i));
                s.spawn(move || shuffler.shuffle_file(path.as_ref(), seed))
            })
            .collect::<Vec<_>>();

        let mut result = Ok(());

        for (handle, path) in handles.into_iter().zip(paths) {
            let outcome = handle
                .join()
                .unwrap_or_else(|_| Err(shuffle_error(path.as_ref(), "shuffle thread panicked".to_string())));

            if let Err(err) = outcome {
                log::error!("{err}");
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }

        result
    })
}

/// Seed for the `stream`-th independent permutation derived from `seed`.
pub fn file_seed(seed: u64, stream: usize) -> u64 {
    seed ^ (stream as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Line terminators are kept as found. A last line without one gets the
/// terminator of the first line, as `shuf` would add.
fn shuffle_in_memory(path: &Path, tmp: &Path, rand: &mut Rand) -> Result<()> {
    let mut contents = fs::read_to_string(path)?;

    if !contents.is_empty() && !contents.ends_with('\n') {
        let eol = if contents.contains("\r\n") { "\r\n" } else { "\n" };
        contents.push_str(eol);
    }

    let mut lines = contents.split_inclusive('\n').collect::<Vec<_>>();
    rand.shuffle(&mut lines);

    let mut writer = BufWriter::new(File::create(tmp)?);
    for line in lines {
        writer.write_all(line.as_bytes())?;
    }
    writer.flush()?;

    Ok(())
}

fn run_external(command: &str, path: &Path, tmp: &Path) -> Result<()> {
    let stdout = File::create(tmp)?;

    let output = Command::new(command)
        .arg(path)
        .stdout(stdout)
        .stderr(Stdio::piped())
        .output()
        .map_err(|err| shuffle_error(path, format!("failed to run `{command}`: {err}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(shuffle_error(path, format!("`{command}` exited with {}: {}", output.status, stderr.trim())));
    }

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

fn shuffle_error(path: &Path, reason: String) -> Error {
    Error::Shuffle { path: path.to_path_buf(), reason }
}
