mod convert;
mod shuffle;
mod validate;

use structopt::StructOpt;

#[derive(StructOpt)]
pub enum Options {
    Convert(convert::ConvertOptions),
    Shuffle(shuffle::ShuffleOptions),
    Validate(validate::ValidateOptions),
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Options::from_args() {
        Options::Convert(options) => options.run(),
        Options::Shuffle(options) => options.run(),
        Options::Validate(options) => options.run(),
    }
}
