mod cli;
mod json_export;
mod logging;
mod map_cmd;
mod page_range;
mod shared;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version print to stdout and succeed; usage errors exit 1
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    logging::init(cli.log_level);

    if let Err(code) = map_cmd::run(&cli) {
        std::process::exit(code);
    }
}
