use anyhow::Context;
use minish::{Interpreter, Options, logging};
use std::fs::File;
use std::io::BufReader;

fn main() -> anyhow::Result<()> {
    let opts: Options = argh::from_env();
    logging::init_logging();

    let mut sh = Interpreter::with_config(opts.config());

    if let Some(line) = &opts.command {
        let status = match sh.execute_line(line) {
            Ok(outcome) => outcome.status(),
            Err(err) => {
                eprintln!("minish: {}", err);
                1
            }
        };
        std::process::exit(status);
    }

    if let Some(path) = &opts.script {
        let file = File::open(path).with_context(|| format!("can't open {}", path.display()))?;
        let status = sh.run_script(BufReader::new(file))?;
        std::process::exit(status);
    }

    sh.repl()?;
    Ok(())
}
