use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{arg, value_parser, ArgAction, Command};
use httptemplate::execute::{run, RunOptions};
use httptemplate::presenter::OutputMode;
use httptemplate::template::SystemHelpers;

fn main() {
    env_logger::init();

    let cmd = Command::new("httpt")
        .version(clap::crate_version!())
        .about(clap::crate_description!())
        .arg(
            arg!(-o --output <format> "response parts to print: any subset of s (status), h (headers), b (body)")
                .required(false)
                .default_value("shb"),
        )
        .arg(
            arg!(-e --extract <query> "extract values from a json body via a jsonpath query")
                .required(false),
        )
        .arg(
            arg!(-t --test "render and parse the template without submitting the request")
                .action(ArgAction::SetTrue),
        )
        .arg(
            arg!(--timeout <seconds> "request timeout in seconds; no timeout when omitted")
                .required(false)
                .value_parser(value_parser!(u64)),
        )
        .arg(
            arg!(<ARGS> "context values and file names, followed by the template file")
                .value_parser(value_parser!(String))
                .action(ArgAction::Append),
        );

    let matches = cmd.get_matches();
    let mut args: Vec<String> = matches
        .get_many::<String>("ARGS")
        .unwrap()
        .cloned()
        .collect();
    let template = args.pop().unwrap();

    let options = RunOptions {
        context_sources: args,
        template,
        output: OutputMode::parse(matches.get_one::<String>("output").unwrap()),
        extract: matches.get_one::<String>("extract").cloned(),
        test: matches.get_flag("test"),
        timeout: matches
            .get_one::<u64>("timeout")
            .copied()
            .map(Duration::from_secs),
    };

    match run(&options, Arc::new(SystemHelpers)) {
        Ok(status) => process::exit(status),
        Err(error) => {
            eprintln!("ERROR: {}.", error);
            process::exit(1);
        }
    }
}
