use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::context::Context;
use crate::errors::FatalError;
use crate::presenter::{present, OutputMode};
use crate::request_executor::{execute_request, ExecutionContext};
use crate::request_parser::parse_request;
use crate::template::{environment, render, TemplateHelpers};

/// Everything the pipeline needs from the command line.
#[derive(Debug)]
pub struct RunOptions {
    pub context_sources: Vec<String>,
    pub template: String,
    pub output: OutputMode,
    pub extract: Option<String>,
    pub test: bool,
    pub timeout: Option<Duration>,
}

/// Drive the whole pipeline: context, render, parse, then either the test
/// printout or the one network call plus presentation. Returns the process
/// exit status; every failure surfaces as a [`FatalError`] for the caller
/// to report exactly once.
pub fn run(options: &RunOptions, helpers: Arc<dyn TemplateHelpers>) -> Result<i32, FatalError> {
    let context = Context::from_sources(&options.context_sources)?;
    let env = environment(Path::new("."), helpers);
    let text = render(&env, &options.template, &context)?;
    let request = parse_request(&text)?;
    debug!("parsed request {} {}", request.method, request.url);

    if options.test {
        print!("{}", request.to_text());
        return Ok(0);
    }

    let execution = ExecutionContext::new(&context, options.timeout)?;
    let response = execute_request(&request, &execution)?;
    let (rendered, status) = present(&response, options.output, options.extract.as_deref())?;
    print!("{}", rendered);
    return Ok(status);
}
