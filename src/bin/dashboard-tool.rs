use std::env::args_os;
use std::process::exit;

use serde_json::to_string_pretty;

use dashboard_tools::cmd_pipeline::{build_pipeline, parser::OutputFormat};
use dashboard_tools::logging::init_logging;

fn main() {
    init_logging();

    let os_args: Vec<String> = args_os()
        .map(|os| os.into_string().unwrap_or("".to_string()))
        .collect();

    if os_args.len() < 2 {
        eprintln!(
            "Usage: dashboard-tool '[--config PATH] [-o pretty|concise] load-data FILE | build-graph | ...'"
        );
        exit(2);
    }

    let (pipeline, output_format) = match build_pipeline(&os_args[0], &os_args[1]) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            eprintln!("You did not specify a good pipeline!\n{}", err);
            exit(1);
        }
    };

    let value = match pipeline.run().and_then(|result| result.to_json()) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("Pipeline Error!\n{}", err);
            exit(1);
        }
    };

    match output_format {
        OutputFormat::Concise => println!("{}", value),
        OutputFormat::Pretty => match to_string_pretty(&value) {
            Ok(pretty) => println!("{}", pretty),
            Err(err) => {
                eprintln!("Pipeline Error!\n{}", err);
                exit(1);
            }
        },
    }
}
