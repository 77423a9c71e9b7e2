extern crate serde;
extern crate serde_json;

extern crate clap;
extern crate itertools;
#[macro_use]
extern crate lazy_static;
extern crate petgraph;
extern crate regex;
#[macro_use]
extern crate tracing;
extern crate tracing_subscriber;

pub mod chart;
pub mod cmd_pipeline;
pub mod errors;
pub mod file_format;
pub mod graph;
pub mod logging;
