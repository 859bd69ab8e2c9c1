extern crate clap;
extern crate env_logger;
extern crate libvsl;
#[macro_use] extern crate log;

use clap::Parser;
use libvsl::compiler::Compiler;
use libvsl::semantic::{AnalysisOptions, SymbolTableDump};
use std::process;

#[derive(Parser, Debug)]
#[command(name = "vslc", version)]
#[command(about = "Builds and prints the symbol tables of VSL programs")]
struct Args {
    /// Print the annotated syntax tree
    #[arg(long)]
    tree: bool,

    /// Skip the symbol table listing
    #[arg(long = "no-symbols")]
    no_symbols: bool,

    /// Bucket count of the global tables
    #[arg(long = "global-buckets", default_value_t = 64)]
    global_buckets: usize,

    /// Bucket count of function and block tables
    #[arg(long = "scope-buckets", default_value_t = 16)]
    scope_buckets: usize,

    /// Source files to analyse
    #[arg(required = true)]
    input: Vec<String>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let compiler = Compiler::with_options(AnalysisOptions {
        global_buckets: args.global_buckets,
        scope_buckets: args.scope_buckets,
    });

    let mut failed = false;
    for path in &args.input {
        match compiler.compile(path) {
            Ok(ctx) => {
                if args.tree {
                    print!("{}", ctx.tree.dump());
                }
                if !args.no_symbols {
                    print!("{}", SymbolTableDump::new(&ctx));
                }
                let teardown = ctx.destroy();
                debug!("{}: released {}", path, teardown.summary());
            },
            Err(err) => {
                eprintln!("{}: {}", path, err);
                failed = true;
            },
        }
    }

    if failed {
        process::exit(1);
    }
}
