extern crate log;
extern crate simplelog;

use std::fs::File;
use std::path::Path;
use std::time::Instant;

use bminor_lang::io::{read_input, write_program, Input};
use bminor_lang::project::*;
use bminor_lang::*;

fn main() -> Result<(), i32> {
    let config = configure_cli().get_matches();

    if let Some(level) = get_log_level(&config) {
        if let Err(msg) = configure_logging(level) {
            eprintln!("{}", msg);
            return Err(ERR_FAILURE);
        }
    }

    let stop_stage = get_stage(&config).map_err(fail)?;
    let format = get_format(&config).map_err(fail)?;
    let trace_lexer = get_lexer_tracing(&config).map_err(fail)?;
    let trace_parser = get_parser_tracing(&config).map_err(fail)?;

    let input = config
        .value_of("input")
        .ok_or_else(|| fail("Expected an input source file to compile".into()))?;

    // Checked before any work is done so a missing path fails immediately
    let output_target = config.value_of("output");
    if stop_stage == Stage::Codegen && output_target.is_none() {
        return Err(fail("The codegen stage requires an output file (-o)".into()));
    }

    let mut program = match read_input(Path::new(input)).map_err(fail)? {
        Input::Tree(program) => program,
        Input::Source(text) => {
            let tokenize_time = Instant::now();
            let tokens = match tokenize_source(&text, trace_lexer) {
                Ok(tokens) => tokens,
                Err(e) => {
                    eprintln!("scan failed on line {}: {}", e.line(), e.kind());
                    return Err(ERR_FAILURE);
                }
            };
            log::info!("Lexer: {}", tokenize_time.elapsed().as_secs_f32());

            if stop_stage == Stage::Scan {
                for t in tokens.iter() {
                    println!("{}", t.s.scan_name());
                }
                return Ok(());
            }

            let parse_time = Instant::now();
            let program = match parse_tokens(&tokens, trace_parser) {
                Ok(program) => program,
                Err(e) => {
                    eprintln!("parse failed on line {}: {}", e.line(), e.kind());
                    return Err(ERR_FAILURE);
                }
            };
            log::info!("Parser: {}", parse_time.elapsed().as_secs_f32());
            program
        }
    };

    match stop_stage {
        Stage::Scan => return Err(fail("Cannot scan an already parsed declaration tree".into())),
        Stage::Parse => {
            println!("parse successful");
            return Ok(());
        }
        Stage::Print => {
            return write_program(&program, format, &mut std::io::stdout()).map_err(fail);
        }
        _ => (),
    }

    let semantic_time = Instant::now();
    let mut symbols = match resolve_program(&mut program) {
        Ok(symbols) => symbols,
        Err(errs) => {
            print_errs(Stage::Resolve, &errs);
            return Err(ERR_FAILURE);
        }
    };

    if stop_stage == Stage::Resolve {
        for line in resolve_report(&symbols) {
            println!("{}", line);
        }
        return Ok(());
    }

    if let Err(errs) = type_check_program(&mut program, &mut symbols) {
        print_errs(Stage::TypeCheck, &errs);
        return Err(ERR_FAILURE);
    }
    log::info!("Semantic: {}", semantic_time.elapsed().as_secs_f32());

    if stop_stage == Stage::TypeCheck {
        println!("typecheck successful");
        return Ok(());
    }

    let codegen_time = Instant::now();
    let compiler = match generate(&program, &symbols) {
        Ok(compiler) => compiler,
        Err(errs) => {
            print_errs(Stage::Codegen, &errs);
            return Err(ERR_FAILURE);
        }
    };

    let output_target = output_target
        .ok_or_else(|| fail("The codegen stage requires an output file (-o)".into()))?;
    File::create(output_target)
        .and_then(|mut output| compiler.print(&mut output))
        .map_err(|e| fail(format!("Failed to write {}: {}", output_target, e)))?;
    log::info!("Codegen: {}", codegen_time.elapsed().as_secs_f32());

    Ok(())
}

fn fail(msg: String) -> i32 {
    eprintln!("{}", msg);
    ERR_FAILURE
}
