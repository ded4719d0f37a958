//! Runs each phase of the compiler over a single compilation unit.  Every
//! phase only runs when the phase before it produced no errors.
use log::info;

use crate::{
    compiler::{
        ast::Program,
        compiler::Compiler,
        lexer::{Lexer, LexerError, Token},
        parser::{parse, ParserError},
        semantics::{resolve, type_check, SymbolArena},
        CompilerError,
    },
    diagnostics::config::{Tracing, TracingConfig},
    result::NResult,
};

fn messages<E: std::fmt::Display>(errs: Vec<CompilerError<E>>) -> Vec<String> {
    errs.iter().map(|e| e.to_string()).collect()
}

/// Converts source text into tokens, stopping at the first lexical error.
pub fn tokenize_source(
    text: &str,
    trace_lexer: TracingConfig,
) -> Result<Vec<Token>, CompilerError<LexerError>> {
    let mut lexer = Lexer::new(text);
    lexer.set_tracing(trace_lexer);
    let tokens = lexer.tokenize().into_iter().collect::<Result<Vec<_>, _>>()?;
    info!("Scanned {} tokens", tokens.len());
    Ok(tokens)
}

pub fn parse_tokens(
    tokens: &[Token],
    trace_parser: TracingConfig,
) -> Result<Program, CompilerError<ParserError>> {
    let program = parse(tokens, trace_parser)?;
    info!("Parsed {} declarations", program.decls.len());
    Ok(program)
}

pub fn resolve_program(program: &mut Program) -> NResult<SymbolArena> {
    let symbols = resolve(program).map_err(messages)?;
    info!("Resolved {} symbols", symbols.len());
    Ok(symbols)
}

pub fn type_check_program(program: &mut Program, symbols: &mut SymbolArena) -> NResult<()> {
    type_check(program, symbols).map_err(messages)?;
    info!("Type check passed");
    Ok(())
}

pub fn generate(program: &Program, symbols: &SymbolArena) -> NResult<Compiler> {
    let compiler = Compiler::compile(program, symbols).map_err(messages)?;
    info!("Code generation finished");
    Ok(compiler)
}

/// One line for every symbol, in the order the declarations appear.
pub fn resolve_report(symbols: &SymbolArena) -> Vec<String> {
    symbols
        .iter()
        .map(|(_, sym)| format!("{} resolves to {}", sym.name, sym))
        .collect()
}

/// Runs every phase over `text` and returns the generated assembly.
pub fn compile_source(text: &str) -> NResult<Compiler> {
    let tokens = tokenize_source(text, TracingConfig::Off).map_err(|e| vec![e.to_string()])?;
    let mut program = parse_tokens(&tokens, TracingConfig::Off).map_err(|e| vec![e.to_string()])?;
    let mut symbols = resolve_program(&mut program)?;
    type_check_program(&mut program, &mut symbols)?;
    generate(&program, &symbols)
}
