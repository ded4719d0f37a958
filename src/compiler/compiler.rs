// Code generation - lowers a resolved and type checked program into x86-64
// assembly for the GNU assembler.
use log::{debug, trace};

use crate::{
    assembly,
    compiler::{
        arch::registers::ScratchRegisters,
        ast::{
            BinaryOperator, Declaration, ExprKind, Expression, Initializer, Program, Statement,
            StmtKind, Type, UnaryOperator,
        },
        memory::{
            frame::{StackFrame, SLOT_SIZE},
            labels::LabelAllocator,
            stringpool::StringPool,
        },
        semantics::{type_of, Symbol, SymbolArena, SymbolKind},
        x86::assembly::{Inst, Operand, Reg64},
        CompilerError,
    },
};

/// Registers used to hold intermediate values, in allocation order.
const SCRATCH: [Reg64; 7] = [
    Reg64::Rbx,
    Reg64::R10,
    Reg64::R11,
    Reg64::R12,
    Reg64::R13,
    Reg64::R14,
    Reg64::R15,
];

/// Registers which carry the arguments of a call, by parameter position.
const ARGUMENTS: [Reg64; 6] = [
    Reg64::Rdi,
    Reg64::Rsi,
    Reg64::Rdx,
    Reg64::Rcx,
    Reg64::R8,
    Reg64::R9,
];

/// Saved by every function body.
const CALLEE_SAVED: [Reg64; 5] = [Reg64::Rbx, Reg64::R12, Reg64::R13, Reg64::R14, Reg64::R15];

/// Scratch registers a callee is free to overwrite.
const CALLER_SAVED: [Reg64; 2] = [Reg64::R10, Reg64::R11];

/// Global names taken by the runtime routines and the C library functions
/// they call.
const RESERVED: [&str; 7] = [
    "print_integer",
    "print_string",
    "print_character",
    "print_boolean",
    "integer_power",
    "printf",
    "putchar",
];

#[derive(Clone, Debug, PartialEq)]
pub enum CodegenError {
    OutOfScratchRegisters,
    LocalArray(String),
    LocalFunction(String),
    StringArray(String),
    MultiDimArray(String),
    MultiDimIndex,
    TooManyParams(String, usize),
    TooManyArgs(String, usize),
    GlobalStringReassign(String),
    NonConstantInitializer(String),
    Unresolved(String),
    ReservedName(String),
    Unsupported(String),
}

impl CodegenError {
    /// Fatal errors stop code generation.  Every other error only stops the
    /// emission of the declaration it was found in.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CodegenError::OutOfScratchRegisters)
    }
}

impl std::fmt::Display for CodegenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CodegenError::*;
        match self {
            OutOfScratchRegisters => f.write_str("Ran out of scratch registers"),
            LocalArray(name) => write!(f, "Array {} must be declared at global scope", name),
            LocalFunction(name) => write!(f, "Function {} must be declared at global scope", name),
            StringArray(name) => write!(f, "Arrays of strings are not supported: {}", name),
            MultiDimArray(name) => write!(
                f,
                "Multi-dimensional arrays are not supported: {}",
                name
            ),
            MultiDimIndex => f.write_str("Only one-dimensional array access is supported"),
            TooManyParams(name, n) => write!(
                f,
                "Function {} has {} parameters but at most {} are supported",
                name,
                n,
                ARGUMENTS.len()
            ),
            TooManyArgs(name, n) => write!(
                f,
                "Call to {} has {} arguments but at most {} are supported",
                name,
                n,
                ARGUMENTS.len()
            ),
            GlobalStringReassign(name) => {
                write!(f, "Global string {} cannot be reassigned", name)
            }
            NonConstantInitializer(name) => {
                write!(f, "Global {} must be initialized with a constant", name)
            }
            Unresolved(name) => write!(f, "{} was not resolved to a symbol", name),
            ReservedName(name) => {
                write!(f, "{} is reserved for the runtime and cannot be declared", name)
            }
            Unsupported(what) => write!(f, "Unsupported: {}", what),
        }
    }
}

type CodegenResult<T> = Result<T, CompilerError<CodegenError>>;

/// The assembly generated for a program.
#[derive(Debug)]
pub struct Compiler {
    data: Vec<Inst>,
    text: Vec<Inst>,
}

impl Compiler {
    pub fn print(&self, output: &mut dyn std::io::Write) -> std::io::Result<()> {
        write!(output, "{}", self)
    }

    /// Generates the assembly for `program`.  Every global variable is placed
    /// in the data section and every function definition in the text section,
    /// after the runtime support routines.
    ///
    /// A declaration which cannot be compiled is reported and skipped, and
    /// the remaining declarations are still compiled.  If anything was reported
    /// then every error is returned.  Running out of scratch registers stops
    /// code generation immediately.
    pub fn compile(
        program: &Program,
        symbols: &SymbolArena,
    ) -> Result<Compiler, Vec<CompilerError<CodegenError>>> {
        debug!("Generating code for {} declarations", program.decls.len());
        let mut ctx = Context::new(symbols);
        let mut globals = vec![];
        let mut functions = vec![];
        let mut errors = vec![];

        for d in program.decls.iter() {
            if RESERVED.contains(&d.name.as_str()) {
                errors.push(CompilerError::new(
                    d.line,
                    CodegenError::ReservedName(d.name.clone()),
                ));
                continue;
            }

            let result = match (&d.ty, &d.code) {
                (Type::Function(..), Some(code)) => ctx
                    .function(d, code)
                    .map(|mut code| functions.append(&mut code)),
                (Type::Function(..), None) => Ok(()),
                _ => ctx
                    .global(d)
                    .map(|mut code| globals.append(&mut code))
                    .map_err(|e| vec![e]),
            };

            if let Err(mut errs) = result {
                let fatal = errs.iter().any(|e| e.kind().is_fatal());
                for e in errs.iter() {
                    debug!("{}", e);
                }
                errors.append(&mut errs);
                if fatal {
                    return Err(errors);
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let mut data = vec![Inst::Section(".data".into())];
        Compiler::runtime_data(&mut data);
        data.append(&mut globals);
        for (lbl, s) in ctx.strings.iter() {
            data.push(Inst::Label(lbl));
            data.push(Inst::Str(s.into()));
        }

        let mut text = vec![Inst::Section(".text".into())];
        Compiler::print_integer(&mut text);
        Compiler::print_string(&mut text);
        Compiler::print_character(&mut text);
        Compiler::print_boolean(&mut text);
        Compiler::integer_power(&mut text);
        text.append(&mut functions);
        text.push(Inst::Section(".note.GNU-stack,\"\",@progbits".into()));

        debug!(
            "Generated {} instructions and {} string literals",
            data.len() + text.len(),
            ctx.strings.len()
        );
        Ok(Compiler { data, text })
    }

    fn runtime_data(data: &mut Vec<Inst>) {
        for (lbl, s) in [
            (".fmt_integer", "%ld"),
            (".fmt_string", "%s"),
            (".str_true", "true"),
            (".str_false", "false"),
        ]
        .iter()
        {
            data.push(Inst::Label((*lbl).into()));
            data.push(Inst::Str((*s).into()));
        }
    }

    fn print_integer(code: &mut Vec<Inst>) {
        assembly! {(code) {
            @print_integer:
                pushq %rbp;
                movq %rsp, %rbp;
                andq {-16}, %rsp;
                movq %rdi, %rsi;
                leaq [@{".fmt_integer"}], %rdi;
                movq {0}, %rax;
                call @{"printf@PLT"};
                movq %rbp, %rsp;
                popq %rbp;
                ret;
        }}
    }

    fn print_string(code: &mut Vec<Inst>) {
        assembly! {(code) {
            @print_string:
                pushq %rbp;
                movq %rsp, %rbp;
                andq {-16}, %rsp;
                movq %rdi, %rsi;
                leaq [@{".fmt_string"}], %rdi;
                movq {0}, %rax;
                call @{"printf@PLT"};
                movq %rbp, %rsp;
                popq %rbp;
                ret;
        }}
    }

    fn print_character(code: &mut Vec<Inst>) {
        assembly! {(code) {
            @print_character:
                pushq %rbp;
                movq %rsp, %rbp;
                andq {-16}, %rsp;
                call @{"putchar@PLT"};
                movq %rbp, %rsp;
                popq %rbp;
                ret;
        }}
    }

    fn print_boolean(code: &mut Vec<Inst>) {
        assembly! {(code) {
            @print_boolean:
                pushq %rbp;
                movq %rsp, %rbp;
                andq {-16}, %rsp;
                leaq [@{".str_true"}], %rsi;
                cmpq {0}, %rdi;
                jne @{".print_boolean_true"};
                leaq [@{".str_false"}], %rsi;
            @{".print_boolean_true"}:
                leaq [@{".fmt_string"}], %rdi;
                movq {0}, %rax;
                call @{"printf@PLT"};
                movq %rbp, %rsp;
                popq %rbp;
                ret;
        }}
    }

    /// %rdi raised to the power %rsi.  Negative exponents give 1.
    fn integer_power(code: &mut Vec<Inst>) {
        assembly! {(code) {
            @integer_power:
                movq {1}, %rax;
            @{".integer_power_loop"}:
                cmpq {0}, %rsi;
                jle @{".integer_power_done"};
                imulq %rdi, %rax;
                decq %rsi;
                jmp @{".integer_power_loop"};
            @{".integer_power_done"}:
                ret;
        }}
    }
}

impl std::fmt::Display for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for inst in self.data.iter().chain(self.text.iter()) {
            writeln!(f, "{}", inst)?;
        }
        Ok(())
    }
}

/// The state shared by every traversal during code generation.
struct Context<'a> {
    symbols: &'a SymbolArena,
    registers: ScratchRegisters<Reg64>,
    labels: LabelAllocator,
    strings: StringPool,
    func: String,
}

impl<'a> Context<'a> {
    fn new(symbols: &'a SymbolArena) -> Context<'a> {
        Context {
            symbols,
            registers: ScratchRegisters::new(&SCRATCH),
            labels: LabelAllocator::new(),
            strings: StringPool::new(),
            func: String::new(),
        }
    }

    fn alloc(&mut self, line: u32) -> CodegenResult<Reg64> {
        let reg = self
            .registers
            .alloc()
            .ok_or_else(|| CompilerError::new(line, CodegenError::OutOfScratchRegisters))?;
        trace!("alloc {}", reg);
        Ok(reg)
    }

    fn free(&mut self, reg: Reg64) {
        trace!("free {}", reg);
        self.registers.free(reg)
    }

    fn decl_symbol(&self, d: &Declaration) -> CodegenResult<&'a Symbol> {
        let symbols = self.symbols;
        d.symbol
            .and_then(|id| symbols.get(id))
            .ok_or_else(|| CompilerError::new(d.line, CodegenError::Unresolved(d.name.clone())))
    }

    fn symbol(&self, e: &Expression) -> CodegenResult<&'a Symbol> {
        let symbols = self.symbols;
        e.get_symbol().and_then(|id| symbols.get(id)).ok_or_else(|| {
            CompilerError::new(
                e.line,
                CodegenError::Unresolved(e.get_name().unwrap_or("expression").into()),
            )
        })
    }

    /// Where the value of a variable is stored.
    fn location(sym: &Symbol) -> Operand {
        match sym.kind {
            SymbolKind::Global => Operand::RipRelative(sym.name.clone()),
            SymbolKind::Local | SymbolKind::Param => {
                Operand::Memory(Reg64::Rbp, -(StackFrame::offset(sym.which) as i64))
            }
        }
    }

    /// Data section entry for a global variable.
    fn global(&mut self, d: &Declaration) -> CodegenResult<Vec<Inst>> {
        debug!("Compiling global {}", d.name);
        let sym = self.decl_symbol(d)?;
        let err = |e| CompilerError::new(d.line, e);
        let mut code = vec![Inst::Label(d.name.clone())];

        match &sym.ty {
            Type::String => match &d.value {
                None => code.push(Inst::Str(String::new())),
                Some(Initializer::Expr(Expression {
                    kind: ExprKind::StringLiteral(s),
                    ..
                })) => code.push(Inst::Str(s.clone())),
                Some(_) => return Err(err(CodegenError::NonConstantInitializer(d.name.clone()))),
            },
            Type::Array(el, size) => {
                match el.as_ref() {
                    Type::String => return Err(err(CodegenError::StringArray(d.name.clone()))),
                    Type::Array(..) => {
                        return Err(err(CodegenError::MultiDimArray(d.name.clone())))
                    }
                    _ => (),
                }

                let values = match &d.value {
                    None => vec![],
                    Some(Initializer::List(elements)) => elements
                        .iter()
                        .map(|e| e.constant_value())
                        .collect::<Option<Vec<i64>>>()
                        .ok_or_else(|| {
                            err(CodegenError::NonConstantInitializer(d.name.clone()))
                        })?,
                    Some(Initializer::Expr(_)) => {
                        return Err(err(CodegenError::NonConstantInitializer(d.name.clone())))
                    }
                };

                let count = values.len();
                let padding = size.saturating_sub(count);
                if count > 0 {
                    code.push(Inst::Quad(values));
                }
                if padding > 0 {
                    code.push(Inst::Zero(padding * SLOT_SIZE));
                } else if count == 0 {
                    code.push(Inst::Zero(SLOT_SIZE));
                }
            }
            Type::Function(..) => {
                return Err(err(CodegenError::Unsupported(format!(
                    "function variable {}",
                    d.name
                ))))
            }
            _ => {
                let value = match &d.value {
                    None => 0,
                    Some(Initializer::Expr(e)) => e.constant_value().ok_or_else(|| {
                        err(CodegenError::NonConstantInitializer(d.name.clone()))
                    })?,
                    Some(Initializer::List(_)) => {
                        return Err(err(CodegenError::NonConstantInitializer(d.name.clone())))
                    }
                };
                code.push(Inst::Quad(vec![value]));
            }
        }

        Ok(code)
    }

    /// Every statement of the body is compiled even after one of them fails,
    /// so that all of the errors in the function are reported.  A fatal error
    /// stops at once.
    fn function(
        &mut self,
        d: &Declaration,
        body: &[Statement],
    ) -> Result<Vec<Inst>, Vec<CompilerError<CodegenError>>> {
        debug!("Compiling function {}", d.name);
        let frame = StackFrame::from_function(d);
        if frame.params() > ARGUMENTS.len() {
            return Err(vec![CompilerError::new(
                d.line,
                CodegenError::TooManyParams(d.name.clone(), frame.params()),
            )]);
        }

        self.registers.reset();
        self.func = d.name.clone();
        let epilogue = LabelAllocator::epilogue(&d.name);

        let mut stmts = vec![];
        let mut errors = vec![];
        for s in body {
            if let Err(e) = self.statement(s, &mut stmts) {
                let fatal = e.kind().is_fatal();
                errors.push(e);
                if fatal {
                    return Err(errors);
                }
                // No value is live between statements
                self.registers.reset();
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        trace!(
            "{} scratch registers in use after {}",
            self.registers.in_use(),
            d.name
        );

        let mut code = vec![Inst::Global(d.name.clone())];
        assembly! {(code) {
            @{d.name}:
                pushq %rbp;
                movq %rsp, %rbp;
        }}
        for reg in ARGUMENTS.iter().take(frame.params()) {
            assembly! {(code) {pushq %{*reg};}}
        }
        if frame.locals_size() > 0 {
            assembly! {(code) {subq {frame.locals_size()}, %rsp;}}
        }
        for reg in CALLEE_SAVED.iter() {
            assembly! {(code) {pushq %{*reg};}}
        }

        assembly! {(code) {
            {{stmts}}
            @{epilogue}:
        }}
        for reg in CALLEE_SAVED.iter().rev() {
            assembly! {(code) {popq %{*reg};}}
        }
        for (slot, reg) in ARGUMENTS.iter().take(frame.params()).enumerate() {
            assembly! {(code) {movq [%rbp-{StackFrame::offset(slot)}], %{*reg};}}
        }
        assembly! {(code) {
                movq %rbp, %rsp;
                popq %rbp;
                ret;
        }}

        Ok(code)
    }

    fn statement(&mut self, s: &Statement, code: &mut Vec<Inst>) -> CodegenResult<()> {
        match &s.kind {
            StmtKind::Decl(d) => self.local(d, code)?,
            StmtKind::Expr(e) => {
                let reg = self.expr(e, code)?;
                self.free(reg);
            }
            StmtKind::IfElse {
                cond,
                body,
                else_body,
            } => {
                let reg = self.expr(cond, code)?;
                let done = self.labels.next();
                match else_body {
                    Some(else_body) => {
                        let else_lbl = self.labels.next();
                        assembly! {(code) {
                            cmpq {0}, %{reg};
                            je @{else_lbl};
                        }}
                        self.free(reg);
                        self.statement(body, code)?;
                        assembly! {(code) {
                            jmp @{done};
                        @{else_lbl}:
                        }}
                        self.statement(else_body, code)?;
                    }
                    None => {
                        assembly! {(code) {
                            cmpq {0}, %{reg};
                            je @{done};
                        }}
                        self.free(reg);
                        self.statement(body, code)?;
                    }
                }
                assembly! {(code) {@{done}:}}
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                if let Some(init) = init {
                    let reg = self.expr(init, code)?;
                    self.free(reg);
                }

                let top = self.labels.next();
                let done = self.labels.next();
                assembly! {(code) {@{top}:}}
                if let Some(cond) = cond {
                    let reg = self.expr(cond, code)?;
                    assembly! {(code) {
                        cmpq {0}, %{reg};
                        je @{done};
                    }}
                    self.free(reg);
                }
                self.statement(body, code)?;
                if let Some(step) = step {
                    let reg = self.expr(step, code)?;
                    self.free(reg);
                }
                assembly! {(code) {
                    jmp @{top};
                @{done}:
                }}
            }
            StmtKind::Print(exprs) => {
                for e in exprs {
                    self.print(e, code)?;
                }
            }
            StmtKind::Return { value, function } => {
                if let Some(value) = value {
                    let reg = self.expr(value, code)?;
                    assembly! {(code) {movq %{reg}, %rax;}}
                    self.free(reg);
                }
                let epilogue =
                    LabelAllocator::epilogue(function.as_deref().unwrap_or(&self.func));
                assembly! {(code) {jmp @{epilogue};}}
            }
            StmtKind::Block(stmts) => {
                for s in stmts {
                    self.statement(s, code)?;
                }
            }
        }
        Ok(())
    }

    fn local(&mut self, d: &Declaration, code: &mut Vec<Inst>) -> CodegenResult<()> {
        let sym = self.decl_symbol(d)?;
        match &sym.ty {
            Type::Function(..) => {
                return Err(CompilerError::new(
                    d.line,
                    CodegenError::LocalFunction(d.name.clone()),
                ))
            }
            Type::Array(..) => {
                return Err(CompilerError::new(
                    d.line,
                    CodegenError::LocalArray(d.name.clone()),
                ))
            }
            _ => (),
        }

        let slot = Self::location(sym);
        match &d.value {
            Some(Initializer::Expr(e)) => {
                let reg = self.expr(e, code)?;
                code.push(Inst::Mov(Operand::Register(reg), slot));
                self.free(reg);
            }
            Some(Initializer::List(_)) => {
                return Err(CompilerError::new(
                    d.line,
                    CodegenError::LocalArray(d.name.clone()),
                ))
            }
            None => code.push(Inst::Mov(Operand::Immediate(0), slot)),
        }
        Ok(())
    }

    fn print(&mut self, e: &Expression, code: &mut Vec<Inst>) -> CodegenResult<()> {
        let routine = match type_of(e, self.symbols) {
            Type::Integer => "print_integer",
            Type::Boolean => "print_boolean",
            Type::Character => "print_character",
            Type::String => "print_string",
            ty => {
                return Err(CompilerError::new(
                    e.line,
                    CodegenError::Unsupported(format!("printing a value of type {}", ty)),
                ))
            }
        };

        let reg = self.expr(e, code)?;
        Self::call_routine(routine, &[reg], code);
        self.free(reg);
        Ok(())
    }

    /// Calls `routine` with the values in `args`.  The return value is left
    /// in %rax.
    fn call_routine(routine: &str, args: &[Reg64], code: &mut Vec<Inst>) {
        for reg in CALLER_SAVED.iter() {
            assembly! {(code) {pushq %{*reg};}}
        }
        for (reg, arg) in args.iter().zip(ARGUMENTS.iter()) {
            assembly! {(code) {movq %{*reg}, %{*arg};}}
        }
        assembly! {(code) {call @{routine};}}
        for reg in CALLER_SAVED.iter().rev() {
            assembly! {(code) {popq %{*reg};}}
        }
    }

    /// Evaluates `e` into a newly allocated scratch register.
    fn expr(&mut self, e: &Expression, code: &mut Vec<Inst>) -> CodegenResult<Reg64> {
        match &e.kind {
            ExprKind::Integer(i) => self.constant(e.line, *i, code),
            ExprKind::Boolean(b) => self.constant(e.line, *b as i64, code),
            ExprKind::Character(c) => self.constant(e.line, *c as i64, code),
            ExprKind::StringLiteral(s) => {
                let lbl = self.strings.insert(s);
                let reg = self.alloc(e.line)?;
                assembly! {(code) {leaq [@{lbl}], %{reg};}}
                Ok(reg)
            }
            ExprKind::Name { .. } => {
                let sym = self.symbol(e)?;
                self.load(e.line, sym, code)
            }
            ExprKind::Group(inner) => self.expr(inner, code),
            ExprKind::Assign(l, r) => {
                let value = self.expr(r, code)?;
                self.store(l, value, code)?;
                Ok(value)
            }
            ExprKind::Binary(op, l, r) => self.binary(*op, l, r, code),
            ExprKind::Unary(op, operand) => self.unary(e.line, *op, operand, code),
            ExprKind::Call(func, args) => self.call(e.line, func, args, code),
            ExprKind::Index { base, indices } => {
                let (base_reg, index_reg, scale) = self.element(e.line, base, indices, code)?;
                if scale == 1 {
                    assembly! {(code) {movzbq [%{base_reg}, %{index_reg}, 1], %{base_reg};}}
                } else {
                    assembly! {(code) {movq [%{base_reg}, %{index_reg}, 8], %{base_reg};}}
                }
                self.free(index_reg);
                Ok(base_reg)
            }
        }
    }

    fn constant(&mut self, line: u32, value: i64, code: &mut Vec<Inst>) -> CodegenResult<Reg64> {
        let reg = self.alloc(line)?;
        assembly! {(code) {movq {value}, %{reg};}}
        Ok(reg)
    }

    /// Strings and arrays are referred to by their address.
    fn load(&mut self, line: u32, sym: &Symbol, code: &mut Vec<Inst>) -> CodegenResult<Reg64> {
        if sym.ty.is_function() {
            return Err(CompilerError::new(
                line,
                CodegenError::Unsupported(format!("function {} used as a value", sym.name)),
            ));
        }

        let reg = self.alloc(line)?;
        let by_address = matches!(sym.ty, Type::String | Type::Array(..));
        match sym.kind {
            SymbolKind::Global if by_address => {
                code.push(Inst::Lea(Self::location(sym), Operand::Register(reg)))
            }
            _ => code.push(Inst::Mov(Self::location(sym), Operand::Register(reg))),
        }
        Ok(reg)
    }

    /// Writes `value` into the variable or array element named by `target`.
    fn store(&mut self, target: &Expression, value: Reg64, code: &mut Vec<Inst>) -> CodegenResult<()> {
        match &target.kind {
            ExprKind::Name { .. } => {
                let sym = self.symbol(target)?;
                match (&sym.kind, &sym.ty) {
                    (SymbolKind::Global, Type::String) => {
                        return Err(CompilerError::new(
                            target.line,
                            CodegenError::GlobalStringReassign(sym.name.clone()),
                        ))
                    }
                    (SymbolKind::Global, Type::Array(..)) | (_, Type::Function(..)) => {
                        return Err(CompilerError::new(
                            target.line,
                            CodegenError::Unsupported(format!("assignment to {}", sym.name)),
                        ))
                    }
                    _ => code.push(Inst::Mov(Operand::Register(value), Self::location(sym))),
                }
            }
            ExprKind::Index { base, indices } => {
                let addr = self.element_address(target.line, base, indices, code)?;
                assembly! {(code) {movq %{value}, [%{addr}];}}
                self.free(addr);
            }
            _ => {
                return Err(CompilerError::new(
                    target.line,
                    CodegenError::Unsupported("assignment to an expression".into()),
                ))
            }
        }
        Ok(())
    }

    /// Evaluates the base and index of an element access.  Returns the base
    /// address, the index and the element width.
    fn element(
        &mut self,
        line: u32,
        base: &Expression,
        indices: &[Expression],
        code: &mut Vec<Inst>,
    ) -> CodegenResult<(Reg64, Reg64, u8)> {
        let index = match indices {
            [index] => index,
            _ => return Err(CompilerError::new(line, CodegenError::MultiDimIndex)),
        };
        let scale = match type_of(base, self.symbols) {
            Type::String => 1,
            _ => 8,
        };

        let base_reg = self.expr(base, code)?;
        let index_reg = self.expr(index, code)?;
        Ok((base_reg, index_reg, scale))
    }

    /// Computes the address of an array element.  Characters within a string
    /// cannot be written.
    fn element_address(
        &mut self,
        line: u32,
        base: &Expression,
        indices: &[Expression],
        code: &mut Vec<Inst>,
    ) -> CodegenResult<Reg64> {
        let (base_reg, index_reg, scale) = self.element(line, base, indices, code)?;
        if scale == 1 {
            return Err(CompilerError::new(
                line,
                CodegenError::Unsupported("writing to a character of a string".into()),
            ));
        }
        assembly! {(code) {leaq [%{base_reg}, %{index_reg}, 8], %{base_reg};}}
        self.free(index_reg);
        Ok(base_reg)
    }

    fn binary(
        &mut self,
        op: BinaryOperator,
        l: &Expression,
        r: &Expression,
        code: &mut Vec<Inst>,
    ) -> CodegenResult<Reg64> {
        use BinaryOperator::*;

        let left = self.expr(l, code)?;
        let right = self.expr(r, code)?;
        match op {
            Add => {
                assembly! {(code) {addq %{right}, %{left};}}
            }
            Sub => {
                assembly! {(code) {subq %{right}, %{left};}}
            }
            Mul => {
                assembly! {(code) {imulq %{right}, %{left};}}
            }
            BAnd => {
                assembly! {(code) {andq %{right}, %{left};}}
            }
            BOr => {
                assembly! {(code) {orq %{right}, %{left};}}
            }
            Div | Mod => {
                let result = if op == Div { Reg64::Rax } else { Reg64::Rdx };
                assembly! {(code) {
                    movq {0}, %rdx;
                    movq %{left}, %rax;
                    cqto;
                    idivq %{right};
                    movq %{result}, %{left};
                }}
            }
            Pow => {
                Self::call_routine("integer_power", &[left, right], code);
                assembly! {(code) {movq %rax, %{left};}}
            }
            Eq => self.comparison(left, right, Inst::Je, code),
            NEq => self.comparison(left, right, Inst::Jne, code),
            Ls => self.comparison(left, right, Inst::Jl, code),
            LsEq => self.comparison(left, right, Inst::Jle, code),
            Gr => self.comparison(left, right, Inst::Jg, code),
            GrEq => self.comparison(left, right, Inst::Jge, code),
        }
        self.free(right);
        Ok(left)
    }

    /// Sets `left` to 1 when `jump` is taken after comparing `left` to
    /// `right`, and to 0 otherwise.
    fn comparison(&mut self, left: Reg64, right: Reg64, jump: fn(Operand) -> Inst, code: &mut Vec<Inst>) {
        let done = self.labels.next();
        assembly! {(code) {
            cmpq %{right}, %{left};
            movq {1}, %{left};
        }}
        code.push(jump(Operand::Label(done.clone())));
        assembly! {(code) {
            movq {0}, %{left};
        @{done}:
        }}
    }

    fn unary(
        &mut self,
        line: u32,
        op: UnaryOperator,
        operand: &Expression,
        code: &mut Vec<Inst>,
    ) -> CodegenResult<Reg64> {
        match op {
            UnaryOperator::Minus => {
                let reg = self.expr(operand, code)?;
                assembly! {(code) {negq %{reg};}}
                Ok(reg)
            }
            UnaryOperator::Not => {
                let reg = self.expr(operand, code)?;
                let done = self.labels.next();
                assembly! {(code) {
                    cmpq {0}, %{reg};
                    movq {1}, %{reg};
                    je @{done};
                    movq {0}, %{reg};
                @{done}:
                }}
                Ok(reg)
            }
            UnaryOperator::Increment | UnaryOperator::Decrement => {
                let step = if op == UnaryOperator::Increment {
                    Inst::Inc
                } else {
                    Inst::Dec
                };
                self.step(line, operand, step, code)
            }
        }
    }

    /// Postfix `++` and `--`.  The result is the value before the update.
    fn step(
        &mut self,
        line: u32,
        operand: &Expression,
        step: fn(Operand) -> Inst,
        code: &mut Vec<Inst>,
    ) -> CodegenResult<Reg64> {
        match &operand.kind {
            ExprKind::Name { .. } => {
                let sym = self.symbol(operand)?;
                let reg = self.load(line, sym, code)?;
                code.push(step(Self::location(sym)));
                Ok(reg)
            }
            ExprKind::Index { base, indices } => {
                let addr = self.element_address(line, base, indices, code)?;
                let reg = self.alloc(line)?;
                assembly! {(code) {movq [%{addr}], %{reg};}}
                code.push(step(Operand::Memory(addr, 0)));
                self.free(addr);
                Ok(reg)
            }
            _ => Err(CompilerError::new(
                line,
                CodegenError::Unsupported("increment or decrement of an expression".into()),
            )),
        }
    }

    fn call(
        &mut self,
        line: u32,
        func: &Expression,
        args: &[Expression],
        code: &mut Vec<Inst>,
    ) -> CodegenResult<Reg64> {
        let sym = self.symbol(func)?;
        if sym.kind != SymbolKind::Global || !sym.ty.is_function() {
            return Err(CompilerError::new(
                line,
                CodegenError::Unsupported(format!("calling {}", sym.name)),
            ));
        }
        if args.len() > ARGUMENTS.len() {
            return Err(CompilerError::new(
                line,
                CodegenError::TooManyArgs(sym.name.clone(), args.len()),
            ));
        }

        let mut regs = vec![];
        for a in args {
            regs.push(self.expr(a, code)?);
        }
        Self::call_routine(&sym.name, &regs, code);
        for reg in regs {
            self.free(reg);
        }

        let result = self.alloc(line)?;
        assembly! {(code) {movq %rax, %{result};}}
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compiler::{
            lexer::{tokens::Token, Lexer},
            parser::parse,
            semantics::{resolve, type_check},
        },
        diagnostics::config::TracingConfig,
    };

    fn generate(text: &str) -> Result<String, Vec<CodegenError>> {
        let tokens = Lexer::new(text)
            .tokenize()
            .into_iter()
            .collect::<Result<Vec<Token>, _>>()
            .expect("Expected valid tokens");
        let mut program = parse(&tokens, TracingConfig::Off).expect("Expected valid program");
        let mut symbols = resolve(&mut program).expect("Expected names to resolve");
        type_check(&mut program, &mut symbols).expect("Expected program to type check");
        Compiler::compile(&program, &symbols)
            .map(|c| c.to_string())
            .map_err(|errs| errs.into_iter().map(|e| e.inner()).collect())
    }

    fn assembly(text: &str) -> String {
        match generate(text) {
            Ok(asm) => asm,
            Err(errs) => panic!("Expected code generation to succeed: {:?}", errs),
        }
    }

    /// The lines of `asm` starting at the label `lbl` up to the next
    /// function label.
    fn function<'a>(asm: &'a str, lbl: &str) -> Vec<&'a str> {
        let start = format!("{}:", lbl);
        asm.lines()
            .skip_while(|l| *l != start)
            .skip(1)
            .take_while(|l| l.starts_with("    ") || l.starts_with('.'))
            .map(|l| l.trim())
            .collect()
    }

    fn contains_sequence(lines: &[&str], seq: &[&str]) -> bool {
        lines.windows(seq.len()).any(|w| w == seq)
    }

    #[test]
    fn sections_and_runtime() {
        let asm = assembly("main: function integer () = { return 0; }");
        assert!(asm.starts_with("\n.section .data\n"));
        assert!(asm.contains("\n.section .text\n"));
        for routine in &[
            "print_integer",
            "print_string",
            "print_character",
            "print_boolean",
            "integer_power",
        ] {
            assert!(asm.contains(&format!("\n{}:\n", routine)), "{}", routine);
        }
        assert!(asm.contains("call printf@PLT"));
        assert!(asm.contains("call putchar@PLT"));
        assert!(asm.contains(".globl main\n\nmain:"));
    }

    #[test]
    fn prologue_and_epilogue() {
        let asm = assembly(
            "f: function integer (a: integer, b: integer) = { x: integer = a; { y: integer; } return x; }",
        );
        let f = function(&asm, "f");
        assert_eq!(
            &f[..10],
            &[
                "pushq %rbp",
                "movq %rsp, %rbp",
                "pushq %rdi",
                "pushq %rsi",
                "subq $16, %rsp",
                "pushq %rbx",
                "pushq %r12",
                "pushq %r13",
                "pushq %r14",
                "pushq %r15",
            ]
        );
        assert_eq!(
            &f[f.len() - 11..],
            &[
                ".f_epilogue:",
                "popq %r15",
                "popq %r14",
                "popq %r13",
                "popq %r12",
                "popq %rbx",
                "movq -8(%rbp), %rdi",
                "movq -16(%rbp), %rsi",
                "movq %rbp, %rsp",
                "popq %rbp",
                "ret",
            ]
        );
    }

    #[test]
    fn locals_and_params_use_slots() {
        let asm = assembly(
            "f: function integer (a: integer) = { x: integer = a; y: integer; return x; }",
        );
        let f = function(&asm, "f");
        assert!(contains_sequence(
            &f,
            &["movq -8(%rbp), %rbx", "movq %rbx, -16(%rbp)"]
        ));
        assert!(f.contains(&"movq $0, -24(%rbp)"));
        assert!(contains_sequence(
            &f,
            &["movq -16(%rbp), %rbx", "movq %rbx, %rax", "jmp .f_epilogue"]
        ));
    }

    #[test]
    fn arithmetic() {
        let asm = assembly("main: function integer () = { return 1 + 2 * 3; }");
        let main = function(&asm, "main");
        assert!(contains_sequence(
            &main,
            &[
                "movq $1, %rbx",
                "movq $2, %r10",
                "movq $3, %r11",
                "imulq %r11, %r10",
                "addq %r10, %rbx",
                "movq %rbx, %rax",
                "jmp .main_epilogue",
            ]
        ));
    }

    #[test]
    fn subtraction_keeps_the_minuend() {
        let asm = assembly("main: function integer () = { return 9 - 4; }");
        let main = function(&asm, "main");
        assert!(contains_sequence(
            &main,
            &["movq $9, %rbx", "movq $4, %r10", "subq %r10, %rbx"]
        ));
    }

    #[test]
    fn division_and_modulo() {
        let asm = assembly("main: function integer () = { x: integer = 7 / 2; return 7 % 2; }");
        let main = function(&asm, "main");
        assert!(contains_sequence(
            &main,
            &[
                "movq $0, %rdx",
                "movq %rbx, %rax",
                "cqto",
                "idivq %r10",
                "movq %rax, %rbx",
            ]
        ));
        assert!(contains_sequence(
            &main,
            &["cqto", "idivq %r10", "movq %rdx, %rbx"]
        ));
    }

    #[test]
    fn power_calls_the_runtime() {
        let asm = assembly("main: function integer () = { return 2 ^ 10; }");
        let main = function(&asm, "main");
        assert!(contains_sequence(
            &main,
            &[
                "pushq %r10",
                "pushq %r11",
                "movq %rbx, %rdi",
                "movq %r10, %rsi",
                "call integer_power",
                "popq %r11",
                "popq %r10",
                "movq %rax, %rbx",
            ]
        ));
    }

    #[test]
    fn comparison_materializes_boolean() {
        let asm = assembly("main: function boolean () = { return 1 < 2; }");
        let main = function(&asm, "main");
        assert!(contains_sequence(
            &main,
            &[
                "cmpq %r10, %rbx",
                "movq $1, %rbx",
                "jl .L0",
                "movq $0, %rbx",
                ".L0:",
            ]
        ));
    }

    #[test]
    fn not_and_logical_operators() {
        let asm = assembly(
            "main: function boolean () = { a: boolean = true; return !a && (a || false); }",
        );
        let main = function(&asm, "main");
        assert!(contains_sequence(
            &main,
            &["cmpq $0, %rbx", "movq $1, %rbx", "je .L0", "movq $0, %rbx", ".L0:"]
        ));
        assert!(main.contains(&"orq %r11, %r10"));
        assert!(main.contains(&"andq %r10, %rbx"));
    }

    #[test]
    fn if_else_labels() {
        let asm = assembly(
            "main: function integer () = { if (true) return 1; else return 2; }",
        );
        let main = function(&asm, "main");
        assert!(contains_sequence(
            &main,
            &[
                "movq $1, %rbx",
                "cmpq $0, %rbx",
                "je .L1",
                "movq $1, %rbx",
                "movq %rbx, %rax",
                "jmp .main_epilogue",
                "jmp .L0",
                ".L1:",
                "movq $2, %rbx",
                "movq %rbx, %rax",
                "jmp .main_epilogue",
                ".L0:",
            ]
        ));
    }

    #[test]
    fn for_loop_labels() {
        let asm = assembly(
            "main: function integer () = { i: integer; for (i = 0; i < 3; i++) print i; return 0; }",
        );
        let main = function(&asm, "main");
        let top = main.iter().position(|l| *l == ".L0:").expect("loop top");
        assert_eq!(main[top - 1], "movq %rbx, -8(%rbp)");
        assert!(main.contains(&"je .L1"));
        assert!(contains_sequence(&main, &["movq -8(%rbp), %rbx", "incq -8(%rbp)"]));
        assert!(contains_sequence(&main, &["jmp .L0", ".L1:"]));
    }

    #[test]
    fn print_selects_routine_by_type() {
        let asm = assembly(
            "main: function void () = { print 1, true, 'c', \"hi\"; }",
        );
        let main = function(&asm, "main");
        for routine in &[
            "call print_integer",
            "call print_boolean",
            "call print_character",
            "call print_string",
        ] {
            assert!(main.contains(routine), "{}", routine);
        }
        assert!(contains_sequence(
            &main,
            &[
                "leaq .str_0(%rip), %rbx",
                "pushq %r10",
                "pushq %r11",
                "movq %rbx, %rdi",
                "call print_string",
            ]
        ));
        assert!(asm.contains(".str_0:\n    .string \"hi\""));
    }

    #[test]
    fn string_literals_are_pooled() {
        let asm = assembly("main: function void () = { print \"a\", \"b\", \"a\"; }");
        assert!(asm.contains(".str_0:\n    .string \"a\""));
        assert!(asm.contains(".str_1:\n    .string \"b\""));
        assert!(!asm.contains(".str_2:"));
    }

    #[test]
    fn globals_in_data_section() {
        let asm = assembly(
            "x: integer = -5; b: boolean = true; c: char = 'a'; s: string = \"hey\"; \
             a: array [3] integer = {1, 2, 3}; z: array [4] integer; n: integer; \
             main: function integer () = { return x; }",
        );
        assert!(asm.contains("\nx:\n    .quad -5\n"));
        assert!(asm.contains("\nb:\n    .quad 1\n"));
        assert!(asm.contains("\nc:\n    .quad 97\n"));
        assert!(asm.contains("\ns:\n    .string \"hey\"\n"));
        assert!(asm.contains("\na:\n    .quad 1, 2, 3\n"));
        assert!(asm.contains("\nz:\n    .zero 32\n"));
        assert!(asm.contains("\nn:\n    .quad 0\n"));
        let main = function(&asm, "main");
        assert!(main.contains(&"movq x(%rip), %rbx"));
    }

    #[test]
    fn global_strings_and_arrays_load_by_address() {
        let asm = assembly(
            "s: string = \"hey\"; a: array [2] integer = {4, 5}; \
             main: function integer () = { print s; return a[1]; }",
        );
        let main = function(&asm, "main");
        assert!(contains_sequence(&main, &["leaq s(%rip), %rbx", "pushq %r10"]));
        assert!(contains_sequence(
            &main,
            &[
                "leaq a(%rip), %rbx",
                "movq $1, %r10",
                "movq (%rbx,%r10,8), %rbx",
            ]
        ));
    }

    #[test]
    fn string_index_loads_a_byte() {
        let asm = assembly(
            "s: string = \"hey\"; main: function char () = { return s[0]; }",
        );
        let main = function(&asm, "main");
        assert!(main.contains(&"movzbq (%rbx,%r10,1), %rbx"));
    }

    #[test]
    fn array_element_store_and_increment() {
        let asm = assembly(
            "a: array [2] integer; main: function integer () = { a[0] = 3; a[1]++; return 0; }",
        );
        let main = function(&asm, "main");
        assert!(contains_sequence(
            &main,
            &[
                "movq $3, %rbx",
                "leaq a(%rip), %r10",
                "movq $0, %r11",
                "leaq (%r10,%r11,8), %r10",
                "movq %rbx, (%r10)",
            ]
        ));
        assert!(contains_sequence(
            &main,
            &["movq (%rbx), %r10", "incq (%rbx)"]
        ));
    }

    #[test]
    fn call_moves_arguments() {
        let asm = assembly(
            "f: function integer (a: integer, b: integer) = { return a - b; } \
             main: function integer () = { return f(5, 2); }",
        );
        let main = function(&asm, "main");
        assert!(contains_sequence(
            &main,
            &[
                "movq $5, %rbx",
                "movq $2, %r10",
                "pushq %r10",
                "pushq %r11",
                "movq %rbx, %rdi",
                "movq %r10, %rsi",
                "call f",
                "popq %r11",
                "popq %r10",
                "movq %rax, %rbx",
            ]
        ));
    }

    #[test]
    fn global_decrement() {
        let asm = assembly("n: integer = 3; main: function integer () = { return n--; }");
        let main = function(&asm, "main");
        assert!(contains_sequence(
            &main,
            &["movq n(%rip), %rbx", "decq n(%rip)"]
        ));
    }

    #[test]
    fn scratch_registers_run_out() {
        let errs = generate(
            "main: function integer () = { return 1+(1+(1+(1+(1+(1+(1+(1+1))))))); }",
        )
        .expect_err("Expected register exhaustion");
        assert_eq!(errs, vec![CodegenError::OutOfScratchRegisters]);
    }

    #[test]
    fn fatal_error_stops_generation() {
        let errs = generate(
            "main: function integer () = { return 1+(1+(1+(1+(1+(1+(1+(1+1))))))); } \
             b: array [2] string;",
        )
        .expect_err("Expected register exhaustion");
        assert_eq!(errs, vec![CodegenError::OutOfScratchRegisters]);
    }

    #[test]
    fn reported_errors_are_collected() {
        let errs = generate(
            "s: array [2] string; m: array [2] array [2] integer; \
             g: string = \"a\"; \
             main: function integer () = { a: array [2] integer; return 0; } \
             other: function void () = { g = \"b\"; }",
        )
        .expect_err("Expected reported errors");
        assert_eq!(
            errs,
            vec![
                CodegenError::StringArray("s".into()),
                CodegenError::MultiDimArray("m".into()),
                CodegenError::LocalArray("a".into()),
                CodegenError::GlobalStringReassign("g".into()),
            ]
        );
    }

    #[test]
    fn non_constant_global() {
        let errs = generate("x: integer = 1; y: integer = x + 1;").expect_err("Expected errors");
        assert_eq!(errs, vec![CodegenError::NonConstantInitializer("y".into())]);
    }

    #[test]
    fn too_many_parameters() {
        let errs = generate(
            "f: function integer (a: integer, b: integer, c: integer, d: integer, e: integer, \
             g: integer, h: integer) = { return a; }",
        )
        .expect_err("Expected errors");
        assert_eq!(errs, vec![CodegenError::TooManyParams("f".into(), 7)]);
    }

    #[test]
    fn prototypes_emit_nothing() {
        let asm = assembly("f: function integer (a: integer);");
        assert!(!asm.contains("\nf:"));
        assert!(!asm.contains(".globl f"));
    }

    #[test]
    fn every_error_in_a_function_is_reported() {
        let errs = generate(
            "main: function integer () = { a: array [2] integer; b: array [2] integer; return 0; } \
             other: function integer () = { c: array [2] integer; return 0; }",
        )
        .expect_err("Expected reported errors");
        assert_eq!(
            errs,
            vec![
                CodegenError::LocalArray("a".into()),
                CodegenError::LocalArray("b".into()),
                CodegenError::LocalArray("c".into()),
            ]
        );
    }

    #[test]
    fn statements_after_an_error_are_still_checked() {
        let errs = generate(
            "g: string = \"a\"; \
             main: function integer () = { x: integer = 1 + 2; a: array [2] integer; \
             y: integer = x * 3; g = \"b\"; return y; }",
        )
        .expect_err("Expected reported errors");
        assert_eq!(
            errs,
            vec![
                CodegenError::LocalArray("a".into()),
                CodegenError::GlobalStringReassign("g".into()),
            ]
        );
    }

    #[test]
    fn runtime_names_are_reserved() {
        let errs = generate(
            "print_integer: function integer (x: integer); \
             integer_power: function integer (x: integer) = { return x; } \
             printf: integer = 1; \
             main: function integer () = { return 0; }",
        )
        .expect_err("Expected reserved names");
        assert_eq!(
            errs,
            vec![
                CodegenError::ReservedName("print_integer".into()),
                CodegenError::ReservedName("integer_power".into()),
                CodegenError::ReservedName("printf".into()),
            ]
        );
    }
}
