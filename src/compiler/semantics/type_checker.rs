use log::debug;

use crate::compiler::{
    ast::{
        BinaryOperator, Declaration, ExprKind, Expression, Initializer, Program, Statement,
        StmtKind, Type, UnaryOperator,
    },
    CompilerError,
};

use super::{error::SemanticError, symbol_table::SymbolArena, SemanticResult};

/**
 Computes the type of every expression in `program` and checks that every operator,
 call, declaration and return statement is used with values of the correct types.

 Declarations of type `auto` have the type of their initializer recorded on their
 symbol in `symbols`.  Every return statement is tagged with the name of the
 function it exits.

 Checking always continues to the end of the program; if any errors were found then
 all of them are returned.
 */
pub fn type_check(program: &mut Program, symbols: &mut SymbolArena) -> SemanticResult<()> {
    debug!("Type checking");
    for d in program.decls.iter_mut() {
        if let Some(code) = d.code.as_mut() {
            tag_returns(code, &d.name);
        }
    }

    let mut checker = TypeChecker {
        symbols,
        errors: vec![],
    };
    for d in program.decls.iter() {
        checker.check_decl(d);
    }

    if checker.errors.is_empty() {
        Ok(())
    } else {
        debug!("Type checking failed with {} errors", checker.errors.len());
        Err(checker.errors)
    }
}

/// Computes the type of `e` without reporting any errors.
pub fn type_of(e: &Expression, symbols: &SymbolArena) -> Type {
    ExpressionTyper::new(symbols).ty(e)
}

fn tag_returns(stmts: &mut [Statement], func: &str) {
    for s in stmts.iter_mut() {
        match &mut s.kind {
            StmtKind::Return { function, .. } => *function = Some(func.into()),
            StmtKind::Block(stmts) => tag_returns(stmts, func),
            StmtKind::IfElse {
                body, else_body, ..
            } => {
                tag_returns(std::slice::from_mut(body.as_mut()), func);
                if let Some(else_body) = else_body {
                    tag_returns(std::slice::from_mut(else_body.as_mut()), func);
                }
            }
            StmtKind::For { body, .. } => tag_returns(std::slice::from_mut(body.as_mut()), func),
            StmtKind::Decl(_) | StmtKind::Expr(_) | StmtKind::Print(_) => (),
        }
    }
}

struct TypeChecker<'a> {
    symbols: &'a mut SymbolArena,
    errors: Vec<CompilerError<SemanticError>>,
}

impl<'a> TypeChecker<'a> {
    fn error(&mut self, line: u32, e: SemanticError) {
        debug!("L{}: {}", line, e);
        self.errors.push(CompilerError::new(line, e));
    }

    /// Computes the type of `e`, recording any errors found within it.
    fn expr_type(&mut self, e: &Expression) -> Type {
        let mut typer = ExpressionTyper::new(&*self.symbols);
        let ty = typer.ty(e);
        self.errors.append(&mut typer.errors);
        ty
    }

    fn check_decl(&mut self, d: &Declaration) {
        let id = match d.symbol {
            Some(id) => id,
            None => {
                self.error(d.line, SemanticError::NotResolved(d.name.clone()));
                return;
            }
        };

        if let Type::Function(ret, _) = &d.ty {
            let proto_ty = d
                .prototype
                .and_then(|p| self.symbols.get(p))
                .map(|proto| proto.ty.clone());
            if let Some(proto_ty) = proto_ty {
                if !proto_ty.compare(&d.ty) {
                    self.error(
                        d.line,
                        SemanticError::PrototypeMismatch(d.name.clone(), proto_ty, d.ty.clone()),
                    );
                }
            }

            if let Some(code) = &d.code {
                for s in code {
                    self.check_stmt(s);
                }
                self.check_returns(code, &d.name, ret);
            }
            return;
        }

        match (&d.value, &d.ty) {
            (None, Type::Auto) => {
                self.error(d.line, SemanticError::AutoWithoutValue(d.name.clone()))
            }
            (_, Type::Void) => self.error(d.line, SemanticError::VoidVariable(d.name.clone())),
            (None, _) => (),
            (Some(Initializer::Expr(e)), Type::Auto) => {
                let ty = self.expr_type(e);
                if ty == Type::Void {
                    self.error(d.line, SemanticError::VoidVariable(d.name.clone()));
                } else {
                    debug!("Infer {} as {}", d.name, ty);
                    if let Some(sym) = self.symbols.get_mut(id) {
                        sym.ty = ty;
                    }
                }
            }
            (Some(Initializer::Expr(e)), Type::String) => {
                let ty = self.expr_type(e);
                if !ty.compare(&Type::String) {
                    self.error(d.line, SemanticError::StringDeclMismatch(d.name.clone(), ty));
                }
            }
            (Some(Initializer::Expr(e)), declared) => {
                let ty = self.expr_type(e);
                if !ty.compare(declared) {
                    self.error(
                        d.line,
                        SemanticError::DeclMismatch(d.name.clone(), declared.clone(), ty),
                    );
                }
            }
            (Some(Initializer::List(elements)), Type::Array(el_ty, size)) => {
                for e in elements {
                    let ty = self.expr_type(e);
                    if !ty.compare(el_ty) {
                        self.error(
                            e.line,
                            SemanticError::ArrayElementMismatch(
                                d.name.clone(),
                                el_ty.as_ref().clone(),
                                ty,
                            ),
                        );
                    }
                }

                if *size != 0 && !elements.is_empty() && elements.len() != *size {
                    self.error(
                        d.line,
                        SemanticError::ArraySizeMismatch(d.name.clone(), elements.len(), *size),
                    );
                }
            }
            (Some(Initializer::List(elements)), declared) => {
                let el_ty = match elements.first() {
                    Some(e) => self.expr_type(e),
                    None => Type::Auto,
                };
                self.error(
                    d.line,
                    SemanticError::DeclMismatch(
                        d.name.clone(),
                        declared.clone(),
                        Type::Array(Box::new(el_ty), elements.len()),
                    ),
                );
            }
        }
    }

    fn check_stmt(&mut self, s: &Statement) {
        match &s.kind {
            StmtKind::Decl(d) => self.check_decl(d),
            StmtKind::Expr(e) => {
                self.expr_type(e);
            }
            StmtKind::IfElse {
                cond,
                body,
                else_body,
            } => {
                let ty = self.expr_type(cond);
                if !ty.is_boolean() {
                    self.error(cond.line, SemanticError::CondExpectedBool("if", ty));
                }
                self.check_stmt(body);
                if let Some(else_body) = else_body {
                    self.check_stmt(else_body);
                }
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                if let Some(init) = init {
                    self.expr_type(init);
                }
                if let Some(cond) = cond {
                    let ty = self.expr_type(cond);
                    if !ty.is_boolean() {
                        self.error(cond.line, SemanticError::CondExpectedBool("for", ty));
                    }
                }
                if let Some(step) = step {
                    self.expr_type(step);
                }
                self.check_stmt(body);
            }
            StmtKind::Print(exprs) => {
                for e in exprs {
                    let ty = self.expr_type(e);
                    match ty {
                        Type::Void | Type::Array(..) | Type::Function(..) | Type::Auto => {
                            self.error(e.line, SemanticError::PrintInvalidType(ty))
                        }
                        Type::Integer | Type::Boolean | Type::Character | Type::String => (),
                    }
                }
            }
            StmtKind::Return { value, .. } => {
                if let Some(v) = value {
                    self.expr_type(v);
                }
            }
            StmtKind::Block(stmts) => {
                for s in stmts {
                    self.check_stmt(s);
                }
            }
        }
    }

    /// Checks every return statement in the body of `func`, including returns
    /// nested within blocks, conditionals and loops, against its return type.
    fn check_returns(&mut self, stmts: &[Statement], func: &str, ret: &Type) {
        for s in stmts {
            match &s.kind {
                StmtKind::Return { value, .. } => {
                    // The expression itself was checked with its statement
                    let actual = value.as_ref().map(|v| type_of(v, &*self.symbols));
                    match (ret, actual) {
                        (Type::Void, None) => (),
                        (Type::Void, Some(actual)) => self.error(
                            s.line,
                            SemanticError::ReturnExpected(func.into(), Type::Void, actual),
                        ),
                        (expected, None) => self.error(
                            s.line,
                            SemanticError::ReturnMissingValue(func.into(), expected.clone()),
                        ),
                        (expected, Some(actual)) => {
                            if !actual.compare(expected) {
                                self.error(
                                    s.line,
                                    SemanticError::ReturnExpected(
                                        func.into(),
                                        expected.clone(),
                                        actual,
                                    ),
                                )
                            }
                        }
                    }
                }
                StmtKind::Block(stmts) => self.check_returns(stmts, func, ret),
                StmtKind::IfElse {
                    body, else_body, ..
                } => {
                    self.check_returns(std::slice::from_ref(body.as_ref()), func, ret);
                    if let Some(else_body) = else_body {
                        self.check_returns(std::slice::from_ref(else_body.as_ref()), func, ret);
                    }
                }
                StmtKind::For { body, .. } => {
                    self.check_returns(std::slice::from_ref(body.as_ref()), func, ret)
                }
                StmtKind::Decl(_) | StmtKind::Expr(_) | StmtKind::Print(_) => (),
            }
        }
    }
}

/// Computes the type of an expression bottom up, collecting the errors found
/// along the way.
struct ExpressionTyper<'a> {
    symbols: &'a SymbolArena,
    errors: Vec<CompilerError<SemanticError>>,
}

impl<'a> ExpressionTyper<'a> {
    fn new(symbols: &'a SymbolArena) -> ExpressionTyper<'a> {
        ExpressionTyper {
            symbols,
            errors: vec![],
        }
    }

    fn error(&mut self, line: u32, e: SemanticError) {
        self.errors.push(CompilerError::new(line, e));
    }

    fn ty(&mut self, e: &Expression) -> Type {
        match &e.kind {
            ExprKind::Integer(_) => Type::Integer,
            ExprKind::Boolean(_) => Type::Boolean,
            ExprKind::Character(_) => Type::Character,
            ExprKind::StringLiteral(_) => Type::String,
            ExprKind::Name { name, symbol } => {
                match symbol.and_then(|id| self.symbols.get(id)) {
                    Some(sym) => sym.ty.clone(),
                    None => {
                        self.error(e.line, SemanticError::NotResolved(name.clone()));
                        Type::Auto
                    }
                }
            }
            ExprKind::Group(inner) => self.ty(inner),
            ExprKind::Assign(l, r) => self.assign(e.line, l, r),
            ExprKind::Binary(op, l, r) => self.binary(e.line, *op, l, r),
            ExprKind::Unary(op, operand) => self.unary(e.line, *op, operand),
            ExprKind::Call(func, args) => self.call(e.line, func, args),
            ExprKind::Index { base, indices } => self.index(e.line, base, indices),
        }
    }

    fn assign(&mut self, line: u32, l: &Expression, r: &Expression) -> Type {
        let lt = self.ty(l);
        let rt = self.ty(r);

        if !l.is_addressable() {
            self.error(line, SemanticError::NotAssignable(l.to_string()));
        }

        if lt == Type::Auto {
            rt
        } else {
            if !lt.compare(&rt) {
                self.error(
                    line,
                    SemanticError::AssignMismatch(l.to_string(), lt.clone(), rt),
                );
            }
            lt
        }
    }

    fn binary(&mut self, line: u32, op: BinaryOperator, l: &Expression, r: &Expression) -> Type {
        use BinaryOperator::*;

        let lt = self.ty(l);
        let rt = self.ty(r);

        match op {
            Add | Sub | Mul | Div | Mod | Pow => {
                if !lt.is_integer() || !rt.is_integer() {
                    self.error(line, SemanticError::BinaryOpExpected(op, Type::Integer, lt, rt));
                }
                Type::Integer
            }
            Eq | NEq => {
                if !lt.compare(&rt) {
                    self.error(line, SemanticError::EqualityMismatch(lt.clone(), rt));
                }
                if matches!(lt, Type::Void | Type::Array(..) | Type::Function(..)) {
                    self.error(line, SemanticError::EqualityInvalidType(lt));
                }
                Type::Boolean
            }
            BAnd | BOr => {
                if !lt.is_boolean() || !rt.is_boolean() {
                    self.error(line, SemanticError::BinaryOpExpected(op, Type::Boolean, lt, rt));
                }
                Type::Boolean
            }
            Ls | LsEq | Gr | GrEq => {
                if !lt.is_integer() || !rt.is_integer() {
                    self.error(line, SemanticError::BinaryOpExpected(op, Type::Integer, lt, rt));
                }
                Type::Boolean
            }
        }
    }

    fn unary(&mut self, line: u32, op: UnaryOperator, operand: &Expression) -> Type {
        let ty = self.ty(operand);
        match op {
            UnaryOperator::Not => {
                if !ty.is_boolean() {
                    self.error(line, SemanticError::UnaryOpExpected(op, Type::Boolean, ty));
                }
                Type::Boolean
            }
            UnaryOperator::Minus | UnaryOperator::Increment | UnaryOperator::Decrement => {
                if op != UnaryOperator::Minus && !operand.is_addressable() {
                    self.error(line, SemanticError::NotAssignable(operand.to_string()));
                }
                if !ty.is_integer() {
                    self.error(line, SemanticError::UnaryOpExpected(op, Type::Integer, ty));
                }
                Type::Integer
            }
        }
    }

    fn call(&mut self, line: u32, func: &Expression, args: &[Expression]) -> Type {
        let fty = self.ty(func);
        let arg_tys: Vec<Type> = args.iter().map(|a| self.ty(a)).collect();

        match fty {
            Type::Function(ret, params) => {
                // A function declared without parameters accepts any arguments
                if !params.is_empty() && !params.compare_call(&arg_tys) {
                    self.error(
                        line,
                        SemanticError::CallParamsMismatch(
                            func.to_string(),
                            Type::Function(ret.clone(), params),
                            arg_tys,
                        ),
                    );
                }
                *ret
            }
            other => {
                self.error(
                    line,
                    SemanticError::CallNotFunction(func.to_string(), other.clone()),
                );
                other
            }
        }
    }

    fn index(&mut self, line: u32, base: &Expression, indices: &[Expression]) -> Type {
        let mut ty = self.ty(base);
        for idx in indices {
            let idx_ty = self.ty(idx);
            if !idx_ty.is_integer() {
                self.error(line, SemanticError::IndexNotInteger(base.to_string(), idx_ty));
            }

            ty = match ty {
                Type::Array(el, _) => *el,
                Type::String => Type::Character,
                other => {
                    self.error(line, SemanticError::IndexInvalidType(base.to_string(), other.clone()));
                    return other;
                }
            };
        }
        ty
    }
}
