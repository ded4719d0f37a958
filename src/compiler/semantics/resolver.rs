use log::{debug, warn};

use crate::compiler::{
    ast::{Declaration, ExprKind, Expression, Program, Statement, StmtKind, Type},
    CompilerError,
};

use super::{
    error::SemanticError,
    stack::SymbolTableScopeStack,
    symbol_table::{Symbol, SymbolArena, SymbolKind},
    SemanticResult,
};

/**
 Binds every name in `program` to a symbol.

 A symbol is created for every declaration and every function parameter and its id is
 stored on the node that declared it.  Every name reference is then annotated with the
 symbol it refers to, following the scoping rules of the language: a name refers to the
 innermost declaration of that name which is visible at the point of reference.

 The whole tree is always visited.  If any names could not be resolved then every
 unresolved reference is returned as an error, otherwise the arena holding all of the
 symbols is returned.
 */
pub fn resolve(program: &mut Program) -> SemanticResult<SymbolArena> {
    debug!("Resolving names");
    let mut resolver = Resolver::new();
    for d in program.decls.iter_mut() {
        resolver.resolve_decl(d);
    }

    if resolver.errors.is_empty() {
        let symbols = resolver.scopes.into_arena();
        debug!("Resolved {} symbols", symbols.len());
        Ok(symbols)
    } else {
        debug!("Resolution failed with {} errors", resolver.errors.len());
        Err(resolver.errors)
    }
}

struct Resolver {
    scopes: SymbolTableScopeStack,
    errors: Vec<CompilerError<SemanticError>>,
}

impl Resolver {
    fn new() -> Resolver {
        Resolver {
            scopes: SymbolTableScopeStack::new(),
            errors: vec![],
        }
    }

    fn resolve_decl(&mut self, d: &mut Declaration) {
        // The name being declared is not visible within its own initializer
        if let Some(init) = d.value.as_mut() {
            for e in init.exprs_mut() {
                self.resolve_expr(e);
            }
        }

        let kind = if self.scopes.level() == 1 {
            SymbolKind::Global
        } else {
            SymbolKind::Local
        };

        if let Some(prev) = self.scopes.lookup_current(&d.name) {
            match self.scopes.get(prev) {
                Some(sym) if sym.ty.is_function() && d.ty.is_function() => {
                    d.prototype = Some(prev)
                }
                _ => warn!("L{}: {} is declared again in the same scope", d.line, d.name),
            }
        }

        let id = self
            .scopes
            .bind(&d.name, Symbol::new(kind, d.ty.clone(), &d.name));
        d.symbol = Some(id);

        if let Type::Function(_, params) = &mut d.ty {
            self.scopes.enter_function();
            for p in params.iter_mut() {
                p.symbol = Some(
                    self.scopes
                        .bind(&p.name, Symbol::new(SymbolKind::Param, p.ty.clone(), &p.name)),
                );
            }

            if let Some(code) = d.code.as_mut() {
                for s in code.iter_mut() {
                    self.resolve_stmt(s);
                }
            }
            self.scopes.exit();
        }
    }

    fn resolve_stmt(&mut self, s: &mut Statement) {
        match &mut s.kind {
            StmtKind::Decl(d) => self.resolve_decl(d),
            StmtKind::Expr(e) => self.resolve_expr(e),
            StmtKind::IfElse {
                cond,
                body,
                else_body,
            } => {
                self.scopes.enter();
                self.resolve_expr(cond);
                self.resolve_stmt(body);
                if let Some(else_body) = else_body {
                    self.resolve_stmt(else_body);
                }
                self.scopes.exit();
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                self.scopes.enter();
                for e in vec![init, cond, step].into_iter().flatten() {
                    self.resolve_expr(e);
                }
                self.resolve_stmt(body);
                self.scopes.exit();
            }
            StmtKind::Print(exprs) => {
                for e in exprs.iter_mut() {
                    self.resolve_expr(e);
                }
            }
            StmtKind::Return { value, .. } => {
                if let Some(v) = value {
                    self.resolve_expr(v);
                }
            }
            StmtKind::Block(stmts) => {
                self.scopes.enter();
                for s in stmts.iter_mut() {
                    self.resolve_stmt(s);
                }
                self.scopes.exit();
            }
        }
    }

    fn resolve_expr(&mut self, e: &mut Expression) {
        let line = e.line;
        match &mut e.kind {
            ExprKind::Name { name, symbol } => match self.scopes.lookup(name) {
                Some(id) => *symbol = Some(id),
                None => {
                    debug!("L{}: {} is undeclared", line, name);
                    self.errors.push(CompilerError::new(
                        line,
                        SemanticError::Undeclared(name.clone()),
                    ));
                }
            },
            ExprKind::Assign(l, r) | ExprKind::Binary(_, l, r) => {
                self.resolve_expr(l);
                self.resolve_expr(r);
            }
            ExprKind::Unary(_, e) | ExprKind::Group(e) => self.resolve_expr(e),
            ExprKind::Call(func, args) => {
                self.resolve_expr(func);
                for a in args.iter_mut() {
                    self.resolve_expr(a);
                }
            }
            ExprKind::Index { base, indices } => {
                self.resolve_expr(base);
                for i in indices.iter_mut() {
                    self.resolve_expr(i);
                }
            }
            ExprKind::Integer(_)
            | ExprKind::Boolean(_)
            | ExprKind::Character(_)
            | ExprKind::StringLiteral(_) => (),
        }
    }
}
