//! Renders a tree back into B-minor source text.  The output re-parses into the
//! same tree: groups keep their parentheses and no other parentheses are added.
use std::fmt::{Formatter, Result, Write};

use super::{
    declaration::{Declaration, Initializer, Program},
    expression::{ExprKind, Expression, UnaryOperator},
    statement::{Statement, StmtKind},
    ty::Type,
};

const INDENT: &str = "    ";

fn indent(f: &mut Formatter<'_>, depth: usize) -> Result {
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    Ok(())
}

fn write_list(f: &mut Formatter<'_>, exprs: &[Expression]) -> Result {
    for (i, e) in exprs.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", e)?;
    }
    Ok(())
}

fn escape_char(c: char) -> String {
    match c {
        '\n' => "\\n".into(),
        '\0' => "\\0".into(),
        '\\' => "\\\\".into(),
        '\'' => "\\'".into(),
        c => c.to_string(),
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match &self.kind {
            ExprKind::Assign(l, r) => write!(f, "{} = {}", l, r),
            ExprKind::Binary(op, l, r) => write!(f, "{} {} {}", l, op, r),
            ExprKind::Unary(op @ UnaryOperator::Increment, e)
            | ExprKind::Unary(op @ UnaryOperator::Decrement, e) => write!(f, "{}{}", e, op),
            ExprKind::Unary(op, e) => {
                // `- -x` must not turn into `--x`
                let operand = e.to_string();
                if *op == UnaryOperator::Minus && operand.starts_with('-') {
                    write!(f, "{} {}", op, operand)
                } else {
                    write!(f, "{}{}", op, operand)
                }
            }
            ExprKind::Integer(i) => write!(f, "{}", i),
            ExprKind::Boolean(b) => write!(f, "{}", b),
            ExprKind::Character(c) => write!(f, "'{}'", escape_char(*c)),
            ExprKind::StringLiteral(s) => write!(f, "\"{}\"", s),
            ExprKind::Name { name, .. } => f.write_str(name),
            ExprKind::Call(func, args) => {
                write!(f, "{}(", func)?;
                write_list(f, args)?;
                f.write_char(')')
            }
            ExprKind::Index { base, indices } => {
                write!(f, "{}", base)?;
                for idx in indices {
                    write!(f, "[{}]", idx)?;
                }
                Ok(())
            }
            ExprKind::Group(e) => write!(f, "({})", e),
        }
    }
}

fn write_decl(f: &mut Formatter<'_>, d: &Declaration, depth: usize) -> Result {
    indent(f, depth)?;
    write!(f, "{}: {}", d.name, d.ty)?;
    match (&d.value, &d.code) {
        (_, Some(code)) => {
            f.write_str(" = {\n")?;
            for s in code {
                write_stmt(f, s, depth + 1)?;
            }
            indent(f, depth)?;
            f.write_str("}\n")
        }
        (Some(Initializer::Expr(e)), None) => writeln!(f, " = {};", e),
        (Some(Initializer::List(es)), None) => {
            f.write_str(" = {")?;
            write_list(f, es)?;
            f.write_str("};\n")
        }
        (None, None) => f.write_str(";\n"),
    }
}

/// Writes the body of an `if`, `else` or `for`.  Blocks stay on the line of
/// their header; any other statement goes on its own line one level deeper.
/// The body is always followed by a line break.
fn write_body(f: &mut Formatter<'_>, s: &Statement, depth: usize) -> Result {
    match &s.kind {
        StmtKind::Block(stmts) => {
            f.write_str(" {\n")?;
            for s in stmts {
                write_stmt(f, s, depth + 1)?;
            }
            indent(f, depth)?;
            f.write_str("}\n")
        }
        _ => {
            f.write_char('\n')?;
            write_stmt(f, s, depth + 1)
        }
    }
}

fn write_opt(f: &mut Formatter<'_>, e: &Option<Expression>) -> Result {
    match e {
        Some(e) => write!(f, "{}", e),
        None => Ok(()),
    }
}

fn write_stmt(f: &mut Formatter<'_>, s: &Statement, depth: usize) -> Result {
    match &s.kind {
        StmtKind::Decl(d) => write_decl(f, d, depth),
        StmtKind::Expr(e) => {
            indent(f, depth)?;
            writeln!(f, "{};", e)
        }
        StmtKind::IfElse {
            cond,
            body,
            else_body,
        } => {
            indent(f, depth)?;
            write!(f, "if ({})", cond)?;
            write_body(f, body, depth)?;
            match else_body {
                Some(else_body) => {
                    indent(f, depth)?;
                    f.write_str("else")?;
                    write_body(f, else_body, depth)
                }
                None => Ok(()),
            }
        }
        StmtKind::For {
            init,
            cond,
            step,
            body,
        } => {
            indent(f, depth)?;
            f.write_str("for (")?;
            write_opt(f, init)?;
            f.write_str("; ")?;
            write_opt(f, cond)?;
            f.write_str("; ")?;
            write_opt(f, step)?;
            f.write_char(')')?;
            write_body(f, body, depth)
        }
        StmtKind::Print(exprs) => {
            indent(f, depth)?;
            f.write_str("print")?;
            if !exprs.is_empty() {
                f.write_char(' ')?;
                write_list(f, exprs)?;
            }
            f.write_str(";\n")
        }
        StmtKind::Return { value, .. } => {
            indent(f, depth)?;
            match value {
                Some(v) => writeln!(f, "return {};", v),
                None => f.write_str("return;\n"),
            }
        }
        StmtKind::Block(stmts) => {
            indent(f, depth)?;
            f.write_str("{\n")?;
            for s in stmts {
                write_stmt(f, s, depth + 1)?;
            }
            indent(f, depth)?;
            f.write_str("}\n")
        }
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write_stmt(f, self, 0)
    }
}

impl std::fmt::Display for Declaration {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write_decl(f, self, 0)
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for (i, d) in self.decls.iter().enumerate() {
            if i > 0 && (d.code.is_some() || matches!(d.ty, Type::Function(..))) {
                f.write_char('\n')?;
            }
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}
