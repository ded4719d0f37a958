use std::fmt::*;

/*
Assembly DSL
Instructions are written in AT&T operand order: source first, destination last.
Registers are prefixed with %
Memory locations are within []
Each instruction is followed by a ;
Expressions to evaluate are in {}
Labels are prefixed with @

```
let x = 8;
assembly!(
    (buffer) {
        movq {4}, %rax;
        movq %rax, [%rbp-{x}];
        movq [@counter], %rbx;
        jmp @{done};
    @{done}:
        ret;
    }
)
```

would translate to:
```
    movq $4, %rax
    movq %rax, -8(%rbp)
    movq counter(%rip), %rbx
    jmp .L1
.L1:
    ret
```

operand forms:
%rax, %{reg}          register
{expr}, 5             immediate
@name, @{expr}        label used as a jump or call target
[%rbp-{d}], [%{reg}]  memory at a register plus displacement
[@name], [@{expr}]    memory at a label, addressed relative to %rip
[%{b}, %{i}, 8]       memory at b + i * 8
*/

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reg64 {
    Rax,
    Rbx,
    Rcx,
    Rdx,
    Rsi,
    Rdi,
    Rbp,
    Rsp,
    R8,
    R9,
    R10,
    R11,
    R12,
    R13,
    R14,
    R15,
}

impl Display for Reg64 {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        use Reg64::*;
        match self {
            Rax => f.write_str("rax"),
            Rbx => f.write_str("rbx"),
            Rcx => f.write_str("rcx"),
            Rdx => f.write_str("rdx"),
            Rsi => f.write_str("rsi"),
            Rdi => f.write_str("rdi"),
            Rbp => f.write_str("rbp"),
            Rsp => f.write_str("rsp"),
            R8 => f.write_str("r8"),
            R9 => f.write_str("r9"),
            R10 => f.write_str("r10"),
            R11 => f.write_str("r11"),
            R12 => f.write_str("r12"),
            R13 => f.write_str("r13"),
            R14 => f.write_str("r14"),
            R15 => f.write_str("r15"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Immediate(i64),
    Register(Reg64),
    Label(String),
    Memory(Reg64, i64),
    Indexed(Reg64, Reg64, u8),
    RipRelative(String),
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        use Operand::*;
        match self {
            Immediate(i) => write!(f, "${}", i),
            Register(reg) => write!(f, "%{}", reg),
            Label(lbl) => f.write_str(lbl),
            Memory(reg, 0) => write!(f, "(%{})", reg),
            Memory(reg, d) => write!(f, "{}(%{})", d, reg),
            Indexed(base, index, scale) => write!(f, "(%{},%{},{})", base, index, scale),
            RipRelative(lbl) => write!(f, "{}(%rip)", lbl),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Inst {
    Comment(String),
    Section(String),
    Global(String),
    Label(String),
    Quad(Vec<i64>),
    Zero(usize),
    Str(String),

    Jmp(Operand),
    Je(Operand),
    Jne(Operand),
    Jl(Operand),
    Jle(Operand),
    Jg(Operand),
    Jge(Operand),
    Call(Operand),
    Ret,
    Cqto,

    Push(Operand),
    Pop(Operand),
    Mov(Operand, Operand),
    Movzb(Operand, Operand),
    Lea(Operand, Operand),

    Add(Operand, Operand),
    Sub(Operand, Operand),
    IMul(Operand, Operand),
    IDiv(Operand),
    Neg(Operand),
    Inc(Operand),
    Dec(Operand),

    Cmp(Operand, Operand),
    And(Operand, Operand),
    Or(Operand, Operand),
}

impl Display for Inst {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        use Inst::*;
        // Add separating newline?
        match self {
            Label(lbl) if !lbl.starts_with('.') => f.write_str("\n")?,
            Section(_) => f.write_str("\n")?,
            _ => (),
        };

        // Indent instruction?
        match self {
            Label(_) | Global(_) | Section(_) => (),
            _ => f.write_str("    ")?,
        };

        match self {
            Comment(comment) => write!(f, "# {}", comment),
            Section(section) => write!(f, ".section {}", section),
            Global(global) => write!(f, ".globl {}", global),
            Label(lbl) => write!(f, "{}:", lbl),
            Quad(values) => {
                let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, ".quad {}", values.join(", "))
            }
            Zero(bytes) => write!(f, ".zero {}", bytes),
            Str(s) => write!(f, ".string \"{}\"", s),

            Jmp(a) => write!(f, "jmp {}", a),
            Je(a) => write!(f, "je {}", a),
            Jne(a) => write!(f, "jne {}", a),
            Jl(a) => write!(f, "jl {}", a),
            Jle(a) => write!(f, "jle {}", a),
            Jg(a) => write!(f, "jg {}", a),
            Jge(a) => write!(f, "jge {}", a),
            Call(a) => write!(f, "call {}", a),
            Ret => f.write_str("ret"),
            Cqto => f.write_str("cqto"),

            Push(a) => write!(f, "pushq {}", a),
            Pop(a) => write!(f, "popq {}", a),
            Mov(a, b) => write!(f, "movq {}, {}", a, b),
            Movzb(a, b) => write!(f, "movzbq {}, {}", a, b),
            Lea(a, b) => write!(f, "leaq {}, {}", a, b),

            Add(a, b) => write!(f, "addq {}, {}", a, b),
            Sub(a, b) => write!(f, "subq {}, {}", a, b),
            IMul(a, b) => write!(f, "imulq {}, {}", a, b),
            IDiv(a) => write!(f, "idivq {}", a),
            Neg(a) => write!(f, "negq {}", a),
            Inc(a) => write!(f, "incq {}", a),
            Dec(a) => write!(f, "decq {}", a),

            Cmp(a, b) => write!(f, "cmpq {}, {}", a, b),
            And(a, b) => write!(f, "andq {}, {}", a, b),
            Or(a, b) => write!(f, "orq {}, {}", a, b),
        }
    }
}

#[macro_export]
macro_rules! unit_op {
    (ret) => {
        $crate::compiler::x86::assembly::Inst::Ret
    };
    (cqto) => {
        $crate::compiler::x86::assembly::Inst::Cqto
    };
}

#[macro_export]
macro_rules! unary_op {
    (jmp) => {
        $crate::compiler::x86::assembly::Inst::Jmp
    };
    (je) => {
        $crate::compiler::x86::assembly::Inst::Je
    };
    (jne) => {
        $crate::compiler::x86::assembly::Inst::Jne
    };
    (jl) => {
        $crate::compiler::x86::assembly::Inst::Jl
    };
    (jle) => {
        $crate::compiler::x86::assembly::Inst::Jle
    };
    (jg) => {
        $crate::compiler::x86::assembly::Inst::Jg
    };
    (jge) => {
        $crate::compiler::x86::assembly::Inst::Jge
    };
    (call) => {
        $crate::compiler::x86::assembly::Inst::Call
    };
    (pushq) => {
        $crate::compiler::x86::assembly::Inst::Push
    };
    (popq) => {
        $crate::compiler::x86::assembly::Inst::Pop
    };
    (idivq) => {
        $crate::compiler::x86::assembly::Inst::IDiv
    };
    (negq) => {
        $crate::compiler::x86::assembly::Inst::Neg
    };
    (incq) => {
        $crate::compiler::x86::assembly::Inst::Inc
    };
    (decq) => {
        $crate::compiler::x86::assembly::Inst::Dec
    };
}

#[macro_export]
macro_rules! binary_op {
    (movq) => {
        $crate::compiler::x86::assembly::Inst::Mov
    };
    (movzbq) => {
        $crate::compiler::x86::assembly::Inst::Movzb
    };
    (leaq) => {
        $crate::compiler::x86::assembly::Inst::Lea
    };
    (addq) => {
        $crate::compiler::x86::assembly::Inst::Add
    };
    (subq) => {
        $crate::compiler::x86::assembly::Inst::Sub
    };
    (imulq) => {
        $crate::compiler::x86::assembly::Inst::IMul
    };
    (cmpq) => {
        $crate::compiler::x86::assembly::Inst::Cmp
    };
    (andq) => {
        $crate::compiler::x86::assembly::Inst::And
    };
    (orq) => {
        $crate::compiler::x86::assembly::Inst::Or
    };
}

#[macro_export]
macro_rules! register {
    (rax) => {
        $crate::compiler::x86::assembly::Reg64::Rax
    };
    (rbx) => {
        $crate::compiler::x86::assembly::Reg64::Rbx
    };
    (rcx) => {
        $crate::compiler::x86::assembly::Reg64::Rcx
    };
    (rdx) => {
        $crate::compiler::x86::assembly::Reg64::Rdx
    };
    (rsi) => {
        $crate::compiler::x86::assembly::Reg64::Rsi
    };
    (rdi) => {
        $crate::compiler::x86::assembly::Reg64::Rdi
    };
    (rbp) => {
        $crate::compiler::x86::assembly::Reg64::Rbp
    };
    (rsp) => {
        $crate::compiler::x86::assembly::Reg64::Rsp
    };
    (r10) => {
        $crate::compiler::x86::assembly::Reg64::R10
    };
    (r11) => {
        $crate::compiler::x86::assembly::Reg64::R11
    };
    (r12) => {
        $crate::compiler::x86::assembly::Reg64::R12
    };
    (r13) => {
        $crate::compiler::x86::assembly::Reg64::R13
    };
    (r14) => {
        $crate::compiler::x86::assembly::Reg64::R14
    };
    (r15) => {
        $crate::compiler::x86::assembly::Reg64::R15
    };
}

#[macro_export]
macro_rules! operand {
    // memory
    ([% {$base:expr}, % {$index:expr}, $scale:literal]) => {
        $crate::compiler::x86::assembly::Operand::Indexed($base, $index, $scale)
    };
    ([% {$reg:expr} - {$d:expr}]) => {
        $crate::compiler::x86::assembly::Operand::Memory($reg, -($d as i64))
    };
    ([% $reg:ident - {$d:expr}]) => {
        $crate::compiler::x86::assembly::Operand::Memory($crate::register!($reg), -($d as i64))
    };
    ([% $reg:ident + {$d:expr}]) => {
        $crate::compiler::x86::assembly::Operand::Memory($crate::register!($reg), $d as i64)
    };
    ([% {$reg:expr}]) => {
        $crate::compiler::x86::assembly::Operand::Memory($reg, 0)
    };
    ([% $reg:ident]) => {
        $crate::compiler::x86::assembly::Operand::Memory($crate::register!($reg), 0)
    };
    ([@ {$e:expr}]) => {
        $crate::compiler::x86::assembly::Operand::RipRelative(($e).to_string())
    };
    ([@ $e:ident]) => {
        $crate::compiler::x86::assembly::Operand::RipRelative(stringify!($e).into())
    };

    // register
    (% {$reg:expr}) => {
        $crate::compiler::x86::assembly::Operand::Register($reg)
    };
    (% $reg:ident) => {
        $crate::compiler::x86::assembly::Operand::Register($crate::register!($reg))
    };

    // labels
    (@ {$e:expr}) => {
        $crate::compiler::x86::assembly::Operand::Label(($e).to_string())
    };
    (@ $e:ident) => {
        $crate::compiler::x86::assembly::Operand::Label(stringify!($e).into())
    };

    // immediate
    ({$e:expr}) => {
        $crate::compiler::x86::assembly::Operand::Immediate($e as i64)
    };
    ($e:literal) => {
        $crate::compiler::x86::assembly::Operand::Immediate($e)
    };
}

#[macro_export]
macro_rules! assembly {
    (($buf:expr) {}) => {
    };

    /********************/
    /*  MACRO OPERATIONS */
    /********************/
    // Append another set of instructions
    (($buf:expr) {{{$is:expr}} $($tail:tt)*}) => {
        for inst in $is.iter() {
            $buf.push(inst.clone());
        }
        $crate::assembly!(($buf) {$($tail)*})
    };

    /********************/
    /*     COMMENTS       */
    /********************/
    (($buf:expr) {;$comment:literal $($tail:tt)*}) => {
        $buf.push($crate::compiler::x86::assembly::Inst::Comment($comment.into()));
        $crate::assembly!(($buf) {$($tail)*})
    };
    (($buf:expr) {;{$comment:expr} $($tail:tt)*}) => {
        $buf.push($crate::compiler::x86::assembly::Inst::Comment(($comment).to_string()));
        $crate::assembly!(($buf) {$($tail)*})
    };

    /********************/
    /*     LABELS       */
    /********************/
    (($buf:expr) {@{$label:expr}: $($tail:tt)*}) => {
        $buf.push($crate::compiler::x86::assembly::Inst::Label(($label).to_string()));
        $crate::assembly!(($buf) {$($tail)*})
    };
    (($buf:expr) {@$label:ident: $($tail:tt)*}) => {
        $buf.push($crate::compiler::x86::assembly::Inst::Label(stringify!($label).into()));
        $crate::assembly!(($buf) {$($tail)*})
    };

    /********************/
    /* UNIT OPERATORS */
    /********************/
    (($buf:expr) {$inst:ident; $($tail:tt)*}) => {
        $buf.push($crate::unit_op!($inst));
        $crate::assembly!(($buf) {$($tail)*})
    };

    /********************/
    /* UNARY OPERATORS */
    /********************/
    (($buf:expr) {$inst:ident % $a:tt; $($tail:tt)*}) => {
        $buf.push($crate::unary_op!($inst)($crate::operand!(% $a)));
        $crate::assembly!(($buf) {$($tail)*})
    };
    (($buf:expr) {$inst:ident @ $a:tt; $($tail:tt)*}) => {
        $buf.push($crate::unary_op!($inst)($crate::operand!(@ $a)));
        $crate::assembly!(($buf) {$($tail)*})
    };
    (($buf:expr) {$inst:ident $a:tt; $($tail:tt)*}) => {
        $buf.push($crate::unary_op!($inst)($crate::operand!($a)));
        $crate::assembly!(($buf) {$($tail)*})
    };

    /********************/
    /* BINARY OPERATORS */
    /********************/
    // reg, reg
    (($buf:expr) {$inst:ident % $a:tt, % $b:tt; $($tail:tt)*}) => {
        $buf.push($crate::binary_op!($inst)($crate::operand!(% $a), $crate::operand!(% $b)));
        $crate::assembly!(($buf) {$($tail)*})
    };
    // reg, mem
    (($buf:expr) {$inst:ident % $a:tt, $b:tt; $($tail:tt)*}) => {
        $buf.push($crate::binary_op!($inst)($crate::operand!(% $a), $crate::operand!($b)));
        $crate::assembly!(($buf) {$($tail)*})
    };
    // literal or mem, reg
    (($buf:expr) {$inst:ident $a:tt, % $b:tt; $($tail:tt)*}) => {
        $buf.push($crate::binary_op!($inst)($crate::operand!($a), $crate::operand!(% $b)));
        $crate::assembly!(($buf) {$($tail)*})
    };
    // literal, mem
    (($buf:expr) {$inst:ident $a:tt, $b:tt; $($tail:tt)*}) => {
        $buf.push($crate::binary_op!($inst)($crate::operand!($a), $crate::operand!($b)));
        $crate::assembly!(($buf) {$($tail)*})
    };
}
