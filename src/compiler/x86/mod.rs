/*!
 # x86
 ## About
 This module provides a DSL that models x86-64 assembly in the AT&T syntax
 accepted by the GNU assembler.  The code generator builds a `Vec<Inst>` with
 the `assembly!` macro and prints each instruction on its own line.

 ## Example
 ```ignore
 assembly!{(code){
     movq %rsp, %rbp;
     addq %r10, %rbx;
     pushq %rbx;
 }}
 ```

## Syntax
1. `%<register>` - The `%` prefix indicates that the next token will be a register.
2. `{expression}` - This is an expression which will be evaluated and whose result
    will be used in the generated assembly. On its own it is an immediate, after
    a `%` it is the register to use:

    ```ignore
        assembly!{(code){
            popq %{reg};   // where reg is of type Reg64
        }};
    ```

3. `@label` - a label named `label`, used as a jump or call target.
4. `@{expr}:` - defines the label produced by `expr`.
5. `[%rbp-{d}]` - the memory `d` bytes below `%rbp`.
6. `[@label]` - the memory at `label`, addressed relative to `%rip`.
7. `[%{base}, %{index}, 8]` - the memory at `base + index * 8`.
8. `;"comment"` - emits a comment line.
9. `{{iterable of instructions}}` - injects any iterable which contains `Inst`. This
    allows code generated in helper functions to be easily injected into an
    assembly macro.
 */

pub mod assembly;
