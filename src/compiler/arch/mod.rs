/**
 * Arch contains abstractions for general architectural concepts such as
 * the bank of scratch registers expressions are evaluated in.  This is part
 * of the architecture independent interface between the compiler and the
 * actual generation of assembly code.
 */
pub mod registers;
