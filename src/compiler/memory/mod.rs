/**
 * Memory layout of the generated program.
 *
 * The following concerns are handled by this submodule
 * 1. Assign the position of every parameter and local within the stack
 * frame of its function.
 * 2. Generate the unique labels used by control flow and function epilogues.
 * 3. Construct a string pool of all string literals used in function bodies.
 */
pub(super) mod frame;
pub(super) mod labels;
pub(super) mod stringpool;
