//! Capacity limits for compilation and matching

/// The default capacity of the instruction arena, shared by the forward and backward programs
pub const DEFAULT_INSTRUCTION_LIMIT: usize = 1024;
/// The default capacity of each of the parser's operand and operator stacks
pub const DEFAULT_STACK_LIMIT: usize = 20;
/// The default capacity of each thread list during matching
pub const DEFAULT_THREAD_LIMIT: usize = 127;

/// The set of limits a [`Regex`](crate::Regex) is compiled and executed with
///
/// Every limit is a hard bound: exceeding one of the compile-time limits is a [`CompileError`],
/// and exceeding the thread limit during a search makes that search report no match.
///
/// [`CompileError`]: crate::CompileError
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    pub instruction_limit: usize,
    pub stack_limit: usize,
    pub thread_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            instruction_limit: DEFAULT_INSTRUCTION_LIMIT,
            stack_limit: DEFAULT_STACK_LIMIT,
            thread_limit: DEFAULT_THREAD_LIMIT,
        }
    }
}
