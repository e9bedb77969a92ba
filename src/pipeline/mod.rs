pub mod merge;
pub mod normalize;
pub mod parser;
pub mod reconstruct;
pub mod session;
pub mod storage;

#[cfg(test)]
mod tests;
