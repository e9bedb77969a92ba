pub mod import;
pub mod parse;
pub mod reconstruct;
pub mod review;
pub mod status;

mod source;
