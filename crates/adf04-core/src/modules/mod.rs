pub mod crossmatch;
pub mod merge;
pub mod normalize;
pub mod parse;
pub mod remap;
pub mod serialize;
