//! Section parsing and the sectioned projection of the node model

mod parser;
mod projection;
